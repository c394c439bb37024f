//! Registry of schedule templates keyed by gate name and qubits.

use rustc_hash::FxHashMap;
use std::collections::BTreeSet;
use tracing::debug;

use crate::error::{PulseError, PulseResult};
use crate::parametric::Bindings;
use crate::schedule::Schedule;

/// Maps `(gate name, qubit tuple)` to a schedule template.
///
/// Templates may hold free parameters; [`CmdDef::get`] binds them. The
/// registry has no internal synchronization.
#[derive(Debug, Clone, Default)]
pub struct CmdDef {
    defs: FxHashMap<String, FxHashMap<Vec<u32>, Schedule>>,
}

impl CmdDef {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a template, replacing any previous one under the same key.
    pub fn add(&mut self, name: impl Into<String>, qubits: &[u32], schedule: Schedule) {
        let name = name.into();
        debug!("Registering command definition {} on qubits {:?}", name, qubits);
        self.defs
            .entry(name)
            .or_default()
            .insert(qubits.to_vec(), schedule);
    }

    /// Whether a template is registered.
    pub fn has(&self, name: &str, qubits: &[u32]) -> bool {
        self.defs
            .get(name)
            .is_some_and(|by_qubits| by_qubits.contains_key(qubits))
    }

    /// The template with its free parameters bound.
    ///
    /// Bindings for symbols the template does not use are ignored.
    pub fn get(&self, name: &str, qubits: &[u32], bindings: &Bindings) -> PulseResult<Schedule> {
        self.get_unbound(name, qubits)?.bind_parameters(bindings)
    }

    /// The template as registered.
    pub fn get_unbound(&self, name: &str, qubits: &[u32]) -> PulseResult<&Schedule> {
        self.defs
            .get(name)
            .and_then(|by_qubits| by_qubits.get(qubits))
            .ok_or_else(|| not_found(name, qubits))
    }

    /// Remove and return a template.
    pub fn pop(&mut self, name: &str, qubits: &[u32]) -> PulseResult<Schedule> {
        let by_qubits = self
            .defs
            .get_mut(name)
            .ok_or_else(|| not_found(name, qubits))?;
        let schedule = by_qubits
            .remove(qubits)
            .ok_or_else(|| not_found(name, qubits))?;
        if by_qubits.is_empty() {
            self.defs.remove(name);
        }
        Ok(schedule)
    }

    /// Names with at least one template.
    pub fn cmd_types(&self) -> BTreeSet<String> {
        self.defs.keys().cloned().collect()
    }

    /// Qubit tuples registered for `name`, sorted.
    pub fn cmd_qubits(&self, name: &str) -> Vec<Vec<u32>> {
        let mut qubits: Vec<_> = self
            .defs
            .get(name)
            .map(|by_qubits| by_qubits.keys().cloned().collect())
            .unwrap_or_default();
        qubits.sort();
        qubits
    }

    /// Number of templates.
    pub fn len(&self) -> usize {
        self.defs.values().map(FxHashMap::len).sum()
    }

    /// Whether no template is registered.
    pub fn is_empty(&self) -> bool {
        self.defs.is_empty()
    }
}

fn not_found(name: &str, qubits: &[u32]) -> PulseError {
    PulseError::CmdDefNotFound {
        name: name.to_string(),
        qubits: qubits.to_vec(),
    }
}

impl<S: Into<String>> FromIterator<((S, Vec<u32>), Schedule)> for CmdDef {
    fn from_iter<I: IntoIterator<Item = ((S, Vec<u32>), Schedule)>>(iter: I) -> Self {
        let mut cmd_def = CmdDef::new();
        for ((name, qubits), schedule) in iter {
            cmd_def.add(name, &qubits, schedule);
        }
        cmd_def
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channel::Channel;
    use crate::command::{FrameChange, SamplePulse};
    use num_complex::Complex64;
    use qobj_ir::ParameterExpression;

    fn template() -> Schedule {
        let pulse = SamplePulse::new(vec![Complex64::new(0.5, 0.0); 4]);
        Schedule::new()
            .insert(0, pulse.to(Channel::Drive(0)))
            .unwrap()
            .insert(4, FrameChange::new(ParameterExpression::symbol("P0")).to(Channel::Drive(0)))
            .unwrap()
    }

    #[test]
    fn test_add_has_pop() {
        let mut defs = CmdDef::new();
        defs.add("u1", &[0], template());
        assert!(defs.has("u1", &[0]));
        assert!(!defs.has("u1", &[1]));
        assert!(!defs.has("cx", &[0]));
        assert_eq!(defs.len(), 1);

        let popped = defs.pop("u1", &[0]).unwrap();
        assert_eq!(popped.flatten().count(), 2);
        assert!(defs.is_empty());

        let err = defs.pop("u1", &[0]).unwrap_err();
        assert!(matches!(err, PulseError::CmdDefNotFound { name, .. } if name == "u1"));
    }

    #[test]
    fn test_get_binds_parameters() {
        let defs: CmdDef = [(("u1", vec![0]), template())].into_iter().collect();

        let mut bindings = Bindings::default();
        bindings.insert("P0".into(), 1.57);
        bindings.insert("extra".into(), 3.0);
        let bound = defs.get("u1", &[0], &bindings).unwrap();
        assert!(bound.parameters().is_empty());

        // The registered template keeps its free parameter.
        assert_eq!(defs.get_unbound("u1", &[0]).unwrap().parameters().len(), 1);

        let err = defs.get("u1", &[0], &Bindings::default()).unwrap_err();
        assert!(matches!(err, PulseError::UnboundParameter(name) if name == "P0"));

        assert!(matches!(
            defs.get("u1", &[3], &bindings),
            Err(PulseError::CmdDefNotFound { .. })
        ));
    }

    #[test]
    fn test_cmd_types_and_qubits() {
        let mut defs = CmdDef::new();
        defs.add("cx", &[1, 0], Schedule::new());
        defs.add("cx", &[0, 1], Schedule::new());
        defs.add("measure", &[0], Schedule::new());

        assert_eq!(
            defs.cmd_types().into_iter().collect::<Vec<_>>(),
            vec!["cx", "measure"]
        );
        assert_eq!(defs.cmd_qubits("cx"), vec![vec![0, 1], vec![1, 0]]);
        assert!(defs.cmd_qubits("h").is_empty());
    }
}
