//! Payloads carried by schedule leaves.

use num_complex::Complex64;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::channel::Channel;
use crate::error::PulseResult;
use crate::instruction::Instruction;
use crate::parametric::{Bindings, Parametric};

static NEXT_COMMAND_ID: AtomicU64 = AtomicU64::new(0);

/// Process-unique identity of a command.
///
/// Clones share the identity of the original; two separately constructed
/// commands never do, even with identical contents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CommandId(u64);

impl CommandId {
    fn next() -> Self {
        CommandId(NEXT_COMMAND_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for CommandId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A pulse given by its samples.
#[derive(Debug, Clone, PartialEq)]
pub struct SamplePulse {
    id: CommandId,
    name: Option<String>,
    samples: Arc<[Complex64]>,
}

impl SamplePulse {
    /// Create an unnamed pulse.
    ///
    /// The assembler gives it a library name when it is first played.
    pub fn new(samples: impl Into<Arc<[Complex64]>>) -> Self {
        Self {
            id: CommandId::next(),
            name: None,
            samples: samples.into(),
        }
    }

    /// Create a named pulse.
    pub fn with_name(name: impl Into<String>, samples: impl Into<Arc<[Complex64]>>) -> Self {
        Self {
            id: CommandId::next(),
            name: Some(name.into()),
            samples: samples.into(),
        }
    }

    /// Identity of this pulse.
    pub fn id(&self) -> CommandId {
        self.id
    }

    /// Name used in the pulse library and by drive instructions, if given.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// The samples.
    pub fn samples(&self) -> &[Complex64] {
        &self.samples
    }

    /// Number of samples.
    pub fn duration(&self) -> u64 {
        self.samples.len() as u64
    }

    /// Play this pulse on `channel`.
    pub fn to(&self, channel: Channel) -> Instruction {
        Instruction::on_channel(Command::SamplePulse(self.clone()), channel)
    }
}

/// A kernel or discriminator choice for an acquisition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeasurementOption {
    /// Name of the kernel or discriminator.
    pub name: String,
    /// Free-form parameters, passed through to the backend.
    #[serde(default)]
    pub params: serde_json::Map<String, serde_json::Value>,
}

impl MeasurementOption {
    /// Create an option with no parameters.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            params: serde_json::Map::new(),
        }
    }

    /// Add a parameter.
    #[must_use]
    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }
}

/// A measurement acquisition window.
#[derive(Debug, Clone, PartialEq)]
pub struct Acquire {
    id: CommandId,
    duration: u64,
    /// Discriminator used at measurement level 2.
    pub discriminator: Option<MeasurementOption>,
    /// Integration kernel used at measurement levels 1 and 2.
    pub kernel: Option<MeasurementOption>,
}

impl Acquire {
    /// Create an acquisition of the given length.
    pub fn new(duration: u64) -> Self {
        Self {
            id: CommandId::next(),
            duration,
            discriminator: None,
            kernel: None,
        }
    }

    /// Set the discriminator.
    #[must_use]
    pub fn with_discriminator(mut self, discriminator: MeasurementOption) -> Self {
        self.discriminator = Some(discriminator);
        self
    }

    /// Set the kernel.
    #[must_use]
    pub fn with_kernel(mut self, kernel: MeasurementOption) -> Self {
        self.kernel = Some(kernel);
        self
    }

    /// Identity of this command.
    pub fn id(&self) -> CommandId {
        self.id
    }

    /// Acquisition length.
    pub fn duration(&self) -> u64 {
        self.duration
    }

    /// Acquire `qubits` into `memory_slots`, and into `register_slots` when
    /// results should also feed back.
    pub fn to(
        &self,
        qubits: &[u32],
        memory_slots: &[u32],
        register_slots: &[u32],
    ) -> PulseResult<Instruction> {
        let channels = qubits
            .iter()
            .map(|&q| Channel::Acquire(q))
            .chain(memory_slots.iter().map(|&m| Channel::MemorySlot(m)))
            .chain(register_slots.iter().map(|&r| Channel::RegisterSlot(r)))
            .collect();
        Instruction::new(Command::Acquire(self.clone()), channels)
    }
}

/// A phase shift of a channel's frame.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameChange {
    id: CommandId,
    /// Phase in radians.
    pub phase: Parametric<f64>,
}

impl FrameChange {
    /// Create a frame change.
    pub fn new(phase: impl Into<Parametric<f64>>) -> Self {
        Self {
            id: CommandId::next(),
            phase: phase.into(),
        }
    }

    /// Identity of this command.
    pub fn id(&self) -> CommandId {
        self.id
    }

    /// Apply on `channel`.
    pub fn to(&self, channel: Channel) -> Instruction {
        Instruction::on_channel(Command::FrameChange(self.clone()), channel)
    }
}

/// A constant output level held until changed.
#[derive(Debug, Clone, PartialEq)]
pub struct PersistentValue {
    id: CommandId,
    /// Complex output amplitude.
    pub value: Parametric<Complex64>,
}

impl PersistentValue {
    /// Create a persistent value.
    pub fn new(value: impl Into<Parametric<Complex64>>) -> Self {
        Self {
            id: CommandId::next(),
            value: value.into(),
        }
    }

    /// Identity of this command.
    pub fn id(&self) -> CommandId {
        self.id
    }

    /// Apply on `channel`.
    pub fn to(&self, channel: Channel) -> Instruction {
        Instruction::on_channel(Command::PersistentValue(self.clone()), channel)
    }
}

/// A simulator snapshot marker.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    id: CommandId,
    /// Label under which the snapshot is stored.
    pub label: String,
    /// Snapshot kind, e.g. `statevector`.
    pub snapshot_type: String,
}

impl Snapshot {
    /// Create a snapshot.
    pub fn new(label: impl Into<String>, snapshot_type: impl Into<String>) -> Self {
        Self {
            id: CommandId::next(),
            label: label.into(),
            snapshot_type: snapshot_type.into(),
        }
    }

    /// Identity of this command.
    pub fn id(&self) -> CommandId {
        self.id
    }

    /// Place on the snapshot channel.
    pub fn instruction(&self) -> Instruction {
        Instruction::on_channel(Command::Snapshot(self.clone()), Channel::Snapshot)
    }
}

/// Every command kind a schedule leaf can carry.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Sampled pulse.
    SamplePulse(SamplePulse),
    /// Acquisition.
    Acquire(Acquire),
    /// Frame change.
    FrameChange(FrameChange),
    /// Persistent value.
    PersistentValue(PersistentValue),
    /// Snapshot.
    Snapshot(Snapshot),
}

impl Command {
    /// Identity of the command.
    pub fn id(&self) -> CommandId {
        match self {
            Command::SamplePulse(c) => c.id,
            Command::Acquire(c) => c.id,
            Command::FrameChange(c) => c.id,
            Command::PersistentValue(c) => c.id,
            Command::Snapshot(c) => c.id,
        }
    }

    /// Time the command occupies its channels.
    pub fn duration(&self) -> u64 {
        match self {
            Command::SamplePulse(c) => c.duration(),
            Command::Acquire(c) => c.duration,
            Command::FrameChange(_) | Command::PersistentValue(_) | Command::Snapshot(_) => 0,
        }
    }

    /// Short name, used as the default instruction name.
    pub fn name(&self) -> &str {
        match self {
            Command::SamplePulse(c) => c.name().unwrap_or("pulse"),
            Command::Acquire(_) => "acquire",
            Command::FrameChange(_) => "fc",
            Command::PersistentValue(_) => "pv",
            Command::Snapshot(_) => "snapshot",
        }
    }

    /// Free symbols in the command's values.
    pub fn parameters(&self) -> BTreeSet<String> {
        match self {
            Command::FrameChange(c) => c.phase.symbols(),
            Command::PersistentValue(c) => c.value.symbols(),
            Command::SamplePulse(_) | Command::Acquire(_) | Command::Snapshot(_) => BTreeSet::new(),
        }
    }

    /// Resolve every free symbol, keeping the command's identity.
    pub fn bind(&self, bindings: &Bindings) -> PulseResult<Command> {
        Ok(match self {
            Command::FrameChange(c) => Command::FrameChange(FrameChange {
                id: c.id,
                phase: c.phase.bind(bindings)?,
            }),
            Command::PersistentValue(c) => Command::PersistentValue(PersistentValue {
                id: c.id,
                value: c.value.bind(bindings)?,
            }),
            other => other.clone(),
        })
    }
}

impl From<SamplePulse> for Command {
    fn from(c: SamplePulse) -> Self {
        Command::SamplePulse(c)
    }
}

impl From<Acquire> for Command {
    fn from(c: Acquire) -> Self {
        Command::Acquire(c)
    }
}

impl From<FrameChange> for Command {
    fn from(c: FrameChange) -> Self {
        Command::FrameChange(c)
    }
}

impl From<PersistentValue> for Command {
    fn from(c: PersistentValue) -> Self {
        Command::PersistentValue(c)
    }
}

impl From<Snapshot> for Command {
    fn from(c: Snapshot) -> Self {
        Command::Snapshot(c)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use qobj_ir::ParameterExpression;

    #[test]
    fn test_sample_pulse_identity() {
        let samples = vec![Complex64::new(0.1, 0.0); 4];
        let a = SamplePulse::new(samples.clone());
        let b = SamplePulse::new(samples);

        assert_eq!(a.duration(), 4);
        assert_eq!(a.samples(), b.samples());
        assert_ne!(a.id(), b.id());
        assert_eq!(a.clone().id(), a.id());
        assert_eq!(a.name(), None);
        assert_eq!(Command::from(a).name(), "pulse");

        let named = SamplePulse::with_name("x90", vec![Complex64::new(0.5, 0.0)]);
        assert_eq!(named.name(), Some("x90"));
    }

    #[test]
    fn test_durations() {
        assert_eq!(Command::from(Acquire::new(10)).duration(), 10);
        assert_eq!(Command::from(FrameChange::new(0.5)).duration(), 0);
        assert_eq!(
            Command::from(PersistentValue::new(Complex64::new(0.1, 0.0))).duration(),
            0
        );
        assert_eq!(Command::from(Snapshot::new("s", "statevector")).duration(), 0);
    }

    #[test]
    fn test_bind_keeps_identity() {
        let fc = FrameChange::new(ParameterExpression::symbol("phi"));
        let cmd = Command::from(fc.clone());
        assert_eq!(cmd.parameters().len(), 1);

        let mut bindings = Bindings::default();
        bindings.insert("phi".into(), 1.25);
        let bound = cmd.bind(&bindings).unwrap();
        assert_eq!(bound.id(), fc.id());
        match bound {
            Command::FrameChange(c) => assert_eq!(c.phase, Parametric::Bound(1.25)),
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_measurement_option_params() {
        let opt = MeasurementOption::new("boxcar").with_param("start", 0);
        assert_eq!(opt.params.get("start"), Some(&serde_json::json!(0)));
    }
}
