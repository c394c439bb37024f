//! Top-level assembly of circuit and schedule batches.

use qobj_ir::Circuit;
use rayon::prelude::*;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info, instrument};

use crate::circuit::assemble_circuit;
use crate::config::{PulseConfig, RunConfig};
use crate::converter::InstructionConverter;
use crate::error::AssembleResult;
use crate::ids::{IdGenerator, UuidGenerator};
use crate::pulse::{PulseExperiment, PulseNames, build_pulse_library, lower_schedule};
use crate::qobj::{
    PulseQobj, PulseQobjConfig, QasmQobj, QasmQobjConfig, Qobj, QobjType, SCHEMA_VERSION,
};

/// Builds Qobj containers from batches of circuits or schedules.
///
/// Experiments are lowered in parallel but keep the caller's order. Any
/// error aborts the batch; no partial container is returned.
#[derive(Clone)]
pub struct Assembler {
    ids: Arc<dyn IdGenerator>,
}

impl Assembler {
    /// An assembler that draws random UUIDs.
    pub fn new() -> Self {
        Self::with_id_generator(UuidGenerator)
    }

    /// An assembler that draws identifiers from `ids`.
    pub fn with_id_generator(ids: impl IdGenerator + 'static) -> Self {
        Self { ids: Arc::new(ids) }
    }

    /// Assemble circuits into a `QASM` container.
    ///
    /// The top-level `n_qubits` and `memory_slots` are the maxima over all
    /// circuits; each experiment keeps its own counts.
    #[instrument(skip(self, circuits, config))]
    pub fn assemble_circuits(
        &self,
        circuits: &[Circuit],
        config: &RunConfig,
    ) -> AssembleResult<QasmQobj> {
        config.validate()?;
        info!("Assembling {} circuits with {} shots", circuits.len(), config.shots);

        let experiments = circuits
            .par_iter()
            .map(assemble_circuit)
            .collect::<AssembleResult<Vec<_>>>()?;

        let n_qubits = experiments
            .iter()
            .map(|e| e.config.n_qubits)
            .max()
            .unwrap_or(0);
        let memory_slots = experiments
            .iter()
            .map(|e| e.config.memory_slots)
            .max()
            .unwrap_or(0);

        let qobj_id = config
            .qobj_id
            .clone()
            .unwrap_or_else(|| self.ids.next_id());
        debug!(
            "Circuit container {}: n_qubits {}, memory_slots {}",
            qobj_id, n_qubits, memory_slots
        );

        Ok(Qobj {
            qobj_id,
            qobj_type: QobjType::Qasm,
            schema_version: SCHEMA_VERSION.to_string(),
            header: config.qobj_header.clone(),
            config: QasmQobjConfig {
                shots: config.shots,
                memory_slots,
                n_qubits,
                max_credits: config.max_credits,
                seed: config.seed,
                memory: config.memory,
                extra: config.extra.clone(),
            },
            experiments,
        })
    }

    /// Assemble schedules into a `PULSE` container.
    ///
    /// Each experiment carries only the LO lists that differ from the
    /// defaults in `config`. The pulse library holds the defaults followed
    /// by every played pulse, once per pulse identity. Unnamed pulses are
    /// named in batch order, so equal batches give equal containers.
    #[instrument(skip(self, experiments, config))]
    pub fn assemble_schedules(
        &self,
        experiments: &[PulseExperiment],
        config: &PulseConfig,
    ) -> AssembleResult<PulseQobj> {
        config.validate()?;
        info!(
            "Assembling {} schedules at measurement level {}",
            experiments.len(),
            config.meas_level
        );

        let names = PulseNames::assign(
            experiments.iter().map(|exp| &exp.schedule),
            config.pulse_library.iter().map(|item| item.name.as_str()),
        );
        debug!("Assigned library names to {} unnamed pulses", names.len());
        let converter = InstructionConverter::new(config.meas_level).with_pulse_names(names);
        let lowered = experiments
            .par_iter()
            .enumerate()
            .map(|(i, exp)| lower_schedule(i, exp, &converter, config))
            .collect::<AssembleResult<Vec<_>>>()?;

        let pulse_library = build_pulse_library(
            &config.pulse_library,
            lowered.iter().flat_map(|l| l.pulses.iter()),
            converter.pulse_names(),
        )?;
        let memory_slots = config.memory_slots.unwrap_or_else(|| {
            lowered
                .iter()
                .filter_map(|l| l.max_memory_slot)
                .max()
                .map_or(0, |slot| slot + 1)
        });

        let qobj_id = config
            .qobj_id
            .clone()
            .unwrap_or_else(|| self.ids.next_id());
        debug!(
            "Pulse container {}: {} library pulses, memory_slots {}",
            qobj_id,
            pulse_library.len(),
            memory_slots
        );

        Ok(Qobj {
            qobj_id,
            qobj_type: QobjType::Pulse,
            schema_version: SCHEMA_VERSION.to_string(),
            header: config.qobj_header.clone(),
            config: PulseQobjConfig {
                meas_level: config.meas_level,
                qubit_lo_freq: config.qubit_lo_freq.clone(),
                meas_lo_freq: config.meas_lo_freq.clone(),
                pulse_library,
                memory_slots,
                shots: config.shots,
                extra: config.extra.clone(),
            },
            experiments: lowered.into_iter().map(|l| l.experiment).collect(),
        })
    }
}

impl Default for Assembler {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Assembler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Assembler").finish_non_exhaustive()
    }
}
