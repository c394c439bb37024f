//! Lowering of schedule leaves into wire instructions.

use qobj_pulse::{
    Acquire, Channel, Command, FrameChange, Instruction, Parametric, PersistentValue, SamplePulse,
    Schedule, Snapshot,
};

use crate::config::MeasLevel;
use crate::error::{AssembleError, AssembleResult};
use crate::pulse::PulseNames;
use crate::qobj::PulseQobjInstruction;

/// Encodes `(t0, Instruction)` pairs for one measurement level.
///
/// Every [`Command`] variant has its own encoder; the match is exhaustive,
/// so a new variant cannot be dropped silently. Unnamed pulses are looked
/// up in the converter's [`PulseNames`].
#[derive(Debug, Clone, Default)]
pub struct InstructionConverter {
    meas_level: MeasLevel,
    pulse_names: PulseNames,
}

impl InstructionConverter {
    /// Converter for `meas_level`.
    pub fn new(meas_level: MeasLevel) -> Self {
        Self {
            meas_level,
            pulse_names: PulseNames::default(),
        }
    }

    /// Use `names` for pulses created without a name.
    #[must_use]
    pub fn with_pulse_names(mut self, names: PulseNames) -> Self {
        self.pulse_names = names;
        self
    }

    /// The configured measurement level.
    pub fn meas_level(&self) -> MeasLevel {
        self.meas_level
    }

    /// Names for pulses created without one.
    pub fn pulse_names(&self) -> &PulseNames {
        &self.pulse_names
    }

    /// Encode one leaf starting at absolute time `t0`.
    pub fn convert(&self, t0: u64, inst: &Instruction) -> AssembleResult<PulseQobjInstruction> {
        match inst.command() {
            Command::SamplePulse(pulse) => self.convert_drive(t0, inst, pulse),
            Command::FrameChange(fc) => self.convert_frame_change(t0, inst, fc),
            Command::PersistentValue(pv) => self.convert_persistent_value(t0, inst, pv),
            Command::Acquire(acquire) => self.convert_acquire(t0, inst, acquire),
            Command::Snapshot(snapshot) => Ok(self.convert_snapshot(t0, snapshot)),
        }
    }

    /// Encode every leaf of `schedule` in flatten order.
    pub fn convert_schedule(&self, schedule: &Schedule) -> AssembleResult<Vec<PulseQobjInstruction>> {
        schedule
            .flatten()
            .map(|(t0, inst)| self.convert(t0, inst))
            .collect()
    }

    fn convert_drive(
        &self,
        t0: u64,
        inst: &Instruction,
        pulse: &SamplePulse,
    ) -> AssembleResult<PulseQobjInstruction> {
        let name = self.pulse_names.name_of(pulse).ok_or_else(|| {
            AssembleError::Encoding(format!("pulse {} has no library name", pulse.id()))
        })?;
        let mut out = PulseQobjInstruction::new(name, t0);
        out.ch = Some(output_channel(inst)?);
        Ok(out)
    }

    fn convert_frame_change(
        &self,
        t0: u64,
        inst: &Instruction,
        fc: &FrameChange,
    ) -> AssembleResult<PulseQobjInstruction> {
        let mut out = PulseQobjInstruction::new("fc", t0);
        out.ch = Some(output_channel(inst)?);
        out.phase = Some(bound(&fc.phase, inst)?);
        Ok(out)
    }

    fn convert_persistent_value(
        &self,
        t0: u64,
        inst: &Instruction,
        pv: &PersistentValue,
    ) -> AssembleResult<PulseQobjInstruction> {
        let mut out = PulseQobjInstruction::new("pv", t0);
        out.ch = Some(output_channel(inst)?);
        out.val = Some(bound(&pv.value, inst)?);
        Ok(out)
    }

    fn convert_acquire(
        &self,
        t0: u64,
        inst: &Instruction,
        acquire: &Acquire,
    ) -> AssembleResult<PulseQobjInstruction> {
        let mut qubits = Vec::new();
        let mut memory_slots = Vec::new();
        let mut register_slots = Vec::new();
        for channel in inst.channels() {
            match *channel {
                Channel::Acquire(q) => qubits.push(q),
                Channel::MemorySlot(m) => memory_slots.push(m),
                Channel::RegisterSlot(r) => register_slots.push(r),
                other => {
                    return Err(AssembleError::Encoding(format!(
                        "acquire '{}' cannot use channel {other}",
                        inst.name()
                    )));
                }
            }
        }
        if qubits.is_empty() {
            return Err(AssembleError::Encoding(format!(
                "acquire '{}' has no acquire channel",
                inst.name()
            )));
        }

        let mut out = PulseQobjInstruction::new("acquire", t0);
        out.duration = Some(acquire.duration());
        out.qubits = Some(qubits);
        out.memory_slot = Some(memory_slots);

        if self.meas_level.has_kernels() {
            out.kernels = Some(acquire.kernel.iter().cloned().collect());
        }
        if self.meas_level.has_discriminators() {
            out.register_slot = Some(register_slots);
            out.discriminators = Some(acquire.discriminator.iter().cloned().collect());
        }
        Ok(out)
    }

    fn convert_snapshot(&self, t0: u64, snapshot: &Snapshot) -> PulseQobjInstruction {
        let mut out = PulseQobjInstruction::new("snapshot", t0);
        out.label = Some(snapshot.label.clone());
        out.snapshot_type = Some(snapshot.snapshot_type.clone());
        out
    }
}

fn output_channel(inst: &Instruction) -> AssembleResult<Channel> {
    match inst.channels() {
        [channel] if channel.is_output() => Ok(*channel),
        channels => Err(AssembleError::Encoding(format!(
            "'{}' must be played on a single drive, control or measure channel, got {}",
            inst.name(),
            channels
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(", ")
        ))),
    }
}

fn bound<T: Copy>(value: &Parametric<T>, inst: &Instruction) -> AssembleResult<T> {
    match value {
        Parametric::Bound(v) => Ok(*v),
        Parametric::Free(expr) => Err(AssembleError::Encoding(format!(
            "'{}' has unbound parameter expression {expr}",
            inst.name()
        ))),
    }
}
