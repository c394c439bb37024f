//! Lowering of pulse schedules into wire experiments.

use qobj_pulse::{Command, CommandId, SamplePulse, Schedule};
use rustc_hash::{FxHashMap, FxHashSet};
use tracing::debug;

use crate::config::PulseConfig;
use crate::converter::InstructionConverter;
use crate::error::{AssembleError, AssembleResult};
use crate::lo::LoConfig;
use crate::qobj::{ExperimentHeader, PulseLibraryItem, PulseQobjExperiment, PulseQobjExperimentConfig};

/// A schedule together with its per-experiment settings.
#[derive(Debug, Clone, Default)]
pub struct PulseExperiment {
    /// The program.
    pub schedule: Schedule,
    /// Header name; falls back to the schedule's name.
    pub name: Option<String>,
    /// Custom LO frequencies.
    pub lo_config: LoConfig,
}

impl PulseExperiment {
    /// An experiment with default LO frequencies.
    pub fn new(schedule: Schedule) -> Self {
        Self {
            schedule,
            name: None,
            lo_config: LoConfig::default(),
        }
    }

    /// Set the header name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Set custom LO frequencies.
    #[must_use]
    pub fn with_lo_config(mut self, lo_config: LoConfig) -> Self {
        self.lo_config = lo_config;
        self
    }
}

impl From<Schedule> for PulseExperiment {
    fn from(schedule: Schedule) -> Self {
        Self::new(schedule)
    }
}

/// Library names for pulses created without one.
///
/// Unnamed pulses are numbered `p0`, `p1`, ... in the order they are first
/// played across a batch, skipping names already in use. Equal programs
/// therefore always get equal names.
#[derive(Debug, Clone, Default)]
pub struct PulseNames {
    by_id: FxHashMap<CommandId, String>,
}

impl PulseNames {
    /// Name every unnamed pulse played by `schedules`.
    ///
    /// `reserved` lists names that are taken already, such as the backend
    /// default library.
    pub fn assign<'a>(
        schedules: impl IntoIterator<Item = &'a Schedule>,
        reserved: impl IntoIterator<Item = &'a str>,
    ) -> Self {
        let pulses: Vec<&SamplePulse> = schedules
            .into_iter()
            .flat_map(|sched| sched.flatten())
            .filter_map(|(_, inst)| match inst.command() {
                Command::SamplePulse(pulse) => Some(pulse),
                _ => None,
            })
            .collect();

        let mut taken: FxHashSet<String> = reserved.into_iter().map(str::to_string).collect();
        taken.extend(pulses.iter().filter_map(|p| p.name()).map(str::to_string));

        let mut by_id = FxHashMap::default();
        let mut next = 0_usize;
        for pulse in pulses.into_iter().filter(|p| p.name().is_none()) {
            if by_id.contains_key(&pulse.id()) {
                continue;
            }
            let name = loop {
                let candidate = format!("p{next}");
                next += 1;
                if !taken.contains(&candidate) {
                    break candidate;
                }
            };
            by_id.insert(pulse.id(), name);
        }
        Self { by_id }
    }

    /// The pulse's own name, else the assigned one.
    pub fn name_of<'a>(&'a self, pulse: &'a SamplePulse) -> Option<&'a str> {
        pulse
            .name()
            .or_else(|| self.by_id.get(&pulse.id()).map(String::as_str))
    }

    /// Number of assigned names.
    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    /// Whether no name was assigned.
    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }
}

/// One lowered experiment plus what the container needs from it.
#[derive(Debug)]
pub(crate) struct LoweredSchedule {
    pub experiment: PulseQobjExperiment,
    /// Pulses played, first reference first, each identity once.
    pub pulses: Vec<SamplePulse>,
    /// Highest memory slot written by an acquisition.
    pub max_memory_slot: Option<u32>,
}

pub(crate) fn lower_schedule(
    index: usize,
    experiment: &PulseExperiment,
    converter: &InstructionConverter,
    config: &PulseConfig,
) -> AssembleResult<LoweredSchedule> {
    let name = experiment
        .name
        .clone()
        .or_else(|| experiment.schedule.name().map(str::to_string))
        .unwrap_or_else(|| format!("Experiment-{index}"));

    let lo = experiment
        .lo_config
        .overrides(config.qubit_lo_freq.as_deref(), config.meas_lo_freq.as_deref())?;
    if lo.qubit_lo_freq.is_some() || lo.meas_lo_freq.is_some() {
        debug!("Experiment '{}' overrides LO frequencies", name);
    }

    let mut instructions = Vec::new();
    let mut pulses = Vec::new();
    let mut seen = FxHashSet::default();
    let mut max_memory_slot = None;
    for (t0, inst) in experiment.schedule.flatten() {
        let encoded = converter.convert(t0, inst)?;
        match inst.command() {
            Command::SamplePulse(pulse) => {
                if seen.insert(pulse.id()) {
                    pulses.push(pulse.clone());
                }
            }
            Command::Acquire(_) => {
                let top = encoded.memory_slot.iter().flatten().copied().max();
                max_memory_slot = max_memory_slot.max(top);
            }
            Command::FrameChange(_) | Command::PersistentValue(_) | Command::Snapshot(_) => {}
        }
        instructions.push(encoded);
    }

    Ok(LoweredSchedule {
        experiment: PulseQobjExperiment {
            header: ExperimentHeader {
                name: Some(name),
                ..ExperimentHeader::default()
            },
            config: PulseQobjExperimentConfig {
                qubit_lo_freq: lo.qubit_lo_freq,
                meas_lo_freq: lo.meas_lo_freq,
                extra: serde_json::Map::new(),
            },
            instructions,
        },
        pulses,
        max_memory_slot,
    })
}

/// Defaults first, then every played pulse once per identity.
///
/// Pulses with equal samples but different identities stay separate
/// entries. A name may only repeat with identical samples, since
/// instructions refer to library entries by name.
pub(crate) fn build_pulse_library<'a>(
    defaults: &[PulseLibraryItem],
    pulses: impl IntoIterator<Item = &'a SamplePulse>,
    names: &PulseNames,
) -> AssembleResult<Vec<PulseLibraryItem>> {
    let mut library = defaults.to_vec();
    let mut seen: FxHashSet<CommandId> = FxHashSet::default();
    for pulse in pulses {
        if !seen.insert(pulse.id()) {
            continue;
        }
        let name = names.name_of(pulse).ok_or_else(|| {
            AssembleError::Encoding(format!("pulse {} has no library name", pulse.id()))
        })?;
        if let Some(clash) = library
            .iter()
            .find(|item| item.name == name && item.samples != pulse.samples())
        {
            return Err(AssembleError::Encoding(format!(
                "pulse library already holds different samples named '{}'",
                clash.name
            )));
        }
        library.push(PulseLibraryItem {
            name: name.to_string(),
            samples: pulse.samples().to_vec(),
        });
    }
    Ok(library)
}
