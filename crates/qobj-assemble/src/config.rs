//! Run configuration for the circuit and pulse paths.
//!
//! Both configurations load from YAML files or from YAML/JSON strings and
//! are validated after loading. Unknown keys are kept and passed through
//! to the container's top-level config; keys the assembler writes itself
//! are rejected.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::path::Path;

use crate::error::{AssembleError, AssembleResult};
use crate::qobj::{PulseLibraryItem, QobjHeader};

/// How much post-processing the backend applies to measurement results.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(try_from = "u8", into = "u8")]
pub enum MeasLevel {
    /// Raw acquired samples.
    Raw = 0,
    /// Kernel-integrated IQ values.
    Kerneled = 1,
    /// Discriminated bits.
    #[default]
    Classified = 2,
}

impl MeasLevel {
    /// Whether acquisitions carry integration kernels.
    pub fn has_kernels(self) -> bool {
        self >= MeasLevel::Kerneled
    }

    /// Whether acquisitions carry discriminators and register slots.
    pub fn has_discriminators(self) -> bool {
        self == MeasLevel::Classified
    }
}

impl TryFrom<u8> for MeasLevel {
    type Error = String;

    fn try_from(level: u8) -> Result<Self, Self::Error> {
        match level {
            0 => Ok(MeasLevel::Raw),
            1 => Ok(MeasLevel::Kerneled),
            2 => Ok(MeasLevel::Classified),
            other => Err(format!("measurement level must be 0, 1 or 2, got {other}")),
        }
    }
}

impl From<MeasLevel> for u8 {
    fn from(level: MeasLevel) -> Self {
        level as u8
    }
}

impl fmt::Display for MeasLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", u8::from(*self))
    }
}

/// Configuration for assembling circuits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunConfig {
    /// Repetitions per experiment.
    #[serde(default = "default_shots")]
    pub shots: u32,

    /// Credit cap.
    #[serde(default)]
    pub max_credits: Option<u32>,

    /// Simulator seed.
    #[serde(default)]
    pub seed: Option<u64>,

    /// Whether per-shot memory is returned.
    #[serde(default)]
    pub memory: Option<bool>,

    /// Container identifier; generated when unset.
    #[serde(default)]
    pub qobj_id: Option<String>,

    /// Container header.
    #[serde(default)]
    pub qobj_header: QobjHeader,

    /// Further keys, copied into the container config.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Default for RunConfig {
    fn default() -> Self {
        RunConfig {
            shots: default_shots(),
            max_credits: None,
            seed: None,
            memory: None,
            qobj_id: None,
            qobj_header: QobjHeader::default(),
            extra: Map::new(),
        }
    }
}

impl RunConfig {
    /// Load from a YAML (or JSON) file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> AssembleResult<Self> {
        let contents = std::fs::read_to_string(path.as_ref())?;
        Self::from_yaml_str(&contents)
    }

    /// Parse from YAML text.
    pub fn from_yaml_str(text: &str) -> AssembleResult<Self> {
        let config: Self = parse_yaml(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse from JSON text.
    pub fn from_json_str(text: &str) -> AssembleResult<Self> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Set the shot count.
    #[must_use]
    pub fn with_shots(mut self, shots: u32) -> Self {
        self.shots = shots;
        self
    }

    /// Set the simulator seed.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Use a fixed container identifier.
    #[must_use]
    pub fn with_qobj_id(mut self, id: impl Into<String>) -> Self {
        self.qobj_id = Some(id.into());
        self
    }

    /// Add a pass-through key.
    #[must_use]
    pub fn with_extra(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }

    /// Check value ranges and pass-through keys.
    pub fn validate(&self) -> AssembleResult<()> {
        validate_shots(self.shots)?;
        validate_extra(&self.extra, QASM_CONFIG_KEYS)
    }
}

/// Configuration for assembling schedules.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PulseConfig {
    /// Measurement level; decides which acquire fields are emitted.
    #[serde(default)]
    pub meas_level: MeasLevel,

    /// Repetitions per experiment.
    #[serde(default = "default_shots")]
    pub shots: u32,

    /// Backend default qubit LO frequencies (GHz).
    #[serde(default)]
    pub qubit_lo_freq: Option<Vec<f64>>,

    /// Backend default measurement LO frequencies (GHz).
    #[serde(default)]
    pub meas_lo_freq: Option<Vec<f64>>,

    /// Backend default pulse library.
    #[serde(default)]
    pub pulse_library: Vec<PulseLibraryItem>,

    /// Memory slot count; derived from the acquisitions when unset.
    #[serde(default)]
    pub memory_slots: Option<u32>,

    /// Container identifier; generated when unset.
    #[serde(default)]
    pub qobj_id: Option<String>,

    /// Container header.
    #[serde(default)]
    pub qobj_header: QobjHeader,

    /// Further keys, copied into the container config.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Default for PulseConfig {
    fn default() -> Self {
        PulseConfig {
            meas_level: MeasLevel::default(),
            shots: default_shots(),
            qubit_lo_freq: None,
            meas_lo_freq: None,
            pulse_library: Vec::new(),
            memory_slots: None,
            qobj_id: None,
            qobj_header: QobjHeader::default(),
            extra: Map::new(),
        }
    }
}

impl PulseConfig {
    /// Load from a YAML (or JSON) file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> AssembleResult<Self> {
        let contents = std::fs::read_to_string(path.as_ref())?;
        Self::from_yaml_str(&contents)
    }

    /// Parse from YAML text.
    pub fn from_yaml_str(text: &str) -> AssembleResult<Self> {
        let config: Self = parse_yaml(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse from JSON text.
    pub fn from_json_str(text: &str) -> AssembleResult<Self> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Set the measurement level.
    #[must_use]
    pub fn with_meas_level(mut self, level: MeasLevel) -> Self {
        self.meas_level = level;
        self
    }

    /// Set the default qubit LO frequencies.
    #[must_use]
    pub fn with_qubit_lo_freq(mut self, freqs: Vec<f64>) -> Self {
        self.qubit_lo_freq = Some(freqs);
        self
    }

    /// Set the default measurement LO frequencies.
    #[must_use]
    pub fn with_meas_lo_freq(mut self, freqs: Vec<f64>) -> Self {
        self.meas_lo_freq = Some(freqs);
        self
    }

    /// Set the default pulse library.
    #[must_use]
    pub fn with_pulse_library(mut self, library: Vec<PulseLibraryItem>) -> Self {
        self.pulse_library = library;
        self
    }

    /// Use a fixed container identifier.
    #[must_use]
    pub fn with_qobj_id(mut self, id: impl Into<String>) -> Self {
        self.qobj_id = Some(id.into());
        self
    }

    /// Check value ranges and pass-through keys.
    pub fn validate(&self) -> AssembleResult<()> {
        validate_shots(self.shots)?;
        validate_extra(&self.extra, PULSE_CONFIG_KEYS)?;
        for (key, freqs) in [
            ("qubit_lo_freq", &self.qubit_lo_freq),
            ("meas_lo_freq", &self.meas_lo_freq),
        ] {
            if let Some(bad) = freqs
                .iter()
                .flatten()
                .find(|f| !f.is_finite() || **f <= 0.0)
            {
                return Err(AssembleError::Config(format!(
                    "{key} entries must be finite and positive, got {bad}"
                )));
            }
        }
        for (i, item) in self.pulse_library.iter().enumerate() {
            if self.pulse_library[..i].iter().any(|p| p.name == item.name) {
                return Err(AssembleError::Config(format!(
                    "duplicate pulse library entry '{}'",
                    item.name
                )));
            }
        }
        Ok(())
    }
}

/// Top-level config keys of a `QASM` container.
const QASM_CONFIG_KEYS: &[&str] = &[
    "shots",
    "memory_slots",
    "n_qubits",
    "max_credits",
    "seed",
    "memory",
];

/// Top-level config keys of a `PULSE` container.
const PULSE_CONFIG_KEYS: &[&str] = &[
    "meas_level",
    "qubit_lo_freq",
    "meas_lo_freq",
    "pulse_library",
    "memory_slots",
    "shots",
];

fn default_shots() -> u32 {
    1024
}

fn validate_shots(shots: u32) -> AssembleResult<()> {
    if shots == 0 {
        return Err(AssembleError::Config("shots must be positive".to_string()));
    }
    Ok(())
}

fn validate_extra(extra: &Map<String, Value>, reserved: &[&str]) -> AssembleResult<()> {
    if let Some(key) = reserved.iter().find(|key| extra.contains_key(**key)) {
        return Err(AssembleError::Config(format!(
            "'{key}' is set by the assembler and cannot be passed through"
        )));
    }
    Ok(())
}

fn parse_yaml<T: DeserializeOwned>(text: &str) -> AssembleResult<T> {
    Ok(serde_yaml_ng::from_str(text)?)
}
