//! Wire model of the executable container.
//!
//! Field names follow the Qobj schema. Optional fields are skipped when
//! unset, so each instruction carries exactly the keys its kind needs.

use num_complex::Complex64;
use qobj_pulse::{Channel, MeasurementOption};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::config::MeasLevel;
use crate::error::AssembleResult;

/// Schema version emitted on every container.
pub const SCHEMA_VERSION: &str = "1.1.0";

/// Container kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum QobjType {
    /// Gate-level circuits.
    #[serde(rename = "QASM")]
    Qasm,
    /// Pulse schedules.
    #[serde(rename = "PULSE")]
    Pulse,
}

/// Container-level header, passed through from the caller.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QobjHeader {
    /// Target backend.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub backend_name: Option<String>,
    /// Target backend version.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub backend_version: Option<String>,
    /// Any further keys.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// The executable container.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Qobj<C, E> {
    /// Unique identifier.
    pub qobj_id: String,
    /// Container kind.
    #[serde(rename = "type")]
    pub qobj_type: QobjType,
    /// Schema version, see [`SCHEMA_VERSION`].
    pub schema_version: String,
    /// Header.
    pub header: QobjHeader,
    /// Run configuration shared by all experiments.
    pub config: C,
    /// Experiments in caller order.
    pub experiments: Vec<E>,
}

impl<C: Serialize, E: Serialize> Qobj<C, E> {
    /// Serialize to compact JSON.
    pub fn to_json(&self) -> AssembleResult<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Serialize to indented JSON.
    pub fn to_json_pretty(&self) -> AssembleResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Circuit container.
pub type QasmQobj = Qobj<QasmQobjConfig, QasmQobjExperiment>;

/// Pulse container.
pub type PulseQobj = Qobj<PulseQobjConfig, PulseQobjExperiment>;

/// Per-experiment header.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExperimentHeader {
    /// `(register, index)` for every qubit, in global index order.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub qubit_labels: Option<Vec<(String, u32)>>,
    /// Total number of qubits.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub n_qubits: Option<u32>,
    /// `(register, size)` for every quantum register.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub qreg_sizes: Option<Vec<(String, u32)>>,
    /// `(register, index)` for every classical bit, in memory slot order.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub clbit_labels: Option<Vec<(String, u32)>>,
    /// Total number of classical bits.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub memory_slots: Option<u32>,
    /// `(register, size)` for every classical register.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub creg_sizes: Option<Vec<(String, u32)>>,
    /// Experiment name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

// ---------------------------------------------------------------------------
// Circuit path
// ---------------------------------------------------------------------------

/// Top-level configuration of a circuit container.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QasmQobjConfig {
    /// Repetitions per experiment.
    pub shots: u32,
    /// Largest memory slot count of any experiment.
    pub memory_slots: u32,
    /// Largest qubit count of any experiment.
    pub n_qubits: u32,
    /// Credit cap.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_credits: Option<u32>,
    /// Simulator seed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
    /// Whether per-shot memory is returned.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub memory: Option<bool>,
    /// Pass-through keys from the run configuration.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Per-experiment configuration of a circuit container.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QasmQobjExperimentConfig {
    /// Qubits used by this experiment.
    pub n_qubits: u32,
    /// Memory slots used by this experiment.
    pub memory_slots: u32,
    /// Per-experiment shot override.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shots: Option<u32>,
    /// Per-experiment seed override.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
    /// Any further per-experiment keys.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// One experiment of a circuit container.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QasmQobjExperiment {
    /// Register layout and name.
    pub header: ExperimentHeader,
    /// Per-experiment configuration.
    pub config: QasmQobjExperimentConfig,
    /// Operations in circuit order.
    pub instructions: Vec<QasmQobjInstruction>,
}

/// Parameters of a circuit instruction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum QasmParams {
    /// Evaluated numeric parameters.
    Values(Vec<f64>),
    /// A row-major matrix of `[re, im]` entries.
    Matrix(Vec<Vec<Complex64>>),
}

/// Conditional-execution clause.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QobjConditional {
    /// Hex mask over memory slots, e.g. `0x3`.
    pub mask: String,
    /// Comparison; always `equals`.
    #[serde(rename = "type")]
    pub relation: String,
    /// Hex value compared against the masked bits.
    pub val: String,
}

impl QobjConditional {
    /// An `equals` comparison.
    pub fn equals(mask: u128, val: u64) -> Self {
        Self {
            mask: format!("0x{mask:X}"),
            relation: "equals".to_string(),
            val: format!("0x{val:X}"),
        }
    }
}

/// One circuit operation in wire form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QasmQobjInstruction {
    /// Operation name.
    pub name: String,
    /// Global qubit indices.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub qubits: Option<Vec<u32>>,
    /// Memory slot indices.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub memory: Option<Vec<u32>>,
    /// Evaluated parameters.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub params: Option<QasmParams>,
    /// Snapshot or unitary label.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    /// Snapshot type.
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub snapshot_type: Option<String>,
    /// Classical condition.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conditional: Option<QobjConditional>,
}

impl QasmQobjInstruction {
    /// An instruction with only a name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            qubits: None,
            memory: None,
            params: None,
            label: None,
            snapshot_type: None,
            conditional: None,
        }
    }
}

// ---------------------------------------------------------------------------
// Pulse path
// ---------------------------------------------------------------------------

/// A named sample sequence referenced by drive instructions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PulseLibraryItem {
    /// Name used by instructions.
    pub name: String,
    /// Complex samples.
    pub samples: Vec<Complex64>,
}

/// Top-level configuration of a pulse container.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PulseQobjConfig {
    /// Measurement level.
    pub meas_level: MeasLevel,
    /// Default qubit LO frequencies.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub qubit_lo_freq: Option<Vec<f64>>,
    /// Default measurement LO frequencies.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meas_lo_freq: Option<Vec<f64>>,
    /// Defaults followed by every pulse the experiments play.
    pub pulse_library: Vec<PulseLibraryItem>,
    /// Memory slots written by the experiments.
    pub memory_slots: u32,
    /// Repetitions per experiment.
    pub shots: u32,
    /// Pass-through keys from the pulse configuration.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Per-experiment configuration of a pulse container.
///
/// Holds only the LO lists that differ from the defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PulseQobjExperimentConfig {
    /// Qubit LO frequencies, if overridden.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub qubit_lo_freq: Option<Vec<f64>>,
    /// Measurement LO frequencies, if overridden.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meas_lo_freq: Option<Vec<f64>>,
    /// Any further per-experiment keys.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// One experiment of a pulse container.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PulseQobjExperiment {
    /// Experiment name.
    pub header: ExperimentHeader,
    /// Sparse LO overrides.
    pub config: PulseQobjExperimentConfig,
    /// Instructions in flatten order.
    pub instructions: Vec<PulseQobjInstruction>,
}

/// One schedule leaf in wire form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PulseQobjInstruction {
    /// Pulse name or command kind.
    pub name: String,
    /// Absolute start time.
    pub t0: u64,
    /// Output channel.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ch: Option<Channel>,
    /// Frame change phase.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phase: Option<f64>,
    /// Persistent value.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub val: Option<Complex64>,
    /// Acquisition length.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<u64>,
    /// Acquired qubits.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub qubits: Option<Vec<u32>>,
    /// Memory slots written by an acquisition.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub memory_slot: Option<Vec<u32>>,
    /// Register slots written by an acquisition.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub register_slot: Option<Vec<u32>>,
    /// Integration kernels.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kernels: Option<Vec<MeasurementOption>>,
    /// Discriminators.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discriminators: Option<Vec<MeasurementOption>>,
    /// Snapshot label.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    /// Snapshot type.
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub snapshot_type: Option<String>,
}

impl PulseQobjInstruction {
    /// An instruction with only a name and start time.
    pub fn new(name: impl Into<String>, t0: u64) -> Self {
        Self {
            name: name.into(),
            t0,
            ch: None,
            phase: None,
            val: None,
            duration: None,
            qubits: None,
            memory_slot: None,
            register_slot: None,
            kernels: None,
            discriminators: None,
            label: None,
            snapshot_type: None,
        }
    }
}
