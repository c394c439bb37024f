//! Error types for Qobj assembly.

use qobj_ir::IrError;
use qobj_pulse::{Channel, PulseError};
use thiserror::Error;

/// Errors raised while lowering programs into a Qobj.
///
/// Assembly is all-or-nothing: any of these aborts the whole batch.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AssembleError {
    /// An operand qubit is not part of any declared register.
    #[error("Qubit {qubit} not found in circuit '{circuit}'")]
    QubitNotFound {
        /// The qubit, as `register[index]`.
        qubit: String,
        /// The circuit being assembled.
        circuit: String,
    },

    /// An operand classical bit is not part of any declared register.
    #[error("Classical bit {clbit} not found in circuit '{circuit}'")]
    ClbitNotFound {
        /// The bit, as `register[index]`.
        clbit: String,
        /// The circuit being assembled.
        circuit: String,
    },

    /// A condition names a classical register the circuit does not declare.
    #[error("Classical register '{register}' not found in circuit '{circuit}'")]
    RegisterNotFound {
        /// Register name.
        register: String,
        /// The circuit being assembled.
        circuit: String,
    },

    /// The value cannot be expressed in the wire format.
    #[error("Encoding error: {0}")]
    Encoding(String),

    /// An LO override targets an index the default list does not have.
    #[error("LO frequency override on {channel} is outside the {len} default frequencies")]
    LoOutOfRange {
        /// The overridden channel.
        channel: Channel,
        /// Length of the default list.
        len: usize,
    },

    /// Invalid run or pulse configuration.
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// Error in the pulse model.
    #[error(transparent)]
    Pulse(#[from] PulseError),

    /// Error in the circuit model.
    #[error(transparent)]
    Ir(#[from] IrError),

    /// YAML parsing failure.
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),

    /// JSON parsing or serialization failure.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Reading a configuration file failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for assembly operations.
pub type AssembleResult<T> = Result<T, AssembleError>;
