//! Error types for the IR crate.

use crate::register::{Clbit, Qubit};
use thiserror::Error;

/// Errors that can occur while building or reading a circuit.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum IrError {
    /// Qubit does not belong to any register of the circuit.
    #[error("Qubit {qubit} not found in circuit{}", format_op_context(.op_name))]
    QubitNotFound {
        /// The qubit that was not found.
        qubit: Qubit,
        /// Optional operation name for context.
        op_name: Option<String>,
    },

    /// Classical bit does not belong to any register of the circuit.
    #[error("Classical bit {clbit} not found in circuit{}", format_op_context(.op_name))]
    ClbitNotFound {
        /// The classical bit that was not found.
        clbit: Clbit,
        /// Optional operation name for context.
        op_name: Option<String>,
    },

    /// A register with this name is not declared in the circuit.
    #[error("Register '{0}' not found in circuit")]
    RegisterNotFound(String),

    /// A register with this name is already declared.
    #[error("Register '{0}' already exists in circuit")]
    DuplicateRegister(String),

    /// Operation requires a different number of qubits.
    #[error("Operation '{op_name}' requires {expected} qubits, got {got}")]
    QubitCountMismatch {
        /// Name of the operation.
        op_name: String,
        /// Expected number of qubits.
        expected: u32,
        /// Actual number of qubits provided.
        got: u32,
    },

    /// Measurement operands are not paired one-to-one.
    #[error("Measure needs as many classical bits as qubits ({qubits} qubits, {clbits} clbits)")]
    MeasureArity {
        /// Number of qubit operands.
        qubits: usize,
        /// Number of classical bit operands.
        clbits: usize,
    },

    /// Unitary matrix has the wrong shape for its operands.
    #[error("Unitary on {num_qubits} qubits must be {dim}x{dim}")]
    MatrixShape {
        /// Number of qubits the unitary acts on.
        num_qubits: u32,
        /// Expected dimension of the square matrix.
        dim: usize,
    },

    /// Parameter is unbound.
    #[error("Parameter '{0}' is unbound")]
    UnboundParameter(String),

    /// Parameter evaluated to a non-finite number.
    #[error("Parameter expression '{0}' does not evaluate to a finite number")]
    NonFiniteParameter(String),
}

/// Helper function to format optional operation context.
#[allow(clippy::ref_option)]
fn format_op_context(op_name: &Option<String>) -> String {
    match op_name {
        Some(name) => format!(" (operation: {name})"),
        None => String::new(),
    }
}

/// Result type for IR operations.
pub type IrResult<T> = Result<T, IrError>;
