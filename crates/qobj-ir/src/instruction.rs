//! Circuit instructions combining operations with operands.

use serde::{Deserialize, Serialize};

use crate::gate::{ClassicalCondition, CustomGate, StandardGate, UnitaryMatrix};
use crate::parameter::ParameterExpression;
use crate::register::{ClassicalRegister, Clbit, Qubit};

/// The kind of operation an instruction performs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum InstructionKind {
    /// A standard gate.
    Gate(StandardGate),
    /// An opaque gate known by name.
    Custom(CustomGate),
    /// An explicit unitary matrix.
    Unitary(UnitaryMatrix),
    /// Measurement of each qubit into the paired classical bit.
    Measure,
    /// Reset qubit to |0⟩.
    Reset,
    /// Barrier (synchronization point).
    Barrier,
    /// Simulator snapshot.
    Snapshot {
        /// Label under which the snapshot is stored.
        label: String,
        /// Snapshot kind, e.g. `statevector`.
        snapshot_type: String,
    },
}

/// A parameter as it appears on an operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Param {
    /// A numeric, possibly symbolic, expression.
    Expr(ParameterExpression),
    /// A matrix-valued parameter.
    Matrix(UnitaryMatrix),
    /// A string parameter.
    Text(String),
}

/// A complete instruction with operands.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Instruction {
    /// The kind of operation.
    pub kind: InstructionKind,
    /// Qubits this instruction operates on.
    pub qubits: Vec<Qubit>,
    /// Classical bits this instruction writes (for measure).
    pub clbits: Vec<Clbit>,
    /// Optional user label.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    /// Optional classical condition.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub condition: Option<ClassicalCondition>,
}

impl Instruction {
    fn from_kind(kind: InstructionKind, qubits: Vec<Qubit>, clbits: Vec<Clbit>) -> Self {
        Self {
            kind,
            qubits,
            clbits,
            label: None,
            condition: None,
        }
    }

    /// Create a standard gate instruction.
    pub fn gate(gate: StandardGate, qubits: impl IntoIterator<Item = Qubit>) -> Self {
        Self::from_kind(
            InstructionKind::Gate(gate),
            qubits.into_iter().collect(),
            vec![],
        )
    }

    /// Create a custom gate instruction.
    pub fn custom(gate: CustomGate, qubits: impl IntoIterator<Item = Qubit>) -> Self {
        Self::from_kind(
            InstructionKind::Custom(gate),
            qubits.into_iter().collect(),
            vec![],
        )
    }

    /// Create a unitary instruction.
    pub fn unitary(matrix: UnitaryMatrix, qubits: impl IntoIterator<Item = Qubit>) -> Self {
        Self::from_kind(
            InstructionKind::Unitary(matrix),
            qubits.into_iter().collect(),
            vec![],
        )
    }

    /// Create a measurement instruction.
    pub fn measure(qubit: Qubit, clbit: Clbit) -> Self {
        Self::from_kind(InstructionKind::Measure, vec![qubit], vec![clbit])
    }

    /// Create a reset instruction.
    pub fn reset(qubit: Qubit) -> Self {
        Self::from_kind(InstructionKind::Reset, vec![qubit], vec![])
    }

    /// Create a barrier instruction.
    pub fn barrier(qubits: impl IntoIterator<Item = Qubit>) -> Self {
        Self::from_kind(
            InstructionKind::Barrier,
            qubits.into_iter().collect(),
            vec![],
        )
    }

    /// Create a snapshot instruction.
    pub fn snapshot(
        label: impl Into<String>,
        snapshot_type: impl Into<String>,
        qubits: impl IntoIterator<Item = Qubit>,
    ) -> Self {
        Self::from_kind(
            InstructionKind::Snapshot {
                label: label.into(),
                snapshot_type: snapshot_type.into(),
            },
            qubits.into_iter().collect(),
            vec![],
        )
    }

    /// Attach a label.
    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Condition this instruction on `register == value`.
    #[must_use]
    pub fn c_if(mut self, register: &ClassicalRegister, value: u64) -> Self {
        self.condition = Some(ClassicalCondition::new(&register.name, value));
        self
    }

    /// Get the name of the instruction.
    pub fn name(&self) -> &str {
        match &self.kind {
            InstructionKind::Gate(g) => g.name(),
            InstructionKind::Custom(g) => &g.name,
            InstructionKind::Unitary(_) => "unitary",
            InstructionKind::Measure => "measure",
            InstructionKind::Reset => "reset",
            InstructionKind::Barrier => "barrier",
            InstructionKind::Snapshot { .. } => "snapshot",
        }
    }

    /// Parameters of the operation, in wire order.
    ///
    /// A snapshot reports its label and type as its first two parameters.
    pub fn params(&self) -> Vec<Param> {
        match &self.kind {
            InstructionKind::Gate(g) => g
                .parameters()
                .into_iter()
                .cloned()
                .map(Param::Expr)
                .collect(),
            InstructionKind::Custom(g) => g.params.iter().cloned().map(Param::Expr).collect(),
            InstructionKind::Unitary(m) => vec![Param::Matrix(m.clone())],
            InstructionKind::Snapshot {
                label,
                snapshot_type,
            } => vec![Param::Text(label.clone()), Param::Text(snapshot_type.clone())],
            InstructionKind::Measure | InstructionKind::Reset | InstructionKind::Barrier => {
                vec![]
            }
        }
    }

    /// Number of qubits the operation expects, if it has a fixed arity.
    pub fn expected_qubits(&self) -> Option<u32> {
        match &self.kind {
            InstructionKind::Gate(g) => Some(g.num_qubits()),
            InstructionKind::Custom(g) => Some(g.num_qubits),
            InstructionKind::Unitary(m) => Some(m.num_qubits()),
            InstructionKind::Reset => Some(1),
            InstructionKind::Measure | InstructionKind::Barrier | InstructionKind::Snapshot { .. } => {
                None
            }
        }
    }

    /// Check if this is a measurement.
    pub fn is_measure(&self) -> bool {
        matches!(self.kind, InstructionKind::Measure)
    }

    /// Check if this is a snapshot.
    pub fn is_snapshot(&self) -> bool {
        matches!(self.kind, InstructionKind::Snapshot { .. })
    }
}
