//! Gate types.

use num_complex::Complex64;
use serde::{Deserialize, Serialize};

use crate::parameter::ParameterExpression;

/// Standard gates with a fixed wire name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum StandardGate {
    // Single-qubit gates
    /// Identity gate.
    Id,
    /// Pauli-X gate.
    X,
    /// Pauli-Y gate.
    Y,
    /// Pauli-Z gate.
    Z,
    /// Hadamard gate.
    H,
    /// S gate (sqrt(Z)).
    S,
    /// S-dagger gate.
    Sdg,
    /// T gate (fourth root of Z).
    T,
    /// T-dagger gate.
    Tdg,
    /// Rotation around X axis.
    Rx(ParameterExpression),
    /// Rotation around Y axis.
    Ry(ParameterExpression),
    /// Rotation around Z axis.
    Rz(ParameterExpression),
    /// Phase gate U1(λ).
    U1(ParameterExpression),
    /// U2(φ, λ).
    U2(ParameterExpression, ParameterExpression),
    /// Universal single-qubit gate U3(θ, φ, λ).
    U3(
        ParameterExpression,
        ParameterExpression,
        ParameterExpression,
    ),

    // Two-qubit gates
    /// Controlled-X (CNOT) gate.
    CX,
    /// Controlled-Y gate.
    CY,
    /// Controlled-Z gate.
    CZ,
    /// Controlled-Hadamard gate.
    CH,
    /// SWAP gate.
    Swap,
    /// Controlled rotation around Z.
    CRz(ParameterExpression),
    /// Controlled phase gate.
    CU1(ParameterExpression),
    /// Controlled U3 gate.
    CU3(
        ParameterExpression,
        ParameterExpression,
        ParameterExpression,
    ),
    /// ZZ rotation gate.
    RZZ(ParameterExpression),

    // Three-qubit gates
    /// Toffoli gate (CCX).
    CCX,
    /// Fredkin gate (CSWAP).
    CSwap,
}

impl StandardGate {
    /// Wire name of this gate.
    #[inline]
    pub fn name(&self) -> &'static str {
        match self {
            StandardGate::Id => "id",
            StandardGate::X => "x",
            StandardGate::Y => "y",
            StandardGate::Z => "z",
            StandardGate::H => "h",
            StandardGate::S => "s",
            StandardGate::Sdg => "sdg",
            StandardGate::T => "t",
            StandardGate::Tdg => "tdg",
            StandardGate::Rx(_) => "rx",
            StandardGate::Ry(_) => "ry",
            StandardGate::Rz(_) => "rz",
            StandardGate::U1(_) => "u1",
            StandardGate::U2(_, _) => "u2",
            StandardGate::U3(_, _, _) => "u3",
            StandardGate::CX => "cx",
            StandardGate::CY => "cy",
            StandardGate::CZ => "cz",
            StandardGate::CH => "ch",
            StandardGate::Swap => "swap",
            StandardGate::CRz(_) => "crz",
            StandardGate::CU1(_) => "cu1",
            StandardGate::CU3(_, _, _) => "cu3",
            StandardGate::RZZ(_) => "rzz",
            StandardGate::CCX => "ccx",
            StandardGate::CSwap => "cswap",
        }
    }

    /// Number of qubits this gate acts on.
    #[inline]
    pub fn num_qubits(&self) -> u32 {
        match self {
            StandardGate::Id
            | StandardGate::X
            | StandardGate::Y
            | StandardGate::Z
            | StandardGate::H
            | StandardGate::S
            | StandardGate::Sdg
            | StandardGate::T
            | StandardGate::Tdg
            | StandardGate::Rx(_)
            | StandardGate::Ry(_)
            | StandardGate::Rz(_)
            | StandardGate::U1(_)
            | StandardGate::U2(_, _)
            | StandardGate::U3(_, _, _) => 1,

            StandardGate::CX
            | StandardGate::CY
            | StandardGate::CZ
            | StandardGate::CH
            | StandardGate::Swap
            | StandardGate::CRz(_)
            | StandardGate::CU1(_)
            | StandardGate::CU3(_, _, _)
            | StandardGate::RZZ(_) => 2,

            StandardGate::CCX | StandardGate::CSwap => 3,
        }
    }

    /// Parameters of this gate, in wire order.
    pub fn parameters(&self) -> Vec<&ParameterExpression> {
        match self {
            StandardGate::Rx(p)
            | StandardGate::Ry(p)
            | StandardGate::Rz(p)
            | StandardGate::U1(p)
            | StandardGate::CRz(p)
            | StandardGate::CU1(p)
            | StandardGate::RZZ(p) => vec![p],

            StandardGate::U2(phi, lambda) => vec![phi, lambda],

            StandardGate::U3(a, b, c) | StandardGate::CU3(a, b, c) => vec![a, b, c],

            _ => vec![],
        }
    }

    /// Check if any parameter is still symbolic.
    pub fn is_parameterized(&self) -> bool {
        self.parameters().iter().any(|p| p.is_symbolic())
    }
}

/// An opaque gate known only by name, arity and parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomGate {
    /// The name of the gate.
    pub name: String,
    /// The number of qubits it operates on.
    pub num_qubits: u32,
    /// Parameters of the gate.
    pub params: Vec<ParameterExpression>,
}

impl CustomGate {
    /// Create a new custom gate.
    pub fn new(name: impl Into<String>, num_qubits: u32) -> Self {
        Self {
            name: name.into(),
            num_qubits,
            params: vec![],
        }
    }

    /// Add parameters to the gate.
    #[must_use]
    pub fn with_params(mut self, params: Vec<ParameterExpression>) -> Self {
        self.params = params;
        self
    }
}

/// A dense unitary matrix, row-major, `2^n × 2^n`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnitaryMatrix {
    rows: Vec<Vec<Complex64>>,
}

impl UnitaryMatrix {
    /// Create a matrix from its rows.
    ///
    /// Returns `None` if the rows do not form a square matrix whose
    /// dimension is a power of two.
    pub fn from_rows(rows: Vec<Vec<Complex64>>) -> Option<Self> {
        let dim = rows.len();
        if dim == 0 || !dim.is_power_of_two() || rows.iter().any(|r| r.len() != dim) {
            return None;
        }
        Some(Self { rows })
    }

    /// Matrix dimension (number of rows).
    pub fn dim(&self) -> usize {
        self.rows.len()
    }

    /// Number of qubits the matrix acts on.
    pub fn num_qubits(&self) -> u32 {
        self.rows.len().trailing_zeros()
    }

    /// The rows of the matrix.
    pub fn rows(&self) -> &[Vec<Complex64>] {
        &self.rows
    }
}

/// Classical condition attached to an operation.
///
/// The operation runs only if the value held by `register` equals `value`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassicalCondition {
    /// The name of the classical register.
    pub register: String,
    /// The value to compare against.
    pub value: u64,
}

impl ClassicalCondition {
    /// Create a new classical condition.
    pub fn new(register: impl Into<String>, value: u64) -> Self {
        Self {
            register: register.into(),
            value,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    #[test]
    fn test_standard_gate_properties() {
        assert_eq!(StandardGate::H.num_qubits(), 1);
        assert_eq!(StandardGate::CX.num_qubits(), 2);
        assert_eq!(StandardGate::CCX.num_qubits(), 3);
        assert_eq!(StandardGate::U2(0.0.into(), PI.into()).name(), "u2");

        assert!(!StandardGate::H.is_parameterized());
        assert!(!StandardGate::U1(ParameterExpression::constant(PI)).is_parameterized());
        assert!(StandardGate::U1(ParameterExpression::symbol("lam")).is_parameterized());
    }

    #[test]
    fn test_parameter_order() {
        let gate = StandardGate::U3(1.0.into(), 2.0.into(), 3.0.into());
        let values: Vec<_> = gate
            .parameters()
            .into_iter()
            .map(|p| p.evaluate().unwrap())
            .collect();
        assert_eq!(values, vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_unitary_shape() {
        let one = Complex64::new(1.0, 0.0);
        let zero = Complex64::new(0.0, 0.0);
        let m = UnitaryMatrix::from_rows(vec![vec![one, zero], vec![zero, one]]).unwrap();
        assert_eq!(m.num_qubits(), 1);
        assert_eq!(m.dim(), 2);

        assert!(UnitaryMatrix::from_rows(vec![vec![one, zero, zero]; 3]).is_none());
        assert!(UnitaryMatrix::from_rows(vec![vec![one], vec![one]]).is_none());
    }
}
