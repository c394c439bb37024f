//! Quantum and classical registers, and the bits they own.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A named, fixed-size quantum register.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct QuantumRegister {
    /// Register name, unique within a circuit.
    pub name: String,
    /// Number of qubits in the register.
    pub size: u32,
}

impl QuantumRegister {
    /// Create a new quantum register.
    pub fn new(name: impl Into<String>, size: u32) -> Self {
        Self {
            name: name.into(),
            size,
        }
    }

    /// The `index`-th qubit of this register.
    ///
    /// No bounds check is done here; circuits reject out-of-range bits
    /// when an operation is appended.
    pub fn get(&self, index: u32) -> Qubit {
        Qubit::new(&self.name, index)
    }

    /// All qubits of the register in index order.
    pub fn qubits(&self) -> impl Iterator<Item = Qubit> + '_ {
        (0..self.size).map(|i| self.get(i))
    }
}

/// A named, fixed-size classical register.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ClassicalRegister {
    /// Register name, unique within a circuit.
    pub name: String,
    /// Number of bits in the register.
    pub size: u32,
}

impl ClassicalRegister {
    /// Create a new classical register.
    pub fn new(name: impl Into<String>, size: u32) -> Self {
        Self {
            name: name.into(),
            size,
        }
    }

    /// The `index`-th bit of this register.
    pub fn get(&self, index: u32) -> Clbit {
        Clbit::new(&self.name, index)
    }

    /// All bits of the register in index order.
    pub fn clbits(&self) -> impl Iterator<Item = Clbit> + '_ {
        (0..self.size).map(|i| self.get(i))
    }
}

/// A qubit, identified by its register name and its index in that register.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Qubit {
    /// The name of the owning register.
    pub register: String,
    /// The index within the register.
    pub index: u32,
}

impl Qubit {
    /// Create a new qubit reference.
    pub fn new(register: impl Into<String>, index: u32) -> Self {
        Self {
            register: register.into(),
            index,
        }
    }
}

impl fmt::Display for Qubit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{}]", self.register, self.index)
    }
}

/// A classical bit, identified by its register name and its index in that register.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Clbit {
    /// The name of the owning register.
    pub register: String,
    /// The index within the register.
    pub index: u32,
}

impl Clbit {
    /// Create a new classical bit reference.
    pub fn new(register: impl Into<String>, index: u32) -> Self {
        Self {
            register: register.into(),
            index,
        }
    }
}

impl fmt::Display for Clbit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{}]", self.register, self.index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_qubit_display() {
        let qr = QuantumRegister::new("qr", 2);
        assert_eq!(format!("{}", qr.get(1)), "qr[1]");
    }

    #[test]
    fn test_clbit_display() {
        let cr = ClassicalRegister::new("cr", 3);
        assert_eq!(format!("{}", cr.get(0)), "cr[0]");
    }

    #[test]
    fn test_register_iteration() {
        let qr = QuantumRegister::new("q", 3);
        let bits: Vec<_> = qr.qubits().collect();
        assert_eq!(bits, vec![Qubit::new("q", 0), Qubit::new("q", 1), Qubit::new("q", 2)]);

        let cr = ClassicalRegister::new("c", 0);
        assert_eq!(cr.clbits().count(), 0);
    }
}
