//! Register-based circuit representation.
//!
//! This crate holds the gate-level programs that the Qobj assembler lowers.
//! A [`Circuit`] is a list of quantum and classical registers in declaration
//! order plus an ordered list of [`Instruction`]s. Bits are addressed by
//! register name and index, so the assembler can derive global qubit and
//! memory slot numbers from register order alone.
//!
//! # Example: Building a Bell State
//!
//! ```rust
//! use qobj_ir::{Circuit, ClassicalRegister, QuantumRegister};
//!
//! let q = QuantumRegister::new("q", 2);
//! let c = ClassicalRegister::new("c", 2);
//!
//! let mut circuit = Circuit::new("bell");
//! circuit.add_qreg(q.clone())?.add_creg(c.clone())?;
//! circuit
//!     .h(q.get(0))?
//!     .cx(q.get(0), q.get(1))?
//!     .measure(q.get(0), c.get(0))?
//!     .measure(q.get(1), c.get(1))?;
//!
//! assert_eq!(circuit.num_qubits(), 2);
//! assert_eq!(circuit.data().len(), 4);
//! # Ok::<(), qobj_ir::IrError>(())
//! ```
//!
//! # Example: Conditional Operation
//!
//! ```rust
//! use qobj_ir::{Circuit, ClassicalRegister, Instruction, QuantumRegister, StandardGate};
//!
//! let mut circuit = Circuit::with_size("feedback", 1, 2);
//! let q = QuantumRegister::new("q", 1);
//! let c = ClassicalRegister::new("c", 2);
//!
//! circuit.append(Instruction::gate(StandardGate::X, [q.get(0)]).c_if(&c, 1))?;
//! # Ok::<(), qobj_ir::IrError>(())
//! ```

pub mod circuit;
pub mod error;
pub mod gate;
pub mod instruction;
pub mod parameter;
pub mod register;

pub use circuit::Circuit;
pub use error::{IrError, IrResult};
pub use gate::{ClassicalCondition, CustomGate, StandardGate, UnitaryMatrix};
pub use instruction::{Instruction, InstructionKind, Param};
pub use parameter::ParameterExpression;
pub use register::{ClassicalRegister, Clbit, QuantumRegister, Qubit};
