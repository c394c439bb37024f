//! High-level circuit builder API.

use serde::{Deserialize, Serialize};

use crate::error::{IrError, IrResult};
use crate::gate::{CustomGate, StandardGate, UnitaryMatrix};
use crate::instruction::{Instruction, InstructionKind};
use crate::parameter::ParameterExpression;
use crate::register::{ClassicalRegister, Clbit, QuantumRegister, Qubit};

/// A quantum circuit.
///
/// Registers are kept in declaration order and operations in insertion
/// order; both orders are significant to the assembler, which derives global
/// qubit and memory slot indices from them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Circuit {
    /// Name of the circuit.
    name: String,
    /// Quantum registers in declaration order.
    qregs: Vec<QuantumRegister>,
    /// Classical registers in declaration order.
    cregs: Vec<ClassicalRegister>,
    /// Operations in insertion order.
    data: Vec<Instruction>,
}

impl Circuit {
    /// Create a new empty circuit.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            qregs: vec![],
            cregs: vec![],
            data: vec![],
        }
    }

    /// Create a circuit with one quantum register `q` and one classical register `c`.
    pub fn with_size(name: impl Into<String>, num_qubits: u32, num_clbits: u32) -> Self {
        let mut circuit = Self::new(name);
        if num_qubits > 0 {
            circuit.qregs.push(QuantumRegister::new("q", num_qubits));
        }
        if num_clbits > 0 {
            circuit.cregs.push(ClassicalRegister::new("c", num_clbits));
        }
        circuit
    }

    /// Assemble a circuit from parts without validating operands.
    ///
    /// Intended for front-ends that already produced consistent register
    /// and operation lists. Operands that do not resolve are reported later
    /// by the assembler.
    pub fn from_parts(
        name: impl Into<String>,
        qregs: Vec<QuantumRegister>,
        cregs: Vec<ClassicalRegister>,
        data: Vec<Instruction>,
    ) -> Self {
        Self {
            name: name.into(),
            qregs,
            cregs,
            data,
        }
    }

    /// Declare a quantum register.
    pub fn add_qreg(&mut self, reg: QuantumRegister) -> IrResult<&mut Self> {
        if self.has_register(&reg.name) {
            return Err(IrError::DuplicateRegister(reg.name));
        }
        self.qregs.push(reg);
        Ok(self)
    }

    /// Declare a classical register.
    pub fn add_creg(&mut self, reg: ClassicalRegister) -> IrResult<&mut Self> {
        if self.has_register(&reg.name) {
            return Err(IrError::DuplicateRegister(reg.name));
        }
        self.cregs.push(reg);
        Ok(self)
    }

    fn has_register(&self, name: &str) -> bool {
        self.qregs.iter().any(|r| r.name == name) || self.cregs.iter().any(|r| r.name == name)
    }

    // =========================================================================
    // Single-qubit gates
    // =========================================================================

    /// Apply identity gate.
    pub fn id(&mut self, qubit: Qubit) -> IrResult<&mut Self> {
        self.append(Instruction::gate(StandardGate::Id, [qubit]))
    }

    /// Apply Hadamard gate.
    pub fn h(&mut self, qubit: Qubit) -> IrResult<&mut Self> {
        self.append(Instruction::gate(StandardGate::H, [qubit]))
    }

    /// Apply Pauli-X gate.
    pub fn x(&mut self, qubit: Qubit) -> IrResult<&mut Self> {
        self.append(Instruction::gate(StandardGate::X, [qubit]))
    }

    /// Apply Pauli-Y gate.
    pub fn y(&mut self, qubit: Qubit) -> IrResult<&mut Self> {
        self.append(Instruction::gate(StandardGate::Y, [qubit]))
    }

    /// Apply Pauli-Z gate.
    pub fn z(&mut self, qubit: Qubit) -> IrResult<&mut Self> {
        self.append(Instruction::gate(StandardGate::Z, [qubit]))
    }

    /// Apply S gate.
    pub fn s(&mut self, qubit: Qubit) -> IrResult<&mut Self> {
        self.append(Instruction::gate(StandardGate::S, [qubit]))
    }

    /// Apply S-dagger gate.
    pub fn sdg(&mut self, qubit: Qubit) -> IrResult<&mut Self> {
        self.append(Instruction::gate(StandardGate::Sdg, [qubit]))
    }

    /// Apply T gate.
    pub fn t(&mut self, qubit: Qubit) -> IrResult<&mut Self> {
        self.append(Instruction::gate(StandardGate::T, [qubit]))
    }

    /// Apply T-dagger gate.
    pub fn tdg(&mut self, qubit: Qubit) -> IrResult<&mut Self> {
        self.append(Instruction::gate(StandardGate::Tdg, [qubit]))
    }

    /// Apply Rx rotation gate.
    pub fn rx(
        &mut self,
        theta: impl Into<ParameterExpression>,
        qubit: Qubit,
    ) -> IrResult<&mut Self> {
        self.append(Instruction::gate(StandardGate::Rx(theta.into()), [qubit]))
    }

    /// Apply Ry rotation gate.
    pub fn ry(
        &mut self,
        theta: impl Into<ParameterExpression>,
        qubit: Qubit,
    ) -> IrResult<&mut Self> {
        self.append(Instruction::gate(StandardGate::Ry(theta.into()), [qubit]))
    }

    /// Apply Rz rotation gate.
    pub fn rz(
        &mut self,
        theta: impl Into<ParameterExpression>,
        qubit: Qubit,
    ) -> IrResult<&mut Self> {
        self.append(Instruction::gate(StandardGate::Rz(theta.into()), [qubit]))
    }

    /// Apply U1 phase gate.
    pub fn u1(
        &mut self,
        lambda: impl Into<ParameterExpression>,
        qubit: Qubit,
    ) -> IrResult<&mut Self> {
        self.append(Instruction::gate(StandardGate::U1(lambda.into()), [qubit]))
    }

    /// Apply U2 gate.
    pub fn u2(
        &mut self,
        phi: impl Into<ParameterExpression>,
        lambda: impl Into<ParameterExpression>,
        qubit: Qubit,
    ) -> IrResult<&mut Self> {
        self.append(Instruction::gate(
            StandardGate::U2(phi.into(), lambda.into()),
            [qubit],
        ))
    }

    /// Apply U3 gate.
    pub fn u3(
        &mut self,
        theta: impl Into<ParameterExpression>,
        phi: impl Into<ParameterExpression>,
        lambda: impl Into<ParameterExpression>,
        qubit: Qubit,
    ) -> IrResult<&mut Self> {
        self.append(Instruction::gate(
            StandardGate::U3(theta.into(), phi.into(), lambda.into()),
            [qubit],
        ))
    }

    // =========================================================================
    // Multi-qubit gates
    // =========================================================================

    /// Apply CNOT (CX) gate.
    pub fn cx(&mut self, control: Qubit, target: Qubit) -> IrResult<&mut Self> {
        self.append(Instruction::gate(StandardGate::CX, [control, target]))
    }

    /// Apply CY gate.
    pub fn cy(&mut self, control: Qubit, target: Qubit) -> IrResult<&mut Self> {
        self.append(Instruction::gate(StandardGate::CY, [control, target]))
    }

    /// Apply CZ gate.
    pub fn cz(&mut self, control: Qubit, target: Qubit) -> IrResult<&mut Self> {
        self.append(Instruction::gate(StandardGate::CZ, [control, target]))
    }

    /// Apply SWAP gate.
    pub fn swap(&mut self, q1: Qubit, q2: Qubit) -> IrResult<&mut Self> {
        self.append(Instruction::gate(StandardGate::Swap, [q1, q2]))
    }

    /// Apply controlled phase gate.
    pub fn cu1(
        &mut self,
        lambda: impl Into<ParameterExpression>,
        control: Qubit,
        target: Qubit,
    ) -> IrResult<&mut Self> {
        self.append(Instruction::gate(
            StandardGate::CU1(lambda.into()),
            [control, target],
        ))
    }

    /// Apply Toffoli (CCX) gate.
    pub fn ccx(&mut self, c1: Qubit, c2: Qubit, target: Qubit) -> IrResult<&mut Self> {
        self.append(Instruction::gate(StandardGate::CCX, [c1, c2, target]))
    }

    // =========================================================================
    // Other operations
    // =========================================================================

    /// Apply an opaque gate.
    pub fn custom(
        &mut self,
        gate: CustomGate,
        qubits: impl IntoIterator<Item = Qubit>,
    ) -> IrResult<&mut Self> {
        self.append(Instruction::custom(gate, qubits))
    }

    /// Apply an explicit unitary, optionally labelled.
    pub fn unitary(
        &mut self,
        matrix: UnitaryMatrix,
        qubits: impl IntoIterator<Item = Qubit>,
        label: Option<&str>,
    ) -> IrResult<&mut Self> {
        let mut inst = Instruction::unitary(matrix, qubits);
        inst.label = label.map(str::to_string);
        self.append(inst)
    }

    /// Measure a qubit to a classical bit.
    pub fn measure(&mut self, qubit: Qubit, clbit: Clbit) -> IrResult<&mut Self> {
        self.append(Instruction::measure(qubit, clbit))
    }

    /// Reset a qubit to |0⟩.
    pub fn reset(&mut self, qubit: Qubit) -> IrResult<&mut Self> {
        self.append(Instruction::reset(qubit))
    }

    /// Apply a barrier to specified qubits.
    pub fn barrier(&mut self, qubits: impl IntoIterator<Item = Qubit>) -> IrResult<&mut Self> {
        self.append(Instruction::barrier(qubits))
    }

    /// Apply a barrier to all qubits.
    pub fn barrier_all(&mut self) -> IrResult<&mut Self> {
        let qubits: Vec<_> = self.qubits().collect();
        self.append(Instruction::barrier(qubits))
    }

    /// Take a simulator snapshot of the given qubits.
    pub fn snapshot(
        &mut self,
        label: impl Into<String>,
        snapshot_type: impl Into<String>,
        qubits: impl IntoIterator<Item = Qubit>,
    ) -> IrResult<&mut Self> {
        self.append(Instruction::snapshot(label, snapshot_type, qubits))
    }

    /// Append an instruction after checking its operands against the circuit.
    pub fn append(&mut self, inst: Instruction) -> IrResult<&mut Self> {
        self.check(&inst)?;
        self.data.push(inst);
        Ok(self)
    }

    fn check(&self, inst: &Instruction) -> IrResult<()> {
        let op_name = inst.name();

        if let Some(expected) = inst.expected_qubits() {
            let got = inst.qubits.len() as u32;
            if got != expected {
                if let InstructionKind::Unitary(_) = &inst.kind {
                    return Err(IrError::MatrixShape {
                        num_qubits: got,
                        dim: 1usize << got.min(63),
                    });
                }
                return Err(IrError::QubitCountMismatch {
                    op_name: op_name.to_string(),
                    expected,
                    got,
                });
            }
        }

        if inst.is_measure() && (inst.qubits.is_empty() || inst.qubits.len() != inst.clbits.len())
        {
            return Err(IrError::MeasureArity {
                qubits: inst.qubits.len(),
                clbits: inst.clbits.len(),
            });
        }

        for qubit in &inst.qubits {
            if !self.contains_qubit(qubit) {
                return Err(IrError::QubitNotFound {
                    qubit: qubit.clone(),
                    op_name: Some(op_name.to_string()),
                });
            }
        }
        for clbit in &inst.clbits {
            if !self.contains_clbit(clbit) {
                return Err(IrError::ClbitNotFound {
                    clbit: clbit.clone(),
                    op_name: Some(op_name.to_string()),
                });
            }
        }

        if let Some(cond) = &inst.condition {
            if self.creg(&cond.register).is_none() {
                return Err(IrError::RegisterNotFound(cond.register.clone()));
            }
        }

        Ok(())
    }

    fn contains_qubit(&self, qubit: &Qubit) -> bool {
        self.qregs
            .iter()
            .any(|r| r.name == qubit.register && qubit.index < r.size)
    }

    fn contains_clbit(&self, clbit: &Clbit) -> bool {
        self.cregs
            .iter()
            .any(|r| r.name == clbit.register && clbit.index < r.size)
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// Get the circuit name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Quantum registers in declaration order.
    pub fn qregs(&self) -> &[QuantumRegister] {
        &self.qregs
    }

    /// Classical registers in declaration order.
    pub fn cregs(&self) -> &[ClassicalRegister] {
        &self.cregs
    }

    /// Look up a classical register by name.
    pub fn creg(&self, name: &str) -> Option<&ClassicalRegister> {
        self.cregs.iter().find(|r| r.name == name)
    }

    /// Operations in insertion order.
    pub fn data(&self) -> &[Instruction] {
        &self.data
    }

    /// All qubits, register by register.
    pub fn qubits(&self) -> impl Iterator<Item = Qubit> + '_ {
        self.qregs.iter().flat_map(QuantumRegister::qubits)
    }

    /// All classical bits, register by register.
    pub fn clbits(&self) -> impl Iterator<Item = Clbit> + '_ {
        self.cregs.iter().flat_map(ClassicalRegister::clbits)
    }

    /// Get the number of qubits.
    pub fn num_qubits(&self) -> u32 {
        self.qregs.iter().map(|r| r.size).sum()
    }

    /// Get the number of classical bits.
    pub fn num_clbits(&self) -> u32 {
        self.cregs.iter().map(|r| r.size).sum()
    }

    // =========================================================================
    // Pre-built circuits
    // =========================================================================

    /// Create a Bell state circuit.
    pub fn bell() -> IrResult<Self> {
        let mut circuit = Self::with_size("bell", 2, 2);
        let q = QuantumRegister::new("q", 2);
        let c = ClassicalRegister::new("c", 2);

        circuit
            .h(q.get(0))?
            .cx(q.get(0), q.get(1))?
            .measure(q.get(0), c.get(0))?
            .measure(q.get(1), c.get(1))?;

        Ok(circuit)
    }

    /// Create a GHZ state circuit.
    pub fn ghz(n: u32) -> IrResult<Self> {
        let mut circuit = Self::with_size("ghz", n, n);
        if n == 0 {
            return Ok(circuit);
        }
        let q = QuantumRegister::new("q", n);
        let c = ClassicalRegister::new("c", n);

        circuit.h(q.get(0))?;
        for i in 0..n - 1 {
            circuit.cx(q.get(i), q.get(i + 1))?;
        }
        for i in 0..n {
            circuit.measure(q.get(i), c.get(i))?;
        }

        Ok(circuit)
    }
}
