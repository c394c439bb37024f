//! Lowering of a circuit into one wire experiment.

use qobj_ir::{ClassicalCondition, Circuit, Clbit, Instruction, InstructionKind, Param, Qubit};
use rustc_hash::FxHashMap;
use std::hash::Hash;

use crate::error::{AssembleError, AssembleResult};
use crate::qobj::{
    ExperimentHeader, QasmParams, QasmQobjExperiment, QasmQobjExperimentConfig,
    QasmQobjInstruction, QobjConditional,
};

/// Global bit numbering of one circuit.
///
/// Qubits are numbered by their position in the concatenation of the
/// quantum registers in declaration order; classical bits likewise give
/// memory slot numbers.
#[derive(Debug, Clone)]
pub struct BitLayout {
    qubit_labels: Vec<(String, u32)>,
    clbit_labels: Vec<(String, u32)>,
    qubits: FxHashMap<Qubit, u32>,
    clbits: FxHashMap<Clbit, u32>,
}

impl BitLayout {
    /// Number the bits of `circuit`.
    pub fn new(circuit: &Circuit) -> Self {
        let qubit_labels: Vec<_> = circuit
            .qregs()
            .iter()
            .flat_map(|reg| (0..reg.size).map(move |i| (reg.name.clone(), i)))
            .collect();
        let clbit_labels: Vec<_> = circuit
            .cregs()
            .iter()
            .flat_map(|reg| (0..reg.size).map(move |i| (reg.name.clone(), i)))
            .collect();
        let qubits = first_positions(circuit.qubits());
        let clbits = first_positions(circuit.clbits());
        Self {
            qubit_labels,
            clbit_labels,
            qubits,
            clbits,
        }
    }

    /// Global index of `qubit`.
    pub fn qubit(&self, qubit: &Qubit) -> Option<u32> {
        self.qubits.get(qubit).copied()
    }

    /// Memory slot of `clbit`.
    pub fn clbit(&self, clbit: &Clbit) -> Option<u32> {
        self.clbits.get(clbit).copied()
    }

    /// `(register, index)` per qubit, in global order.
    pub fn qubit_labels(&self) -> &[(String, u32)] {
        &self.qubit_labels
    }

    /// `(register, index)` per classical bit, in memory slot order.
    pub fn clbit_labels(&self) -> &[(String, u32)] {
        &self.clbit_labels
    }
}

/// Position of each bit; a repeated bit keeps its first position.
fn first_positions<B: Eq + Hash>(bits: impl Iterator<Item = B>) -> FxHashMap<B, u32> {
    let mut positions = FxHashMap::default();
    for (bit, i) in bits.zip(0..) {
        positions.entry(bit).or_insert(i);
    }
    positions
}

/// Lower `circuit` into an experiment.
pub fn assemble_circuit(circuit: &Circuit) -> AssembleResult<QasmQobjExperiment> {
    let layout = BitLayout::new(circuit);
    let n_qubits = layout.qubit_labels.len() as u32;
    let memory_slots = layout.clbit_labels.len() as u32;

    let instructions = circuit
        .data()
        .iter()
        .map(|inst| lower_instruction(circuit, &layout, inst))
        .collect::<AssembleResult<Vec<_>>>()?;

    let header = ExperimentHeader {
        qubit_labels: Some(layout.qubit_labels),
        n_qubits: Some(n_qubits),
        qreg_sizes: Some(
            circuit
                .qregs()
                .iter()
                .map(|r| (r.name.clone(), r.size))
                .collect(),
        ),
        clbit_labels: Some(layout.clbit_labels),
        memory_slots: Some(memory_slots),
        creg_sizes: Some(
            circuit
                .cregs()
                .iter()
                .map(|r| (r.name.clone(), r.size))
                .collect(),
        ),
        name: Some(circuit.name().to_string()),
    };

    Ok(QasmQobjExperiment {
        header,
        config: QasmQobjExperimentConfig {
            n_qubits,
            memory_slots,
            shots: None,
            seed: None,
            extra: serde_json::Map::new(),
        },
        instructions,
    })
}

fn lower_instruction(
    circuit: &Circuit,
    layout: &BitLayout,
    inst: &Instruction,
) -> AssembleResult<QasmQobjInstruction> {
    let mut out = QasmQobjInstruction::new(inst.name());

    if !inst.qubits.is_empty() {
        let qubits = inst
            .qubits
            .iter()
            .map(|q| {
                layout.qubit(q).ok_or_else(|| AssembleError::QubitNotFound {
                    qubit: q.to_string(),
                    circuit: circuit.name().to_string(),
                })
            })
            .collect::<AssembleResult<Vec<_>>>()?;
        out.qubits = Some(qubits);
    }

    if !inst.clbits.is_empty() {
        let memory = inst
            .clbits
            .iter()
            .map(|c| {
                layout.clbit(c).ok_or_else(|| AssembleError::ClbitNotFound {
                    clbit: c.to_string(),
                    circuit: circuit.name().to_string(),
                })
            })
            .collect::<AssembleResult<Vec<_>>>()?;
        out.memory = Some(memory);
    }

    match &inst.kind {
        InstructionKind::Snapshot {
            label,
            snapshot_type,
        } => {
            out.label = Some(label.clone());
            out.snapshot_type = Some(snapshot_type.clone());
        }
        InstructionKind::Unitary(_) => {
            out.params = lower_params(inst)?;
            out.label = inst.label.clone();
        }
        _ => out.params = lower_params(inst)?,
    }

    if let Some(condition) = &inst.condition {
        out.conditional = Some(lower_condition(circuit, layout, condition)?);
    }

    Ok(out)
}

fn lower_params(inst: &Instruction) -> AssembleResult<Option<QasmParams>> {
    let params = inst.params();
    if let [Param::Matrix(matrix)] = params.as_slice() {
        return Ok(Some(QasmParams::Matrix(matrix.rows().to_vec())));
    }
    if params.is_empty() {
        return Ok(None);
    }

    let values = params
        .iter()
        .map(|p| match p {
            Param::Expr(expr) => Ok(expr.evaluate()?),
            Param::Matrix(_) | Param::Text(_) => Err(AssembleError::Encoding(format!(
                "'{}' mixes matrix or text parameters with other parameters",
                inst.name()
            ))),
        })
        .collect::<AssembleResult<Vec<_>>>()?;
    Ok(Some(QasmParams::Values(values)))
}

/// The mask covers every bit of the register, not only the compared ones.
fn lower_condition(
    circuit: &Circuit,
    layout: &BitLayout,
    condition: &ClassicalCondition,
) -> AssembleResult<QobjConditional> {
    let register = circuit
        .creg(&condition.register)
        .ok_or_else(|| AssembleError::RegisterNotFound {
            register: condition.register.clone(),
            circuit: circuit.name().to_string(),
        })?;

    let mut mask: u128 = 0;
    for clbit in register.clbits() {
        let slot = layout
            .clbit(&clbit)
            .ok_or_else(|| AssembleError::ClbitNotFound {
                clbit: clbit.to_string(),
                circuit: circuit.name().to_string(),
            })?;
        let bit = 1u128.checked_shl(slot).ok_or_else(|| {
            AssembleError::Encoding(format!(
                "condition on '{}' uses memory slot {slot}, beyond the 128-bit mask",
                register.name
            ))
        })?;
        mask |= bit;
    }

    Ok(QobjConditional::equals(mask, condition.value))
}
