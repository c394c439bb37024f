//! Property-based tests for batch assembly.

use num_complex::Complex64;
use proptest::prelude::*;
use qobj_assemble::{Assembler, PulseConfig, PulseExperiment, RunConfig, SequentialIds};
use qobj_ir::{Circuit, Qubit};
use qobj_pulse::{Channel, SamplePulse, Schedule};

/// Register sizes for a batch of circuits.
fn arb_sizes() -> impl Strategy<Value = Vec<(u32, u32)>> {
    prop::collection::vec((1_u32..6, 0_u32..6), 0..24)
}

fn circuits(sizes: &[(u32, u32)]) -> Vec<Circuit> {
    sizes
        .iter()
        .enumerate()
        .map(|(i, &(n_qubits, n_clbits))| {
            let mut circuit = Circuit::with_size(format!("c{i}"), n_qubits, n_clbits);
            circuit.h(Qubit::new("q", n_qubits - 1)).unwrap();
            circuit
        })
        .collect()
}

proptest! {
    #[test]
    fn circuit_experiments_keep_input_order(sizes in arb_sizes()) {
        let asm = Assembler::with_id_generator(SequentialIds::new("prop"));
        let qobj = asm.assemble_circuits(&circuits(&sizes), &RunConfig::default()).unwrap();

        prop_assert_eq!(qobj.experiments.len(), sizes.len());
        for (i, (exp, &(n_qubits, n_clbits))) in qobj.experiments.iter().zip(&sizes).enumerate() {
            let expected = format!("c{i}");
            prop_assert_eq!(exp.header.name.as_deref(), Some(expected.as_str()));
            prop_assert_eq!(exp.config.n_qubits, n_qubits);
            prop_assert_eq!(exp.config.memory_slots, n_clbits);
        }
        prop_assert_eq!(
            qobj.config.n_qubits,
            sizes.iter().map(|s| s.0).max().unwrap_or(0)
        );
        prop_assert_eq!(
            qobj.config.memory_slots,
            sizes.iter().map(|s| s.1).max().unwrap_or(0)
        );
    }

    #[test]
    fn schedule_experiments_keep_input_order(lengths in prop::collection::vec(1_usize..32, 0..16)) {
        let experiments: Vec<PulseExperiment> = lengths
            .iter()
            .enumerate()
            .map(|(i, &len)| {
                let pulse = SamplePulse::new(vec![Complex64::new(0.1, 0.0); len]);
                let sched = Schedule::named(format!("s{i}"))
                    .append(pulse.to(Channel::Drive(0)))
                    .unwrap();
                sched.into()
            })
            .collect();
        let asm = Assembler::with_id_generator(SequentialIds::new("prop"));
        let qobj = asm.assemble_schedules(&experiments, &PulseConfig::default()).unwrap();

        prop_assert_eq!(qobj.experiments.len(), lengths.len());
        prop_assert_eq!(qobj.config.pulse_library.len(), lengths.len());
        for (i, exp) in qobj.experiments.iter().enumerate() {
            let expected = format!("s{i}");
            prop_assert_eq!(exp.header.name.as_deref(), Some(expected.as_str()));
            let pulse_name = format!("p{i}");
            prop_assert_eq!(exp.instructions[0].name.as_str(), pulse_name.as_str());
            prop_assert_eq!(qobj.config.pulse_library[i].samples.len(), lengths[i]);
        }
    }
}
