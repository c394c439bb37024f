//! Benchmarks for Qobj assembly
//!
//! Run with: cargo bench -p qobj-assemble

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use num_complex::Complex64;
use qobj_assemble::{Assembler, PulseConfig, PulseExperiment, RunConfig, SequentialIds};
use qobj_ir::Circuit;
use qobj_pulse::{Acquire, Channel, SamplePulse, Schedule};

/// Benchmark assembling batches of GHZ circuits
fn bench_circuit_assembly(c: &mut Criterion) {
    let mut group = c.benchmark_group("circuit_assembly");
    let assembler = Assembler::with_id_generator(SequentialIds::new("bench"));
    let config = RunConfig::default();

    for batch in &[1, 10, 100] {
        let circuits: Vec<_> = (0..*batch)
            .map(|_| Circuit::ghz(20).unwrap())
            .collect();
        group.bench_with_input(BenchmarkId::new("ghz20", batch), &circuits, |b, circuits| {
            b.iter(|| assembler.assemble_circuits(black_box(circuits), &config).unwrap());
        });
    }

    group.finish();
}

/// A schedule driving `qubits` qubits with `depth` pulses each, then measuring.
fn drive_and_measure(qubits: u32, depth: usize) -> Schedule {
    let pulse = SamplePulse::new(vec![Complex64::new(0.2, 0.0); 64]);
    let mut sched = Schedule::new();
    for q in 0..qubits {
        for _ in 0..depth {
            sched = sched.append(pulse.to(Channel::Drive(q))).unwrap();
        }
        sched = sched
            .append(Acquire::new(256).to(&[q], &[q], &[q]).unwrap())
            .unwrap();
    }
    sched
}

/// Benchmark schedule composition
fn bench_schedule_append(c: &mut Criterion) {
    let mut group = c.benchmark_group("schedule_append");

    for depth in &[10, 100] {
        group.bench_with_input(BenchmarkId::new("depth", depth), depth, |b, &depth| {
            b.iter(|| drive_and_measure(black_box(5), depth));
        });
    }

    group.finish();
}

/// Benchmark assembling batches of schedules
fn bench_schedule_assembly(c: &mut Criterion) {
    let mut group = c.benchmark_group("schedule_assembly");
    let assembler = Assembler::with_id_generator(SequentialIds::new("bench"));
    let config = PulseConfig::default().with_qubit_lo_freq(vec![5.0; 5]);

    for batch in &[1, 10, 50] {
        let experiments: Vec<PulseExperiment> = (0..*batch)
            .map(|_| drive_and_measure(5, 20).into())
            .collect();
        group.bench_with_input(
            BenchmarkId::new("5q_depth20", batch),
            &experiments,
            |b, experiments| {
                b.iter(|| {
                    assembler
                        .assemble_schedules(black_box(experiments), &config)
                        .unwrap()
                });
            },
        );
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_circuit_assembly,
    bench_schedule_append,
    bench_schedule_assembly
);
criterion_main!(benches);
