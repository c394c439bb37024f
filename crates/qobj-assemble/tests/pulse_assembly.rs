//! End-to-end assembly of pulse schedules.

use num_complex::Complex64;
use qobj_assemble::{
    AssembleError, Assembler, LoConfig, MeasLevel, PulseConfig, PulseExperiment,
    PulseLibraryItem, QobjType, SequentialIds,
};
use qobj_ir::ParameterExpression;
use qobj_pulse::{
    Acquire, Bindings, Channel, CmdDef, FrameChange, MeasurementOption, PersistentValue,
    SamplePulse, Schedule, Snapshot, shapes,
};
use serde_json::{Value, json};

fn assembler() -> Assembler {
    Assembler::with_id_generator(SequentialIds::new("pulse"))
}

fn measure(memory_slot: u32) -> Schedule {
    let acquire = Acquire::new(100)
        .with_kernel(MeasurementOption::new("boxcar"))
        .with_discriminator(MeasurementOption::new("max_1Q_fidelity"));
    Schedule::named("measure")
        .insert(
            0,
            SamplePulse::new(vec![Complex64::new(0.3, 0.0); 100]).to(Channel::Measure(0)),
        )
        .unwrap()
        .insert(0, acquire.to(&[0], &[memory_slot], &[memory_slot]).unwrap())
        .unwrap()
}

fn experiment_config() -> PulseConfig {
    PulseConfig::default()
        .with_qubit_lo_freq(vec![5.0, 5.1])
        .with_meas_lo_freq(vec![6.5, 6.6])
}

#[test]
fn test_flattened_instruction_stream() {
    let x90 = SamplePulse::with_name("x90", vec![Complex64::new(0.5, 0.0); 20]);
    let sched = Schedule::named("x-then-measure")
        .append(x90.to(Channel::Drive(0)))
        .unwrap()
        .append(FrameChange::new(0.5).to(Channel::Drive(0)))
        .unwrap()
        .append(PersistentValue::new(Complex64::new(0.1, 0.0)).to(Channel::Control(0)))
        .unwrap()
        .insert(20, measure(0))
        .unwrap()
        .insert(120, Snapshot::new("end", "statevector").instruction())
        .unwrap();

    let qobj = assembler()
        .assemble_schedules(&[sched.into()], &experiment_config())
        .unwrap();
    assert_eq!(qobj.qobj_type, QobjType::Pulse);

    let value: Value = serde_json::from_str(&qobj.to_json().unwrap()).unwrap();
    let instructions = &value["experiments"][0]["instructions"];
    assert_eq!(instructions[0], json!({"name": "x90", "t0": 0, "ch": "d0"}));
    assert_eq!(
        instructions[1],
        json!({"name": "fc", "t0": 20, "ch": "d0", "phase": 0.5})
    );
    assert_eq!(
        instructions[2],
        json!({"name": "pv", "t0": 0, "ch": "u0", "val": [0.1, 0.0]})
    );
    assert_eq!(instructions[3]["ch"], "m0");
    assert_eq!(instructions[3]["t0"], 20);
    assert_eq!(instructions[4]["name"], "acquire");
    assert_eq!(instructions[4]["t0"], 20);
    assert_eq!(
        instructions[5],
        json!({"name": "snapshot", "t0": 120, "label": "end", "type": "statevector"})
    );
    assert_eq!(value["experiments"][0]["header"], json!({"name": "x-then-measure"}));
    assert_eq!(value["experiments"][0]["config"], json!({}));
}

#[test]
fn test_acquire_fields_follow_meas_level() {
    let sched = measure(0);
    let acquire_at = |level: MeasLevel| -> Value {
        let config = experiment_config().with_meas_level(level);
        let qobj = assembler()
            .assemble_schedules(&[sched.clone().into()], &config)
            .unwrap();
        assert_eq!(serde_json::to_value(&qobj.config).unwrap()["meas_level"], level as u8);
        serde_json::to_value(&qobj.experiments[0].instructions[1]).unwrap()
    };

    let raw = acquire_at(MeasLevel::Raw);
    assert_eq!(raw["duration"], 100);
    assert_eq!(raw["qubits"], json!([0]));
    assert_eq!(raw["memory_slot"], json!([0]));
    assert!(raw.get("kernels").is_none());
    assert!(raw.get("discriminators").is_none());
    assert!(raw.get("register_slot").is_none());

    let kerneled = acquire_at(MeasLevel::Kerneled);
    assert_eq!(kerneled["kernels"], json!([{"name": "boxcar", "params": {}}]));
    assert!(kerneled.get("discriminators").is_none());
    assert!(kerneled.get("register_slot").is_none());

    let classified = acquire_at(MeasLevel::Classified);
    assert!(classified.get("kernels").is_some());
    assert_eq!(classified["discriminators"][0]["name"], "max_1Q_fidelity");
    assert_eq!(classified["register_slot"], json!([0]));
}

#[test]
fn test_lo_overrides_are_sparse() {
    let sched = measure(0);
    let same = LoConfig::new().with(Channel::Drive(0), 5.0).unwrap();
    let changed = LoConfig::new().with(Channel::Drive(1), 5.15).unwrap();
    let meas_only = LoConfig::new().with(Channel::Measure(0), 6.45).unwrap();

    let experiments = [
        PulseExperiment::new(sched.clone()).with_lo_config(same),
        PulseExperiment::new(sched.clone()).with_lo_config(changed),
        PulseExperiment::new(sched.clone()).with_lo_config(meas_only),
        PulseExperiment::new(sched),
    ];
    let qobj = assembler()
        .assemble_schedules(&experiments, &experiment_config())
        .unwrap();

    let configs: Vec<Value> = qobj
        .experiments
        .iter()
        .map(|e| serde_json::to_value(&e.config).unwrap())
        .collect();
    assert_eq!(configs[0], json!({}));
    assert_eq!(configs[1], json!({"qubit_lo_freq": [5.0, 5.15]}));
    assert_eq!(configs[2], json!({"meas_lo_freq": [6.45, 6.6]}));
    assert_eq!(configs[3], json!({}));
    assert_eq!(qobj.config.qubit_lo_freq, Some(vec![5.0, 5.1]));
}

#[test]
fn test_lo_override_out_of_range_aborts() {
    let exp = PulseExperiment::new(measure(0))
        .with_lo_config(LoConfig::new().with(Channel::Drive(5), 5.0).unwrap());
    assert!(matches!(
        assembler().assemble_schedules(&[exp], &experiment_config()),
        Err(AssembleError::LoOutOfRange { .. })
    ));
}

#[test]
fn test_pulse_library_dedup_by_identity() {
    let samples = vec![Complex64::new(0.2, 0.1); 8];
    let a = SamplePulse::new(samples.clone());
    let b = SamplePulse::new(samples);
    let first = Schedule::new()
        .append(a.to(Channel::Drive(0)))
        .unwrap()
        .append(a.to(Channel::Drive(0)))
        .unwrap()
        .append(b.to(Channel::Drive(1)))
        .unwrap();
    let second = Schedule::new().append(a.to(Channel::Drive(1))).unwrap();

    let defaults = vec![PulseLibraryItem {
        name: "cr90".into(),
        samples: vec![Complex64::new(0.4, 0.0); 4],
    }];
    let config = PulseConfig::default().with_pulse_library(defaults);
    let qobj = assembler()
        .assemble_schedules(&[first.into(), second.into()], &config)
        .unwrap();

    let names: Vec<_> = qobj
        .config
        .pulse_library
        .iter()
        .map(|p| p.name.as_str())
        .collect();
    assert_eq!(names, vec!["cr90", "p0", "p1"]);
    assert_eq!(qobj.experiments[0].instructions[2].name, "p1");
    assert_eq!(qobj.experiments[1].instructions[0].name, "p0");
    assert_eq!(qobj.config.pulse_library[1].samples, qobj.config.pulse_library[2].samples);
}

#[test]
fn test_generated_pulse_is_clipped() {
    let hot = shapes::constant()
        .unwrap()
        .generate(4, &[("amp".to_string(), 1.5)].into_iter().collect())
        .unwrap();
    assert_eq!(hot.clipped.len(), 4);

    let sched = Schedule::new().append(hot.pulse.to(Channel::Drive(0))).unwrap();
    let qobj = assembler()
        .assemble_schedules(&[sched.into()], &PulseConfig::default())
        .unwrap();
    for s in &qobj.config.pulse_library[0].samples {
        assert!((s.norm() - 1.0).abs() < 1e-12);
        assert!(s.arg().abs() < 1e-12);
    }
}

#[test]
fn test_cmd_def_template_assembles_after_binding() {
    let x = SamplePulse::with_name("x", vec![Complex64::new(0.5, 0.0); 16]);
    let template = Schedule::new()
        .insert(0, FrameChange::new(ParameterExpression::symbol("P0")).to(Channel::Drive(0)))
        .unwrap()
        .insert(0, x.to(Channel::Drive(0)))
        .unwrap();
    let mut defs = CmdDef::new();
    defs.add("u1x", &[0], template);

    let free = defs.get_unbound("u1x", &[0]).unwrap().clone();
    assert!(matches!(
        assembler().assemble_schedules(&[free.into()], &PulseConfig::default()),
        Err(AssembleError::Encoding(_))
    ));

    let mut bindings = Bindings::default();
    bindings.insert("P0".into(), 0.75);
    let bound = defs.get("u1x", &[0], &bindings).unwrap();
    let qobj = assembler()
        .assemble_schedules(&[bound.into()], &PulseConfig::default())
        .unwrap();
    assert_eq!(qobj.experiments[0].instructions[0].phase, Some(0.75));
    assert_eq!(qobj.experiments[0].header.name.as_deref(), Some("Experiment-0"));
}

#[test]
fn test_memory_slots_derived_or_given() {
    let qobj = assembler()
        .assemble_schedules(&[measure(0).into(), measure(3).into()], &PulseConfig::default())
        .unwrap();
    assert_eq!(qobj.config.memory_slots, 4);

    let config = PulseConfig {
        memory_slots: Some(8),
        ..PulseConfig::default()
    };
    let qobj = assembler()
        .assemble_schedules(&[measure(0).into()], &config)
        .unwrap();
    assert_eq!(qobj.config.memory_slots, 8);
}

fn build_program() -> Vec<PulseExperiment> {
    let drive = SamplePulse::new(vec![Complex64::new(0.25, 0.0); 12]);
    let sched = Schedule::new()
        .append(drive.to(Channel::Drive(0)))
        .unwrap()
        .append(measure(0))
        .unwrap();
    vec![sched.into()]
}

#[test]
fn test_equal_programs_give_identical_containers() {
    let config = experiment_config();
    let first = assembler()
        .assemble_schedules(&build_program(), &config)
        .unwrap()
        .to_json()
        .unwrap();
    // Commands built in between must not leak into the names.
    let _unrelated = SamplePulse::new(vec![Complex64::new(0.1, 0.0); 3]);
    let second = assembler()
        .assemble_schedules(&build_program(), &config)
        .unwrap()
        .to_json()
        .unwrap();
    assert_eq!(first, second);

    let value: Value = serde_json::from_str(&first).unwrap();
    assert_eq!(value["config"]["pulse_library"][0]["name"], "p0");
    assert_eq!(value["config"]["pulse_library"][1]["name"], "p1");
}

#[test]
fn test_deterministic_ids() {
    let asm = assembler();
    let a = asm
        .assemble_schedules(&[measure(0).into()], &PulseConfig::default())
        .unwrap();
    let b = asm
        .assemble_schedules(&[measure(0).into()], &PulseConfig::default())
        .unwrap();
    assert_eq!(a.qobj_id, "pulse-0");
    assert_eq!(b.qobj_id, "pulse-1");
}
