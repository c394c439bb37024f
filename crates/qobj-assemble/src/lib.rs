//! Lowering of quantum programs into Qobj executable containers.
//!
//! The [`Assembler`] takes either gate-level [`qobj_ir::Circuit`]s or
//! pulse-level [`qobj_pulse::Schedule`]s and produces a [`Qobj`] whose
//! experiments follow the Qobj wire schema.
//!
//! # Example: Assembling a Circuit
//!
//! ```rust
//! use qobj_assemble::{Assembler, RunConfig, SequentialIds};
//! use qobj_ir::Circuit;
//!
//! let assembler = Assembler::with_id_generator(SequentialIds::new("bell"));
//! let qobj = assembler.assemble_circuits(&[Circuit::bell()?], &RunConfig::default())?;
//!
//! assert_eq!(qobj.qobj_id, "bell-0");
//! assert_eq!(qobj.experiments[0].instructions.len(), 4);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! # Example: Assembling a Schedule
//!
//! ```rust
//! use num_complex::Complex64;
//! use qobj_assemble::{Assembler, MeasLevel, PulseConfig, PulseExperiment};
//! use qobj_pulse::{Acquire, Channel, SamplePulse, Schedule};
//!
//! let x90 = SamplePulse::with_name("x90", vec![Complex64::new(0.5, 0.0); 16]);
//! let sched = Schedule::named("x90-measure")
//!     .append(x90.to(Channel::Drive(0)))?
//!     .append(Acquire::new(32).to(&[0], &[0], &[])?)?;
//!
//! let config = PulseConfig::default()
//!     .with_meas_level(MeasLevel::Kerneled)
//!     .with_qubit_lo_freq(vec![5.0]);
//! let qobj = Assembler::new().assemble_schedules(&[PulseExperiment::new(sched)], &config)?;
//!
//! assert_eq!(qobj.config.pulse_library[0].name, "x90");
//! assert_eq!(qobj.config.memory_slots, 1);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod assembler;
pub mod circuit;
pub mod config;
pub mod converter;
pub mod error;
pub mod ids;
pub mod lo;
pub mod pulse;
pub mod qobj;

pub use assembler::Assembler;
pub use circuit::{BitLayout, assemble_circuit};
pub use config::{MeasLevel, PulseConfig, RunConfig};
pub use converter::InstructionConverter;
pub use error::{AssembleError, AssembleResult};
pub use ids::{IdGenerator, SequentialIds, UuidGenerator};
pub use lo::{LoConfig, LoOverrides};
pub use pulse::{PulseExperiment, PulseNames};
pub use qobj::{
    ExperimentHeader, PulseLibraryItem, PulseQobj, PulseQobjConfig, PulseQobjExperiment,
    PulseQobjExperimentConfig, PulseQobjInstruction, QasmParams, QasmQobj, QasmQobjConfig,
    QasmQobjExperiment, QasmQobjExperimentConfig, QasmQobjInstruction, Qobj, QobjConditional,
    QobjHeader, QobjType,
};
