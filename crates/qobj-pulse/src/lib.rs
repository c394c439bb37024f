//! Pulse-level scheduling model.
//!
//! Pulse programs are trees of [`Schedule`]s whose leaves are
//! [`Instruction`]s, each binding one [`Command`] to one or more
//! [`Channel`]s. Every composition step checks the tree's
//! [`TimeslotCollection`] so no two instructions ever overlap on a channel,
//! and returns a new schedule instead of changing an existing one.
//!
//! # Example
//!
//! ```rust
//! use num_complex::Complex64;
//! use qobj_pulse::{Acquire, Channel, Schedule, SamplePulse};
//!
//! let x90 = SamplePulse::new(vec![Complex64::new(0.5, 0.0); 16]);
//! let meas = Acquire::new(32);
//!
//! let sched = Schedule::named("x90-measure")
//!     .append(x90.to(Channel::Drive(0)))?
//!     .append(meas.to(&[0], &[0], &[])?)?;
//!
//! let times: Vec<u64> = sched.flatten().map(|(t, _)| t).collect();
//! assert_eq!(times, vec![0, 0]);
//! assert_eq!(sched.duration(), 32);
//! # Ok::<(), qobj_pulse::PulseError>(())
//! ```
//!
//! # Components
//!
//! - [`timeslots`]: intervals and the per-channel no-overlap collection
//! - [`command`]: sample pulses, acquisitions, frame changes, persistent
//!   values and snapshots
//! - [`functional`] and [`shapes`]: envelope functions that materialize
//!   sample pulses, clipping out-of-range amplitudes
//! - [`schedule`]: the composite tree and its depth-first flattening
//! - [`cmd_def`]: gate-to-schedule templates with parameter binding

pub mod channel;
pub mod cmd_def;
pub mod command;
pub mod error;
pub mod functional;
pub mod instruction;
pub mod parametric;
pub mod schedule;
pub mod shapes;
pub mod timeslots;

pub use channel::Channel;
pub use cmd_def::CmdDef;
pub use command::{
    Acquire, Command, CommandId, FrameChange, MeasurementOption, PersistentValue, SamplePulse,
    Snapshot,
};
pub use error::{PulseError, PulseResult};
pub use functional::{FunctionalPulse, GeneratedPulse, PulseParams};
pub use instruction::Instruction;
pub use parametric::{Bindings, Parametric};
pub use schedule::{Flatten, Schedule, ScheduleComponent};
pub use timeslots::{Interval, Timeslot, TimeslotCollection};
