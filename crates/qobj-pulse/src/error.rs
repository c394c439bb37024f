//! Error types for the pulse crate.

use qobj_ir::IrError;
use thiserror::Error;

use crate::channel::Channel;
use crate::timeslots::Interval;

/// Errors raised while building or composing pulse schedules.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum PulseError {
    /// Two timeslots on the same channel overlap.
    #[error("Timeslot conflict on channel {channel}: {incoming} overlaps {existing}")]
    Conflict {
        /// The channel both intervals occupy.
        channel: Channel,
        /// Interval already held by the collection.
        existing: Interval,
        /// Interval that was being added.
        incoming: Interval,
    },

    /// A command or instruction was built from inconsistent inputs.
    #[error("Invalid construction: {0}")]
    Construction(String),

    /// An interval whose end lies before its begin.
    #[error("Invalid interval: begin {begin} is after end {end}")]
    InvalidInterval {
        /// Requested begin time.
        begin: u64,
        /// Requested end time.
        end: u64,
    },

    /// A time moved past the end of the representable range.
    #[error("Time {time} shifted by {offset} overflows")]
    TimeOverflow {
        /// The time being moved.
        time: u64,
        /// The requested shift.
        offset: u64,
    },

    /// No command definition is registered under this key.
    #[error("Command definition '{name}' not found for qubits {qubits:?}")]
    CmdDefNotFound {
        /// Gate name.
        name: String,
        /// Qubit tuple.
        qubits: Vec<u32>,
    },

    /// A free parameter had no binding.
    #[error("Parameter '{0}' is unbound")]
    UnboundParameter(String),

    /// Parameter expression could not be evaluated.
    #[error(transparent)]
    Ir(IrError),
}

impl From<IrError> for PulseError {
    fn from(err: IrError) -> Self {
        match err {
            IrError::UnboundParameter(name) => PulseError::UnboundParameter(name),
            other => PulseError::Ir(other),
        }
    }
}

/// Result type for pulse operations.
pub type PulseResult<T> = Result<T, PulseError>;
