//! Schedule leaves binding a command to channels.

use std::collections::BTreeSet;

use crate::channel::Channel;
use crate::command::Command;
use crate::error::{PulseError, PulseResult};
use crate::parametric::Bindings;
use crate::timeslots::{Interval, Timeslot, TimeslotCollection};

/// A command placed on one or more channels.
///
/// Timeslots are relative to the instruction's own start; the enclosing
/// schedule supplies the offset.
#[derive(Debug, Clone, PartialEq)]
pub struct Instruction {
    name: String,
    command: Command,
    channels: Vec<Channel>,
    timeslots: TimeslotCollection,
}

impl Instruction {
    /// Occupy `[0, duration)` on each channel.
    pub fn new(command: Command, channels: Vec<Channel>) -> PulseResult<Self> {
        if channels.is_empty() {
            return Err(PulseError::Construction(format!(
                "instruction '{}' needs at least one channel",
                command.name()
            )));
        }
        let interval = Interval::from_zero(command.duration());
        let timeslots =
            TimeslotCollection::new(channels.iter().map(|ch| Timeslot::new(interval, *ch)))?;
        Ok(Self {
            name: command.name().to_string(),
            command,
            channels,
            timeslots,
        })
    }

    /// Occupy explicitly given timeslots.
    pub fn with_timeslots(command: Command, timeslots: TimeslotCollection) -> PulseResult<Self> {
        if timeslots.is_empty() {
            return Err(PulseError::Construction(format!(
                "instruction '{}' needs at least one timeslot",
                command.name()
            )));
        }
        Ok(Self {
            name: command.name().to_string(),
            channels: timeslots.channels().collect(),
            command,
            timeslots,
        })
    }

    /// Build from channels or explicit timeslots, not both.
    pub fn try_new(
        command: Command,
        channels: Vec<Channel>,
        timeslots: Option<TimeslotCollection>,
    ) -> PulseResult<Self> {
        match timeslots {
            Some(_) if !channels.is_empty() => Err(PulseError::Construction(
                "channels and timeslots may not both be supplied".to_string(),
            )),
            Some(timeslots) => Self::with_timeslots(command, timeslots),
            None => Self::new(command, channels),
        }
    }

    pub(crate) fn on_channel(command: Command, channel: Channel) -> Self {
        let interval = Interval::from_zero(command.duration());
        Self {
            name: command.name().to_string(),
            timeslots: TimeslotCollection::single(Timeslot::new(interval, channel)),
            channels: vec![channel],
            command,
        }
    }

    /// Replace the display name (defaults to the command's name).
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Instruction name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The carried command.
    pub fn command(&self) -> &Command {
        &self.command
    }

    /// Channels in the order given at construction.
    pub fn channels(&self) -> &[Channel] {
        &self.channels
    }

    /// Occupied timeslots, relative to the instruction start.
    pub fn timeslots(&self) -> &TimeslotCollection {
        &self.timeslots
    }

    /// Command duration.
    pub fn duration(&self) -> u64 {
        self.command.duration()
    }

    /// Free symbols in the command.
    pub fn parameters(&self) -> BTreeSet<String> {
        self.command.parameters()
    }

    /// Copy with every free symbol resolved.
    pub fn bind(&self, bindings: &Bindings) -> PulseResult<Self> {
        Ok(Self {
            name: self.name.clone(),
            command: self.command.bind(bindings)?,
            channels: self.channels.clone(),
            timeslots: self.timeslots.clone(),
        })
    }
}
