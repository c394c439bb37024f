//! Timing lanes that pulse instructions occupy.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::error::PulseError;

/// A channel, identified by kind and index.
///
/// The wire name is the kind prefix followed by the index (`d0`, `m1`,
/// `a2`, ...); the snapshot channel has no index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Channel {
    /// Qubit drive line.
    Drive(u32),
    /// Cross-resonance / control line.
    Control(u32),
    /// Measurement stimulus line.
    Measure(u32),
    /// Acquisition window on a qubit.
    Acquire(u32),
    /// Classical memory slot an acquisition writes to.
    MemorySlot(u32),
    /// Fast-feedback register slot.
    RegisterSlot(u32),
    /// Simulator snapshot lane.
    Snapshot,
}

impl Channel {
    /// Channel index, `None` for the snapshot channel.
    pub fn index(&self) -> Option<u32> {
        match *self {
            Channel::Drive(i)
            | Channel::Control(i)
            | Channel::Measure(i)
            | Channel::Acquire(i)
            | Channel::MemorySlot(i)
            | Channel::RegisterSlot(i) => Some(i),
            Channel::Snapshot => None,
        }
    }

    /// Single-letter wire prefix.
    pub fn prefix(&self) -> &'static str {
        match self {
            Channel::Drive(_) => "d",
            Channel::Control(_) => "u",
            Channel::Measure(_) => "m",
            Channel::Acquire(_) => "a",
            Channel::MemorySlot(_) => "s",
            Channel::RegisterSlot(_) => "c",
            Channel::Snapshot => "snapshot",
        }
    }

    /// Whether pulses can be played on this channel.
    pub fn is_output(&self) -> bool {
        matches!(
            self,
            Channel::Drive(_) | Channel::Control(_) | Channel::Measure(_)
        )
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.index() {
            Some(i) => write!(f, "{}{i}", self.prefix()),
            None => f.write_str(self.prefix()),
        }
    }
}

impl FromStr for Channel {
    type Err = PulseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "snapshot" {
            return Ok(Channel::Snapshot);
        }
        let bad = || PulseError::Construction(format!("unknown channel '{s}'"));
        let mut chars = s.chars();
        let kind = chars.next().ok_or_else(bad)?;
        let index: u32 = chars.as_str().parse().map_err(|_| bad())?;
        match kind {
            'd' => Ok(Channel::Drive(index)),
            'u' => Ok(Channel::Control(index)),
            'm' => Ok(Channel::Measure(index)),
            'a' => Ok(Channel::Acquire(index)),
            's' => Ok(Channel::MemorySlot(index)),
            'c' => Ok(Channel::RegisterSlot(index)),
            _ => Err(bad()),
        }
    }
}

impl Serialize for Channel {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Channel {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
