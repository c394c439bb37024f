//! Time intervals on channels and the no-overlap collection built from them.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::channel::Channel;
use crate::error::{PulseError, PulseResult};

/// A half-open time range `[begin, end)` in device time units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Interval {
    begin: u64,
    end: u64,
}

impl Interval {
    /// Create an interval, rejecting `begin > end`.
    pub fn new(begin: u64, end: u64) -> PulseResult<Self> {
        if begin > end {
            return Err(PulseError::InvalidInterval { begin, end });
        }
        Ok(Self { begin, end })
    }

    /// Interval starting at `begin` lasting `duration`.
    pub fn with_duration(begin: u64, duration: u64) -> PulseResult<Self> {
        let end = begin
            .checked_add(duration)
            .ok_or(PulseError::TimeOverflow {
                time: begin,
                offset: duration,
            })?;
        Ok(Self { begin, end })
    }

    /// The interval `[0, duration)`.
    pub fn from_zero(duration: u64) -> Self {
        Self {
            begin: 0,
            end: duration,
        }
    }

    /// Begin time.
    #[inline]
    pub fn begin(&self) -> u64 {
        self.begin
    }

    /// End time (exclusive).
    #[inline]
    pub fn end(&self) -> u64 {
        self.end
    }

    /// Length of the interval.
    #[inline]
    pub fn duration(&self) -> u64 {
        self.end - self.begin
    }

    /// Whether the interval has zero length.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.begin == self.end
    }

    /// Whether two intervals share any instant.
    ///
    /// Zero-length intervals occupy no time and never overlap anything.
    pub fn overlaps(&self, other: &Interval) -> bool {
        !self.is_empty()
            && !other.is_empty()
            && self.begin < other.end
            && other.begin < self.end
    }

    /// The same interval moved later by `time`.
    pub fn shifted(&self, time: u64) -> PulseResult<Self> {
        let end = self.end.checked_add(time).ok_or(PulseError::TimeOverflow {
            time: self.end,
            offset: time,
        })?;
        Ok(Self {
            begin: self.begin + time,
            end,
        })
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {})", self.begin, self.end)
    }
}

/// An interval on a specific channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Timeslot {
    /// The occupied time range.
    pub interval: Interval,
    /// The occupied channel.
    pub channel: Channel,
}

impl Timeslot {
    /// Create a new timeslot.
    pub fn new(interval: Interval, channel: Channel) -> Self {
        Self { interval, channel }
    }
}

/// A set of timeslots with no two overlapping intervals on one channel.
///
/// Intervals are kept sorted per channel so a new interval only needs to be
/// checked against its neighbours.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TimeslotCollection {
    slots: BTreeMap<Channel, Vec<Interval>>,
}

impl TimeslotCollection {
    /// Build a collection, failing on the first same-channel overlap.
    pub fn new(timeslots: impl IntoIterator<Item = Timeslot>) -> PulseResult<Self> {
        let mut collection = Self::default();
        for slot in timeslots {
            collection.add(slot.channel, slot.interval)?;
        }
        Ok(collection)
    }

    /// An empty collection.
    pub fn empty() -> Self {
        Self::default()
    }

    /// A collection holding one timeslot.
    pub fn single(slot: Timeslot) -> Self {
        let mut slots = BTreeMap::new();
        slots.insert(slot.channel, vec![slot.interval]);
        Self { slots }
    }

    fn add(&mut self, channel: Channel, incoming: Interval) -> PulseResult<()> {
        let intervals = self.slots.entry(channel).or_default();
        let pos = intervals.partition_point(|i| *i <= incoming);

        // Non-empty intervals in a valid collection are disjoint, so among
        // those beginning before `incoming` ends only the last can reach it.
        let before_end = intervals.partition_point(|i| i.begin < incoming.end);
        let candidate = intervals[..before_end].iter().rev().find(|i| !i.is_empty());
        if let Some(existing) = candidate {
            if existing.overlaps(&incoming) {
                return Err(PulseError::Conflict {
                    channel,
                    existing: *existing,
                    incoming,
                });
            }
        }

        intervals.insert(pos, incoming);
        Ok(())
    }

    /// Whether the collection holds no timeslots.
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// All timeslots, channel by channel in time order.
    pub fn timeslots(&self) -> impl Iterator<Item = Timeslot> + '_ {
        self.slots.iter().flat_map(|(channel, intervals)| {
            intervals.iter().map(|i| Timeslot::new(*i, *channel))
        })
    }

    /// Channels with at least one timeslot.
    pub fn channels(&self) -> impl Iterator<Item = Channel> + '_ {
        self.slots.keys().copied()
    }

    /// Earliest begin over all channels.
    pub fn start_time(&self) -> Option<u64> {
        self.slots
            .values()
            .filter_map(|v| v.first())
            .map(Interval::begin)
            .min()
    }

    /// Latest end over all channels.
    pub fn stop_time(&self) -> Option<u64> {
        self.slots
            .values()
            .flat_map(|v| v.iter().map(Interval::end))
            .max()
    }

    /// Earliest begin on the given channels, 0 if none of them is occupied.
    pub fn ch_start_time(&self, channels: &[Channel]) -> u64 {
        channels
            .iter()
            .filter_map(|ch| self.slots.get(ch))
            .filter_map(|v| v.first())
            .map(Interval::begin)
            .min()
            .unwrap_or(0)
    }

    /// Latest end on the given channels, 0 if none of them is occupied.
    pub fn ch_stop_time(&self, channels: &[Channel]) -> u64 {
        channels
            .iter()
            .filter_map(|ch| self.slots.get(ch))
            .flat_map(|v| v.iter().map(Interval::end))
            .max()
            .unwrap_or(0)
    }

    /// Whether `other` can be merged without a conflict.
    pub fn is_mergeable_with(&self, other: &TimeslotCollection) -> bool {
        self.merged(other).is_ok()
    }

    /// Union with `other`, failing on any overlap.
    pub fn merged(&self, other: &TimeslotCollection) -> PulseResult<Self> {
        self.merged_shifted(other, 0)
    }

    /// Union with `other` moved later by `time`, failing on any overlap.
    pub fn merged_shifted(&self, other: &TimeslotCollection, time: u64) -> PulseResult<Self> {
        let mut merged = self.clone();
        for slot in other.timeslots() {
            merged.add(slot.channel, slot.interval.shifted(time)?)?;
        }
        Ok(merged)
    }

    /// Every timeslot moved later by `time`.
    pub fn shifted(&self, time: u64) -> PulseResult<Self> {
        let slots = self
            .slots
            .iter()
            .map(|(ch, intervals)| {
                let moved = intervals
                    .iter()
                    .map(|i| i.shifted(time))
                    .collect::<PulseResult<Vec<_>>>()?;
                Ok((*ch, moved))
            })
            .collect::<PulseResult<_>>()?;
        Ok(Self { slots })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn slot(begin: u64, end: u64, channel: Channel) -> Timeslot {
        Timeslot::new(Interval::new(begin, end).unwrap(), channel)
    }

    #[test]
    fn test_interval_validation() {
        assert!(Interval::new(3, 3).is_ok());
        assert!(matches!(
            Interval::new(4, 3),
            Err(PulseError::InvalidInterval { begin: 4, end: 3 })
        ));
    }

    #[test]
    fn test_interval_overlap() {
        let a = Interval::new(0, 10).unwrap();
        assert!(a.overlaps(&Interval::new(9, 12).unwrap()));
        assert!(!a.overlaps(&Interval::new(10, 12).unwrap()));
        assert!(!a.overlaps(&Interval::new(5, 5).unwrap()));
    }

    #[test]
    fn test_construct_without_overlap() {
        let c = TimeslotCollection::new([
            slot(0, 10, Channel::Drive(0)),
            slot(10, 20, Channel::Drive(0)),
            slot(0, 20, Channel::Drive(1)),
        ])
        .unwrap();
        assert_eq!(c.timeslots().count(), 3);
        assert_eq!(c.stop_time(), Some(20));
        assert_eq!(c.ch_stop_time(&[Channel::Drive(0)]), 20);
        assert_eq!(c.ch_stop_time(&[Channel::Measure(0)]), 0);
    }

    #[test]
    fn test_construct_with_overlap_fails() {
        let err = TimeslotCollection::new([
            slot(10, 20, Channel::Drive(0)),
            slot(0, 11, Channel::Drive(0)),
        ])
        .unwrap_err();
        match err {
            PulseError::Conflict {
                channel,
                existing,
                incoming,
            } => {
                assert_eq!(channel, Channel::Drive(0));
                assert_eq!(existing, Interval::new(10, 20).unwrap());
                assert_eq!(incoming, Interval::new(0, 11).unwrap());
            }
            other => panic!("expected conflict, got {other:?}"),
        }
    }

    #[test]
    fn test_overlap_across_empty_interval() {
        // The zero-length slot sits between the two real ones in sort order.
        let err = TimeslotCollection::new([
            slot(0, 10, Channel::Drive(0)),
            slot(5, 5, Channel::Drive(0)),
            slot(6, 8, Channel::Drive(0)),
        ]);
        assert!(matches!(err, Err(PulseError::Conflict { .. })));
    }

    #[test]
    fn test_merged_shifted() {
        let a = TimeslotCollection::new([slot(0, 10, Channel::Drive(0))]).unwrap();
        let b = TimeslotCollection::new([slot(0, 5, Channel::Drive(0))]).unwrap();

        assert!(!a.is_mergeable_with(&b));
        let merged = a.merged_shifted(&b, 10).unwrap();
        assert_eq!(merged.stop_time(), Some(15));
        assert!(a.merged_shifted(&b, 9).is_err());

        // Inputs are untouched.
        assert_eq!(a.timeslots().count(), 1);
        assert_eq!(b.stop_time(), Some(5));
    }

    #[test]
    fn test_shifted() {
        let a = TimeslotCollection::new([slot(2, 4, Channel::Acquire(0))]).unwrap();
        let s = a.shifted(6).unwrap();
        assert_eq!(s.start_time(), Some(8));
        assert_eq!(s.stop_time(), Some(10));
        assert_eq!(s.ch_start_time(&[Channel::Acquire(0)]), 8);
    }

    #[test]
    fn test_shift_overflow() {
        assert!(matches!(
            Interval::with_duration(u64::MAX - 1, 2),
            Err(PulseError::TimeOverflow { .. })
        ));
        assert_eq!(Interval::with_duration(u64::MAX - 2, 2).unwrap().end(), u64::MAX);

        let a = TimeslotCollection::new([slot(2, 4, Channel::Drive(0))]).unwrap();
        assert!(matches!(
            a.shifted(u64::MAX - 3),
            Err(PulseError::TimeOverflow { time: 4, .. })
        ));
        assert!(matches!(
            TimeslotCollection::empty().merged_shifted(&a, u64::MAX),
            Err(PulseError::TimeOverflow { .. })
        ));
    }
}
