//! Immutable, conflict-checked schedule trees.

use std::collections::BTreeSet;
use std::slice;
use std::sync::Arc;

use tracing::debug;

use crate::channel::Channel;
use crate::error::{PulseError, PulseResult};
use crate::instruction::Instruction;
use crate::parametric::Bindings;
use crate::timeslots::TimeslotCollection;

/// A node of a schedule tree.
#[derive(Debug, Clone, PartialEq)]
pub enum ScheduleComponent {
    /// A nested schedule.
    Schedule(Arc<Schedule>),
    /// A leaf.
    Instruction(Arc<Instruction>),
}

impl ScheduleComponent {
    /// Occupancy in the frame of the parent, before the child offset.
    fn occupancy(&self) -> TimeslotCollection {
        match self {
            ScheduleComponent::Schedule(s) => s.occupancy.clone(),
            ScheduleComponent::Instruction(i) => i.timeslots().clone(),
        }
    }

    fn channels(&self) -> Vec<Channel> {
        match self {
            ScheduleComponent::Schedule(s) => s.channels(),
            ScheduleComponent::Instruction(i) => i.timeslots().channels().collect(),
        }
    }

    fn bind(&self, bindings: &Bindings) -> PulseResult<Self> {
        Ok(match self {
            ScheduleComponent::Schedule(s) => {
                ScheduleComponent::Schedule(Arc::new(s.bind_parameters(bindings)?))
            }
            ScheduleComponent::Instruction(i) => {
                ScheduleComponent::Instruction(Arc::new(i.bind(bindings)?))
            }
        })
    }
}

impl From<Schedule> for ScheduleComponent {
    fn from(s: Schedule) -> Self {
        ScheduleComponent::Schedule(Arc::new(s))
    }
}

impl From<Arc<Schedule>> for ScheduleComponent {
    fn from(s: Arc<Schedule>) -> Self {
        ScheduleComponent::Schedule(s)
    }
}

impl From<Instruction> for ScheduleComponent {
    fn from(i: Instruction) -> Self {
        ScheduleComponent::Instruction(Arc::new(i))
    }
}

impl From<Arc<Instruction>> for ScheduleComponent {
    fn from(i: Arc<Instruction>) -> Self {
        ScheduleComponent::Instruction(i)
    }
}

/// A composite node: children placed at offsets from `start_time`.
///
/// Composition returns a new schedule and shares children through `Arc`;
/// a schedule is never changed once built. `occupancy` is kept in the
/// parent's frame, so it already includes `start_time`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Schedule {
    name: Option<String>,
    start_time: u64,
    children: Vec<(u64, ScheduleComponent)>,
    occupancy: TimeslotCollection,
}

impl Schedule {
    /// An empty, unnamed schedule starting at 0.
    pub fn new() -> Self {
        Self::default()
    }

    /// An empty named schedule starting at 0.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    /// Schedule name.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Start time relative to the parent.
    pub fn start_time(&self) -> u64 {
        self.start_time
    }

    /// Latest end of any timeslot, or `start_time` if empty.
    pub fn stop_time(&self) -> u64 {
        self.occupancy.stop_time().unwrap_or(self.start_time)
    }

    /// `stop_time - start_time`.
    pub fn duration(&self) -> u64 {
        self.stop_time().saturating_sub(self.start_time)
    }

    /// Occupied timeslots, in the parent's frame.
    pub fn occupancy(&self) -> &TimeslotCollection {
        &self.occupancy
    }

    /// Children with their offsets from `start_time`.
    pub fn children(&self) -> &[(u64, ScheduleComponent)] {
        &self.children
    }

    /// Channels used anywhere in the tree.
    pub fn channels(&self) -> Vec<Channel> {
        self.occupancy.channels().collect()
    }

    /// Latest end on the given channels, 0 if none is used.
    pub fn ch_stop_time(&self, channels: &[Channel]) -> u64 {
        self.occupancy.ch_stop_time(channels)
    }

    /// Earliest begin on the given channels, 0 if none is used.
    pub fn ch_start_time(&self, channels: &[Channel]) -> u64 {
        self.occupancy.ch_start_time(channels)
    }

    /// Place `component` at `time` after this schedule's start.
    ///
    /// Fails with a conflict if any of its timeslots overlaps one already
    /// held on the same channel.
    pub fn insert(&self, time: u64, component: impl Into<ScheduleComponent>) -> PulseResult<Self> {
        let component = component.into();
        let offset = self
            .start_time
            .checked_add(time)
            .ok_or(PulseError::TimeOverflow {
                time: self.start_time,
                offset: time,
            })?;
        let occupancy = self
            .occupancy
            .merged_shifted(&component.occupancy(), offset)?;

        let mut children = self.children.clone();
        children.push((time, component));
        Ok(Self {
            name: self.name.clone(),
            start_time: self.start_time,
            children,
            occupancy,
        })
    }

    /// Place `component` right after the last use of any channel it occupies.
    pub fn append(&self, component: impl Into<ScheduleComponent>) -> PulseResult<Self> {
        let component = component.into();
        let stop = self.ch_stop_time(&component.channels());
        let time = stop.saturating_sub(self.start_time);
        debug!("Appending schedule component at t={}", time);
        self.insert(time, component)
    }

    /// Merge `other` at this schedule's start.
    pub fn union(&self, other: impl Into<ScheduleComponent>) -> PulseResult<Self> {
        self.insert(0, other)
    }

    /// The same schedule starting `time` later.
    pub fn shifted(&self, time: u64) -> PulseResult<Self> {
        let start_time = self
            .start_time
            .checked_add(time)
            .ok_or(PulseError::TimeOverflow {
                time: self.start_time,
                offset: time,
            })?;
        Ok(Self {
            name: self.name.clone(),
            start_time,
            children: self.children.clone(),
            occupancy: self.occupancy.shifted(time)?,
        })
    }

    /// Leaves with absolute start times, depth first.
    ///
    /// The iterator is lazy; call again to restart.
    pub fn flatten(&self) -> Flatten<'_> {
        Flatten {
            stack: vec![(self.start_time, self.children.iter())],
        }
    }

    /// Collected [`Schedule::flatten`].
    pub fn instructions(&self) -> Vec<(u64, &Instruction)> {
        self.flatten().collect()
    }

    /// Free symbols used by any leaf.
    pub fn parameters(&self) -> BTreeSet<String> {
        self.flatten()
            .flat_map(|(_, inst)| inst.parameters())
            .collect()
    }

    /// Copy of the tree with every free symbol resolved.
    pub fn bind_parameters(&self, bindings: &Bindings) -> PulseResult<Self> {
        let children = self
            .children
            .iter()
            .map(|(offset, child)| Ok((*offset, child.bind(bindings)?)))
            .collect::<PulseResult<Vec<_>>>()?;
        Ok(Self {
            name: self.name.clone(),
            start_time: self.start_time,
            children,
            occupancy: self.occupancy.clone(),
        })
    }
}

/// Depth-first iterator over `(absolute_time, instruction)` pairs.
pub struct Flatten<'a> {
    stack: Vec<(u64, slice::Iter<'a, (u64, ScheduleComponent)>)>,
}

impl<'a> Iterator for Flatten<'a> {
    type Item = (u64, &'a Instruction);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let (base, children) = self.stack.last_mut()?;
            let base = *base;
            match children.next() {
                None => {
                    self.stack.pop();
                }
                Some((offset, ScheduleComponent::Instruction(inst))) => {
                    return Some((base + offset, inst.as_ref()));
                }
                Some((offset, ScheduleComponent::Schedule(sched))) => {
                    // Bounded by the checked occupancy whenever the child has leaves.
                    let start = base.saturating_add(*offset).saturating_add(sched.start_time);
                    self.stack.push((start, sched.children.iter()));
                }
            }
        }
    }
}
