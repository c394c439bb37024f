//! Property-based tests for timeslot collections and schedule composition.

use num_complex::Complex64;
use proptest::prelude::*;
use qobj_pulse::{
    Channel, CommandId, Interval, PulseError, SamplePulse, Schedule, Timeslot, TimeslotCollection,
};

/// Timeslots on a handful of drive channels, short enough to collide often.
fn arb_timeslots() -> impl Strategy<Value = Vec<Timeslot>> {
    prop::collection::vec(
        (0_u32..3, 0_u64..50, 0_u64..20).prop_map(|(ch, begin, len)| {
            Timeslot::new(Interval::with_duration(begin, len).unwrap(), Channel::Drive(ch))
        }),
        0..12,
    )
}

/// A schedule built by appending pulses of random length to random channels.
fn arb_schedule() -> impl Strategy<Value = Schedule> {
    prop::collection::vec((0_u32..3, 1_usize..16), 1..10).prop_map(|ops| {
        let mut sched = Schedule::new();
        for (ch, len) in ops {
            let pulse = SamplePulse::new(vec![Complex64::new(0.1, 0.0); len]);
            sched = sched
                .append(pulse.to(Channel::Drive(ch)))
                .expect("append never conflicts");
        }
        sched
    })
}

fn has_same_channel_overlap(slots: &[Timeslot]) -> bool {
    slots.iter().enumerate().any(|(i, a)| {
        slots[i + 1..]
            .iter()
            .any(|b| a.channel == b.channel && a.interval.overlaps(&b.interval))
    })
}

fn leaves(sched: &Schedule) -> Vec<(u64, CommandId, Vec<Channel>)> {
    sched
        .flatten()
        .map(|(t, inst)| (t, inst.command().id(), inst.channels().to_vec()))
        .collect()
}

proptest! {
    #[test]
    fn construction_fails_exactly_on_overlap(slots in arb_timeslots()) {
        let result = TimeslotCollection::new(slots.clone());
        if has_same_channel_overlap(&slots) {
            let is_conflict = matches!(result, Err(PulseError::Conflict { .. }));
            prop_assert!(is_conflict);
        } else {
            let collection = result.unwrap();
            prop_assert_eq!(collection.timeslots().count(), slots.len());
        }
    }

    #[test]
    fn insert_shifts_flattened_times(child in arb_schedule(), t in 0_u64..1000) {
        let placed = Schedule::new().insert(t, child.clone()).unwrap();

        let expected: Vec<_> = leaves(&child)
            .into_iter()
            .map(|(time, id, chans)| (time + t, id, chans))
            .collect();
        prop_assert_eq!(leaves(&placed), expected);
        prop_assert_eq!(placed.stop_time(), child.stop_time() + t);
    }

    #[test]
    fn insert_next_to_existing_content(child in arb_schedule(), t in 0_u64..1000) {
        let other = SamplePulse::new(vec![Complex64::new(0.2, 0.0); 7]);
        let base = Schedule::new().insert(0, other.to(Channel::Drive(9))).unwrap();
        let placed = base.insert(t, child.clone()).unwrap();

        let mut expected = leaves(&base);
        expected.extend(
            leaves(&child)
                .into_iter()
                .map(|(time, id, chans)| (time + t, id, chans)),
        );
        prop_assert_eq!(leaves(&placed), expected);
    }

    #[test]
    fn occupancy_never_overlaps(sched in arb_schedule()) {
        let slots: Vec<_> = sched.occupancy().timeslots().collect();
        prop_assert!(!has_same_channel_overlap(&slots));
    }
}
