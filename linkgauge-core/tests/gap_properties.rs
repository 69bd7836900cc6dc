//! Property tests for gap accounting: the incremental counters must match
//! what a full rescan of the tick range would find, for every arrival
//! order and duplication pattern the radio can produce.

use std::collections::BTreeSet;

use proptest::prelude::*;

use linkgauge_core::{DqiEstimator, NodeId, SensorProfile, Tick, TickSeries};

/// Gap count computed the slow way: scan `[0, frontier]` for absences.
fn rescan_missing(ticks: &[Tick]) -> u32 {
    let distinct: BTreeSet<Tick> = ticks.iter().copied().collect();
    match distinct.last() {
        Some(&frontier) => frontier + 1 - distinct.len() as u32,
        None => 0,
    }
}

fn tick_sequences() -> impl Strategy<Value = Vec<Tick>> {
    prop::collection::vec(0u32..500, 0..64)
}

proptest! {
    #[test]
    fn incremental_counters_match_rescan(ticks in tick_sequences()) {
        let mut series = TickSeries::new();
        for &t in &ticks {
            series.insert(t, t as f32);
        }

        let distinct: BTreeSet<Tick> = ticks.iter().copied().collect();
        prop_assert_eq!(series.present(), distinct.len() as u32);
        prop_assert_eq!(series.missing(), rescan_missing(&ticks));
        prop_assert_eq!(series.frontier(), distinct.last().copied());
    }

    #[test]
    fn counts_are_arrival_order_invariant(ticks in tick_sequences().prop_shuffle()) {
        let mut shuffled = TickSeries::new();
        for &t in &ticks {
            shuffled.insert(t, 0.0);
        }

        let mut sorted_ticks = ticks.clone();
        sorted_ticks.sort_unstable();
        let mut sorted = TickSeries::new();
        for &t in &sorted_ticks {
            sorted.insert(t, 0.0);
        }

        prop_assert_eq!(shuffled.missing(), sorted.missing());
        prop_assert_eq!(shuffled.present(), sorted.present());
        prop_assert_eq!(shuffled.frontier(), sorted.frontier());
    }

    #[test]
    fn redelivery_never_moves_counters(ticks in tick_sequences()) {
        let mut series = TickSeries::new();
        for &t in &ticks {
            series.insert(t, 1.0);
        }
        let present = series.present();
        let missing = series.missing();
        let frontier = series.frontier();

        // The radio redelivers the whole batch.
        for &t in &ticks {
            series.insert(t, 2.0);
        }

        prop_assert_eq!(series.present(), present);
        prop_assert_eq!(series.missing(), missing);
        prop_assert_eq!(series.frontier(), frontier);
    }

    #[test]
    fn present_and_missing_partition_the_range(ticks in tick_sequences()) {
        let mut series = TickSeries::new();
        for &t in &ticks {
            series.insert(t, 0.5);
        }

        match series.frontier() {
            Some(frontier) => {
                prop_assert_eq!(series.present() + series.missing(), frontier + 1);
            }
            None => {
                prop_assert_eq!(series.present(), 0);
                prop_assert_eq!(series.missing(), 0);
            }
        }
    }

    #[test]
    fn estimates_bounded_for_any_traffic(
        ticks in tick_sequences(),
        priority in any::<bool>(),
    ) {
        let mut profile = SensorProfile::new(NodeId(1));
        for &t in &ticks {
            profile.ingest_reading(t as f32, t, priority);
        }

        let est = DqiEstimator::default().estimate(&profile);
        prop_assert!((0.0..=1.0).contains(&est.dqi));
        prop_assert!((0.0..=1.0).contains(&est.drop_rate));
        prop_assert!(profile.priority_received_count() <= profile.received_count());
    }
}
