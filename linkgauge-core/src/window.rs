//! Feedback Scheduler - Observation Window Boundaries
//!
//! ## Overview
//!
//! Decides, per profile, when a full observation window has been crossed
//! and a fresh [`Feedback`] estimate is due. The boundary for window `k`
//! (0-based) sits at tick `(k + 1) * W + O`, where `W` is the window
//! width and `O` a settling offset that keeps the first boundary clear of
//! node boot noise.
//!
//! The scheduler is consulted after *every* ingested (value, tick) pair,
//! and [`poll`](FeedbackScheduler::poll) is re-polled until it returns
//! `None`: one reading can jump several boundaries at once (a node
//! catching up after a long outage), and each crossed boundary owes the
//! node one feedback emission - up to a cap. Beyond
//! [`MAX_CATCHUP_WINDOWS`] crossed boundaries the scheduler skips the
//! oldest windows and resumes from the most recent ones, so a corrupt
//! tick near `u32::MAX` cannot flood the link. Boundary arithmetic is
//! widened to `u64` for the same reason: no tick a node can encode makes
//! it overflow.
//!
//! The window index lives on the profile, per node. Nodes report at
//! independent rates; a counter shared across nodes would mis-time
//! feedback for any node whose rate diverges from its neighbors.

use log::warn;

use crate::constants::{MAX_CATCHUP_WINDOWS, SETTLING_OFFSET, WINDOW_TICKS};
use crate::estimator::DqiEstimator;
use crate::messages::{Feedback, Tick};
use crate::profile::SensorProfile;

/// Per-profile window boundary detector.
#[derive(Debug, Clone, Copy)]
pub struct FeedbackScheduler {
    window_ticks: u32,
    settling_offset: u32,
}

impl Default for FeedbackScheduler {
    fn default() -> Self {
        Self {
            window_ticks: WINDOW_TICKS,
            settling_offset: SETTLING_OFFSET,
        }
    }
}

impl FeedbackScheduler {
    /// Scheduler with explicit geometry; callers normally use `default()`.
    ///
    /// Panics on a zero window width: every boundary would collapse onto
    /// the settling offset and feedback would fire on every poll.
    pub fn with_geometry(window_ticks: u32, settling_offset: u32) -> Self {
        assert!(window_ticks > 0, "window width must be non-zero");
        Self {
            window_ticks,
            settling_offset,
        }
    }

    /// Boundary tick closing window `window_index`.
    ///
    /// Widened to `u64`: near the top of the index range the product
    /// exceeds `u32`, and no reachable tick may panic the engine.
    pub fn boundary(&self, window_index: u32) -> u64 {
        (u64::from(window_index) + 1) * u64::from(self.window_ticks)
            + u64::from(self.settling_offset)
    }

    /// Close the profile's current window if `tick` has crossed its
    /// boundary, producing the feedback owed for it.
    ///
    /// Re-poll until `None`: each call closes at most one window, and a
    /// tick far beyond the frontier may owe several. A tick more than
    /// [`MAX_CATCHUP_WINDOWS`] boundaries ahead fast-forwards the profile
    /// past the excess windows first, bounding the emission burst.
    pub fn poll(
        &self,
        profile: &mut SensorProfile,
        tick: Tick,
        estimator: &DqiEstimator,
    ) -> Option<Feedback> {
        let tick = u64::from(tick);
        if tick <= self.boundary(profile.window_index()) {
            return None;
        }

        // Boundaries strictly below `tick`; fits in u32 since the count
        // can never exceed the tick itself.
        let crossed =
            ((tick - u64::from(self.settling_offset) - 1) / u64::from(self.window_ticks)) as u32;
        let behind = crossed - profile.window_index();
        if behind > MAX_CATCHUP_WINDOWS {
            let skip_to = crossed - MAX_CATCHUP_WINDOWS;
            warn!(
                "node {}: tick frontier jumped {} windows ahead; resuming feedback at window {}",
                profile.id(),
                behind,
                skip_to
            );
            profile.fast_forward_windows(skip_to);
        }

        let boundary = self.boundary(profile.window_index());
        let estimate = estimator.estimate(profile);
        profile.close_window();

        // boundary < tick <= u32::MAX here, so the narrowing is lossless.
        let window_end = boundary as Tick;
        Some(Feedback {
            node: profile.id(),
            estimated_dqi: estimate.dqi,
            estimated_drop_rate: estimate.drop_rate,
            window_start: window_end - self.window_ticks,
            window_end,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::messages::NodeId;
    use alloc::vec::Vec;

    fn fire_all(
        scheduler: &FeedbackScheduler,
        profile: &mut SensorProfile,
        tick: Tick,
    ) -> Vec<Feedback> {
        let estimator = DqiEstimator::default();
        let mut fired = Vec::new();
        while let Some(fb) = scheduler.poll(profile, tick, &estimator) {
            fired.push(fb);
        }
        fired
    }

    #[test]
    fn boundary_layout() {
        let s = FeedbackScheduler::default();
        assert_eq!(s.boundary(0), 230);
        assert_eq!(s.boundary(1), 430);
        assert_eq!(s.boundary(2), 630);
    }

    #[test]
    fn no_feedback_before_boundary() {
        let s = FeedbackScheduler::default();
        let mut p = SensorProfile::new(NodeId(1));
        p.ingest_reading(1.0, 229, false);
        assert!(fire_all(&s, &mut p, 229).is_empty());

        // The boundary tick itself does not fire; only crossing it does.
        p.ingest_reading(1.0, 230, false);
        assert!(fire_all(&s, &mut p, 230).is_empty());
        assert_eq!(p.window_index(), 0);
    }

    #[test]
    fn single_crossing_fires_once() {
        let s = FeedbackScheduler::default();
        let mut p = SensorProfile::new(NodeId(1));
        p.ingest_reading(1.0, 231, false);

        let fired = fire_all(&s, &mut p, 231);
        assert_eq!(fired.len(), 1);
        assert_eq!(fired[0].window_start, 30);
        assert_eq!(fired[0].window_end, 230);
        assert_eq!(p.window_index(), 1);
    }

    #[test]
    fn catch_up_tick_fires_every_missed_boundary() {
        let s = FeedbackScheduler::default();
        let mut p = SensorProfile::new(NodeId(1));
        p.ingest_reading(1.0, 1000, false);

        let fired = fire_all(&s, &mut p, 1000);
        let ends: Vec<Tick> = fired.iter().map(|f| f.window_end).collect();
        assert_eq!(ends, alloc::vec![230, 430, 630, 830]);
        assert_eq!(p.window_index(), 4);
    }

    #[test]
    fn catch_up_beyond_cap_skips_oldest_windows() {
        let s = FeedbackScheduler::default();
        let mut p = SensorProfile::new(NodeId(1));
        // Tick 4031 sits past 20 boundaries (230, 430, ..., 4030).
        p.ingest_reading(1.0, 4031, false);

        let fired = fire_all(&s, &mut p, 4031);
        assert_eq!(fired.len(), MAX_CATCHUP_WINDOWS as usize);
        // The 4 oldest windows were skipped; emissions resume at window 4.
        assert_eq!(fired[0].window_end, 1030);
        assert_eq!(fired.last().unwrap().window_end, 4030);
        assert_eq!(p.window_index(), 20);
    }

    #[test]
    fn corrupt_tick_at_u32_max_is_contained() {
        let s = FeedbackScheduler::default();
        let mut p = SensorProfile::new(NodeId(1));
        p.ingest_reading(1.0, u32::MAX, false);

        let fired = fire_all(&s, &mut p, u32::MAX);
        assert_eq!(fired.len(), MAX_CATCHUP_WINDOWS as usize);
        // 21_474_836 boundaries sit below u32::MAX; the last one closes
        // at (21_474_836 * 200) + 30.
        assert_eq!(fired.last().unwrap().window_end, 4_294_967_230);
        assert_eq!(p.window_index(), 21_474_836);
        // Fully caught up: the next boundary is beyond any encodable tick.
        assert!(s.poll(&mut p, u32::MAX, &DqiEstimator::default()).is_none());
    }

    #[test]
    #[should_panic(expected = "window width must be non-zero")]
    fn zero_window_width_is_rejected() {
        let _ = FeedbackScheduler::with_geometry(0, 30);
    }

    #[test]
    fn feedback_carries_current_estimate() {
        let s = FeedbackScheduler::default();
        let mut p = SensorProfile::new(NodeId(3));
        for tick in 0..=231 {
            p.ingest_reading(0.5, tick, false);
        }

        let fired = fire_all(&s, &mut p, 231);
        assert_eq!(fired.len(), 1);
        assert_eq!(fired[0].node, NodeId(3));
        assert_eq!(fired[0].estimated_drop_rate, 0.0);
        assert!((0.0..=1.0).contains(&fired[0].estimated_dqi));
    }
}
