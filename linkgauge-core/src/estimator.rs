//! DQI and Drop-Rate Estimation
//!
//! ## Overview
//!
//! Computes the aggregator-side quality estimate over everything a
//! profile has seen so far. Two normalized fractions feed the score:
//!
//! ```text
//! received_fraction = received / (received + gaps)
//! priority_fraction = priority_received / received
//!
//! dqi       = w_r * received_fraction + w_p * priority_fraction
//! drop_rate = gaps / (received + gaps)
//! ```
//!
//! The received fraction dominates; the priority fraction rewards nodes
//! whose priority-tagged readings made it through. Both outputs are
//! clamped to `[0, 1]`. The weights are tunable
//! ([`constants`](crate::constants)); the shape - monotone in both
//! fractions, clamped - is the contract.
//!
//! The node's own self-reported summary is deliberately not an input:
//! it is cross-check data, and folding it in would let a node inflate
//! its own score.

use crate::constants::{DQI_PRIORITY_WEIGHT, DQI_RECEIVED_WEIGHT};
use crate::profile::SensorProfile;

/// A computed quality estimate for one node.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Estimate {
    /// Data-Quality-Index in [0, 1]
    pub dqi: f32,
    /// Drop rate in [0, 1]; 0 when no gaps have been observed
    pub drop_rate: f32,
}

/// Weighted DQI estimator.
#[derive(Debug, Clone, Copy)]
pub struct DqiEstimator {
    received_weight: f32,
    priority_weight: f32,
}

impl Default for DqiEstimator {
    fn default() -> Self {
        Self {
            received_weight: DQI_RECEIVED_WEIGHT,
            priority_weight: DQI_PRIORITY_WEIGHT,
        }
    }
}

impl DqiEstimator {
    /// Estimator with explicit weights; callers normally use `default()`.
    pub fn with_weights(received_weight: f32, priority_weight: f32) -> Self {
        Self {
            received_weight,
            priority_weight,
        }
    }

    /// Estimate quality from a profile's counters.
    pub fn estimate(&self, profile: &SensorProfile) -> Estimate {
        let received = profile.received_count() as f32;
        let gaps = profile.gap_count() as f32;
        let total = received + gaps;

        // Nothing observed yet: no evidence of loss.
        let received_fraction = if total > 0.0 { received / total } else { 1.0 };
        let priority_fraction = if received > 0.0 {
            profile.priority_received_count() as f32 / received
        } else {
            0.0
        };

        let dqi = self.received_weight * received_fraction
            + self.priority_weight * priority_fraction;
        let drop_rate = if total > 0.0 { gaps / total } else { 0.0 };

        Estimate {
            dqi: dqi.clamp(0.0, 1.0),
            drop_rate: drop_rate.clamp(0.0, 1.0),
        }
    }
}
