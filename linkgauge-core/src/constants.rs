//! Protocol Constants and Estimator Tuning
//!
//! This module centralizes the wire-protocol sentinels and the tunable
//! knobs of the DQI estimator. Constants that nodes also depend on
//! (window geometry, the echo sentinel) must not change without a
//! coordinated firmware update.

// ===== OBSERVATION WINDOWS =====

/// Width of one observation window, in node ticks.
///
/// A node reporting once per tick contributes up to this many readings
/// per window. Feedback is recomputed each time a node's reported ticks
/// cross a window boundary.
pub const WINDOW_TICKS: u32 = 200;

/// Settling offset added to every window boundary, in ticks.
///
/// The first readings after node boot are unreliable (radio warm-up,
/// duty-cycle negotiation), so boundaries sit at `(k + 1) * WINDOW_TICKS
/// + SETTLING_OFFSET` rather than at exact multiples of the window width.
pub const SETTLING_OFFSET: u32 = 30;

/// Upper bound on missed windows one reading may catch up on.
///
/// A tick near `u32::MAX` in a corrupt-but-checksummed frame would
/// otherwise owe tens of millions of feedback emissions. Crossing more
/// boundaries than this skips the excess windows and resumes feedback
/// from the most recent ones.
pub const MAX_CATCHUP_WINDOWS: u32 = 16;

// ===== WIRE SENTINELS =====

/// Reserved message id marking a reading as a node self-estimate echo.
///
/// Nodes periodically echo their own DQI/drop-rate estimate for
/// diagnostics, reusing the reading schema with this id. Such messages
/// are logged only: never acknowledged, never ingested.
pub const SELF_ESTIMATE_MSG_ID: u16 = 3000;

/// Fixed-point scale used by the self-estimate echo payload.
///
/// Nodes encode fractions in integer slots as `value * 10_000`.
pub const SELF_ESTIMATE_SCALE: f32 = 10_000.0;

// ===== DQI ESTIMATOR WEIGHTS =====

/// Weight of the received fraction in the DQI score.
///
/// The received fraction (readings seen vs. readings seen plus gaps)
/// dominates the score: a node whose data arrives is a healthy node.
pub const DQI_RECEIVED_WEIGHT: f32 = 0.85;

/// Weight of the priority fraction in the DQI score.
///
/// Rewards nodes whose priority-tagged readings made it through; these
/// are the readings the node itself considered most important, so their
/// arrival says more about effective link quality than bulk traffic.
pub const DQI_PRIORITY_WEIGHT: f32 = 0.15;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn weights_form_convex_combination() {
        assert!((DQI_RECEIVED_WEIGHT + DQI_PRIORITY_WEIGHT - 1.0).abs() < 1e-6);
    }

    #[test]
    fn first_boundary_matches_protocol() {
        // Window 0 closes at tick 230 on the wire.
        assert_eq!(WINDOW_TICKS + SETTLING_OFFSET, 230);
    }
}
