//! Error Types for Protocol Violations
//!
//! ## Design Philosophy
//!
//! Malformed radio traffic is routine, not exceptional: a corrupted frame
//! that survives the link-layer checksum can still carry structurally
//! inconsistent payloads. The error type is therefore kept small and
//! `Copy` - it travels through hot dispatch paths and into logs, never
//! across a user-facing surface.
//!
//! Nothing in this crate is fatal. A malformed message is rejected before
//! any profile mutation, logged, and processing continues for every other
//! node. Transport send failures are not represented here at all: they
//! are logged and swallowed at the dispatch site, because a failed ACK
//! must never roll back state already ingested.

use thiserror_no_std::Error;

/// Result type for dispatch operations
pub type ProtocolResult<T> = Result<T, ProtocolError>;

/// Structural violations detected before ingestion
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProtocolError {
    /// Parallel value/tick arrays of a reading disagree in length
    #[error("parallel arrays disagree: {values} values, {ticks} ticks")]
    LengthMismatch {
        /// Number of value slots in the reading
        values: usize,
        /// Number of tick slots in the reading
        ticks: usize,
    },

    /// A quality report whose tick range ends before it starts
    #[error("report range invalid: end tick {end} before start tick {start}")]
    InvalidIdRange {
        /// Reported first tick
        start: u32,
        /// Reported last tick
        end: u32,
    },
}
