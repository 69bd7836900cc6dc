//! Core aggregation engine for LinkGauge
//!
//! Receives periodic readings and self-reported quality summaries from
//! battery-powered sensor nodes over an unreliable broadcast radio link,
//! and closes the loop back to each node with acknowledgments and computed
//! quality feedback.
//!
//! The radio may drop, duplicate, or reorder packets. That is not a failure
//! mode to eliminate - it is the condition this engine exists to quantify.
//! Each node gets a rolling Data-Quality-Index (DQI) and drop-rate estimate,
//! recomputed every observation window and pushed back so the node can adapt
//! its transmission behavior.
//!
//! ## Data flow
//!
//! ```text
//! Transport → Dispatcher → Registry (lookup/create) → SensorProfile (ingest)
//!                 ↑                                        ↓
//!                 └──── ACK / Feedback ←── FeedbackScheduler (window check)
//! ```
//!
//! Key constraints:
//! - Single logical writer: the [`Dispatcher`] owns all per-node state, so
//!   gap detection and window bookkeeping never race
//! - Nothing here is fatal: malformed traffic from one node never affects
//!   processing for any other node
//! - Transport framing and binary encoding are external collaborators; the
//!   engine deals in typed [`Message`]s only
//!
//! ```no_run
//! use linkgauge_core::{Dispatcher, MemoryTransport, Message, Reading};
//! use linkgauge_core::messages::{NodeId, MsgId};
//!
//! let mut dispatcher = Dispatcher::new(MemoryTransport::new());
//!
//! let reading = Reading {
//!     node: NodeId(7),
//!     msg_id: MsgId(1),
//!     priority: true,
//!     values: vec![10.0, 20.0],
//!     ticks: vec![0, 1],
//! };
//!
//! dispatcher.handle(Message::Reading(reading)).unwrap();
//! ```

#![cfg_attr(not(feature = "std"), no_std)]
#![deny(unsafe_code)]
#![warn(missing_docs)]

extern crate alloc;

pub mod constants;
pub mod dispatch;
pub mod errors;
pub mod estimator;
pub mod messages;
pub mod profile;
pub mod registry;
pub mod series;
pub mod transport;
pub mod window;

// Public API
pub use dispatch::{DispatchMetrics, Dispatcher};
pub use errors::{ProtocolError, ProtocolResult};
pub use estimator::{DqiEstimator, Estimate};
pub use messages::{
    Ack, AckKind, Feedback, Message, MsgId, NodeId, QualityReport, Reading, SelfEstimate, Tick,
};
pub use profile::SensorProfile;
pub use registry::ProfileRegistry;
pub use series::TickSeries;
pub use transport::{MemoryTransport, Transport};
pub use window::FeedbackScheduler;

/// Crate version string
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
