//! Message Kinds Exchanged with Sensor Nodes
//!
//! ## Overview
//!
//! This module defines the typed message vocabulary of the aggregation
//! protocol. Encoding and radio framing are a transport concern; the
//! engine only ever sees these structs.
//!
//! ## Protocol shape
//!
//! Inbound from nodes:
//! - [`Reading`] - a batch of (value, tick) pairs, optionally priority-tagged
//! - [`QualityReport`] - a node's own self-computed quality summary
//! - [`Ack`] - reserved; the aggregator ignores upstream acks
//!
//! Outbound to nodes (link-layer broadcast, no unicast addressing):
//! - [`Ack`] - one per quality report, one per priority-tagged reading
//! - [`Feedback`] - DQI and drop-rate estimate pushed at window boundaries
//!
//! ## The self-estimate echo
//!
//! The node firmware overloads the reading schema for a diagnostics
//! channel: a reading carrying the reserved message id
//! [`SELF_ESTIMATE_MSG_ID`](crate::constants::SELF_ESTIMATE_MSG_ID)
//! encodes the node's own DQI estimate in fixed-point inside the
//! value/tick slots. That overload is a wire legacy; inside the engine it
//! is promoted to its own type, [`SelfEstimate`], as soon as it is
//! recognized, and it never reaches the ingestion path.

use alloc::vec::Vec;
use core::fmt;

use crate::constants::{SELF_ESTIMATE_MSG_ID, SELF_ESTIMATE_SCALE};

/// Node-local time index attached to each reading.
///
/// Monotonically assigned by the node; used by the aggregator as the
/// alignment key. Not wall-clock time.
pub type Tick = u32;

/// Opaque identifier of a physical sensor node.
///
/// Primary key of the profile registry; never reassigned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NodeId(pub u16);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Per-message identifier assigned by the sending node.
///
/// Nodes resend on ACK timeout, so the same id may be delivered more
/// than once; the protocol acknowledges duplicates rather than
/// deduplicating them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MsgId(pub u16);

impl MsgId {
    /// Reserved id marking a reading as a self-estimate echo.
    pub const SELF_ESTIMATE: MsgId = MsgId(SELF_ESTIMATE_MSG_ID);
}

impl fmt::Display for MsgId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A batch of sensor readings from one node.
///
/// `values` and `ticks` are parallel arrays and must have equal length;
/// the dispatcher validates this before any ingestion. Ticks within one
/// message may arrive in any order.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Reading {
    /// Originating node
    pub node: NodeId,
    /// Node-assigned message id
    pub msg_id: MsgId,
    /// Priority tag; priority readings are acknowledged
    pub priority: bool,
    /// Reading values, parallel to `ticks`
    pub values: Vec<f32>,
    /// Tick indices, parallel to `values`
    pub ticks: Vec<Tick>,
}

impl Reading {
    /// Iterate over the (value, tick) pairs in message order.
    pub fn pairs(&self) -> impl Iterator<Item = (f32, Tick)> + '_ {
        self.values.iter().copied().zip(self.ticks.iter().copied())
    }

    /// Whether this reading carries the reserved self-estimate echo id.
    pub fn is_self_estimate(&self) -> bool {
        self.msg_id == MsgId::SELF_ESTIMATE
    }

    /// Decode the self-estimate diagnostic carried in an echo reading.
    ///
    /// The node packs `dqi * 10_000` into the first value slot,
    /// `drop_rate * 10_000` into the first tick slot, and three auxiliary
    /// counters into the following tick slots. Returns `None` if the
    /// message is not an echo or the payload is too short to decode.
    pub fn self_estimate(&self) -> Option<SelfEstimate> {
        if !self.is_self_estimate() || self.values.is_empty() || self.ticks.len() < 4 {
            return None;
        }

        Some(SelfEstimate {
            node: self.node,
            dqi: self.values[0] / SELF_ESTIMATE_SCALE,
            drop_rate: self.ticks[0] as f32 / SELF_ESTIMATE_SCALE,
            aux: [self.ticks[1], self.ticks[2], self.ticks[3]],
        })
    }
}

/// A node's own self-computed quality summary.
///
/// Stored on the profile as cross-check data only; the aggregator's
/// estimate remains authoritative.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct QualityReport {
    /// Originating node
    pub node: NodeId,
    /// Node-assigned message id
    pub msg_id: MsgId,
    /// How many priority readings the node believes it sent
    pub priority_count: u16,
    /// First tick covered by this summary
    pub start_tick: Tick,
    /// Last tick covered by this summary; must be >= `start_tick`
    pub end_tick: Tick,
    /// Raw summary values as reported by the node
    pub values: Vec<f32>,
}

impl QualityReport {
    /// Whether the reported tick range is self-consistent.
    pub fn is_well_formed(&self) -> bool {
        self.end_tick >= self.start_tick
    }
}

/// Which inbound message an acknowledgment is for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AckKind {
    /// Acknowledges a [`QualityReport`]
    Report = 0,
    /// Acknowledges a priority-tagged [`Reading`]
    Reading = 1,
}

/// Acknowledgment of a received message.
///
/// Fire-and-forget broadcast; retry responsibility, if any, belongs to
/// the node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Ack {
    /// Node whose message is being acknowledged
    pub node: NodeId,
    /// Message id being acknowledged
    pub msg_id: MsgId,
    /// Which message kind is acknowledged
    pub kind: AckKind,
}

/// Quality feedback pushed to a node at a window boundary.
///
/// Consumed by the node to adapt its transmission behavior.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Feedback {
    /// Node this estimate describes
    pub node: NodeId,
    /// Estimated Data-Quality-Index, in [0, 1]
    pub estimated_dqi: f32,
    /// Estimated drop rate, in [0, 1]
    pub estimated_drop_rate: f32,
    /// First tick of the window just closed
    pub window_start: Tick,
    /// Boundary tick of the window just closed
    pub window_end: Tick,
}

/// Decoded self-estimate diagnostic from a node.
///
/// Displayed and logged only; never acknowledged, never ingested.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SelfEstimate {
    /// Reporting node
    pub node: NodeId,
    /// The node's own DQI estimate
    pub dqi: f32,
    /// The node's own drop-rate estimate
    pub drop_rate: f32,
    /// Auxiliary firmware counters, reported verbatim
    pub aux: [u32; 3],
}

/// Envelope for every message crossing the transport boundary.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Message {
    /// Sensor readings (node → aggregator)
    Reading(Reading),
    /// Self-reported quality summary (node → aggregator)
    QualityReport(QualityReport),
    /// Acknowledgment (aggregator → node; inbound copies are ignored)
    Ack(Ack),
    /// Window feedback (aggregator → node; inbound copies are ignored)
    Feedback(Feedback),
}

impl Message {
    /// The node this message concerns.
    pub fn node(&self) -> NodeId {
        match self {
            Message::Reading(r) => r.node,
            Message::QualityReport(q) => q.node,
            Message::Ack(a) => a.node,
            Message::Feedback(f) => f.node,
        }
    }

    /// Short kind name for logging.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Message::Reading(_) => "reading",
            Message::QualityReport(_) => "quality-report",
            Message::Ack(_) => "ack",
            Message::Feedback(_) => "feedback",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;

    #[test]
    fn reading_pairs_preserve_order() {
        let reading = Reading {
            node: NodeId(1),
            msg_id: MsgId(5),
            priority: false,
            values: vec![1.0, 2.0, 3.0],
            ticks: vec![9, 4, 7],
        };

        let pairs: Vec<_> = reading.pairs().collect();
        assert_eq!(pairs, vec![(1.0, 9), (2.0, 4), (3.0, 7)]);
    }

    #[test]
    fn self_estimate_decoding() {
        let echo = Reading {
            node: NodeId(3),
            msg_id: MsgId::SELF_ESTIMATE,
            priority: false,
            values: vec![9500.0],
            ticks: vec![500, 12, 34, 56],
        };

        let est = echo.self_estimate().unwrap();
        assert!((est.dqi - 0.95).abs() < 1e-6);
        assert!((est.drop_rate - 0.05).abs() < 1e-6);
        assert_eq!(est.aux, [12, 34, 56]);
    }

    #[test]
    fn truncated_echo_does_not_decode() {
        let echo = Reading {
            node: NodeId(3),
            msg_id: MsgId::SELF_ESTIMATE,
            priority: false,
            values: vec![9500.0],
            ticks: vec![500],
        };

        assert!(echo.self_estimate().is_none());
    }

    #[test]
    fn ordinary_reading_is_not_an_echo() {
        let reading = Reading {
            node: NodeId(3),
            msg_id: MsgId(2999),
            priority: false,
            values: vec![1.0],
            ticks: vec![0, 1, 2, 3],
        };

        assert!(!reading.is_self_estimate());
        assert!(reading.self_estimate().is_none());
    }

    #[test]
    fn report_range_validation() {
        let mut report = QualityReport {
            node: NodeId(2),
            msg_id: MsgId(10),
            priority_count: 4,
            start_tick: 100,
            end_tick: 199,
            values: vec![0.5],
        };
        assert!(report.is_well_formed());

        report.end_tick = 99;
        assert!(!report.is_well_formed());
    }
}
