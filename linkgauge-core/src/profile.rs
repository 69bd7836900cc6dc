//! Per-Node Sensor Profile
//!
//! ## Overview
//!
//! One `SensorProfile` exists per node identifier. It is created lazily on
//! first sight of a node, lives for the process lifetime, and is mutated
//! only through the dispatcher's ingestion calls - the dispatcher is the
//! single logical writer, so none of this state needs interior locking.
//!
//! ## What a profile knows
//!
//! - the node's sparse tick series and the gap accounting derived from it
//! - how many priority-tagged readings arrived
//! - the node's most recent self-reported summary (cross-check data only,
//!   never authoritative)
//! - how many observation windows have already been closed and fed back
//! - the last message id acknowledged, to spot duplicate deliveries in
//!   the logs (the protocol still acknowledges duplicates, see
//!   [`dispatch`](crate::dispatch))

use crate::messages::{MsgId, NodeId, QualityReport, Tick};
use crate::series::{Insert, TickSeries};

/// Lifecycle state of a profile.
///
/// Profiles never reach a terminal state while the process runs; the only
/// transition is `New → Accumulating` on the first ingested reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProfileState {
    /// Created, but no reading ingested yet
    New,
    /// At least one reading ingested; stays here for the process lifetime
    Accumulating,
}

/// Outcome of ingesting a single (value, tick) pair.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Ingest {
    /// A previously unseen tick was recorded.
    Recorded {
        /// Gaps newly opened beyond the old tick frontier.
        gaps_opened: u32,
    },
    /// The tick already held a value; it was overwritten, counters untouched.
    Overwrote {
        /// The replaced value.
        previous: f32,
    },
}

/// Rolling per-node aggregation state.
#[derive(Debug, Clone)]
pub struct SensorProfile {
    id: NodeId,
    series: TickSeries,
    priority_received: u32,
    last_self_reported: Option<QualityReport>,
    window_index: u32,
    last_ack_msg_id: Option<MsgId>,
}

impl SensorProfile {
    /// Create an empty profile for `id`.
    pub fn new(id: NodeId) -> Self {
        Self {
            id,
            series: TickSeries::new(),
            priority_received: 0,
            last_self_reported: None,
            window_index: 0,
            last_ack_msg_id: None,
        }
    }

    /// Node identifier; immutable after creation.
    pub fn id(&self) -> NodeId {
        self.id
    }

    /// Lifecycle state derived from ingestion history.
    pub fn state(&self) -> ProfileState {
        if self.series.is_empty() {
            ProfileState::New
        } else {
            ProfileState::Accumulating
        }
    }

    /// Ingest one (value, tick) pair.
    ///
    /// A duplicate tick overwrites the stored value and leaves every
    /// counter untouched. A fresh tick records the value, counts the
    /// reading (and its priority tag), and opens one gap per tick skipped
    /// beyond the previous frontier. Backfill of a previously missing
    /// tick converts that gap into a received reading; it never
    /// resurrects or double-counts gaps regardless of how often the tick
    /// is re-delivered afterwards.
    pub fn ingest_reading(&mut self, value: f32, tick: Tick, is_priority: bool) -> Ingest {
        match self.series.insert(tick, value) {
            Insert::Overwrite { previous } => Ingest::Overwrote { previous },
            Insert::Fresh { opened, .. } => {
                if is_priority {
                    self.priority_received += 1;
                }
                Ingest::Recorded { gaps_opened: opened }
            }
        }
    }

    /// Store a self-reported quality summary verbatim.
    ///
    /// Informational cross-check data: touches neither the series nor any
    /// counter.
    pub fn ingest_quality_report(&mut self, report: QualityReport) {
        self.last_self_reported = Some(report);
    }

    /// Record that `msg_id` was acknowledged; returns whether this looks
    /// like a duplicate delivery of the previous message.
    pub fn note_ack(&mut self, msg_id: MsgId) -> bool {
        let duplicate = self.last_ack_msg_id == Some(msg_id);
        self.last_ack_msg_id = Some(msg_id);
        duplicate
    }

    /// Close the current observation window, returning its index.
    ///
    /// The window index only increases, once per boundary crossing; the
    /// feedback scheduler is the only caller.
    pub fn close_window(&mut self) -> u32 {
        let closed = self.window_index;
        self.window_index += 1;
        closed
    }

    /// Skip directly to `window_index`, dropping the windows in between.
    ///
    /// Used by the feedback scheduler when a tick lands so far ahead that
    /// closing every missed window would flood the link. Never moves the
    /// index backwards.
    pub fn fast_forward_windows(&mut self, window_index: u32) {
        self.window_index = self.window_index.max(window_index);
    }

    /// Count of distinct ticks with a recorded reading.
    pub fn received_count(&self) -> u32 {
        self.series.present()
    }

    /// Count of ticks up to the frontier never observed.
    pub fn gap_count(&self) -> u32 {
        self.series.missing()
    }

    /// Count of readings that arrived priority-tagged.
    pub fn priority_received_count(&self) -> u32 {
        self.priority_received
    }

    /// Highest tick index ever observed for this node.
    pub fn expected_tick_cursor(&self) -> Option<Tick> {
        self.series.frontier()
    }

    /// Observation windows already closed and fed back.
    pub fn window_index(&self) -> u32 {
        self.window_index
    }

    /// Most recent self-reported summary, if any.
    pub fn last_self_reported(&self) -> Option<&QualityReport> {
        self.last_self_reported.as_ref()
    }

    /// The node's sparse time series.
    pub fn series(&self) -> &TickSeries {
        &self.series
    }
}
