//! Message Dispatcher and ACK/Feedback Protocol
//!
//! ## Overview
//!
//! The dispatcher is the single entry point for inbound traffic and the
//! single writer of all per-node state. It routes each message by kind,
//! issues acknowledgments, forwards readings into the owning profile, and
//! drives the feedback scheduler after every ingested pair.
//!
//! ## Protocol rules
//!
//! - Every well-formed [`QualityReport`] is acknowledged, even an obvious
//!   duplicate - nodes resend on ACK timeout and expect the ACK again.
//! - A [`Reading`] is acknowledged only when priority-tagged.
//! - A reading carrying the reserved self-estimate id is a diagnostics
//!   echo: logged, never acknowledged, never ingested, and it does not
//!   even create a profile.
//! - Inbound acks are a no-op (reserved for future use); stray inbound
//!   feedback is ignored.
//! - Duplicate message ids are acknowledged and ingested as if new. The
//!   protocol is deliberately not idempotent at this layer; the series'
//!   last-write-wins slots and set-based gap accounting absorb redundant
//!   data instead.
//!
//! ## Failure containment
//!
//! Malformed messages (unequal parallel arrays, inverted report ranges)
//! are rejected before any state mutation, logged, and not acknowledged.
//! Transport send failures are logged and swallowed - state already
//! mutated stays mutated, and processing continues for every other node.
//! Nothing in this module can take the process down.

use alloc::vec::Vec;

use log::{debug, info, warn};

use crate::errors::{ProtocolError, ProtocolResult};
use crate::estimator::DqiEstimator;
use crate::messages::{Ack, AckKind, Feedback, Message, QualityReport, Reading};
use crate::registry::ProfileRegistry;
use crate::transport::Transport;
use crate::window::FeedbackScheduler;

/// Counters tracking dispatcher activity.
///
/// Monitoring data only; none of these feed back into protocol decisions.
#[derive(Debug, Clone, Copy, Default)]
pub struct DispatchMetrics {
    /// Messages routed, of any kind
    pub messages_handled: u32,
    /// (value, tick) pairs ingested into profiles
    pub readings_ingested: u32,
    /// Acknowledgments successfully broadcast
    pub acks_sent: u32,
    /// Feedback estimates successfully broadcast
    pub feedback_sent: u32,
    /// Messages rejected before ingestion
    pub malformed_rejected: u32,
    /// Self-estimate echoes observed
    pub echoes_observed: u32,
    /// Broadcasts that failed at the transport
    pub send_failures: u32,
    /// Redeliveries spotted via the last-acknowledged message id
    pub duplicate_deliveries: u32,
}

/// Routes inbound messages and closes the loop back to each node.
pub struct Dispatcher<T: Transport> {
    transport: T,
    registry: ProfileRegistry,
    scheduler: FeedbackScheduler,
    estimator: DqiEstimator,
    metrics: DispatchMetrics,
}

impl<T: Transport> Dispatcher<T> {
    /// Dispatcher with default window geometry and estimator weights.
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            registry: ProfileRegistry::new(),
            scheduler: FeedbackScheduler::default(),
            estimator: DqiEstimator::default(),
            metrics: DispatchMetrics::default(),
        }
    }

    /// Replace the feedback scheduler (window geometry).
    pub fn with_scheduler(mut self, scheduler: FeedbackScheduler) -> Self {
        self.scheduler = scheduler;
        self
    }

    /// Replace the DQI estimator.
    pub fn with_estimator(mut self, estimator: DqiEstimator) -> Self {
        self.estimator = estimator;
        self
    }

    /// Route one inbound message.
    ///
    /// A returned error means the message was rejected as malformed; it
    /// has already been logged and no state was mutated. Callers keep
    /// processing - one node's bad frame must not affect the rest.
    pub fn handle(&mut self, message: Message) -> ProtocolResult<()> {
        self.metrics.messages_handled += 1;

        match message {
            Message::Reading(reading) => self.handle_reading(reading),
            Message::QualityReport(report) => self.handle_report(report),
            Message::Ack(ack) => {
                // Reserved: the aggregator does not process upstream acks.
                debug!("node {}: upstream ack for msg {} ignored", ack.node, ack.msg_id);
                Ok(())
            }
            Message::Feedback(feedback) => {
                debug!("node {}: stray inbound feedback ignored", feedback.node);
                Ok(())
            }
        }
    }

    /// Drain the transport's inbound queue, routing every message.
    ///
    /// Returns how many messages were handled. Malformed messages are
    /// counted as handled; their rejection is already logged.
    pub fn pump(&mut self) -> usize {
        let mut handled = 0;
        while let Some(message) = self.transport.poll() {
            let _ = self.handle(message);
            handled += 1;
        }
        handled
    }

    fn handle_reading(&mut self, reading: Reading) -> ProtocolResult<()> {
        if reading.is_self_estimate() {
            self.metrics.echoes_observed += 1;
            match reading.self_estimate() {
                Some(est) => info!(
                    "node {} self-estimate: dqi {:.4}, drop rate {:.4}, counters {:?}",
                    est.node, est.dqi, est.drop_rate, est.aux
                ),
                None => warn!(
                    "node {}: self-estimate echo too short to decode",
                    reading.node
                ),
            }
            return Ok(());
        }

        if reading.values.len() != reading.ticks.len() {
            let err = ProtocolError::LengthMismatch {
                values: reading.values.len(),
                ticks: reading.ticks.len(),
            };
            self.metrics.malformed_rejected += 1;
            warn!(
                "node {}: rejecting reading msg {}: {}",
                reading.node, reading.msg_id, err
            );
            return Err(err);
        }

        // Acknowledge before ingesting, matching node retry expectations.
        if reading.priority {
            self.send_ack(Ack {
                node: reading.node,
                msg_id: reading.msg_id,
                kind: AckKind::Reading,
            });
        }

        let mut due: Vec<Feedback> = Vec::new();
        {
            let profile = self.registry.get_or_create(reading.node);
            if reading.priority && profile.note_ack(reading.msg_id) {
                self.metrics.duplicate_deliveries += 1;
                debug!(
                    "node {}: msg {} redelivered; ingesting anyway",
                    reading.node, reading.msg_id
                );
            }

            for (value, tick) in reading.pairs() {
                profile.ingest_reading(value, tick, reading.priority);
                self.metrics.readings_ingested += 1;

                // A burst may cross several boundaries; fire one feedback
                // per boundary, in tick order.
                while let Some(feedback) = self.scheduler.poll(profile, tick, &self.estimator) {
                    due.push(feedback);
                }
            }
        }

        for feedback in due {
            info!(
                "node {}: window {}..{} closed: dqi {:.4}, drop rate {:.4}",
                feedback.node,
                feedback.window_start,
                feedback.window_end,
                feedback.estimated_dqi,
                feedback.estimated_drop_rate
            );
            self.send_feedback(feedback);
        }

        Ok(())
    }

    fn handle_report(&mut self, report: QualityReport) -> ProtocolResult<()> {
        if !report.is_well_formed() {
            let err = ProtocolError::InvalidIdRange {
                start: report.start_tick,
                end: report.end_tick,
            };
            self.metrics.malformed_rejected += 1;
            warn!(
                "node {}: rejecting quality report msg {}: {}",
                report.node, report.msg_id, err
            );
            return Err(err);
        }

        // Quality reports are acknowledged unconditionally, duplicates
        // included; nodes resend them until an ACK arrives.
        self.send_ack(Ack {
            node: report.node,
            msg_id: report.msg_id,
            kind: AckKind::Report,
        });

        let profile = self.registry.get_or_create(report.node);
        if profile.note_ack(report.msg_id) {
            self.metrics.duplicate_deliveries += 1;
            debug!(
                "node {}: quality report msg {} redelivered",
                report.node, report.msg_id
            );
        }

        debug!(
            "node {}: self-report for ticks {}..={} stored ({} priority claimed)",
            report.node, report.start_tick, report.end_tick, report.priority_count
        );
        profile.ingest_quality_report(report);

        Ok(())
    }

    fn send_ack(&mut self, ack: Ack) {
        if self.send(Message::Ack(ack)) {
            self.metrics.acks_sent += 1;
        }
    }

    fn send_feedback(&mut self, feedback: Feedback) {
        if self.send(Message::Feedback(feedback)) {
            self.metrics.feedback_sent += 1;
        }
    }

    fn send(&mut self, message: Message) -> bool {
        match self.transport.broadcast(&message) {
            Ok(()) => true,
            Err(err) => {
                self.metrics.send_failures += 1;
                warn!(
                    "broadcast of {} for node {} failed: {:?}",
                    message.kind_name(),
                    message.node(),
                    err
                );
                false
            }
        }
    }

    /// All node profiles observed so far.
    pub fn registry(&self) -> &ProfileRegistry {
        &self.registry
    }

    /// Dispatcher activity counters.
    pub fn metrics(&self) -> &DispatchMetrics {
        &self.metrics
    }

    /// The underlying transport.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Mutable access to the underlying transport, e.g. to poll it from
    /// an outer loop or inject test traffic.
    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }
}
