//! Transport Seam and In-Memory Test Double
//!
//! ## Overview
//!
//! The radio link is an external collaborator: it may drop, duplicate,
//! and reorder packets, and its framing and binary codec live outside
//! this crate. The engine sees the link only through the [`Transport`]
//! trait - a broadcast-send primitive plus a non-blocking inbound poll.
//!
//! All outbound traffic is link-layer broadcast; the protocol never
//! addresses a specific node, so the trait has no unicast operation.
//!
//! ## MemoryTransport
//!
//! [`MemoryTransport`] backs the test suite and any in-process harness.
//! Inbound messages sit in a bounded queue that drops the oldest message
//! on overflow (recent data outranks stale data on a sensor link);
//! outbound messages are kept for inspection. A failure switch simulates
//! a dead radio so dispatch code can prove that send errors are logged
//! and swallowed, never propagated.

use alloc::vec::Vec;
use core::fmt;

use heapless::Deque;

use crate::messages::Message;

/// Abstract unreliable broadcast link.
pub trait Transport {
    /// Error produced by a failed send; logged and swallowed by callers.
    type Error: fmt::Debug;

    /// Broadcast one message to every listening node, fire-and-forget.
    fn broadcast(&mut self, message: &Message) -> Result<(), Self::Error>;

    /// Next inbound message, if one has been delivered. Non-blocking.
    fn poll(&mut self) -> Option<Message>;
}

/// Capacity of the in-memory inbound queue.
pub const MEMORY_INBOUND_CAPACITY: usize = 64;

/// Send error of the in-memory transport's simulated dead radio.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LinkDown;

impl fmt::Display for LinkDown {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "link down")
    }
}

/// In-process transport for tests and harnesses.
#[derive(Debug, Default)]
pub struct MemoryTransport {
    inbound: Deque<Message, MEMORY_INBOUND_CAPACITY>,
    sent: Vec<Message>,
    fail_sends: bool,
    dropped: u32,
}

impl MemoryTransport {
    /// Create an empty transport.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a message for delivery to the engine.
    ///
    /// On overflow the oldest queued message is dropped, mirroring how a
    /// saturated radio sheds stale traffic.
    pub fn inject(&mut self, message: Message) {
        if self.inbound.is_full() {
            self.inbound.pop_front();
            self.dropped += 1;
        }
        // Cannot fail: a slot was just freed if the queue was full.
        let _ = self.inbound.push_back(message);
    }

    /// Everything broadcast so far, oldest first.
    pub fn sent(&self) -> &[Message] {
        &self.sent
    }

    /// Drain and return everything broadcast so far.
    pub fn take_sent(&mut self) -> Vec<Message> {
        core::mem::take(&mut self.sent)
    }

    /// Simulate a dead radio: subsequent sends fail until re-enabled.
    pub fn set_fail_sends(&mut self, fail: bool) {
        self.fail_sends = fail;
    }

    /// Inbound messages shed due to queue overflow.
    pub fn dropped(&self) -> u32 {
        self.dropped
    }
}

impl Transport for MemoryTransport {
    type Error = LinkDown;

    fn broadcast(&mut self, message: &Message) -> Result<(), LinkDown> {
        if self.fail_sends {
            return Err(LinkDown);
        }
        self.sent.push(message.clone());
        Ok(())
    }

    fn poll(&mut self) -> Option<Message> {
        self.inbound.pop_front()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::messages::{Ack, AckKind, MsgId, NodeId};

    fn ack(n: u16) -> Message {
        Message::Ack(Ack {
            node: NodeId(n),
            msg_id: MsgId(1),
            kind: AckKind::Reading,
        })
    }

    #[test]
    fn inject_then_poll_is_fifo() {
        let mut t = MemoryTransport::new();
        t.inject(ack(1));
        t.inject(ack(2));

        assert_eq!(t.poll().unwrap().node(), NodeId(1));
        assert_eq!(t.poll().unwrap().node(), NodeId(2));
        assert!(t.poll().is_none());
    }

    #[test]
    fn overflow_sheds_oldest() {
        let mut t = MemoryTransport::new();
        for i in 0..(MEMORY_INBOUND_CAPACITY as u16 + 3) {
            t.inject(ack(i));
        }

        assert_eq!(t.dropped(), 3);
        assert_eq!(t.poll().unwrap().node(), NodeId(3));
    }

    #[test]
    fn dead_radio_fails_sends() {
        let mut t = MemoryTransport::new();
        t.set_fail_sends(true);
        assert_eq!(t.broadcast(&ack(1)), Err(LinkDown));
        assert!(t.sent().is_empty());

        t.set_fail_sends(false);
        assert!(t.broadcast(&ack(1)).is_ok());
        assert_eq!(t.sent().len(), 1);
    }
}
