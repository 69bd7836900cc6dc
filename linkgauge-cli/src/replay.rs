//! Line-Delimited JSON Transport
//!
//! Adapts any line-oriented byte stream to the engine's [`Transport`]
//! seam: inbound messages are read one JSON object per line, outbound
//! broadcasts are written the same way. This covers recorded traces,
//! stdin pipes, and serial bridges that already frame per line.
//!
//! Unparseable lines are logged and skipped; a corrupt line in a trace
//! must not abort the replay, for the same reason a corrupt frame on the
//! radio must not stall the aggregator.

use std::io::{BufRead, Write};

use log::warn;

use linkgauge_core::{Message, Transport};

/// Transport over a line-delimited JSON reader/writer pair.
pub struct LineTransport<R, W> {
    reader: R,
    writer: W,
    line: String,
    parse_failures: u32,
}

impl<R: BufRead, W: Write> LineTransport<R, W> {
    /// Wrap a reader of inbound lines and a writer for broadcasts.
    pub fn new(reader: R, writer: W) -> Self {
        Self {
            reader,
            writer,
            line: String::new(),
            parse_failures: 0,
        }
    }

    /// Lines that failed to parse and were skipped.
    pub fn parse_failures(&self) -> u32 {
        self.parse_failures
    }
}

impl<R: BufRead, W: Write> Transport for LineTransport<R, W> {
    type Error = serde_json::Error;

    fn broadcast(&mut self, message: &Message) -> Result<(), serde_json::Error> {
        serde_json::to_writer(&mut self.writer, message)?;
        self.writer.write_all(b"\n").map_err(serde_json::Error::io)?;
        Ok(())
    }

    fn poll(&mut self) -> Option<Message> {
        loop {
            self.line.clear();
            match self.reader.read_line(&mut self.line) {
                Ok(0) => return None,
                Ok(_) => {
                    let trimmed = self.line.trim();
                    if trimmed.is_empty() {
                        continue;
                    }
                    match serde_json::from_str(trimmed) {
                        Ok(message) => return Some(message),
                        Err(err) => {
                            self.parse_failures += 1;
                            warn!("skipping unparseable line: {err}");
                        }
                    }
                }
                Err(err) => {
                    warn!("input stream error, stopping: {err}");
                    return None;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use linkgauge_core::{MsgId, NodeId, Reading};

    #[test]
    fn polls_messages_and_skips_garbage() {
        let input = concat!(
            r#"{"Reading":{"node":7,"msg_id":1,"priority":true,"values":[20.5],"ticks":[3]}}"#,
            "\n",
            "not json\n",
            "\n",
            r#"{"Reading":{"node":8,"msg_id":2,"priority":false,"values":[],"ticks":[]}}"#,
            "\n",
        );
        let mut transport = LineTransport::new(input.as_bytes(), Vec::new());

        let first = transport.poll().unwrap();
        assert_eq!(first.node(), NodeId(7));
        let second = transport.poll().unwrap();
        assert_eq!(second.node(), NodeId(8));
        assert!(transport.poll().is_none());
        assert_eq!(transport.parse_failures(), 1);
    }

    #[test]
    fn broadcast_writes_one_line_per_message() {
        let mut transport = LineTransport::new(&b""[..], Vec::new());
        let message = Message::Reading(Reading {
            node: NodeId(1),
            msg_id: MsgId(9),
            priority: false,
            values: vec![1.5],
            ticks: vec![0],
        });

        transport.broadcast(&message).unwrap();
        transport.broadcast(&message).unwrap();

        let written = String::from_utf8(transport.writer).unwrap();
        assert_eq!(written.lines().count(), 2);
        let parsed: Message = serde_json::from_str(written.lines().next().unwrap()).unwrap();
        assert_eq!(parsed.node(), NodeId(1));
    }
}
