//! Message sinks

use super::message::Message;
use crate::error::{Error, Result};
use std::io::Write;
use std::sync::{Arc, Mutex, PoisonError};

/// Destination of emitted messages
///
/// Writes are synchronous and in call order. A failed write aborts the run.
pub trait MessageSink: Send {
    /// Write one message
    fn write(&mut self, message: &Message) -> Result<()>;

    /// Flush buffered output
    fn flush(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Writes one compact JSON document per line
pub struct JsonLinesWriter<W: Write + Send> {
    out: W,
    written: usize,
}

impl<W: Write + Send> JsonLinesWriter<W> {
    /// Wrap a writer
    pub fn new(out: W) -> Self {
        Self { out, written: 0 }
    }

    /// Number of messages written
    pub fn written(&self) -> usize {
        self.written
    }

    /// Unwrap the inner writer
    pub fn into_inner(self) -> W {
        self.out
    }
}

impl JsonLinesWriter<std::io::Stdout> {
    /// Writer on process stdout
    pub fn stdout() -> Self {
        Self::new(std::io::stdout())
    }
}

impl<W: Write + Send> MessageSink for JsonLinesWriter<W> {
    fn write(&mut self, message: &Message) -> Result<()> {
        let line = serde_json::to_string(message)?;
        writeln!(self.out, "{line}")
            .map_err(|e| Error::output(format!("failed to write message: {e}")))?;
        self.written += 1;
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        self.out
            .flush()
            .map_err(|e| Error::output(format!("failed to flush output: {e}")))
    }
}

/// Keeps every message in memory; clones share the same buffer
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    messages: Arc<Mutex<Vec<Message>>>,
}

impl MemorySink {
    /// Create an empty sink
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the messages written so far
    pub fn messages(&self) -> Vec<Message> {
        self.messages
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Records written for `stream`
    pub fn records(&self, stream: &str) -> Vec<serde_json::Value> {
        self.messages()
            .into_iter()
            .filter_map(|m| match m {
                Message::Record { stream: s, record, .. } if s == stream => Some(record),
                _ => None,
            })
            .collect()
    }

    /// The last state message value
    pub fn last_state(&self) -> Option<serde_json::Value> {
        self.messages().into_iter().rev().find_map(|m| match m {
            Message::State { value } => Some(value),
            _ => None,
        })
    }
}

impl MessageSink for MemorySink {
    fn write(&mut self, message: &Message) -> Result<()> {
        self.messages
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(message.clone());
        Ok(())
    }
}
