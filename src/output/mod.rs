//! Output module
//!
//! Singer messages and the sinks that receive them.
//!
//! # Overview
//!
//! - `Message` - `SCHEMA`, `RECORD` and `STATE` messages
//! - `MessageSink` - where the engine writes messages
//! - `JsonLinesWriter` - one JSON document per line (stdout in the binary)
//! - `MemorySink` - collects messages for inspection

mod message;
mod sink;

pub use message::Message;
pub use sink::{JsonLinesWriter, MemorySink, MessageSink};
