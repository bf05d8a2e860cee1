//! State types for tracking sync progress
//!
//! These types are serialized to JSON and persisted between runs using the
//! Singer bookmark layout:
//!
//! ```json
//! {"bookmarks": {"stream": {"partitions": [
//!     {"context": {"customer_id": "123"}, "replication_key": "date",
//!      "replication_key_value": "2024-01-03"}
//! ]}}}
//! ```

use crate::partition::{parse_date, ContextKey};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::cmp::Ordering;
use std::collections::BTreeMap;

/// Complete state for the tap
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct State {
    /// Per-stream bookmarks
    #[serde(default)]
    pub bookmarks: BTreeMap<String, StreamState>,
}

impl State {
    /// Create a new empty state
    pub fn new() -> Self {
        Self::default()
    }

    /// Get state for a stream
    pub fn get_stream(&self, stream: &str) -> Option<&StreamState> {
        self.bookmarks.get(stream)
    }

    /// Get mutable state for a stream, creating if needed
    pub fn get_stream_mut(&mut self, stream: &str) -> &mut StreamState {
        self.bookmarks.entry(stream.to_string()).or_default()
    }

    /// Checkpoint value for a (stream, context) pair
    pub fn get_checkpoint(&self, stream: &str, key: &ContextKey) -> Option<String> {
        self.get_stream(stream)?
            .get_partition(key)?
            .replication_key_value
            .as_ref()
            .and_then(crate::types::scalar_to_string)
    }
}

/// State for a single stream
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StreamState {
    /// One entry per context that made progress
    #[serde(default)]
    pub partitions: Vec<PartitionState>,
}

impl StreamState {
    /// Create a new empty stream state
    pub fn new() -> Self {
        Self::default()
    }

    /// Find the partition for a context key
    pub fn get_partition(&self, key: &ContextKey) -> Option<&PartitionState> {
        self.partitions.iter().find(|p| p.matches(key))
    }

    /// Get mutable partition state, creating if needed
    pub fn get_partition_mut(&mut self, key: &ContextKey) -> &mut PartitionState {
        let index = match self.partitions.iter().position(|p| p.matches(key)) {
            Some(index) => index,
            None => {
                self.partitions.push(PartitionState::new(key));
                self.partitions.len() - 1
            }
        };
        &mut self.partitions[index]
    }
}

/// Replication checkpoint of one (stream, context) pair
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PartitionState {
    /// Context key fields
    #[serde(default)]
    pub context: Value,

    /// Field the checkpoint tracks
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub replication_key: Option<String>,

    /// Maximum replication-key value seen
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub replication_key_value: Option<Value>,
}

impl PartitionState {
    /// Create an empty partition for a context key
    pub fn new(key: &ContextKey) -> Self {
        Self {
            context: key.to_json(),
            replication_key: None,
            replication_key_value: None,
        }
    }

    /// Whether this partition belongs to a context key
    pub fn matches(&self, key: &ContextKey) -> bool {
        ContextKey::from_json(&self.context).is_ok_and(|k| &k == key)
    }

    /// Move the checkpoint forward; returns `false` when `value` is not newer
    pub fn advance(&mut self, replication_key: &str, value: &str) -> bool {
        let current = self
            .replication_key_value
            .as_ref()
            .and_then(crate::types::scalar_to_string);
        if let Some(current) = current {
            if compare_values(value, &current) != Ordering::Greater {
                return false;
            }
        }
        self.replication_key = Some(replication_key.to_string());
        self.replication_key_value = Some(Value::String(value.to_string()));
        true
    }
}

/// Order replication-key values
///
/// Dates compare as dates and finite numbers compare numerically. Anything
/// else, including a date against a number, falls back to text order.
pub fn compare_values(a: &str, b: &str) -> Ordering {
    if let (Ok(a), Ok(b)) = (parse_date(a), parse_date(b)) {
        return a.cmp(&b);
    }
    if let (Some(x), Some(y)) = (parse_number(a), parse_number(b)) {
        if let Some(order) = x.partial_cmp(&y) {
            return order;
        }
    }
    a.cmp(b)
}

fn parse_number(value: &str) -> Option<f64> {
    value
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|n| n.is_finite())
}
