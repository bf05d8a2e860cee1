//! Decoder types and traits
//!
//! Defines the core decoder abstractions.

use crate::error::Result;
use serde_json::Value;

/// Field holding the rows of a search response
pub const RESULTS_FIELD: &str = "results";

/// Where a stream's records live in the response envelope
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordSelector {
    /// Rows are the elements of an array field; a missing or `null` field is
    /// an empty page
    Field(String),
    /// The whole envelope is a single record
    Envelope,
}

impl RecordSelector {
    /// Selector for `{"results": [...]}` envelopes
    pub fn results() -> Self {
        Self::Field(RESULTS_FIELD.to_string())
    }
}

impl Default for RecordSelector {
    fn default() -> Self {
        Self::results()
    }
}

/// Trait for decoding response bodies into records
pub trait RecordDecoder: Send + Sync {
    /// Decode the response body into a single JSON value (full response)
    fn decode_raw(&self, body: &str) -> Result<Value>;

    /// Extract the records of an already parsed envelope
    fn extract(&self, envelope: &Value) -> Result<Vec<Value>>;

    /// Decode the response body into a list of records
    fn decode(&self, body: &str) -> Result<Vec<Value>> {
        self.extract(&self.decode_raw(body)?)
    }
}
