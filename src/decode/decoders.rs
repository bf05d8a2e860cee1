//! Decoder implementations

use super::types::{RecordDecoder, RecordSelector};
use crate::error::{Error, Result};
use serde_json::Value;

/// JSON envelope decoder
#[derive(Debug, Clone, Default)]
pub struct JsonDecoder {
    selector: RecordSelector,
}

impl JsonDecoder {
    /// Create a decoder for `results` envelopes
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a decoder with a specific selector
    pub fn with_selector(selector: RecordSelector) -> Self {
        Self { selector }
    }

    /// The configured selector
    pub fn selector(&self) -> &RecordSelector {
        &self.selector
    }
}

impl RecordDecoder for JsonDecoder {
    fn decode_raw(&self, body: &str) -> Result<Value> {
        // Some endpoints answer an empty search with an empty body
        if body.trim().is_empty() {
            return Ok(Value::Object(serde_json::Map::new()));
        }
        serde_json::from_str(body)
            .map_err(|e| Error::decode(format!("Failed to parse JSON: {e}")))
    }

    fn extract(&self, envelope: &Value) -> Result<Vec<Value>> {
        if !envelope.is_object() {
            return Err(Error::decode(format!(
                "expected a JSON object envelope, got {}",
                type_name(envelope)
            )));
        }

        let records = match &self.selector {
            RecordSelector::Envelope => return Ok(vec![envelope.clone()]),
            RecordSelector::Field(field) => match envelope.get(field) {
                None | Some(Value::Null) => return Ok(Vec::new()),
                Some(Value::Array(records)) => records,
                Some(other) => {
                    return Err(Error::decode(format!(
                        "field '{field}' must be an array, got {}",
                        type_name(other)
                    )))
                }
            },
        };

        records
            .iter()
            .enumerate()
            .map(|(i, record)| match record {
                Value::Object(_) => Ok(record.clone()),
                other => Err(Error::decode(format!(
                    "record {i} must be an object, got {}",
                    type_name(other)
                ))),
            })
            .collect()
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
