//! Stream schema module
//!
//! Builders for the JSON schemas announced in `SCHEMA` messages.

mod types;

pub use types::{JsonSchema, JsonType, JsonTypeOrArray, SchemaProperty};
