//! Response decoder module
//!
//! Extracts records from the JSON envelopes returned by the API:
//! `{"results": [...], "nextPageToken": "..."}` for searches and
//! `{"resourceNames": [...]}` for the account listing.

mod decoders;
mod types;

pub use decoders::JsonDecoder;
pub use types::{RecordDecoder, RecordSelector, RESULTS_FIELD};
