//! Partition routing module
//!
//! Supports: parent-record fan-out, per-day date windows
//!
//! # Overview
//!
//! A partition (stream context) scopes one invocation of a stream's query:
//! - customer contexts are derived from parent-stream records
//! - date-partitioned streams split each customer context into single days
//! - each context is dispatched to a child stream at most once

mod fanout;
mod types;
pub mod window;

pub use fanout::{
    customer_id_from_resource_name, AccountFilter, Admission, ChildContextRule, Dispatch,
    FanOutEngine,
};
pub use types::{ContextKey, SeenContextSet, StreamContext, CUSTOMER_ID, DATE};
pub use window::{format_date, parse_date, quote_date, DateWindowPlanner, DEFAULT_LOOKBACK_DAYS};
