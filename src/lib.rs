// Allow common clippy pedantic lints that aren't critical for this codebase
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_lossless)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::ref_option)]
#![allow(clippy::unused_self)]
#![allow(clippy::struct_excessive_bools)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::items_after_statements)]
#![allow(clippy::unnecessary_wraps)]
#![allow(clippy::match_same_arms)]
#![allow(clippy::match_wildcard_for_single_variants)]
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::unused_async)]

//! # tap-googleads
//!
//! Incremental extractor for the Google Ads REST API. Emits Singer
//! `SCHEMA`, `RECORD` and `STATE` messages as JSON lines.
//!
//! ## Features
//!
//! - **Account discovery**: accessible customers, then their client hierarchy
//! - **Report streams**: campaigns, ad groups and performance reports per account
//! - **Incremental Sync**: per-day windows resumed from stored checkpoints
//! - **Soft failures**: accounts without access to a report are skipped, not fatal
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use tap_googleads::{config::TapConfig, engine::{SyncConfig, SyncEngine}};
//!
//! let config = TapConfig::from_file("config.json")?;
//! let mut engine = SyncEngine::new(registry, executor, state, Box::new(JsonLinesWriter::stdout()))
//!     .with_config(SyncConfig::new().with_start_date(config.start_date()?));
//! engine.run().await?;
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                        SyncEngine                               │
//! │  roots → contexts → windows → pages → records → child contexts  │
//! └─────────────────────────────────────────────────────────────────┘
//!                                │
//! ┌──────────┬───────────┬───────┴───────┬───────────┬─────────────┐
//! │   Auth   │   HTTP    │   Paginate    │ Partition │   Output    │
//! ├──────────┼───────────┼───────────────┼───────────┼─────────────┤
//! │ OAuth2   │ Executor  │ Page token    │ Fan-out   │ Singer JSON │
//! │ Proxy    │ Rate Limit│               │ Day window│ State file  │
//! └──────────┴───────────┴───────────────┴───────────┴─────────────┘
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]
#![allow(missing_docs)]

// ============================================================================
// Module declarations
// ============================================================================

/// Error types for the tap
pub mod error;

/// Common types and type aliases
pub mod types;

/// Bearer token acquisition and caching
pub mod auth;

/// Transport, rate limiting and request execution
pub mod http;

/// Page-token pagination
pub mod pagination;

/// Stream contexts, fan-out and date windows
pub mod partition;

/// Response envelope decoding
pub mod decode;

/// Replication checkpoints
pub mod state;

/// Singer messages and sinks
pub mod output;

/// Main execution engine
pub mod engine;

/// Tap configuration and catalog
pub mod config;

/// Stream definitions and registry
pub mod streams;

/// Template interpolation
pub mod template;

/// Command-line interface
pub mod cli;

/// JSON schema types
pub mod schema;

// ============================================================================
// Re-exports
// ============================================================================

pub use error::{Error, Result};
pub use types::*;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
