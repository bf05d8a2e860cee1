//! State management module
//!
//! Handles replication checkpoints and resumability.
//! State is persisted between sync runs to enable incremental syncs.
//!
//! # Overview
//!
//! The state module provides:
//! - `State` - Singer bookmarks keyed by stream and context
//! - `StateManager` - File-based state persistence
//! - Monotonic checkpoint advances for resumable syncs

mod manager;
mod types;

pub use manager::StateManager;
pub use types::{compare_values, PartitionState, State, StreamState};

#[cfg(test)]
mod manager_tests;
