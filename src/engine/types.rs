//! Engine types
//!
//! Run configuration, per-context outcomes and statistics for the sync engine.

use chrono::{NaiveDate, Utc};
use std::collections::HashSet;

/// Lifecycle of one (stream, context) pair
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamStatus {
    /// Dispatched, not started
    Pending,
    /// Requests in flight
    Running,
    /// All pages of all windows written
    Completed,
    /// Abandoned after a benign permission rejection
    Skipped,
    /// Aborted the run
    Failed,
}

impl StreamStatus {
    /// Whether the pair reached a final status
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Skipped | Self::Failed)
    }
}

/// Result of running one stream for one context
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContextOutcome {
    /// Every page was fetched and written
    Completed,
    /// The account may not run this report (HTTP 400/403)
    SkippedPermission {
        /// Rejecting status
        status: u16,
    },
    /// Any other upstream failure
    Fatal {
        /// HTTP status
        status: u16,
        /// Response body
        body: String,
    },
}

impl ContextOutcome {
    /// Classify a non-2xx response for a stream
    pub fn from_status(status: u16, body: String, tolerates_permission_errors: bool) -> Self {
        if tolerates_permission_errors && crate::error::is_permission_status(status) {
            Self::SkippedPermission { status }
        } else {
            Self::Fatal { status, body }
        }
    }

    /// Status reached by the pair
    pub fn status(&self) -> StreamStatus {
        match self {
            Self::Completed => StreamStatus::Completed,
            Self::SkippedPermission { .. } => StreamStatus::Skipped,
            Self::Fatal { .. } => StreamStatus::Failed,
        }
    }
}

/// Configuration for one sync run
#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// Current date; windows stop at the day before
    pub today: NaiveDate,
    /// First day of date windows (default: 91 days before today)
    pub start_date: Option<NaiveDate>,
    /// Last day of date windows
    pub end_date: Option<NaiveDate>,
    /// Streams to emit; `None` emits all
    pub selected_streams: Option<HashSet<String>>,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            today: Utc::now().date_naive(),
            start_date: None,
            end_date: None,
            selected_streams: None,
        }
    }
}

impl SyncConfig {
    /// Create a new sync config
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Pin the current date
    #[must_use]
    pub fn with_today(mut self, today: NaiveDate) -> Self {
        self.today = today;
        self
    }

    /// Set the window start
    #[must_use]
    pub fn with_start_date(mut self, start_date: Option<NaiveDate>) -> Self {
        self.start_date = start_date;
        self
    }

    /// Set the window end
    #[must_use]
    pub fn with_end_date(mut self, end_date: Option<NaiveDate>) -> Self {
        self.end_date = end_date;
        self
    }

    /// Restrict emitted streams
    #[must_use]
    pub fn with_selected_streams<I, S>(mut self, streams: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.selected_streams = Some(streams.into_iter().map(Into::into).collect());
        self
    }

    /// Whether a stream's messages are written
    pub fn is_selected(&self, stream: &str) -> bool {
        self.selected_streams
            .as_ref()
            .map_or(true, |selected| selected.contains(stream))
    }
}

/// Statistics from a sync operation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncStats {
    /// Records written
    pub records_synced: usize,
    /// Pages fetched
    pub pages_fetched: usize,
    /// Contexts run to completion
    pub contexts_completed: usize,
    /// Contexts skipped on permission errors
    pub contexts_skipped: usize,
    /// STATE messages written
    pub state_messages: usize,
    /// Duration in milliseconds
    pub duration_ms: u64,
}

impl SyncStats {
    /// Create new stats
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_records(&mut self, count: usize) {
        self.records_synced += count;
    }

    pub fn add_page(&mut self) {
        self.pages_fetched += 1;
    }

    /// Count a finished context by its outcome
    pub fn add_outcome(&mut self, outcome: &ContextOutcome) {
        match outcome {
            ContextOutcome::Completed => self.contexts_completed += 1,
            ContextOutcome::SkippedPermission { .. } => self.contexts_skipped += 1,
            ContextOutcome::Fatal { .. } => {}
        }
    }

    pub fn add_state(&mut self) {
        self.state_messages += 1;
    }

    /// Set duration
    pub fn set_duration(&mut self, ms: u64) {
        self.duration_ms = ms;
    }
}
