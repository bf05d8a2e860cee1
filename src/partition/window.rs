//! Date window planning
//!
//! Turns a start date, an optional end date and the last checkpoint into the
//! list of single days to query. The metrics backend does not guarantee
//! complete data for the current day, so no window ever reaches today.

use crate::error::{Error, Result};
use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime};

/// Days looked back when no start date is configured
pub const DEFAULT_LOOKBACK_DAYS: i64 = 91;

/// Date format used in queries and checkpoints
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Plans per-day query windows for date-partitioned streams
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateWindowPlanner {
    /// First day to query when there is no checkpoint
    start_date: NaiveDate,
    /// Last day to query (capped at yesterday)
    end_date: Option<NaiveDate>,
}

impl DateWindowPlanner {
    /// Create a planner with explicit bounds
    pub fn new(start_date: NaiveDate, end_date: Option<NaiveDate>) -> Self {
        Self {
            start_date,
            end_date,
        }
    }

    /// Create a planner from optional configured bounds
    ///
    /// Without a start date the window opens `DEFAULT_LOOKBACK_DAYS` before today.
    pub fn from_config(
        start_date: Option<NaiveDate>,
        end_date: Option<NaiveDate>,
        today: NaiveDate,
    ) -> Self {
        let start_date =
            start_date.unwrap_or_else(|| today - Duration::days(DEFAULT_LOOKBACK_DAYS));
        Self::new(start_date, end_date)
    }

    /// First day queried without a checkpoint
    pub fn start_date(&self) -> NaiveDate {
        self.start_date
    }

    /// Compute the days to query, oldest first
    ///
    /// - no checkpoint: resume at the start date
    /// - checkpoint on or after today: resume at yesterday
    /// - resume point at or past the last queryable day: exactly that day
    ///
    /// The last queryable day is the earlier of yesterday and the end date. An
    /// end date that lies before the checkpoint therefore yields `[end_date]`
    /// on every run: the plan is never empty, so a bounded backfill that has
    /// already finished keeps re-reading its final day until the end date is
    /// removed or moved forward.
    pub fn plan(&self, checkpoint: Option<&str>, today: NaiveDate) -> Result<Vec<NaiveDate>> {
        let yesterday = today - Duration::days(1);
        let last = match self.end_date {
            Some(end) if end < yesterday => end,
            _ => yesterday,
        };

        let resume = match checkpoint {
            Some(value) => {
                let date = parse_date(value)
                    .map_err(|e| Error::state(format!("invalid checkpoint '{value}': {e}")))?;
                if date >= today {
                    yesterday
                } else {
                    date
                }
            }
            None => self.start_date,
        };

        if resume >= last {
            return Ok(vec![last]);
        }

        Ok(resume
            .iter_days()
            .take_while(|day| *day <= last)
            .collect())
    }
}

/// Parse a date, discarding any time component
///
/// Accepts `YYYY-MM-DD`, `YYYY-MM-DDTHH:MM:SS[...]`, RFC 3339 and GAQL-quoted
/// `'YYYY-MM-DD'`.
pub fn parse_date(value: &str) -> Result<NaiveDate> {
    let trimmed = value.trim().trim_matches('\'');

    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(dt.date_naive());
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%dT%H:%M:%S%.f") {
        return Ok(dt.date());
    }

    let date_part = trimmed.split(['T', ' ']).next().unwrap_or(trimmed);
    NaiveDate::parse_from_str(date_part, DATE_FORMAT)
        .map_err(|e| Error::decode(format!("cannot parse date '{value}': {e}")))
}

/// Format a date as `YYYY-MM-DD`
pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// Format a date as a GAQL literal: `'YYYY-MM-DD'`
pub fn quote_date(date: NaiveDate) -> String {
    format!("'{}'", format_date(date))
}
