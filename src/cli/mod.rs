//! CLI module
//!
//! Command-line interface for running the tap.
//!
//! # Commands
//!
//! - `spec` - Print the accepted configuration
//! - `check` - Test credentials against the account listing
//! - `discover` - Print the stream catalog
//! - `read` - Extract data from streams as Singer messages

mod commands;
mod runner;

pub use commands::{Cli, Commands, OutputFormat};
pub use runner::{parse_stream_list, Runner};
