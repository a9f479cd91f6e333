//! CLI module
//!
//! Command-line interface for exercising the pager.
//!
//! # Commands
//!
//! - `plan` - Server page and offset for an over-fetching request
//! - `window` - Page links around a page
//! - `browse` - Fetch a page from a JSON file or a remote API
//! - `validate` - Check a pager configuration file

mod commands;
mod runner;

pub use commands::{Cli, Commands, OutputFormat};
pub use runner::{parse_selection, Runner};
