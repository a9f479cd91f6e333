//! CLI commands and argument parsing

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Table pagination toolkit CLI
#[derive(Parser, Debug)]
#[command(name = "tablepager")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Pager configuration file (YAML or JSON)
    #[arg(short = 'C', long, global = true)]
    pub config: Option<PathBuf>,

    /// Preferences file remembering the chosen page size
    #[arg(short, long, global = true)]
    pub preferences: Option<PathBuf>,

    /// Output format
    #[arg(short, long, global = true, default_value = "json")]
    pub format: OutputFormat,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Compute the server page and offset for an over-fetching request
    Plan {
        /// 0-based page requested by the user
        #[arg(long)]
        page: usize,

        /// Items per page shown to the user
        #[arg(long)]
        items_per_page: usize,

        /// Items requested from the server per call
        #[arg(long)]
        server_items_per_page: usize,
    },

    /// Show the page links around a page
    Window {
        /// 0-based current page
        #[arg(long)]
        page: usize,

        /// Total number of items
        #[arg(long)]
        total_items: usize,

        /// Items per page
        #[arg(long)]
        items_per_page: usize,

        /// Number of page links to show (defaults to the configured value)
        #[arg(long)]
        pages_to_show: Option<usize>,
    },

    /// Fetch one page from a JSON data file or a remote API
    Browse {
        /// JSON file containing an array of rows
        #[arg(long, conflicts_with = "url")]
        data: Option<PathBuf>,

        /// Paginated API endpoint (overrides the configured one)
        #[arg(long)]
        url: Option<String>,

        /// 0-based page to show
        #[arg(long, default_value = "0")]
        page: usize,

        /// Page size for this run only (the remembered size is kept)
        #[arg(long)]
        items_per_page: Option<usize>,

        /// Filter text
        #[arg(long)]
        filter: Option<String>,

        /// Column to sort by
        #[arg(long)]
        sort_column: Option<String>,

        /// Sort descending
        #[arg(long, requires = "sort_column")]
        descending: bool,

        /// Selection as `property=value` (repeatable)
        #[arg(long = "select")]
        selections: Vec<String>,

        /// Items fetched per call, for local caching
        #[arg(long)]
        server_items_per_page: Option<usize>,
    },

    /// Validate the pager configuration
    Validate,
}

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output (one message per line)
    Json,
    /// Human-readable output
    Pretty,
}
