// Allow common clippy pedantic lints that aren't critical for this codebase
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_lossless)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::unused_self)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::items_after_statements)]
#![allow(clippy::unnecessary_wraps)]
#![allow(clippy::match_same_arms)]
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::unused_async)]

//! # tablepager
//!
//! Page tracking for data tables backed by a paginated API or an in-memory
//! data set.
//!
//! ## Features
//!
//! - **Page tracking**: current page, page size, totals, clamped navigation
//! - **Local caching**: over-fetch several pages per API call and serve the
//!   following pages without a round-trip
//! - **Debounced criteria**: sort, filter and selection changes collapse into
//!   one fetch per burst
//! - **Persisted page size**: the chosen page size is shared across tables
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use tablepager::{
//!     controller::PaginationController, preferences::MemoryStore, source::MemorySource,
//!     PageTracker, TrackerOptions,
//! };
//!
//! #[tokio::main]
//! async fn main() -> tablepager::Result<()> {
//!     let tracker = PageTracker::create_instance(
//!         TrackerOptions::new().with_items_per_page(50),
//!         Arc::new(MemoryStore::new()),
//!     )?;
//!
//!     let controller = PaginationController::builder(tracker)
//!         .source(Arc::new(MemorySource::from_file("servers.json")?))
//!         .build()?;
//!     controller.start().await?;
//!
//!     controller.set_filter_text(Some("web".to_string()));
//!     controller.tracker().go_to_next_page().await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                    PaginationController                      │
//! │   set_sort_* / set_filter_text / set_selections → debounce   │
//! └──────────────────────────────┬───────────────────────────────┘
//!                                │ criteria, refresh(false)
//! ┌──────────────────────────────┴───────────────────────────────┐
//! │                        PageTracker                           │
//! │   go_to_page / refresh / set_items_per_page → new_items      │
//! └───────────┬──────────────────┬───────────────────┬───────────┘
//!             │                  │                   │
//!      ┌──────┴──────┐   ┌───────┴───────┐   ┌───────┴───────┐
//!      │ ItemSource  │   │  PageCache    │   │ Preferences   │
//!      │ Memory/API  │   │  (planner)    │   │ Memory/File   │
//!      └─────────────┘   └───────────────┘   └───────────────┘
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]

// ============================================================================
// Module declarations
// ============================================================================

/// Error types
pub mod error;

/// Criteria and common type aliases
pub mod types;

/// Configuration types and loaders
pub mod config;

/// Page tracking, request planning and UI-based pagination
pub mod pagination;

/// Fetch functions
pub mod source;

/// Persisted user preferences
pub mod preferences;

/// Debounced orchestration
pub mod controller;

/// HTTP client with rate limiting
pub mod http;

/// Command-line interface
pub mod cli;

// ============================================================================
// Re-exports
// ============================================================================

pub use config::{load_config, ControllerConfig, PagerConfig, ResolutionOrder, TrackerOptions};
pub use error::{Error, Result};
pub use pagination::{calculate_api_vals, LoadState, PageResult, PageTracker};
pub use types::*;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
