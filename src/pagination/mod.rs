//! Pagination module
//!
//! Page tracking for data tables, over server-side APIs or in-memory data.
//!
//! # Overview
//!
//! - [`PageTracker`] holds the current page, page size, total, and the
//!   registered fetch function, and applies fetch results
//! - [`calculate_api_vals`] converts a user-level page request into the
//!   server page and offset to use when over-fetching
//! - [`paginate`] slices in-memory data for UI-based pagination
//! - [`page_window`] computes the page links to display

mod cache;
mod local;
mod planner;
mod tracker;
mod types;
mod window;

pub use local::paginate;
pub use planner::{calculate_api_vals, check_server_page_size, ApiValues};
pub use tracker::PageTracker;
pub use types::{LoadState, PageResult, PageSnapshot};
pub use window::page_window;
