//! Pagination controller
//!
//! Wires criteria changes from a rendering layer to a [`PageTracker`]:
//!
//! | Change                   | Trigger     | Default window |
//! |--------------------------|-------------|----------------|
//! | sort column / direction  | `Sort`      | 100 ms         |
//! | filter text              | `Filter`    | 500 ms         |
//! | selections               | `Selection` | 1000 ms        |
//!
//! The fetch function registered through the controller shows a loading
//! indicator while a fetch is outstanding and reports failures to a
//! [`Notifier`] when an error message is configured.
//!
//! [`PageTracker`]: crate::pagination::PageTracker

mod debounce;
mod hooks;
mod paginator;

pub use debounce::Debouncer;
pub use hooks::{LoadingIndicator, NoopLoading, Notifier, TracingNotifier};
pub use paginator::{PaginationController, PaginationControllerBuilder, Trigger};
