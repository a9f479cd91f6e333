//! Server request planning for local caching
//!
//! A fetch function may ask its API for more items than the user sees on one
//! page, so that the next few pages can be served from the tracker's cache.
//! The server then has to be asked for a different page number than the one
//! the user requested, and the returned batch has to be sliced.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// Server-side paging values for one user-level request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiValues {
    /// Page to request from the server at `server_items_per_page` per page
    pub server_page_number: usize,
    /// Index in the server batch where the requested page starts
    pub offset: usize,
}

/// Translate a user-level page request into a server-level one.
///
/// `server_items_per_page` must be at least `items_per_page` and a multiple of
/// it. This is not checked here; use [`check_server_page_size`] to validate a
/// configuration up front.
///
/// ```
/// use tablepager::pagination::calculate_api_vals;
///
/// let vals = calculate_api_vals(4, 50, 200);
/// assert_eq!(vals.server_page_number, 1);
/// assert_eq!(vals.offset, 0);
/// ```
pub fn calculate_api_vals(
    page_number: usize,
    items_per_page: usize,
    server_items_per_page: usize,
) -> ApiValues {
    let first_item = page_number * items_per_page;
    ApiValues {
        server_page_number: first_item / server_items_per_page,
        offset: first_item % server_items_per_page,
    }
}

/// Check that a server batch size can be used with a page size
pub fn check_server_page_size(items_per_page: usize, server_items_per_page: usize) -> Result<()> {
    if items_per_page == 0 || server_items_per_page == 0 {
        return Err(Error::invalid_value(
            "server_items_per_page",
            "page sizes must be greater than zero",
        ));
    }
    if server_items_per_page < items_per_page || server_items_per_page % items_per_page != 0 {
        return Err(Error::invalid_value(
            "server_items_per_page",
            format!(
                "{server_items_per_page} is not a multiple of the page size {items_per_page}"
            ),
        ));
    }
    Ok(())
}
