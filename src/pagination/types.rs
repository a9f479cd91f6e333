//! Pagination types
//!
//! Page results returned by fetch functions, the tracker's load state, and
//! the read-only snapshot handed to rendering code.

use crate::error::{Error, Result};
use crate::types::JsonValue;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// One page of data returned by a fetch function
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageResult<T> {
    /// Rows for the requested page; may hold several pages when over-fetching
    pub items: Vec<T>,
    /// 0-based page number the first item belongs to
    pub page_number: usize,
    /// Total number of items matching the request criteria
    pub total_number_of_items: usize,
}

impl<T> PageResult<T> {
    /// Create a page result
    pub fn new(items: Vec<T>, page_number: usize, total_number_of_items: usize) -> Self {
        Self {
            items,
            page_number,
            total_number_of_items,
        }
    }

    /// An empty result for an empty data set
    pub fn empty() -> Self {
        Self::new(Vec::new(), 0, 0)
    }

    /// Check that the result is consistent with the page size it was
    /// requested with.
    pub fn validate(&self, items_per_page: usize) -> Result<()> {
        let total = self.total_number_of_items;
        let first_index = self.page_number.saturating_mul(items_per_page);

        if total == 0 {
            if self.page_number != 0 {
                return Err(Error::malformed(format!(
                    "page {} reported for an empty result",
                    self.page_number
                )));
            }
            if !self.items.is_empty() {
                return Err(Error::malformed(format!(
                    "{} items returned with totalNumberOfItems = 0",
                    self.items.len()
                )));
            }
            return Ok(());
        }

        if first_index >= total {
            return Err(Error::malformed(format!(
                "page {} is out of range for {} items at {} per page",
                self.page_number, total, items_per_page
            )));
        }

        if first_index + self.items.len() > total {
            return Err(Error::malformed(format!(
                "{} items starting at index {} exceed totalNumberOfItems = {}",
                self.items.len(),
                first_index,
                total
            )));
        }

        Ok(())
    }
}

impl<T: DeserializeOwned> PageResult<T> {
    /// Decode a page result from a JSON body, naming the offending field
    /// when the body is malformed.
    pub fn from_json(value: JsonValue) -> Result<Self> {
        let JsonValue::Object(mut map) = value else {
            return Err(Error::malformed("page result is not a JSON object"));
        };

        let page_number = map
            .get("pageNumber")
            .and_then(JsonValue::as_u64)
            .ok_or_else(|| Error::missing_field("pageNumber"))?;

        let total = map
            .get("totalNumberOfItems")
            .and_then(JsonValue::as_u64)
            .ok_or_else(|| Error::missing_field("totalNumberOfItems"))?;

        let items = match map.remove("items") {
            Some(JsonValue::Array(items)) => items,
            _ => return Err(Error::missing_field("items")),
        };

        let items = items
            .into_iter()
            .map(serde_json::from_value)
            .collect::<std::result::Result<Vec<T>, _>>()?;

        Ok(Self::new(items, page_number as usize, total as usize))
    }
}

/// Whether a tracker is waiting on a fetch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoadState {
    /// No fetch outstanding
    #[default]
    Idle,
    /// At least one fetch outstanding; previous items stay visible
    Loading,
}

impl LoadState {
    /// Check if a fetch is outstanding
    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }
}

/// Read-only view of a tracker for rendering
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageSnapshot<T> {
    /// Rows of the current page
    pub items: Vec<T>,
    /// 0-based current page
    pub current_page: usize,
    /// Page size
    pub items_per_page: usize,
    /// Total number of items
    pub total_items: usize,
    /// Total number of pages
    pub total_pages: usize,
    /// 1-based index of the first visible item (0 when empty)
    pub first: usize,
    /// 1-based index of the last visible item (0 when empty)
    pub last: usize,
    /// Page numbers of the visible page window
    pub pages: Vec<usize>,
    /// Whether a fetch is outstanding
    pub state: LoadState,
}
