//! In-memory item source
//!
//! Serves pages of a JSON data set held in memory, applying the request
//! criteria the way a paginated API would: filter text, selections, then
//! sort. With a server batch size configured it over-fetches like a remote
//! API client using [`calculate_api_vals`].

use super::ItemSource;
use crate::error::{Error, Result, ResultExt};
use crate::pagination::{calculate_api_vals, check_server_page_size, PageResult};
use crate::types::{Criteria, JsonValue};
use async_trait::async_trait;
use std::cmp::Ordering;
use std::path::Path;
use tracing::debug;

/// Item source over an in-memory list of JSON rows
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    rows: Vec<JsonValue>,
    server_items_per_page: Option<usize>,
}

impl MemorySource {
    /// Create a source over `rows`
    pub fn new(rows: Vec<JsonValue>) -> Self {
        Self {
            rows,
            server_items_per_page: None,
        }
    }

    /// Load rows from a JSON file containing an array
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                Error::FileNotFound {
                    path: path.display().to_string(),
                }
            } else {
                Error::Io(e)
            }
        })?;
        let value: JsonValue = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse data file '{}'", path.display()))?;
        match value {
            JsonValue::Array(rows) => Ok(Self::new(rows)),
            _ => Err(Error::config(format!(
                "Data file '{}' must contain a JSON array",
                path.display()
            ))),
        }
    }

    /// Return `size` items per call to populate the tracker's local cache
    #[must_use]
    pub fn with_server_items_per_page(mut self, size: usize) -> Self {
        self.server_items_per_page = Some(size);
        self
    }

    /// Number of rows before filtering
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Check if the data set is empty
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Rows matching `criteria`, in sort order
    pub fn matching(&self, criteria: &Criteria) -> Vec<&JsonValue> {
        let term = criteria.search_term().map(str::to_lowercase);

        let mut rows: Vec<&JsonValue> = self
            .rows
            .iter()
            .filter(|row| term.as_deref().map_or(true, |t| matches_text(row, t)))
            .filter(|row| matches_selections(row, criteria))
            .collect();

        if let Some(column) = &criteria.sort_column {
            rows.sort_by(|a, b| compare_values(a.get(column), b.get(column)));
            if criteria.sort_direction.is_descending() {
                rows.reverse();
            }
        }

        rows
    }
}

#[async_trait]
impl ItemSource<JsonValue> for MemorySource {
    async fn get_items(
        &self,
        page_number: usize,
        items_per_page: usize,
        criteria: &Criteria,
    ) -> Result<PageResult<JsonValue>> {
        if items_per_page == 0 {
            return Err(Error::fetch(page_number, "items_per_page must be positive"));
        }

        let rows = self.matching(criteria);
        let total = rows.len();
        if total == 0 {
            return Ok(PageResult::empty());
        }

        // Criteria may have shrunk the result set below the requested page.
        let last_page = (total - 1) / items_per_page;
        let page_number = page_number.min(last_page);

        let batch = match self.server_items_per_page {
            Some(server_size) => {
                check_server_page_size(items_per_page, server_size)?;
                let vals = calculate_api_vals(page_number, items_per_page, server_size);
                let start = vals.server_page_number * server_size;
                let end = (start + server_size).min(total);
                &rows[start + vals.offset..end]
            }
            None => {
                let start = page_number * items_per_page;
                let end = (start + items_per_page).min(total);
                &rows[start..end]
            }
        };

        debug!(
            page = page_number,
            items_per_page,
            returned = batch.len(),
            total,
            "Serving page from memory"
        );

        Ok(PageResult::new(
            batch.iter().map(|row| (*row).clone()).collect(),
            page_number,
            total,
        ))
    }
}

fn matches_text(row: &JsonValue, term: &str) -> bool {
    match row {
        JsonValue::String(s) => s.to_lowercase().contains(term),
        JsonValue::Number(n) => n.to_string().contains(term),
        JsonValue::Bool(b) => b.to_string() == term,
        JsonValue::Array(values) => values.iter().any(|v| matches_text(v, term)),
        JsonValue::Object(map) => map.values().any(|v| matches_text(v, term)),
        JsonValue::Null => false,
    }
}

fn matches_selections(row: &JsonValue, criteria: &Criteria) -> bool {
    criteria.selections.iter().all(|(property, allowed)| {
        allowed.is_empty() || row.get(property).is_some_and(|value| allowed.contains(value))
    })
}

fn compare_values(a: Option<&JsonValue>, b: Option<&JsonValue>) -> Ordering {
    match (a, b) {
        (Some(JsonValue::Number(x)), Some(JsonValue::Number(y))) => x
            .as_f64()
            .partial_cmp(&y.as_f64())
            .unwrap_or(Ordering::Equal),
        (Some(JsonValue::String(x)), Some(JsonValue::String(y))) => x.cmp(y),
        (Some(JsonValue::Bool(x)), Some(JsonValue::Bool(y))) => x.cmp(y),
        // Missing values sort first
        (None | Some(JsonValue::Null), None | Some(JsonValue::Null)) => Ordering::Equal,
        (None | Some(JsonValue::Null), _) => Ordering::Less,
        (_, None | Some(JsonValue::Null)) => Ordering::Greater,
        (Some(x), Some(y)) => x.to_string().cmp(&y.to_string()),
    }
}
