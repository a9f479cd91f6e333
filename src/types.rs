//! Common types used throughout tablepager
//!
//! Shared type definitions for the request criteria that travel with every
//! fetch, plus a few JSON aliases.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

// ============================================================================
// Type Aliases
// ============================================================================

/// JSON value type (re-exported from serde_json)
pub type JsonValue = serde_json::Value;

/// JSON object type
pub type JsonObject = serde_json::Map<String, JsonValue>;

/// Selected filter options, keyed by item property.
///
/// Each entry lists the values of that property a row may have to be shown.
/// Comparison is structural, so two selection sets built independently with
/// the same content are equal.
pub type Selections = BTreeMap<String, Vec<JsonValue>>;

// ============================================================================
// Sort Direction
// ============================================================================

/// Direction of the active sort column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

impl SortDirection {
    /// Wire representation sent to fetch functions
    pub fn as_str(&self) -> &'static str {
        match self {
            SortDirection::Ascending => "ASCENDING",
            SortDirection::Descending => "DESCENDING",
        }
    }

    /// Build a direction from a "reverse" flag, as sortable columns report it
    pub fn from_reverse(reverse: bool) -> Self {
        if reverse {
            SortDirection::Descending
        } else {
            SortDirection::Ascending
        }
    }

    /// Check if this is a descending sort
    pub fn is_descending(&self) -> bool {
        matches!(self, SortDirection::Descending)
    }
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Criteria
// ============================================================================

/// Filter, selection and sort parameters sent along with every page request
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Criteria {
    /// Free text search entered by the user
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter_text: Option<String>,

    /// Selected filter options
    #[serde(default)]
    pub selections: Selections,

    /// Column the results are sorted on
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort_column: Option<String>,

    /// Direction of the sort
    #[serde(default)]
    pub sort_direction: SortDirection,
}

impl Criteria {
    /// Create empty criteria
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the filter text
    #[must_use]
    pub fn with_filter_text(mut self, text: impl Into<String>) -> Self {
        self.filter_text = Some(text.into());
        self
    }

    /// Set the sort column and direction
    #[must_use]
    pub fn with_sort(mut self, column: impl Into<String>, direction: SortDirection) -> Self {
        self.sort_column = Some(column.into());
        self.sort_direction = direction;
        self
    }

    /// Add a selection for a property
    #[must_use]
    pub fn with_selection(mut self, property: impl Into<String>, values: Vec<JsonValue>) -> Self {
        self.selections.insert(property.into(), values);
        self
    }

    /// Filter text with surrounding whitespace removed, `None` when blank
    pub fn search_term(&self) -> Option<&str> {
        self.filter_text
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_sort_direction_wire_format() {
        assert_eq!(SortDirection::Ascending.as_str(), "ASCENDING");
        assert_eq!(SortDirection::Descending.to_string(), "DESCENDING");
        assert_eq!(
            serde_json::to_value(SortDirection::Descending).unwrap(),
            json!("DESCENDING")
        );
        assert_eq!(SortDirection::from_reverse(true), SortDirection::Descending);
        assert_eq!(SortDirection::from_reverse(false), SortDirection::Ascending);
    }

    #[test]
    fn test_criteria_serialization() {
        let criteria = Criteria::new()
            .with_filter_text("ubuntu")
            .with_sort("name", SortDirection::Descending)
            .with_selection("os", vec![json!("linux")]);

        let value = serde_json::to_value(&criteria).unwrap();
        assert_eq!(
            value,
            json!({
                "filterText": "ubuntu",
                "selections": {"os": ["linux"]},
                "sortColumn": "name",
                "sortDirection": "DESCENDING"
            })
        );
    }

    #[test]
    fn test_selections_compare_structurally() {
        let a = Criteria::new().with_selection("os", vec![json!("linux"), json!("bsd")]);
        let b = Criteria::new().with_selection("os", vec![json!("linux"), json!("bsd")]);
        assert_eq!(a.selections, b.selections);

        let c = Criteria::new().with_selection("os", vec![json!("linux")]);
        assert_ne!(a.selections, c.selections);
    }

    #[test]
    fn test_search_term() {
        assert_eq!(Criteria::new().search_term(), None);
        assert_eq!(Criteria::new().with_filter_text("   ").search_term(), None);
        assert_eq!(
            Criteria::new().with_filter_text(" web ").search_term(),
            Some("web")
        );
    }
}
