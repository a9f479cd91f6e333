//! Configuration types
//!
//! Every option bag of the pager is an explicit struct with documented
//! defaults. The structs deserialize from YAML or JSON and are validated
//! before use.

use crate::error::{Error, Result};
use crate::http::RateLimiterConfig;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::time::Duration;

/// Items per page used when neither options nor preferences provide one
pub const DEFAULT_ITEMS_PER_PAGE: usize = 200;

/// Number of page links shown around the current page
pub const DEFAULT_PAGES_TO_SHOW: usize = 5;

// ============================================================================
// Top-Level Config
// ============================================================================

/// Complete pager configuration, usually loaded from a YAML file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PagerConfig {
    /// Page tracker options
    #[serde(default)]
    pub tracker: TrackerOptions,

    /// Controller (debounce, error message) options
    #[serde(default)]
    pub controller: ControllerConfig,

    /// Remote API settings, when paging a server-side API
    #[serde(default)]
    pub api: Option<ApiSourceConfig>,
}

impl PagerConfig {
    /// Validate all sections
    pub fn validate(&self) -> Result<()> {
        self.tracker.validate()?;
        self.controller.validate()?;
        if let Some(api) = &self.api {
            api.validate()?;
        }
        Ok(())
    }
}

/// Load a pager config from a YAML or JSON file
///
/// Files ending in `.json` are parsed as JSON, everything else as YAML.
pub fn load_config(path: impl AsRef<Path>) -> Result<PagerConfig> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            Error::FileNotFound {
                path: path.display().to_string(),
            }
        } else {
            Error::config(format!(
                "Failed to read config file '{}': {}",
                path.display(),
                e
            ))
        }
    })?;

    if path.extension().is_some_and(|ext| ext == "json") {
        let config: PagerConfig = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    } else {
        load_config_from_str(&content)
    }
}

/// Load a pager config from a YAML string
pub fn load_config_from_str(yaml: &str) -> Result<PagerConfig> {
    let config: PagerConfig = serde_yaml::from_str(yaml)
        .map_err(|e| Error::config(format!("Failed to parse pager YAML: {e}")))?;
    config.validate()?;
    Ok(config)
}

// ============================================================================
// Tracker Options
// ============================================================================

/// How overlapping fetch resolutions are applied to a tracker
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolutionOrder {
    /// Whichever fetch settles last overwrites the state
    #[default]
    LastSettled,
    /// Only the most recently issued fetch may update the state
    LatestIssued,
}

/// Options recognized when creating a page tracker
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerOptions {
    /// Explicit page size; when unset the persisted preference is used
    pub items_per_page: Option<usize>,

    /// Whether page size changes on this tracker update the shared preference
    pub persist_items_per_page: bool,

    /// Page size used when nothing else provides one
    pub default_items_per_page: usize,

    /// Number of page links in the visible window
    pub pages_to_show: usize,

    /// Page sizes offered by a page size selector
    pub item_size_list: Vec<usize>,

    /// Policy for overlapping fetches
    pub resolution_order: ResolutionOrder,
}

impl Default for TrackerOptions {
    fn default() -> Self {
        Self {
            items_per_page: None,
            persist_items_per_page: true,
            default_items_per_page: DEFAULT_ITEMS_PER_PAGE,
            pages_to_show: DEFAULT_PAGES_TO_SHOW,
            item_size_list: vec![50, 200, 350, 500],
            resolution_order: ResolutionOrder::LastSettled,
        }
    }
}

impl TrackerOptions {
    /// Create default options
    pub fn new() -> Self {
        Self::default()
    }

    /// Override the page size
    #[must_use]
    pub fn with_items_per_page(mut self, items_per_page: usize) -> Self {
        self.items_per_page = Some(items_per_page);
        self
    }

    /// Opt this tracker out of updating the shared page size preference
    #[must_use]
    pub fn without_persistence(mut self) -> Self {
        self.persist_items_per_page = false;
        self
    }

    /// Set the visible page window size
    #[must_use]
    pub fn with_pages_to_show(mut self, pages: usize) -> Self {
        self.pages_to_show = pages;
        self
    }

    /// Set the overlapping fetch policy
    #[must_use]
    pub fn with_resolution_order(mut self, order: ResolutionOrder) -> Self {
        self.resolution_order = order;
        self
    }

    /// Validate the options
    pub fn validate(&self) -> Result<()> {
        if self.items_per_page == Some(0) {
            return Err(Error::invalid_value(
                "items_per_page",
                "must be greater than zero",
            ));
        }
        if self.default_items_per_page == 0 {
            return Err(Error::invalid_value(
                "default_items_per_page",
                "must be greater than zero",
            ));
        }
        if self.pages_to_show == 0 {
            return Err(Error::invalid_value(
                "pages_to_show",
                "must be greater than zero",
            ));
        }
        if self.item_size_list.is_empty() {
            return Err(Error::invalid_value("item_size_list", "cannot be empty"));
        }
        if self.item_size_list.contains(&0) {
            return Err(Error::invalid_value(
                "item_size_list",
                "page sizes must be greater than zero",
            ));
        }
        Ok(())
    }
}

// ============================================================================
// Controller Config
// ============================================================================

/// Options for the pagination controller
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ControllerConfig {
    /// Message shown through the notifier when a fetch fails
    pub error_message: Option<String>,

    /// Debounce window for sort column / direction changes
    pub sort_debounce_ms: u64,

    /// Debounce window for filter text changes
    pub filter_debounce_ms: u64,

    /// Debounce window for selection changes
    pub selection_debounce_ms: u64,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            error_message: None,
            sort_debounce_ms: 100,
            filter_debounce_ms: 500,
            selection_debounce_ms: 1000,
        }
    }
}

impl ControllerConfig {
    /// Create default config
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the error message shown on failed fetches
    #[must_use]
    pub fn with_error_message(mut self, message: impl Into<String>) -> Self {
        self.error_message = Some(message.into());
        self
    }

    /// Sort debounce window
    pub fn sort_window(&self) -> Duration {
        Duration::from_millis(self.sort_debounce_ms)
    }

    /// Filter debounce window
    pub fn filter_window(&self) -> Duration {
        Duration::from_millis(self.filter_debounce_ms)
    }

    /// Selection debounce window
    pub fn selection_window(&self) -> Duration {
        Duration::from_millis(self.selection_debounce_ms)
    }

    /// Validate the config
    pub fn validate(&self) -> Result<()> {
        if self.error_message.as_deref().is_some_and(str::is_empty) {
            return Err(Error::invalid_value(
                "error_message",
                "cannot be empty when set",
            ));
        }
        Ok(())
    }
}

// ============================================================================
// API Source Config
// ============================================================================

/// Settings for paging a remote REST API
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiSourceConfig {
    /// Endpoint returning one page of results
    pub url: String,

    /// Query parameter carrying the server page number
    #[serde(default = "default_page_param")]
    pub page_param: String,

    /// Query parameter carrying the server page size
    #[serde(default = "default_page_size_param")]
    pub page_size_param: String,

    /// Number of the first page on the server (usually 0 or 1)
    #[serde(default)]
    pub start_page: usize,

    /// Query parameter for the filter text
    #[serde(default = "default_filter_param")]
    pub filter_param: String,

    /// Query parameter for the sort column
    #[serde(default = "default_sort_param")]
    pub sort_param: String,

    /// Query parameter for the sort direction
    #[serde(default = "default_direction_param")]
    pub direction_param: String,

    /// Dotted path to the items array in the response body
    #[serde(default = "default_items_path")]
    pub items_path: String,

    /// Dotted path to the total item count in the response body
    #[serde(default = "default_total_path")]
    pub total_path: String,

    /// Items requested per server call; enables local caching when larger
    /// than the user's page size
    #[serde(default)]
    pub server_items_per_page: Option<usize>,

    /// Request timeout in milliseconds
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Optional client-side rate limit
    #[serde(default)]
    pub rate_limit: Option<RateLimiterConfig>,

    /// Extra headers sent with every request
    #[serde(default)]
    pub headers: HashMap<String, String>,
}

fn default_page_param() -> String {
    "page".to_string()
}

fn default_page_size_param() -> String {
    "per_page".to_string()
}

fn default_filter_param() -> String {
    "filter".to_string()
}

fn default_sort_param() -> String {
    "sort".to_string()
}

fn default_direction_param() -> String {
    "direction".to_string()
}

fn default_items_path() -> String {
    "items".to_string()
}

fn default_total_path() -> String {
    "totalNumberOfItems".to_string()
}

fn default_timeout_ms() -> u64 {
    30_000
}

impl ApiSourceConfig {
    /// Create a config for an endpoint with default parameter names
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            page_param: default_page_param(),
            page_size_param: default_page_size_param(),
            start_page: 0,
            filter_param: default_filter_param(),
            sort_param: default_sort_param(),
            direction_param: default_direction_param(),
            items_path: default_items_path(),
            total_path: default_total_path(),
            server_items_per_page: None,
            timeout_ms: default_timeout_ms(),
            rate_limit: None,
            headers: HashMap::new(),
        }
    }

    /// Over-fetch this many items per server call
    #[must_use]
    pub fn with_server_items_per_page(mut self, size: usize) -> Self {
        self.server_items_per_page = Some(size);
        self
    }

    /// Set the response paths for items and total count
    #[must_use]
    pub fn with_paths(mut self, items_path: impl Into<String>, total_path: impl Into<String>) -> Self {
        self.items_path = items_path.into();
        self.total_path = total_path.into();
        self
    }

    /// Request timeout
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Validate the config
    pub fn validate(&self) -> Result<()> {
        url::Url::parse(&self.url)?;
        if self.server_items_per_page == Some(0) {
            return Err(Error::invalid_value(
                "server_items_per_page",
                "must be greater than zero",
            ));
        }
        if self.items_path.is_empty() || self.total_path.is_empty() {
            return Err(Error::config("items_path and total_path cannot be empty"));
        }
        Ok(())
    }
}
