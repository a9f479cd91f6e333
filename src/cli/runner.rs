//! CLI runner - executes commands

use crate::cli::commands::{Cli, Commands, OutputFormat};
use crate::config::{load_config, ApiSourceConfig, PagerConfig};
use crate::controller::{PaginationController, TracingNotifier};
use crate::error::{Error, Result};
use crate::pagination::{calculate_api_vals, check_server_page_size, page_window, PageTracker};
use crate::preferences::{FileStore, MemoryStore, PreferenceStore};
use crate::source::{ApiSource, ItemSource, MemorySource};
use crate::types::{Criteria, JsonValue, Selections, SortDirection};
use serde_json::{json, Value};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};

/// Arguments of the `browse` command
struct BrowseRequest<'a> {
    data: Option<&'a Path>,
    url: Option<&'a str>,
    page: usize,
    items_per_page: Option<usize>,
    criteria: Criteria,
    server_items_per_page: Option<usize>,
}

/// CLI runner
pub struct Runner {
    cli: Cli,
}

impl Runner {
    /// Create a new runner
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Run the CLI command
    pub async fn run(&self) -> Result<()> {
        match &self.cli.command {
            Commands::Plan {
                page,
                items_per_page,
                server_items_per_page,
            } => self.plan(*page, *items_per_page, *server_items_per_page),
            Commands::Window {
                page,
                total_items,
                items_per_page,
                pages_to_show,
            } => self.window(*page, *total_items, *items_per_page, *pages_to_show),
            Commands::Browse {
                data,
                url,
                page,
                items_per_page,
                filter,
                sort_column,
                descending,
                selections,
                server_items_per_page,
            } => {
                let criteria = build_criteria(
                    filter.as_deref(),
                    sort_column.as_deref(),
                    *descending,
                    selections,
                )?;
                self.browse(BrowseRequest {
                    data: data.as_deref(),
                    url: url.as_deref(),
                    page: *page,
                    items_per_page: *items_per_page,
                    criteria,
                    server_items_per_page: *server_items_per_page,
                })
                .await
            }
            Commands::Validate => self.validate(),
        }
    }

    /// Load the pager config, or defaults when no file was given
    fn load_config(&self) -> Result<PagerConfig> {
        match &self.cli.config {
            Some(path) => {
                debug!(path = %path.display(), "Loading pager config");
                load_config(path)
            }
            None => Ok(PagerConfig::default()),
        }
    }

    /// Open the preference store
    fn preferences(&self) -> Result<Arc<dyn PreferenceStore>> {
        match &self.cli.preferences {
            Some(path) => Ok(Arc::new(FileStore::open(path)?)),
            None => Ok(Arc::new(MemoryStore::new())),
        }
    }

    /// Show the server request for a page
    fn plan(&self, page: usize, items_per_page: usize, server_items_per_page: usize) -> Result<()> {
        check_server_page_size(items_per_page, server_items_per_page)?;
        let vals = calculate_api_vals(page, items_per_page, server_items_per_page);

        self.output_message(&json!({
            "type": "PLAN",
            "page": page,
            "itemsPerPage": items_per_page,
            "serverItemsPerPage": server_items_per_page,
            "serverPageNumber": vals.server_page_number,
            "offset": vals.offset
        }));

        Ok(())
    }

    /// Show the page links around a page
    fn window(
        &self,
        page: usize,
        total_items: usize,
        items_per_page: usize,
        pages_to_show: Option<usize>,
    ) -> Result<()> {
        if items_per_page == 0 {
            return Err(Error::invalid_value(
                "items_per_page",
                "must be greater than zero",
            ));
        }

        let pages_to_show = match pages_to_show {
            Some(n) => n,
            None => self.load_config()?.tracker.pages_to_show,
        };
        let total_pages = total_items.div_ceil(items_per_page);
        let pages = page_window(page, total_pages, pages_to_show);

        self.output_message(&json!({
            "type": "WINDOW",
            "currentPage": page.min(total_pages.saturating_sub(1)),
            "totalPages": total_pages,
            "pages": pages
        }));

        Ok(())
    }

    /// Fetch and print one page
    async fn browse(&self, request: BrowseRequest<'_>) -> Result<()> {
        let config = self.load_config()?;
        let source = build_source(
            &config,
            request.data,
            request.url,
            request.server_items_per_page,
        )?;

        // A one-off page size overrides the remembered one without replacing it
        let mut options = config.tracker.clone();
        if let Some(n) = request.items_per_page {
            options = options.with_items_per_page(n);
        }
        let tracker = PageTracker::create_instance(options, self.preferences()?)?;
        tracker.set_criteria(request.criteria);

        let controller = PaginationController::builder(tracker.clone())
            .source(source)
            .config(config.controller.clone())
            .notifier(Arc::new(TracingNotifier))
            .build()?;
        controller.start().await?;

        if request.page > 0 {
            tracker.go_to_page(request.page).await?;
        }

        let snapshot = tracker.snapshot();
        info!(
            page = snapshot.current_page,
            total_pages = snapshot.total_pages,
            total_items = snapshot.total_items,
            "Fetched page"
        );

        self.output_message(&json!({
            "type": "PAGE",
            "page": serde_json::to_value(&snapshot)?
        }));

        Ok(())
    }

    /// Validate the pager config
    fn validate(&self) -> Result<()> {
        let path = self
            .cli
            .config
            .as_ref()
            .ok_or_else(|| Error::config("Config file not specified (use -C flag)"))?;
        let config = load_config(path)?;

        self.output_message(&json!({
            "type": "LOG",
            "log": {
                "level": "INFO",
                "message": format!(
                    "Pager config '{}' is valid (items per page: {}, api: {})",
                    path.display(),
                    config
                        .tracker
                        .items_per_page
                        .unwrap_or(config.tracker.default_items_per_page),
                    config.api.as_ref().map_or("none", |api| api.url.as_str())
                )
            }
        }));

        Ok(())
    }

    /// Output a message
    fn output_message(&self, msg: &Value) {
        match self.cli.format {
            OutputFormat::Json => {
                println!("{}", serde_json::to_string(msg).unwrap_or_default());
            }
            OutputFormat::Pretty => {
                println!("{}", serde_json::to_string_pretty(msg).unwrap_or_default());
            }
        }
    }
}

/// Pick the fetch function for `browse`
fn build_source(
    config: &PagerConfig,
    data: Option<&Path>,
    url: Option<&str>,
    server_items_per_page: Option<usize>,
) -> Result<Arc<dyn ItemSource<JsonValue>>> {
    if let Some(path) = data {
        let mut source = MemorySource::from_file(path)?;
        if let Some(size) = server_items_per_page {
            source = source.with_server_items_per_page(size);
        }
        debug!(rows = source.len(), "Browsing in-memory data");
        return Ok(Arc::new(source));
    }

    let mut api = match (url, config.api.clone()) {
        (Some(url), Some(mut api)) => {
            api.url = url.to_string();
            api
        }
        (Some(url), None) => ApiSourceConfig::new(url),
        (None, Some(api)) => api,
        (None, None) => {
            return Err(Error::config(
                "No data source: pass --data or --url, or configure `api`",
            ))
        }
    };
    if let Some(size) = server_items_per_page {
        api.server_items_per_page = Some(size);
    }
    debug!(url = %api.url, "Browsing remote API");
    Ok(Arc::new(ApiSource::<JsonValue>::new(api)?))
}

/// Build request criteria from command-line flags
fn build_criteria(
    filter: Option<&str>,
    sort_column: Option<&str>,
    descending: bool,
    selections: &[String],
) -> Result<Criteria> {
    let mut criteria = Criteria::new();
    if let Some(text) = filter {
        criteria = criteria.with_filter_text(text);
    }
    if let Some(column) = sort_column {
        criteria = criteria.with_sort(column, SortDirection::from_reverse(descending));
    }

    let mut parsed = Selections::new();
    for raw in selections {
        let (property, value) = parse_selection(raw)?;
        parsed.entry(property).or_default().push(value);
    }
    criteria.selections = parsed;

    Ok(criteria)
}

/// Parse a `property=value` selection.
///
/// Values that parse as JSON (numbers, booleans) keep their type; anything
/// else is a string.
pub fn parse_selection(raw: &str) -> Result<(String, JsonValue)> {
    let (property, value) = raw.split_once('=').ok_or_else(|| {
        Error::invalid_value("select", format!("expected property=value, got '{raw}'"))
    })?;

    let property = property.trim();
    if property.is_empty() {
        return Err(Error::invalid_value(
            "select",
            format!("missing property name in '{raw}'"),
        ));
    }

    let value = value.trim();
    let value = serde_json::from_str(value).unwrap_or_else(|_| JsonValue::String(value.to_string()));
    Ok((property.to_string(), value))
}
