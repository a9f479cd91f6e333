//! Remote API item source
//!
//! Pages a REST endpoint that accepts a page number and page size. When a
//! server batch size larger than the user's page size is configured, each
//! request asks the server for a whole batch and returns it from the
//! requested page on, so the tracker can serve the following pages locally.

use super::ItemSource;
use crate::config::ApiSourceConfig;
use crate::error::{Error, Result};
use crate::http::{HttpClient, HttpClientConfig, RequestConfig};
use crate::pagination::{calculate_api_vals, check_server_page_size, PageResult};
use crate::types::{Criteria, JsonValue};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use std::marker::PhantomData;
use tracing::debug;

/// Item source for a paginated REST API
pub struct ApiSource<T> {
    client: HttpClient,
    config: ApiSourceConfig,
    _items: PhantomData<fn() -> T>,
}

impl<T> std::fmt::Debug for ApiSource<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiSource")
            .field("client", &self.client)
            .field("config", &self.config)
            .finish()
    }
}

impl<T> ApiSource<T> {
    /// Create a source from its config
    pub fn new(config: ApiSourceConfig) -> Result<Self> {
        config.validate()?;

        let mut http = HttpClientConfig::builder().timeout(config.timeout());
        if let Some(rate_limit) = &config.rate_limit {
            http = http.rate_limit(rate_limit.clone());
        }
        for (key, value) in &config.headers {
            http = http.header(key, value);
        }

        Ok(Self {
            client: HttpClient::with_config(http.build())?,
            config,
            _items: PhantomData,
        })
    }

    /// The source configuration
    pub fn config(&self) -> &ApiSourceConfig {
        &self.config
    }

    /// Build the query for one user-level request.
    ///
    /// Returns the query and the offset into the server batch where the
    /// requested page starts.
    pub fn build_request(
        &self,
        page_number: usize,
        items_per_page: usize,
        criteria: &Criteria,
    ) -> Result<(RequestConfig, usize)> {
        let server_items_per_page = self.config.server_items_per_page.unwrap_or(items_per_page);
        check_server_page_size(items_per_page, server_items_per_page)?;
        let vals = calculate_api_vals(page_number, items_per_page, server_items_per_page);

        let mut request = RequestConfig::new()
            .query(
                &self.config.page_param,
                (vals.server_page_number + self.config.start_page).to_string(),
            )
            .query(
                &self.config.page_size_param,
                server_items_per_page.to_string(),
            );

        if let Some(term) = criteria.search_term() {
            request = request.query(&self.config.filter_param, term);
        }
        if let Some(column) = &criteria.sort_column {
            request = request
                .query(&self.config.sort_param, column)
                .query(&self.config.direction_param, criteria.sort_direction.as_str());
        }
        for (property, values) in &criteria.selections {
            if values.is_empty() {
                continue;
            }
            let joined = values
                .iter()
                .map(|v| match v {
                    JsonValue::String(s) => s.clone(),
                    other => other.to_string(),
                })
                .collect::<Vec<_>>()
                .join(",");
            request = request.query(property, joined);
        }

        Ok((request, vals.offset))
    }
}

#[async_trait]
impl<T> ItemSource<T> for ApiSource<T>
where
    T: DeserializeOwned + Send + 'static,
{
    async fn get_items(
        &self,
        page_number: usize,
        items_per_page: usize,
        criteria: &Criteria,
    ) -> Result<PageResult<T>> {
        let (request, offset) = self.build_request(page_number, items_per_page, criteria)?;
        let body = self.client.get_json(&self.config.url, &request).await?;

        let total = extract_path(&body, &self.config.total_path)
            .and_then(JsonValue::as_u64)
            .ok_or_else(|| Error::missing_field(&self.config.total_path))?;

        let batch = match extract_path(&body, &self.config.items_path) {
            Some(JsonValue::Array(items)) => items,
            _ => return Err(Error::missing_field(&self.config.items_path)),
        };

        debug!(
            page = page_number,
            offset,
            batch = batch.len(),
            total,
            "Received page batch from API"
        );

        let items = batch
            .iter()
            .skip(offset)
            .cloned()
            .map(serde_json::from_value)
            .collect::<std::result::Result<Vec<T>, _>>()?;

        Ok(PageResult::new(items, page_number, total as usize))
    }
}

/// Follow a dotted path (`data.items`, optional `$.` prefix) into a JSON body
fn extract_path<'a>(value: &'a JsonValue, path: &str) -> Option<&'a JsonValue> {
    let path = path.strip_prefix("$.").unwrap_or(path);

    let mut current = value;
    for part in path.split('.') {
        match current {
            JsonValue::Object(map) => {
                current = map.get(part)?;
            }
            _ => return None,
        }
    }

    Some(current)
}

#[cfg(test)]
mod api_tests {
    use super::*;
    use crate::types::SortDirection;
    use serde_json::json;

    fn source(server_items_per_page: Option<usize>) -> ApiSource<JsonValue> {
        let mut config = ApiSourceConfig::new("https://api.example.com/servers");
        config.server_items_per_page = server_items_per_page;
        config.start_page = 1;
        ApiSource::new(config).unwrap()
    }

    #[test]
    fn test_build_request_without_over_fetch() {
        let (request, offset) = source(None)
            .build_request(3, 50, &Criteria::new())
            .unwrap();
        assert_eq!(request.get("page"), Some("4"));
        assert_eq!(request.get("per_page"), Some("50"));
        assert_eq!(offset, 0);
        assert_eq!(request.get("filter"), None);
    }

    #[test]
    fn test_build_request_with_over_fetch_and_criteria() {
        let criteria = Criteria::new()
            .with_filter_text(" ubuntu ")
            .with_sort("name", SortDirection::Descending)
            .with_selection("region", vec![json!("ORD"), json!("DFW")])
            .with_selection("empty", vec![]);

        let (request, offset) = source(Some(200)).build_request(2, 50, &criteria).unwrap();
        assert_eq!(request.get("page"), Some("1"));
        assert_eq!(request.get("per_page"), Some("200"));
        assert_eq!(offset, 100);
        assert_eq!(request.get("filter"), Some("ubuntu"));
        assert_eq!(request.get("sort"), Some("name"));
        assert_eq!(request.get("direction"), Some("DESCENDING"));
        assert_eq!(request.get("region"), Some("ORD,DFW"));
        assert_eq!(request.get("empty"), None);
    }

    #[test]
    fn test_build_request_rejects_bad_batch_size() {
        assert!(source(Some(120)).build_request(0, 50, &Criteria::new()).is_err());
        assert!(source(Some(25)).build_request(0, 50, &Criteria::new()).is_err());
    }

    #[test]
    fn test_extract_path() {
        let body = json!({"data": {"servers": [1, 2], "total": 2}});
        assert_eq!(extract_path(&body, "data.total"), Some(&json!(2)));
        assert_eq!(extract_path(&body, "$.data.servers"), Some(&json!([1, 2])));
        assert_eq!(extract_path(&body, "data.missing"), None);
        assert_eq!(extract_path(&body, "data.total.deeper"), None);
    }
}
