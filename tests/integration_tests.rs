//! Integration tests using mock HTTP server
//!
//! Tests the full end-to-end flow: tracker navigation → API requests with
//! over-fetching → locally cached pages

use serde_json::{json, Value};
use std::sync::{Arc, Mutex};
use tablepager::config::{load_config_from_str, ApiSourceConfig};
use tablepager::controller::{Notifier, PaginationController};
use tablepager::preferences::{FileStore, MemoryStore};
use tablepager::source::{ApiSource, ItemSource, MemorySource};
use tablepager::{ControllerConfig, Criteria, Error, PageTracker, SortDirection, TrackerOptions};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ============================================================================
// Helpers
// ============================================================================

fn rows(range: std::ops::Range<u64>) -> Vec<Value> {
    range.map(|id| json!({"id": id, "name": format!("server-{id}")})).collect()
}

fn ids(items: &[Value]) -> Vec<u64> {
    items.iter().filter_map(|item| item["id"].as_u64()).collect()
}

/// Mount one server page of a 250-item data set served 100 at a time
async fn mount_batch(server: &MockServer, server_page: u64, expected_calls: u64) {
    let start = server_page * 100;
    let end = (start + 100).min(250);
    Mock::given(method("GET"))
        .and(path("/servers"))
        .and(query_param("page", server_page.to_string()))
        .and(query_param("per_page", "100"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": rows(start..end),
            "totalNumberOfItems": 250
        })))
        .expect(expected_calls)
        .mount(server)
        .await;
}

fn api_tracker(server: &MockServer) -> PageTracker<Value> {
    let config =
        ApiSourceConfig::new(format!("{}/servers", server.uri())).with_server_items_per_page(100);
    let source: ApiSource<Value> = ApiSource::new(config).unwrap();

    let tracker = PageTracker::create_instance(
        TrackerOptions::new().with_items_per_page(50),
        Arc::new(MemoryStore::new()),
    )
    .unwrap();
    tracker.update_items_fn(Arc::new(source));
    tracker
}

#[derive(Default)]
struct RecordingNotifier {
    messages: Mutex<Vec<String>>,
}

impl Notifier for RecordingNotifier {
    fn error(&self, message: &str) {
        self.messages.lock().unwrap().push(message.to_string());
    }
}

// ============================================================================
// Over-Fetch Integration Tests
// ============================================================================

#[tokio::test]
async fn test_over_fetched_pages_skip_round_trips() {
    let server = MockServer::start().await;
    mount_batch(&server, 0, 1).await;
    mount_batch(&server, 1, 1).await;
    mount_batch(&server, 2, 1).await;

    let tracker = api_tracker(&server);

    tracker.refresh(false).await.unwrap();
    assert_eq!(tracker.total_items(), 250);
    assert_eq!(tracker.total_pages(), 5);
    assert_eq!(ids(&tracker.items()), (0..50).collect::<Vec<_>>());

    // Served from the first batch
    tracker.go_to_page(1).await.unwrap();
    assert_eq!(ids(&tracker.items()), (50..100).collect::<Vec<_>>());

    // Second batch
    tracker.go_to_page(2).await.unwrap();
    assert_eq!(ids(&tracker.items()), (100..150).collect::<Vec<_>>());
    tracker.go_to_next_page().await.unwrap();
    assert_eq!(ids(&tracker.items()), (150..200).collect::<Vec<_>>());

    // Third batch is short and ends the data set
    tracker.go_to_last_page().await.unwrap();
    assert_eq!(tracker.current_page(), 4);
    assert_eq!(ids(&tracker.items()), (200..250).collect::<Vec<_>>());
    assert_eq!(tracker.first(), 201);
    assert_eq!(tracker.last(), 250);
}

#[tokio::test]
async fn test_jump_into_middle_of_batch_uses_offset() {
    let server = MockServer::start().await;
    mount_batch(&server, 1, 1).await;

    let tracker = api_tracker(&server);
    // Seed the total so page 3 is in range
    tracker
        .new_items(async { Ok::<_, Error>(tablepager::PageResult::new(rows(0..50), 0, 250)) })
        .await
        .unwrap();

    tracker.go_to_page(3).await.unwrap();
    assert_eq!(tracker.current_page(), 3);
    assert_eq!(ids(&tracker.items()), (150..200).collect::<Vec<_>>());
}

#[tokio::test]
async fn test_criteria_sent_as_query_parameters() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/servers"))
        .and(query_param("filter", "web"))
        .and(query_param("sort", "name"))
        .and(query_param("direction", "DESCENDING"))
        .and(query_param("region", "ORD,DFW"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": rows(0..3),
            "totalNumberOfItems": 3
        })))
        .expect(1)
        .mount(&server)
        .await;

    let tracker = api_tracker(&server);
    tracker.set_criteria(
        Criteria::new()
            .with_filter_text("web")
            .with_sort("name", SortDirection::Descending)
            .with_selection("region", vec![json!("ORD"), json!("DFW")]),
    );
    tracker.refresh(false).await.unwrap();
    assert_eq!(tracker.total_items(), 3);
}

#[tokio::test]
async fn test_custom_response_paths() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v2/servers"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": {"servers": rows(0..10)},
            "meta": {"count": 10}
        })))
        .mount(&server)
        .await;

    let config = ApiSourceConfig::new(format!("{}/v2/servers", server.uri()))
        .with_paths("data.servers", "meta.count");
    let source: ApiSource<Value> = ApiSource::new(config).unwrap();

    let page = source.get_items(0, 25, &Criteria::new()).await.unwrap();
    assert_eq!(page.total_number_of_items, 10);
    assert_eq!(page.items.len(), 10);
}

#[tokio::test]
async fn test_missing_total_is_rejected() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/servers"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": rows(0..100)
        })))
        .mount(&server)
        .await;

    let tracker = api_tracker(&server);
    let err = tracker.refresh(false).await.unwrap_err();

    match err {
        Error::MissingPageField { field } => assert_eq!(field, "totalNumberOfItems"),
        other => panic!("Expected MissingPageField, got {other:?}"),
    }
    assert_eq!(tracker.total_items(), 0);
    assert!(!tracker.is_loading());
}

// ============================================================================
// Controller Integration Tests
// ============================================================================

#[tokio::test]
async fn test_server_error_notifies_and_keeps_page() {
    let server = MockServer::start().await;
    mount_batch(&server, 0, 1).await;
    Mock::given(method("GET"))
        .and(path("/servers"))
        .and(query_param("page", "1"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;

    let tracker = api_tracker(&server);
    let notifier = Arc::new(RecordingNotifier::default());
    let source: ApiSource<Value> = ApiSource::new(
        ApiSourceConfig::new(format!("{}/servers", server.uri())).with_server_items_per_page(100),
    )
    .unwrap();
    let controller = PaginationController::builder(tracker)
        .source(Arc::new(source))
        .config(ControllerConfig::new().with_error_message("Error loading servers"))
        .notifier(notifier.clone())
        .build()
        .unwrap();

    controller.start().await.unwrap();
    controller.tracker().go_to_page(1).await.unwrap();

    let err = controller.tracker().go_to_page(2).await.unwrap_err();
    assert!(matches!(err, Error::HttpStatus { status: 500, .. }));
    assert_eq!(controller.tracker().current_page(), 1);
    assert_eq!(
        *notifier.messages.lock().unwrap(),
        vec!["Error loading servers".to_string()]
    );
}

#[tokio::test]
async fn test_config_file_drives_api_source() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/servers"))
        .and(query_param("p", "1"))
        .and(query_param("limit", "20"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": rows(0..20),
            "count": 45
        })))
        .expect(1)
        .mount(&server)
        .await;

    let yaml = format!(
        r"
tracker:
  items_per_page: 20
  persist_items_per_page: false
controller:
  error_message: Unable to load servers
api:
  url: {}/servers
  page_param: p
  page_size_param: limit
  start_page: 1
  items_path: results
  total_path: count
",
        server.uri()
    );
    let config = load_config_from_str(&yaml).unwrap();
    let api = config.api.clone().unwrap();

    let tracker =
        PageTracker::create_instance(config.tracker, Arc::new(MemoryStore::new())).unwrap();
    let source: ApiSource<Value> = ApiSource::new(api).unwrap();
    let controller = PaginationController::builder(tracker)
        .source(Arc::new(source))
        .config(config.controller)
        .build()
        .unwrap();
    controller.start().await.unwrap();

    let snapshot = controller.tracker().snapshot();
    assert_eq!(snapshot.total_items, 45);
    assert_eq!(snapshot.total_pages, 3);
    assert_eq!(snapshot.pages, vec![0, 1, 2]);
}

// ============================================================================
// Preference Integration Tests
// ============================================================================

#[tokio::test]
async fn test_page_size_survives_restart() {
    let dir = tempfile::tempdir().unwrap();
    let prefs_path = dir.path().join("prefs.json");
    let data = MemorySource::new(rows(0..500));

    {
        let prefs = Arc::new(FileStore::open(&prefs_path).unwrap());
        let tracker: PageTracker<Value> =
            PageTracker::create_instance(TrackerOptions::default(), prefs).unwrap();
        assert_eq!(tracker.items_per_page(), 200);
        tracker.update_items_fn(Arc::new(data.clone()));
        tracker.set_items_per_page(50).await.unwrap();
        assert_eq!(tracker.items().len(), 50);
    }

    let prefs = Arc::new(FileStore::open(&prefs_path).unwrap());
    let tracker: PageTracker<Value> =
        PageTracker::create_instance(TrackerOptions::default(), prefs).unwrap();
    assert_eq!(tracker.items_per_page(), 50);

    tracker.update_items_fn(Arc::new(data));
    tracker.refresh(false).await.unwrap();
    assert_eq!(tracker.total_pages(), 10);
}
