//! Integration tests for the search endpoint
//!
//! These tests drive the full router with an in-memory backend that records
//! every query it receives.

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tower::ServiceExt;
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::{layer::Context, layer::SubscriberExt, Layer};
use trawl_core::{
    Filter, Hit, Result as TrawlResult, SearchBackend, SearchQuery, SearchResponse, TrawlError,
};
use trawl_infra::TemplateRenderer;
use trawl_serve::{create_app, AppState};

/// Backend returning a fixed response and recording queries
struct RecordingBackend {
    response: std::result::Result<SearchResponse, String>,
    calls: Mutex<Vec<SearchQuery>>,
}

impl RecordingBackend {
    fn ok(hits: Vec<Value>, total: u64) -> Arc<Self> {
        Arc::new(Self {
            response: Ok(SearchResponse {
                total,
                hits: hits
                    .into_iter()
                    .enumerate()
                    .map(|(i, source)| {
                        Hit::from_value(json!({
                            "_index": "files",
                            "_id": format!("doc-{}", i),
                            "_score": 1.0,
                            "_source": source
                        }))
                    })
                    .collect(),
                took: Some(2),
            }),
            calls: Mutex::new(Vec::new()),
        })
    }

    fn failing(message: &str) -> Arc<Self> {
        Arc::new(Self {
            response: Err(message.to_string()),
            calls: Mutex::new(Vec::new()),
        })
    }

    fn calls(&self) -> Vec<SearchQuery> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl SearchBackend for RecordingBackend {
    async fn search(&self, query: &SearchQuery) -> TrawlResult<SearchResponse> {
        self.calls.lock().unwrap().push(query.clone());
        self.response.clone().map_err(TrawlError::backend)
    }
}

/// Backend whose search panics
struct PanickingBackend;

#[async_trait]
impl SearchBackend for PanickingBackend {
    async fn search(&self, _query: &SearchQuery) -> TrawlResult<SearchResponse> {
        panic!("backend client corrupted");
    }
}

/// Counts ERROR-level events
#[derive(Clone, Default)]
struct ErrorCounter(Arc<AtomicUsize>);

impl<S: Subscriber> Layer<S> for ErrorCounter {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        if *event.metadata().level() == Level::ERROR {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }
}

/// Route ERROR events on this thread into a fresh counter
fn count_errors() -> (ErrorCounter, tracing::subscriber::DefaultGuard) {
    let counter = ErrorCounter::default();
    let subscriber = tracing_subscriber::registry().with(counter.clone());
    (counter, tracing::subscriber::set_default(subscriber))
}

impl ErrorCounter {
    fn count(&self) -> usize {
        self.0.load(Ordering::SeqCst)
    }
}

fn router_with(backend: Arc<RecordingBackend>, templates: TemplateRenderer) -> Router {
    let state = AppState::new(backend, Arc::new(templates), 10);
    create_app(state, &Default::default())
}

fn create_test_router(backend: Arc<RecordingBackend>) -> Router {
    router_with(backend, TemplateRenderer::builtin().unwrap())
}

/// Helper to make GET request
async fn make_get_request(router: Router, uri: &str) -> (StatusCode, Option<String>, String) {
    let response = router
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();

    let status = response.status();
    let content_type = response
        .headers()
        .get(header::CONTENT_TYPE)
        .map(|v| v.to_str().unwrap().to_string());
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body_str = String::from_utf8(body.to_vec()).unwrap();

    (status, content_type, body_str)
}

fn three_hits() -> Vec<Value> {
    vec![
        json!({ "filename": "report-2019.pdf", "size": 1000, "servers": [] }),
        json!({ "filename": "report-2020.pdf", "size": 2048, "servers": [] }),
        json!({ "filename": "report-2021.pdf", "size": 999, "extra": { "lang": "en" } }),
    ]
}

#[tokio::test]
async fn test_json_scenario() {
    let backend = RecordingBackend::ok(three_hits(), 50);
    let router = create_test_router(backend.clone());

    let (status, content_type, body) =
        make_get_request(router, "/s?q=report&p=2&f=type:pdf&format=json").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(content_type.as_deref(), Some("application/json"));

    let value: Value = serde_json::from_str(&body).unwrap();
    let hits = value.as_array().unwrap();
    assert_eq!(hits.len(), 3);
    assert_eq!(hits[0]["_source"]["filename"], "report-2019.pdf");
    assert_eq!(hits[2]["_source"]["extra"]["lang"], "en");

    let calls = backend.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].query, "report");
    assert_eq!(calls[0].filter, Filter::decode(&["type:pdf"]));
    assert_eq!(calls[0].per_page, 10);
    assert_eq!(calls[0].page, 2);
}

#[tokio::test]
async fn test_json_skips_payload_decoding() {
    // These payloads cannot be decoded into results, which only matters for HTML
    let backend = RecordingBackend::ok(vec![json!({ "title": "no filename" }), json!(42)], 2);
    let router = create_test_router(backend.clone());

    let (status, _, body) = make_get_request(router.clone(), "/s?q=x&format=json").await;
    assert_eq!(status, StatusCode::OK);
    let value: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(value[1]["_source"], 42);

    let (status, _, _) = make_get_request(router, "/s?q=x&format=xml").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn test_json_output_is_deterministic() {
    let backend = RecordingBackend::ok(three_hits(), 50);
    let router = create_test_router(backend);

    let uri = "/s?q=report&f=type:pdf&format=json";
    let (_, _, first) = make_get_request(router.clone(), uri).await;
    let (_, _, second) = make_get_request(router, uri).await;
    assert_eq!(first, second);
}

#[tokio::test]
async fn test_html_scenario() {
    let backend = RecordingBackend::ok(
        vec![json!({
            "filename": "a.txt",
            "size": 2048,
            "servers": [{ "url": "ftp://mirror.example.org", "path": "/pub/a.txt" }]
        })],
        50,
    );
    let router = create_test_router(backend.clone());

    let (status, content_type, body) =
        make_get_request(router, "/s?q=report&p=2&f=type:pdf").await;

    assert_eq!(status, StatusCode::OK);
    assert!(content_type.unwrap().starts_with("text/html"));
    assert!(body.contains("a.txt"));
    assert!(body.contains("2.0 kB"));
    assert!(body.contains("page 3 of 5"));
    assert!(body.contains("start=\"21\""));
    assert!(body.contains("ftp://mirror.example.org/pub/a.txt"));
    assert!(body.contains("value=\"type:pdf\""));

    assert_eq!(backend.calls()[0].page, 2);
}

#[tokio::test]
async fn test_html_context_exposes_page_window() {
    let mut templates = TemplateRenderer::builtin().unwrap();
    templates
        .add_template(
            "results",
            "{{page}}|{{frompage}}|{{maxpages}}|{{{prevpage}}}|{{{nextpage}}}|{{#each results}}{{filename}}:{{size}}:{{human_size}}{{/each}}|{{response.total}}",
        )
        .unwrap();

    let backend = RecordingBackend::ok(vec![json!({ "filename": "a.txt", "size": 2048 })], 50);
    let router = router_with(backend, templates);

    let (status, _, body) = make_get_request(router, "/s?q=report&p=2&f=type:pdf").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        "2|20|5|/s?q=report&p=1&f=type%3Apdf|/s?q=report&p=3&f=type%3Apdf|a.txt:2048:2.0 kB|50"
    );
}

#[tokio::test]
async fn test_malformed_filter_is_dropped() {
    let backend = RecordingBackend::ok(three_hits(), 3);
    let router = create_test_router(backend.clone());

    let (status, _, _) =
        make_get_request(router, "/s?q=x&f=type:pdf&f=garbage&f=lang:en").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        backend.calls()[0].filter,
        Filter::decode(&["lang:en", "type:pdf"])
    );
}

#[tokio::test]
async fn test_missing_or_bad_page_is_zero() {
    for uri in ["/s", "/s?p=", "/s?p=abc", "/s?p=-3"] {
        let backend = RecordingBackend::ok(vec![], 0);
        let router = create_test_router(backend.clone());

        let (status, _, _) = make_get_request(router, uri).await;
        assert_eq!(status, StatusCode::OK, "{}", uri);
        assert_eq!(backend.calls()[0].page, 0, "{}", uri);
        assert_eq!(backend.calls()[0].query, "", "{}", uri);
    }
}

#[tokio::test]
async fn test_backend_failure_returns_500_and_logs_once() {
    let (counter, _guard) = count_errors();

    let backend = RecordingBackend::failing("index closed");
    let router = create_test_router(backend);

    let (status, content_type, body) = make_get_request(router, "/s?q=report").await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(content_type.unwrap().starts_with("text/plain"));
    assert_eq!(body, TrawlError::backend("index closed").to_string());
    assert_eq!(counter.count(), 1);
}

#[tokio::test]
async fn test_bad_payload_fails_whole_page() {
    let (counter, _guard) = count_errors();

    let backend = RecordingBackend::ok(
        vec![
            json!({ "filename": "good.txt", "size": 1 }),
            json!({ "filename": "bad.txt", "size": "huge" }),
        ],
        2,
    );
    let router = create_test_router(backend);

    let (status, _, body) = make_get_request(router, "/s?q=x").await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body.contains("doc-1"));
    assert!(!body.contains("good.txt"));
    assert_eq!(counter.count(), 1);
}

#[tokio::test]
async fn test_render_failure_returns_500_and_logs_once() {
    let (counter, _guard) = count_errors();

    let mut templates = TemplateRenderer::builtin().unwrap();
    templates
        .add_template("results", "<p>{{#each results}}{{missing_helper this}}{{/each}}</p>")
        .unwrap();
    let backend = RecordingBackend::ok(vec![json!({ "filename": "a.txt", "size": 1 })], 1);
    let router = router_with(backend, templates);

    let (status, content_type, body) = make_get_request(router, "/s?q=a").await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(content_type.unwrap().starts_with("text/plain"));
    assert!(!body.contains("<p>"));
    assert_eq!(counter.count(), 1);
}

#[tokio::test]
async fn test_huge_page_renders_html() {
    for page in [
        "1000000000000000000",
        "9223372036854775807",
        "9223372036854775808",
        "18446744073709551615",
    ] {
        let backend = RecordingBackend::ok(three_hits(), 50);
        let router = create_test_router(backend.clone());

        let (status, content_type, body) =
            make_get_request(router, &format!("/s?q=x&p={}", page)).await;

        assert_eq!(status, StatusCode::OK, "p={}: {}", page, body);
        assert!(content_type.unwrap().starts_with("text/html"));
        assert_eq!(backend.calls()[0].page.to_string(), page);
    }
}

#[tokio::test]
async fn test_page_links_at_u64_limit() {
    let mut templates = TemplateRenderer::builtin().unwrap();
    templates
        .add_template("results", "{{add page 1}}|{{{prevpage}}}|{{{nextpage}}}|{{has_next}}")
        .unwrap();
    let router = router_with(RecordingBackend::ok(vec![], 50), templates);

    let (status, _, body) = make_get_request(router, "/s?q=x&p=18446744073709551615").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        "18446744073709551615|/s?q=x&p=18446744073709551614|/s?q=x&p=18446744073709551615|false"
    );
}

#[tokio::test]
async fn test_empty_result_page_hides_page_count() {
    let router = create_test_router(RecordingBackend::ok(vec![], 0));

    let (status, _, body) = make_get_request(router, "/s?q=nothing").await;

    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("0 files"));
    assert!(!body.contains("of 0"));
}

#[tokio::test]
async fn test_json_passes_backend_fields_through() {
    let raw = json!({
        "_index": "files",
        "_type": "file",
        "_id": "1",
        "_score": null,
        "sort": [5],
        "highlight": { "filename": ["<em>a</em>.txt"] },
        "_source": { "filename": "a.txt", "size": 1 }
    });
    let backend = Arc::new(RecordingBackend {
        response: Ok(SearchResponse {
            total: 1,
            hits: vec![Hit::from_value(raw.clone())],
            took: None,
        }),
        calls: Mutex::new(Vec::new()),
    });
    let router = create_test_router(backend);

    let (status, _, body) = make_get_request(router, "/s?q=a&format=json").await;

    assert_eq!(status, StatusCode::OK);
    let value: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(value, json!([raw]));
}

#[tokio::test]
async fn test_panic_stays_request_scoped() {
    let (counter, _guard) = count_errors();

    let state = AppState::new(
        Arc::new(PanickingBackend),
        Arc::new(TemplateRenderer::builtin().unwrap()),
        10,
    );
    let router = create_app(state, &Default::default());

    let (status, _, body) = make_get_request(router.clone(), "/s?q=x").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, "backend client corrupted");
    assert_eq!(counter.count(), 1);

    let (status, _, _) = make_get_request(router, "/").await;
    assert_eq!(status, StatusCode::MOVED_PERMANENTLY);
    assert_eq!(counter.count(), 1);
}

#[tokio::test]
async fn test_root_redirects_permanently() {
    let router = create_test_router(RecordingBackend::ok(vec![], 0));

    let response = router
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::MOVED_PERMANENTLY);
    assert_eq!(response.headers()[header::LOCATION], "/s");
}

#[tokio::test]
async fn test_static_files_are_served() {
    let dir = tempfile::TempDir::new().unwrap();
    std::fs::write(dir.path().join("style.css"), "body {}").unwrap();

    let settings = trawl_core::config::ServerSettings {
        static_dir: dir.path().to_path_buf(),
        ..Default::default()
    };
    let state = AppState::new(
        RecordingBackend::ok(vec![], 0),
        Arc::new(TemplateRenderer::builtin().unwrap()),
        10,
    );
    let router = create_app(state, &settings);

    let (status, _, body) = make_get_request(router.clone(), "/static/style.css").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "body {}");

    let (status, _, _) = make_get_request(router, "/static/missing.css").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_health_reports_backend() {
    let router = create_test_router(RecordingBackend::ok(vec![], 0));

    let (status, _, body) = make_get_request(router, "/health").await;

    assert_eq!(status, StatusCode::OK);
    let value: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(value["status"], "healthy");
    assert_eq!(value["backend"], true);
}
