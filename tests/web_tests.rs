mod mocks;

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use briefly::infra::config::{SliderConfig, SummaryDefaults};
use briefly::web::{router, AppState};
use briefly::{ModelCache, ModelLoader, ModelRegistry, Summarizer};
use mocks::{words, MockLoader};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;

fn app(loader: MockLoader, request_timeout: Option<Duration>) -> axum::Router {
    let cache = ModelCache::new(
        Arc::new(ModelRegistry::builtin()),
        Arc::new(loader) as Arc<dyn ModelLoader>,
    );
    router(Arc::new(AppState {
        summarizer: Summarizer::new(Arc::new(cache)),
        defaults: SummaryDefaults::default(),
        sliders: SliderConfig::default(),
        request_timeout,
    }))
}

async fn post_summarize(app: axum::Router, body: Value) -> (StatusCode, Value) {
    let request = Request::post("/api/summarize")
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn test_summarize_returns_summary_and_stats() {
    let (status, body) = post_summarize(
        app(MockLoader::new(), None),
        json!({
            "text": words(200),
            "model": "distilbart",
            "max_length": 60,
            "min_length": 20,
            "sampling": false
        }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["input_word_count"], 200);
    assert_eq!(body["output_word_count"], 60);
    assert_eq!(body["compression_percent"], 70.0);
    assert!(body["stats"].as_str().unwrap().contains("Reduction:       70.0%"));
    assert_eq!(body["summary"].as_str().unwrap().split_whitespace().count(), 60);
}

#[tokio::test]
async fn test_missing_fields_use_configured_defaults() {
    let (status, body) = post_summarize(app(MockLoader::new(), None), json!({ "text": words(90) })).await;

    assert_eq!(status, StatusCode::OK);
    // 90 / 3 = 30 words, inside the default 20..=60 bounds
    assert_eq!(body["output_word_count"], 30);
}

#[tokio::test]
async fn test_empty_text_is_unprocessable() {
    let (status, body) = post_summarize(app(MockLoader::new(), None), json!({ "text": "   " })).await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["kind"], "validation_error");
}

#[tokio::test]
async fn test_missing_text_field_uses_error_envelope() {
    let (status, body) = post_summarize(app(MockLoader::new(), None), json!({ "model": "bart" })).await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["kind"], "validation_error");
    assert!(body["error"].as_str().unwrap().contains("text"));
}

#[tokio::test]
async fn test_malformed_json_uses_error_envelope() {
    let request = Request::post("/api/summarize")
        .header("content-type", "application/json")
        .body(Body::from("{not json"))
        .unwrap();

    let response = app(MockLoader::new(), None).oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["kind"], "validation_error");
}

#[tokio::test]
async fn test_unknown_model_is_bad_request() {
    let (status, body) = post_summarize(
        app(MockLoader::new(), None),
        json!({ "text": words(50), "model": "gpt-nonexistent" }),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["kind"], "unknown_model_error");
}

#[tokio::test]
async fn test_model_load_failure_is_unavailable() {
    let (status, body) = post_summarize(
        app(MockLoader::new().failing_loads(1), None),
        json!({ "text": words(50), "model": "t5" }),
    )
    .await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["kind"], "model_load_error");
    assert!(body["error"].as_str().unwrap().contains("t5-small"));
}

#[tokio::test]
async fn test_adapter_timeout_is_gateway_timeout() {
    let loader = MockLoader::new().with_generation_delay(Duration::from_millis(500));
    let (status, body) = post_summarize(
        app(loader, Some(Duration::from_millis(20))),
        json!({ "text": words(50) }),
    )
    .await;

    assert_eq!(status, StatusCode::GATEWAY_TIMEOUT);
    assert_eq!(body["kind"], "timeout");
}

#[tokio::test]
async fn test_models_endpoint_lists_registry() {
    let response = app(MockLoader::new(), None)
        .oneshot(Request::get("/api/models").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let models: Value = serde_json::from_slice(&bytes).unwrap();
    let ids: Vec<&str> = models
        .as_array()
        .unwrap()
        .iter()
        .map(|m| m["identifier"].as_str().unwrap())
        .collect();
    assert_eq!(ids, vec!["bart", "distilbart", "t5"]);
}

#[tokio::test]
async fn test_index_renders_dropdown_and_sliders() {
    let response = app(MockLoader::new(), None)
        .oneshot(Request::get("/").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let html = String::from_utf8(bytes.to_vec()).unwrap();
    assert!(html.contains(r#"<option value="bart" selected>bart</option>"#));
    assert!(html.contains(r#"<option value="distilbart">distilbart</option>"#));
    assert!(html.contains(r#"min="30" max="300" step="10" value="120""#));
    assert!(html.contains(r#"min="10" max="150" step="5" value="40""#));
    assert!(!html.contains("{{"));
}
