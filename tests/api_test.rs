mod common;

use std::time::Duration;

use axum::body::Body;
use axum::http::Request;
use axum::http::StatusCode;
use axum::Router;
use common::nft_hits;
use common::FakeCompleter;
use common::FakeIndex;
use common::Fixture;
use serde_json::json;
use serde_json::Value;
use supportrag::api::build_app;
use supportrag::api::build_state;
use supportrag::config::AppConfig;
use tower::ServiceExt;

fn app(fixture: &Fixture) -> Router {
    let state = build_state(&fixture.resources(), &AppConfig::default());
    build_app(state, true, Duration::from_secs(30))
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

fn post_query(body: &Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/query")
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn post_raw(body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/query")
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

#[tokio::test]
async fn test_query_returns_grounded_answer() {
    let fixture = Fixture::new(
        Some(FakeIndex::with_hits(nft_hits())),
        Some(FakeCompleter::answering("Create a collection, then mint.")),
    );

    let (status, body) = send(
        app(&fixture),
        post_query(&json!({"query": "How do I create an NFT?", "max_results": 5})),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["query"], "How do I create an NFT?");
    assert_eq!(body["response"], "Create a collection, then mint.");
    assert_eq!(body["method"], "RAG (Full Knowledge Base)");
    assert_eq!(body["sources"].as_array().unwrap().len(), 2);
    assert_eq!(body["sources"][0]["title"], "Minting Guide");
    assert!(body["timestamp"].as_str().unwrap().contains('T'));
}

#[tokio::test]
async fn test_blank_query_is_bad_request() {
    let fixture = Fixture::new(None, Some(FakeCompleter::answering("unused")));

    let (status, body) = send(app(&fixture), post_query(&json!({"query": "   "}))).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["detail"], "Query cannot be empty");
    assert!(fixture.completer_calls().is_empty());
}

#[tokio::test]
async fn test_missing_credential_is_service_unavailable() {
    let fixture = Fixture::new(Some(FakeIndex::with_hits(nft_hits())), None);

    let (status, body) = send(app(&fixture), post_query(&json!({"query": "Hello"}))).await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert!(body["detail"].as_str().unwrap().contains("not configured"));
    assert_eq!(fixture.index_calls(), 0);
}

#[tokio::test]
async fn test_fallback_and_error_modes_are_ok_responses() {
    let fallback = Fixture::new(
        Some(FakeIndex::failing()),
        Some(FakeCompleter::answering("general answer")),
    );
    let (status, body) = send(app(&fallback), post_query(&json!({"query": "Hi"}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["method"], "Fallback (General Knowledge)");
    assert_eq!(body["sources"][0]["relevance_score"], 0.5);

    let failing = Fixture::new(None, Some(FakeCompleter::failing("boom")));
    let (status, body) = send(app(&failing), post_query(&json!({"query": "Hi"}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["method"], "Error");
    assert_eq!(body["sources"], json!([]));
}

#[tokio::test]
async fn test_zero_max_results_is_bad_request() {
    let fixture = Fixture::new(None, Some(FakeCompleter::answering("unused")));

    let (status, _) = send(
        app(&fixture),
        post_query(&json!({"query": "Hi", "max_results": 0})),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_malformed_bodies_use_detail_shape() {
    let fixture = Fixture::new(None, Some(FakeCompleter::answering("unused")));

    let (status, body) = send(app(&fixture), post_query(&json!({"max_results": 3}))).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["detail"].as_str().unwrap().contains("missing field `query`"));

    let (status, body) = send(
        app(&fixture),
        post_query(&json!({"query": "Hi", "max_results": -1})),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["detail"].is_string());

    let (status, body) = send(app(&fixture), post_raw("not json")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["detail"].is_string());

    assert!(fixture.completer_calls().is_empty());
}

#[tokio::test]
async fn test_timeout_uses_detail_shape() {
    let fixture = Fixture::new(
        None,
        Some(FakeCompleter::stalling("too late", Duration::from_secs(5))),
    );
    let state = build_state(&fixture.resources(), &AppConfig::default());
    let app = build_app(state, false, Duration::from_millis(50));

    let (status, body) = send(app, post_query(&json!({"query": "Hi"}))).await;

    assert_eq!(status, StatusCode::REQUEST_TIMEOUT);
    assert_eq!(body["detail"], "Request timed out");
}

#[tokio::test]
async fn test_health_reports_index_state() {
    let with_index = Fixture::new(Some(FakeIndex::with_hits(nft_hits())), None);
    let (status, body) = send(app(&with_index), get("/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["rag_available"], true);
    assert_eq!(body["document_count"], 2);

    let without_index = Fixture::new(None, None);
    let (_, body) = send(app(&without_index), get("/health")).await;
    assert_eq!(body["rag_available"], false);
    assert!(body.get("document_count").is_none());

    let broken_index = Fixture::new(Some(FakeIndex::failing()), None);
    let (_, body) = send(app(&broken_index), get("/health")).await;
    assert_eq!(body["rag_available"], true);
    assert!(body.get("document_count").is_none());
}

#[tokio::test]
async fn test_root_banner() {
    let fixture = Fixture::new(None, None);

    let (status, body) = send(app(&fixture), get("/")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Crossmint Support Bot API");
    assert_eq!(body["docs"], "/docs");
    assert!(body["version"].is_string());
}
