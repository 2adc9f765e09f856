use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::body::Body;
use axum::http::{HeaderMap, Request, StatusCode};
use axum::routing::post;
use axum::{Json, Router};
use serde_json::{json, Value};
use tower::ServiceExt;

use historia_proxy::config::{ConfigError, ProxyConfig, DEFAULT_MODEL};
use historia_proxy::state::AppState;
use historia_proxy::{app, COMPLETION_PATH};

#[derive(Default, Clone)]
struct Seen {
    body: Arc<Mutex<Option<Value>>>,
    authorization: Arc<Mutex<Option<String>>>,
}

/// Start a fake upstream that records what it receives and answers with
/// `status` and `reply`.
async fn fake_upstream(status: StatusCode, reply: &'static str) -> (String, Seen) {
    let seen = Seen::default();
    let captured = seen.clone();
    let router = Router::new().route(
        "/v1/chat/completions",
        post(move |headers: HeaderMap, Json(body): Json<Value>| {
            let captured = captured.clone();
            async move {
                *captured.body.lock().unwrap() = Some(body);
                *captured.authorization.lock().unwrap() = headers
                    .get("authorization")
                    .and_then(|v| v.to_str().ok())
                    .map(str::to_string);
                (status, [("content-type", "application/json")], reply)
            }
        }),
    );

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    (format!("http://{addr}/v1/chat/completions"), seen)
}

fn relay_for(upstream_url: &str) -> Router {
    let config = ProxyConfig::from_lookup(|name| match name {
        "HISTORIA_PROVIDER_API_KEY" => Some("test-key".to_string()),
        "HISTORIA_UPSTREAM_URL" => Some(upstream_url.to_string()),
        "HISTORIA_UPSTREAM_TIMEOUT_SECS" => Some("5".to_string()),
        _ => None,
    })
    .unwrap();
    app(AppState::new(config).unwrap())
}

fn post_json(body: impl Into<Body>) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(COMPLETION_PATH)
        .header("content-type", "application/json")
        .body(body.into())
        .unwrap()
}

async fn read_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn completion_request() -> String {
    json!({
        "messages": [
            { "role": "system", "content": "You are Historia AI." },
            { "role": "user", "content": "Start of consultation." }
        ],
        "tool_choice": "none"
    })
    .to_string()
}

#[tokio::test]
async fn non_post_is_rejected() {
    let response = relay_for("http://127.0.0.1:9/unused")
        .oneshot(
            Request::builder()
                .method("GET")
                .uri(COMPLETION_PATH)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(read_json(response).await, json!({ "error": "Method Not Allowed" }));
}

#[tokio::test]
async fn malformed_json_is_an_internal_error() {
    let response = relay_for("http://127.0.0.1:9/unused")
        .oneshot(post_json("{ not json"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        read_json(response).await,
        json!({ "error": "Internal Server Error in the proxy function" })
    );
}

#[tokio::test]
async fn non_object_json_is_an_internal_error() {
    let response = relay_for("http://127.0.0.1:9/unused")
        .oneshot(post_json("[1, 2, 3]"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn missing_messages_is_a_bad_request() {
    let response = relay_for("http://127.0.0.1:9/unused")
        .oneshot(post_json(json!({ "prompt": "hello" }).to_string()))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = read_json(response).await;
    assert!(body["error"].is_string());
    assert!(body["details"].as_str().unwrap().contains("messages"));
}

#[tokio::test]
async fn success_is_passed_through_with_model_and_key() {
    let reply = r#"{"choices":[{"message":{"content":"Where is the pain?"}}]}"#;
    let (url, seen) = fake_upstream(StatusCode::OK, reply).await;

    let response = relay_for(&url)
        .oneshot(post_json(completion_request()))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    assert_eq!(&bytes[..], reply.as_bytes());

    let forwarded = seen.body.lock().unwrap().clone().unwrap();
    assert_eq!(forwarded["model"], DEFAULT_MODEL);
    assert_eq!(forwarded["tool_choice"], "none");
    assert_eq!(forwarded["messages"][1]["content"], "Start of consultation.");
    assert_eq!(
        seen.authorization.lock().unwrap().as_deref(),
        Some("Bearer test-key")
    );
}

#[tokio::test]
async fn upstream_error_keeps_status_and_details() {
    let (url, _seen) = fake_upstream(
        StatusCode::TOO_MANY_REQUESTS,
        r#"{"error":{"message":"Rate limit reached"}}"#,
    )
    .await;

    let response = relay_for(&url)
        .oneshot(post_json(completion_request()))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    let body = read_json(response).await;
    assert_eq!(body["error"], "Failed to fetch from upstream completion API");
    assert!(body["details"].as_str().unwrap().contains("Rate limit reached"));
}

#[tokio::test]
async fn unreachable_upstream_is_an_internal_error() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let response = relay_for(&format!("http://{addr}/v1/chat/completions"))
        .oneshot(post_json(completion_request()))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        read_json(response).await,
        json!({ "error": "Internal Server Error in the proxy function" })
    );
}

#[tokio::test]
async fn health_reports_ok() {
    let response = relay_for("http://127.0.0.1:9/unused")
        .oneshot(
            Request::builder()
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(read_json(response).await, json!({ "status": "ok" }));
}

#[test]
fn config_requires_api_key() {
    let err = ProxyConfig::from_lookup(|_| None).unwrap_err();
    assert!(matches!(err, ConfigError::Missing("HISTORIA_PROVIDER_API_KEY")));
}

#[test]
fn config_defaults_and_overrides() {
    let config = ProxyConfig::from_lookup(|name| match name {
        "HISTORIA_PROVIDER_API_KEY" => Some("k".to_string()),
        "HISTORIA_MODEL" => Some("custom-model".to_string()),
        _ => None,
    })
    .unwrap();
    assert_eq!(config.model, "custom-model");
    assert_eq!(config.upstream_timeout, Duration::from_secs(60));
    assert_eq!(config.bind.to_string(), "127.0.0.1:8787");
    assert!(!format!("{config:?}").contains("\"k\""));

    let bad = ProxyConfig::from_lookup(|name| match name {
        "HISTORIA_PROVIDER_API_KEY" => Some("k".to_string()),
        "HISTORIA_UPSTREAM_TIMEOUT_SECS" => Some("soon".to_string()),
        _ => None,
    });
    assert!(matches!(bad, Err(ConfigError::Invalid { .. })));
}
