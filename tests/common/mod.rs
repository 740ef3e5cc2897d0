#![allow(dead_code)]

use axum::{
    body::Body,
    http::{header, HeaderMap, Method, Request, StatusCode},
    Router,
};
use paylike_gateway::{config::Config, create_app, AppState};
use serde_json::Value;
use std::collections::HashMap;
use tower::ServiceExt;

pub const ADMIN_KEY: &str = "admin-test-key";
pub const PUBLIC_KEY: &str = "pk_test_123";
pub const SECRET_KEY: &str = "sk_test_123";
pub const SITE_URL: &str = "https://shop.example.com";

/// Test-mode configuration pointing the client at `api_url`.
pub fn test_config(api_url: &str, overrides: &[(&str, &str)]) -> Config {
    let mut values: HashMap<String, String> = [
        ("SITE_URL", SITE_URL),
        ("ADMIN_API_KEY", ADMIN_KEY),
        ("PAYLIKE_ENABLED", "yes"),
        ("PAYLIKE_TESTMODE", "yes"),
        ("PAYLIKE_TEST_SECRET_KEY", SECRET_KEY),
        ("PAYLIKE_TEST_PUBLIC_KEY", PUBLIC_KEY),
        ("PAYLIKE_API_URL", api_url),
    ]
    .iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect();

    for (key, value) in overrides {
        values.insert(key.to_string(), value.to_string());
    }

    Config::from_lookup(move |key| values.get(key).cloned()).unwrap()
}

pub fn setup_app(config: &Config) -> (Router, AppState) {
    let state = AppState::new(config).unwrap();
    (create_app(state.clone()), state)
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Value,
}

impl TestResponse {
    pub fn location(&self) -> &str {
        self.headers
            .get(header::LOCATION)
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default()
    }
}

pub async fn send(app: &Router, request: Request<Body>) -> TestResponse {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = hyper::body::to_bytes(response.into_body()).await.unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);

    TestResponse {
        status,
        headers,
        body,
    }
}

pub fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .method(Method::GET)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

pub fn post_json(uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub fn admin_post(uri: &str, body: &Value, key: &str) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .header(header::AUTHORIZATION, format!("Bearer {}", key))
        .body(Body::from(body.to_string()))
        .unwrap()
}

/// Processor answer for a transaction in the `{"transaction": ...}` envelope.
pub fn transaction_body(id: &str, amount: i64, currency: &str, captured: i64) -> String {
    serde_json::json!({
        "transaction": {
            "id": id,
            "successful": true,
            "amount": amount,
            "currency": currency,
            "capturedAmount": captured,
            "refundedAmount": 0,
            "voidedAmount": 0,
            "pendingAmount": amount - captured,
            "created": "2024-03-01T10:15:00Z"
        }
    })
    .to_string()
}

pub async fn create_order(app: &Router, total: &str, currency: &str) -> String {
    let response = send(
        app,
        post_json(
            "/orders",
            &serde_json::json!({ "total": total, "currency": currency }),
        ),
    )
    .await;
    assert_eq!(response.status, StatusCode::CREATED);
    response.body["id"].as_str().unwrap().to_string()
}
