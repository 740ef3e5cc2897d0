use async_trait::async_trait;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::{Client, Method};
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;

use super::types::{CapturePayload, FieldError, RefundPayload, TransactionResponse, VoidPayload};
use crate::config::{GatewayConfig, SecretKey};
use crate::utils::sanitize::sanitize_json;

pub const DEFAULT_API_URL: &str = "https://api.paylike.io";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
const CLIENT_ID: &str = concat!("paylike-gateway-rs/", env!("CARGO_PKG_VERSION"));

#[derive(Error, Debug)]
pub enum TransportError {
    #[error("{operation} request failed: {source}")]
    Request {
        operation: &'static str,
        #[source]
        source: reqwest::Error,
    },
    #[error("{operation} request returned HTTP {status}")]
    Status {
        operation: &'static str,
        status: u16,
        body: String,
    },
    #[error("{operation} response could not be decoded (HTTP {status})")]
    Decode {
        operation: &'static str,
        status: u16,
        body: String,
    },
    #[error("HTTP client could not be built: {0}")]
    Client(#[source] reqwest::Error),
}

impl TransportError {
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Request { source, .. } => source.status().map(|s| s.as_u16()),
            Self::Status { status, .. } | Self::Decode { status, .. } => Some(*status),
            Self::Client(_) => None,
        }
    }

    pub fn body(&self) -> Option<&str> {
        match self {
            Self::Request { .. } | Self::Client(_) => None,
            Self::Status { body, .. } | Self::Decode { body, .. } => Some(body),
        }
    }

    /// Field errors the processor put in the body of a rejected request.
    pub fn field_errors(&self) -> Vec<FieldError> {
        self.body()
            .and_then(|body| serde_json::from_str::<Vec<FieldError>>(body).ok())
            .unwrap_or_default()
    }
}

/// The remote operations of the transactions API.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Fetch,
    Capture,
    Void,
    Refund,
}

impl Operation {
    pub fn name(self) -> &'static str {
        match self {
            Self::Fetch => "fetch",
            Self::Capture => "capture",
            Self::Void => "void",
            Self::Refund => "refund",
        }
    }

    pub fn method(self) -> Method {
        match self {
            Self::Fetch => Method::GET,
            Self::Capture | Self::Void | Self::Refund => Method::POST,
        }
    }

    pub fn path(self, transaction_id: &str) -> String {
        match self {
            Self::Fetch => format!("transactions/{}", transaction_id),
            Self::Capture => format!("transactions/{}/captures", transaction_id),
            Self::Void => format!("transactions/{}/voids", transaction_id),
            Self::Refund => format!("transactions/{}/refunds", transaction_id),
        }
    }
}

/// Transaction operations the orchestrator drives.
#[async_trait]
pub trait TransactionApi: Send + Sync {
    async fn fetch(&self, transaction_id: &str) -> Result<TransactionResponse, TransportError>;

    async fn capture(
        &self,
        transaction_id: &str,
        payload: &CapturePayload,
    ) -> Result<TransactionResponse, TransportError>;

    async fn void(
        &self,
        transaction_id: &str,
        payload: &VoidPayload,
    ) -> Result<TransactionResponse, TransportError>;

    async fn refund(
        &self,
        transaction_id: &str,
        payload: &RefundPayload,
    ) -> Result<TransactionResponse, TransportError>;
}

/// HTTP client for the Paylike transactions API
#[derive(Clone)]
pub struct PaylikeClient {
    client: Client,
    base_url: String,
    secret_key: SecretKey,
    logging: bool,
}

impl PaylikeClient {
    pub fn new(config: &GatewayConfig) -> Result<Self, TransportError> {
        Self::from_parts(
            config.api_url.clone(),
            config.secret_key.clone(),
            config.logging,
        )
    }

    /// Every request is bounded by a 30 second timeout.
    pub fn from_parts(
        base_url: String,
        secret_key: SecretKey,
        logging: bool,
    ) -> Result<Self, TransportError> {
        let client = Client::builder()
            .connect_timeout(REQUEST_TIMEOUT)
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(TransportError::Client)?;

        Ok(PaylikeClient {
            client,
            base_url,
            secret_key,
            logging,
        })
    }

    /// Issues one authenticated request and decodes the transaction it returns.
    pub async fn call<B>(
        &self,
        operation: Operation,
        transaction_id: &str,
        payload: Option<&B>,
    ) -> Result<TransactionResponse, TransportError>
    where
        B: Serialize + Sync + ?Sized,
    {
        let path = operation.path(transaction_id);
        let url = format!("{}/{}", self.base_url.trim_end_matches('/'), path);
        let method = operation.method();

        let mut request = self
            .client
            .request(method.clone(), &url)
            .basic_auth("", Some(self.secret_key.expose()))
            .header(ACCEPT, "application/json")
            .header(CONTENT_TYPE, "application/json")
            .header("X-Client", CLIENT_ID);

        if let Some(payload) = payload {
            if self.logging {
                let body = serde_json::to_value(payload)
                    .map(|value| sanitize_json(&value).to_string())
                    .unwrap_or_else(|_| "[unserializable]".to_string());
                tracing::debug!(target: "paylike", method = %method, path = %path, body = %body, "Paylike request");
            }
            request = request.json(payload);
        } else if self.logging {
            tracing::debug!(target: "paylike", method = %method, path = %path, "Paylike request");
        }

        let response = request.send().await.map_err(|source| {
            tracing::warn!(target: "paylike", method = %method, path = %path, error = ?source, "Paylike request failed");
            TransportError::Request {
                operation: operation.name(),
                source,
            }
        })?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|source| TransportError::Request {
                operation: operation.name(),
                source,
            })?;

        if self.logging {
            tracing::info!(
                target: "paylike",
                method = %method,
                path = %path,
                status = status.as_u16(),
                body = %sanitize_text(&text),
                "Paylike response"
            );
        }

        if !status.is_success() {
            tracing::warn!(target: "paylike", path = %path, status = status.as_u16(), "Paylike rejected request");
            return Err(TransportError::Status {
                operation: operation.name(),
                status: status.as_u16(),
                body: text,
            });
        }

        serde_json::from_str::<Value>(&text)
            .ok()
            .and_then(|body| TransactionResponse::from_body(&body))
            .ok_or_else(|| TransportError::Decode {
                operation: operation.name(),
                status: status.as_u16(),
                body: text,
            })
    }
}

fn sanitize_text(text: &str) -> String {
    match serde_json::from_str::<Value>(text) {
        Ok(json) => sanitize_json(&json).to_string(),
        Err(_) => format!("[non-json, {} bytes]", text.len()),
    }
}

#[async_trait]
impl TransactionApi for PaylikeClient {
    async fn fetch(&self, transaction_id: &str) -> Result<TransactionResponse, TransportError> {
        self.call::<()>(Operation::Fetch, transaction_id, None).await
    }

    async fn capture(
        &self,
        transaction_id: &str,
        payload: &CapturePayload,
    ) -> Result<TransactionResponse, TransportError> {
        self.call(Operation::Capture, transaction_id, Some(payload))
            .await
    }

    async fn void(
        &self,
        transaction_id: &str,
        payload: &VoidPayload,
    ) -> Result<TransactionResponse, TransportError> {
        self.call(Operation::Void, transaction_id, Some(payload)).await
    }

    async fn refund(
        &self,
        transaction_id: &str,
        payload: &RefundPayload,
    ) -> Result<TransactionResponse, TransportError> {
        self.call(Operation::Refund, transaction_id, Some(payload))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::Engine;
    use mockito::Matcher;
    use serde_json::json;

    fn basic_auth(secret: &str) -> String {
        let encoded = base64::engine::general_purpose::STANDARD.encode(format!(":{}", secret));
        format!("Basic {}", encoded)
    }

    fn client_for(server: &mockito::Server) -> PaylikeClient {
        PaylikeClient::from_parts(server.url(), SecretKey::new("sk_test_123"), true).unwrap()
    }

    #[test]
    fn test_operation_paths() {
        assert_eq!(Operation::Fetch.path("tx_1"), "transactions/tx_1");
        assert_eq!(Operation::Capture.path("tx_1"), "transactions/tx_1/captures");
        assert_eq!(Operation::Void.path("tx_1"), "transactions/tx_1/voids");
        assert_eq!(Operation::Refund.path("tx_1"), "transactions/tx_1/refunds");
        assert_eq!(Operation::Fetch.method(), Method::GET);
        assert_eq!(Operation::Refund.method(), Method::POST);
    }

    #[tokio::test]
    async fn test_capture_sends_authenticated_json() {
        let mut server = mockito::Server::new_async().await;

        let mock = server
            .mock("POST", "/transactions/tx_1/captures")
            .match_header("authorization", basic_auth("sk_test_123").as_str())
            .match_header("accept", "application/json")
            .match_header("content-type", "application/json")
            .match_header("x-client", Matcher::Regex("^paylike-gateway-rs/".into()))
            .match_body(Matcher::Json(json!({ "amount": 2500, "currency": "USD" })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{"transaction":{"id":"tx_1","successful":true,"amount":2500,"currency":"USD","capturedAmount":2500}}"#,
            )
            .create_async()
            .await;

        let client = client_for(&server);
        let payload = CapturePayload {
            amount: 2500,
            currency: "USD".to_string(),
        };
        let tx = client.capture("tx_1", &payload).await.unwrap();

        mock.assert_async().await;
        assert!(tx.successful);
        assert_eq!(tx.captured_amount, Some(2500));
    }

    #[tokio::test]
    async fn test_fetch_uses_get() {
        let mut server = mockito::Server::new_async().await;

        let mock = server
            .mock("GET", "/transactions/tx_9")
            .with_status(200)
            .with_body(r#"{"transaction":{"id":"tx_9","successful":true,"amount":100,"currency":"JPY"}}"#)
            .create_async()
            .await;

        let tx = client_for(&server).fetch("tx_9").await.unwrap();

        mock.assert_async().await;
        assert_eq!(tx.id, "tx_9");
        assert_eq!(tx.currency, "JPY");
    }

    #[tokio::test]
    async fn test_non_success_status_keeps_body() {
        let mut server = mockito::Server::new_async().await;

        let _mock = server
            .mock("POST", "/transactions/tx_1/refunds")
            .with_status(400)
            .with_body(r#"[{"field":"amount","message":"exceeds captured amount"}]"#)
            .create_async()
            .await;

        let result = client_for(&server)
            .refund("tx_1", &RefundPayload::default())
            .await;

        let err = result.unwrap_err();
        assert!(matches!(err, TransportError::Status { status: 400, .. }));
        assert_eq!(err.status(), Some(400));
        assert_eq!(
            err.field_errors(),
            vec![FieldError {
                field: "amount".to_string(),
                message: "exceeds captured amount".to_string(),
            }]
        );
    }

    #[tokio::test]
    async fn test_undecodable_success_body() {
        let mut server = mockito::Server::new_async().await;

        let _mock = server
            .mock("POST", "/transactions/tx_1/voids")
            .with_status(200)
            .with_body("<html>maintenance</html>")
            .create_async()
            .await;

        let result = client_for(&server)
            .void("tx_1", &VoidPayload::default())
            .await;

        assert!(matches!(result, Err(TransportError::Decode { status: 200, .. })));
    }

    #[tokio::test]
    async fn test_unreachable_host_is_transport_error() {
        let client = PaylikeClient::from_parts(
            "http://127.0.0.1:1".to_string(),
            SecretKey::new("sk_test_123"),
            false,
        )
        .unwrap();

        let result = client.fetch("tx_1").await;
        assert!(matches!(result, Err(TransportError::Request { .. })));
    }
}
