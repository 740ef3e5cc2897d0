use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::config::ConfigurationError;
use crate::paylike::TransportError;
use crate::ports::StoreError;
use crate::validation::{ValidationError, ValidationFailure};

/// Failure of a gateway operation.
#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigurationError),

    #[error("Order store error: {0}")]
    Store(#[from] StoreError),

    #[error("Order {0} has no Paylike transaction")]
    MissingTransaction(String),

    #[error("Order {0} is already being processed")]
    InProgress(String),
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Payment rejected: {0}")]
    PaymentRejected(String),

    #[error("Payment processor unavailable: {0}")]
    Upstream(String),

    #[error("Internal server error: {0}")]
    Internal(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),
}

impl AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::PaymentRejected(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Upstream(_) => StatusCode::BAD_GATEWAY,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
        }
    }
}

impl From<GatewayError> for AppError {
    fn from(err: GatewayError) -> Self {
        let message = err.to_string();
        match err {
            GatewayError::Transport(_) => AppError::Upstream(message),
            GatewayError::Validation(ref validation) => match validation.failure {
                ValidationFailure::MissingField(_) => AppError::Validation(message),
                _ => AppError::PaymentRejected(message),
            },
            GatewayError::Configuration(_) => AppError::Internal(message),
            GatewayError::Store(StoreError::NotFound(_)) => AppError::NotFound(message),
            GatewayError::Store(StoreError::Conflict { .. }) => AppError::Conflict(message),
            GatewayError::Store(StoreError::Backend(_)) => AppError::Internal(message),
            GatewayError::MissingTransaction(_) | GatewayError::InProgress(_) => {
                AppError::Conflict(message)
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = Json(json!({
            "error": self.to_string(),
            "status": status.as_u16(),
        }));

        (status, body).into_response()
    }
}
