pub mod admin;
pub mod checkout;
pub mod return_callback;

use crate::AppState;
use axum::{extract::State, response::IntoResponse, Json};
use serde::{Deserialize, Serialize};
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi, ToSchema};

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HealthStatus {
    pub status: String,
    pub version: String,
    pub testmode: bool,
    pub capture_mode: String,
}

/// Body of every error response.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorBody {
    pub error: String,
    pub status: u16,
}

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service is healthy", body = HealthStatus)
    ),
    tag = "Health"
)]
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let config = state.gateway.config();

    Json(HealthStatus {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        testmode: config.testmode,
        capture_mode: config.capture_mode.to_string(),
    })
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health,
        checkout::create_order,
        checkout::receipt,
        checkout::pay,
        return_callback::payment_return,
        admin::capture,
        admin::refund,
        admin::change_status,
    ),
    components(schemas(
        HealthStatus,
        ErrorBody,
        checkout::CreateOrderRequest,
        checkout::OrderView,
        checkout::Receipt,
        checkout::PaymentForm,
        checkout::PaymentResponse,
        admin::CaptureRequest,
        admin::RefundRequest,
        admin::StatusChangeRequest,
        admin::AdminResponse,
    )),
    modifiers(&BearerAuth),
    tags(
        (name = "Health", description = "Service status"),
        (name = "Checkout", description = "Storefront payment flow"),
        (name = "Admin", description = "Merchant operations, bearer authenticated")
    )
)]
pub struct ApiDoc;

/// Admin routes take the admin API key as a bearer token.
struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer",
                SecurityScheme::Http(HttpBuilder::new().scheme(HttpAuthScheme::Bearer).build()),
            );
        }
    }
}

pub async fn openapi() -> impl IntoResponse {
    Json(ApiDoc::openapi())
}
