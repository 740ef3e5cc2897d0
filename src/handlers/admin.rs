use crate::AppState;
use axum::{
    extract::{Path, State},
    Json,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::ErrorBody;
use crate::domain::OrderStatus;
use crate::error::{AppError, GatewayError};
use crate::ports::OrderStore;
use crate::services::{PaymentOutcome, RefundKind};

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct CaptureRequest {
    /// Overrides the order total
    #[schema(value_type = Option<String>, example = "10.00")]
    pub amount: Option<Decimal>,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct RefundRequest {
    /// Full refund when omitted
    #[schema(value_type = Option<String>, example = "10.00")]
    pub amount: Option<Decimal>,
    pub reason: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct StatusChangeRequest {
    #[schema(value_type = String, example = "on-hold")]
    pub from: OrderStatus,
    #[schema(value_type = String, example = "completed")]
    pub to: OrderStatus,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AdminResponse {
    pub order_id: String,
    /// captured, already_captured, refunded, voided or unchanged
    pub result: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transaction_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<i64>,
}

impl AdminResponse {
    fn from_outcome(order_id: &str, outcome: &PaymentOutcome) -> Self {
        let (result, amount) = match outcome {
            PaymentOutcome::Captured(tx) => ("captured", tx.captured_amount.or(Some(tx.amount))),
            PaymentOutcome::Authorized(tx) => ("authorized", Some(tx.amount)),
            PaymentOutcome::AlreadyCaptured { .. } => ("already_captured", None),
            PaymentOutcome::AlreadyRecorded { .. } => ("already_recorded", None),
            PaymentOutcome::CompletedWithoutCharge { .. } => ("completed", None),
        };

        Self {
            order_id: order_id.to_string(),
            result: result.to_string(),
            transaction_id: outcome.transaction_id().map(ToString::to_string),
            amount,
        }
    }
}

#[utoipa::path(
    post,
    path = "/orders/{id}/capture",
    params(("id" = String, Path, description = "Order id")),
    request_body = CaptureRequest,
    responses(
        (status = 200, description = "Transaction captured", body = AdminResponse),
        (status = 401, description = "Missing or wrong admin key", body = ErrorBody),
        (status = 409, description = "No transaction or order busy", body = ErrorBody),
        (status = 422, description = "Capture rejected", body = ErrorBody)
    ),
    security(("bearer" = [])),
    tag = "Admin"
)]
pub async fn capture(
    State(state): State<AppState>,
    Path(order_id): Path<String>,
    Json(payload): Json<CaptureRequest>,
) -> Result<Json<AdminResponse>, AppError> {
    let outcome = state.gateway.capture(&order_id, payload.amount).await?;
    Ok(Json(AdminResponse::from_outcome(&order_id, &outcome)))
}

#[utoipa::path(
    post,
    path = "/orders/{id}/refund",
    params(("id" = String, Path, description = "Order id")),
    request_body = RefundRequest,
    responses(
        (status = 200, description = "Refunded or voided", body = AdminResponse),
        (status = 401, description = "Missing or wrong admin key", body = ErrorBody),
        (status = 409, description = "No transaction or order busy", body = ErrorBody),
        (status = 422, description = "Refund rejected", body = ErrorBody),
        (status = 502, description = "Processor unreachable or refused", body = ErrorBody)
    ),
    security(("bearer" = [])),
    tag = "Admin"
)]
pub async fn refund(
    State(state): State<AppState>,
    Path(order_id): Path<String>,
    Json(payload): Json<RefundRequest>,
) -> Result<Json<AdminResponse>, AppError> {
    let outcome = state
        .gateway
        .refund(&order_id, payload.amount, payload.reason.as_deref())
        .await?;

    let result = match outcome.kind {
        RefundKind::Refunded => "refunded",
        RefundKind::Voided => "voided",
    };

    Ok(Json(AdminResponse {
        order_id,
        result: result.to_string(),
        transaction_id: Some(outcome.transaction_id),
        amount: Some(outcome.amount),
    }))
}

/// Moves the order to a new status, capturing first when the move releases
/// an authorization. The status is only changed once the capture succeeded.
#[utoipa::path(
    post,
    path = "/orders/{id}/status",
    params(("id" = String, Path, description = "Order id")),
    request_body = StatusChangeRequest,
    responses(
        (status = 200, description = "Status changed", body = AdminResponse),
        (status = 401, description = "Missing or wrong admin key", body = ErrorBody),
        (status = 409, description = "Order is not in the given status", body = ErrorBody),
        (status = 422, description = "Capture rejected", body = ErrorBody)
    ),
    security(("bearer" = [])),
    tag = "Admin"
)]
pub async fn change_status(
    State(state): State<AppState>,
    Path(order_id): Path<String>,
    Json(payload): Json<StatusChangeRequest>,
) -> Result<Json<AdminResponse>, AppError> {
    let order = state
        .orders
        .get_order(&order_id)
        .await
        .map_err(GatewayError::from)?;

    if order.status != payload.from {
        return Err(AppError::Conflict(format!(
            "Order {} is {}, not {}",
            order_id, order.status, payload.from
        )));
    }

    let outcome = state
        .gateway
        .on_status_change(&order_id, payload.from, payload.to)
        .await?;

    state
        .orders
        .set_status(&order_id, payload.to)
        .await
        .map_err(GatewayError::from)?;

    tracing::info!(
        order_id = %order_id,
        from = %payload.from,
        to = %payload.to,
        captured = outcome.is_some(),
        "Order status changed"
    );

    let response = match outcome {
        Some(outcome) => AdminResponse::from_outcome(&order_id, &outcome),
        None => AdminResponse {
            order_id,
            result: "unchanged".to_string(),
            transaction_id: None,
            amount: None,
        },
    };

    Ok(Json(response))
}
