use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::config::currencies;
use crate::domain::Order;
use crate::error::{AppError, GatewayError};
use crate::services::{CheckoutStep, PaymentRequest, PAYMENT_FAILED_NOTICE};
use crate::validation::ValidationFailure;
use super::ErrorBody;
use crate::AppState;

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateOrderRequest {
    #[schema(value_type = String, example = "25.00")]
    pub total: Decimal,
    #[schema(example = "USD")]
    pub currency: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct OrderView {
    pub id: String,
    pub total: String,
    pub currency: String,
    /// Total in the processor's minor units.
    pub amount: i64,
    pub status: String,
    pub paid: bool,
}

impl From<&Order> for OrderView {
    fn from(order: &Order) -> Self {
        Self {
            id: order.id.clone(),
            total: order.total_string(),
            currency: order.currency.clone(),
            amount: order.minor_amount(),
            status: order.status.to_string(),
            paid: order.is_paid(),
        }
    }
}

/// Everything the payment widget needs to charge an order.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct Receipt {
    pub title: String,
    pub description: String,
    pub order_id: String,
    pub public_key: String,
    pub currency: String,
    pub amount: i64,
    pub total: String,
    pub signature: String,
    pub testmode: bool,
    pub card_types: Vec<String>,
    pub return_url: String,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct PaymentForm {
    pub paylike_token: Option<String>,
    pub paylike_card_id: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct PaymentResponse {
    /// success or failure
    pub result: String,
    pub redirect: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transaction_id: Option<String>,
}

#[utoipa::path(
    post,
    path = "/orders",
    request_body = CreateOrderRequest,
    responses(
        (status = 201, description = "Order created", body = OrderView),
        (status = 400, description = "Invalid total or currency", body = ErrorBody)
    ),
    tag = "Checkout"
)]
pub async fn create_order(
    State(state): State<AppState>,
    Json(payload): Json<CreateOrderRequest>,
) -> Result<impl IntoResponse, AppError> {
    if payload.total < Decimal::ZERO {
        return Err(AppError::Validation(
            "total: must not be negative".to_string(),
        ));
    }

    if !currencies::is_supported(&payload.currency) {
        return Err(AppError::Validation(format!(
            "currency: {} is not supported",
            payload.currency
        )));
    }

    let order = state.orders.create(payload.total, &payload.currency).await;
    tracing::info!(
        order_id = %order.id,
        total = %order.total,
        currency = %order.currency,
        "Order created"
    );

    Ok((StatusCode::CREATED, Json(OrderView::from(&order))))
}

#[utoipa::path(
    get,
    path = "/orders/{id}/receipt",
    params(("id" = String, Path, description = "Order id")),
    responses(
        (status = 200, description = "Checkout form data", body = Receipt),
        (status = 404, description = "Unknown order", body = ErrorBody),
        (status = 409, description = "Gateway not available for this order", body = ErrorBody)
    ),
    tag = "Checkout"
)]
pub async fn receipt(
    State(state): State<AppState>,
    Path(order_id): Path<String>,
) -> Result<Json<Receipt>, AppError> {
    let form = state.gateway.checkout_form(&order_id).await?;

    if !state
        .settings
        .is_available(&form.currency, state.urls.is_secure())
    {
        return Err(AppError::Conflict(format!(
            "Paylike is not available for order {}",
            order_id
        )));
    }

    Ok(Json(Receipt {
        title: state.settings.title.clone(),
        description: state.settings.checkout_description(),
        card_types: state.settings.card_types.clone(),
        return_url: state.urls.payment_return(),
        order_id: form.order_id,
        public_key: form.public_key,
        currency: form.currency,
        amount: form.amount,
        total: form.total,
        signature: form.signature,
        testmode: form.testmode,
    }))
}

#[utoipa::path(
    post,
    path = "/orders/{id}/payment",
    params(("id" = String, Path, description = "Order id")),
    request_body = PaymentForm,
    responses(
        (status = 200, description = "Where to send the shopper next; a failed payment redirects back to checkout", body = PaymentResponse),
        (status = 400, description = "Token missing", body = ErrorBody),
        (status = 404, description = "Unknown order", body = ErrorBody),
        (status = 409, description = "Order busy", body = ErrorBody)
    ),
    tag = "Checkout"
)]
pub async fn pay(
    State(state): State<AppState>,
    Path(order_id): Path<String>,
    Json(form): Json<PaymentForm>,
) -> Result<Json<PaymentResponse>, AppError> {
    let request = PaymentRequest {
        paylike_token: form.paylike_token,
        paylike_card_id: form.paylike_card_id,
    };

    let step = match state.gateway.process_payment(&order_id, request).await {
        Ok(step) => step,
        Err(err) if is_payment_failure(&err) => {
            // Details are in the order notes; the shopper only sees the notice.
            return Ok(Json(PaymentResponse {
                result: "failure".to_string(),
                redirect: state.urls.checkout_with_notice(PAYMENT_FAILED_NOTICE),
                transaction_id: None,
            }));
        }
        Err(err) => return Err(err.into()),
    };

    let response = match step {
        CheckoutStep::PaymentPage => PaymentResponse {
            result: "success".to_string(),
            redirect: state.urls.order_pay(&order_id),
            transaction_id: None,
        },
        CheckoutStep::Paid(outcome) => PaymentResponse {
            result: "success".to_string(),
            redirect: state.urls.order_received(&order_id),
            transaction_id: outcome.transaction_id().map(ToString::to_string),
        },
    };

    Ok(Json(response))
}

fn is_payment_failure(err: &GatewayError) -> bool {
    match err {
        GatewayError::Transport(_) => true,
        GatewayError::Validation(validation) => {
            !matches!(validation.failure, ValidationFailure::MissingField(_))
        }
        _ => false,
    }
}
