use axum::{
    extract::{Query, State},
    response::Redirect,
};
use serde::Deserialize;
use utoipa::IntoParams;

use crate::services::{ReturnOutcome, ReturnParams};
use crate::AppState;

/// Parameters the payment widget appends to the return URL.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ReturnQuery {
    /// Order id
    pub reference: Option<String>,
    pub signature: Option<String>,
    pub transaction_id: Option<String>,
    /// Order total the signature was computed over
    pub amount: Option<String>,
}

impl From<ReturnQuery> for ReturnParams {
    fn from(query: ReturnQuery) -> Self {
        Self {
            reference: query.reference,
            signature: query.signature,
            transaction_id: query.transaction_id,
            amount: query.amount,
        }
    }
}

#[utoipa::path(
    get,
    path = "/paylike/return",
    params(ReturnQuery),
    responses(
        (status = 303, description = "Redirect to the order-received page, the checkout or the cart")
    ),
    tag = "Checkout"
)]
pub async fn payment_return(
    State(state): State<AppState>,
    query: Option<Query<ReturnQuery>>,
) -> Redirect {
    let query = query.map(|Query(query)| query).unwrap_or_default();

    let target = match state.gateway.handle_return(query.into()).await {
        ReturnOutcome::Cart => state.urls.cart(),
        ReturnOutcome::Checkout { notice } => state.urls.checkout_with_notice(&notice),
        ReturnOutcome::OrderReceived { order_id } => state.urls.order_received(&order_id),
    };

    Redirect::to(&target)
}
