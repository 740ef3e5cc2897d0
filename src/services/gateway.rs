//! Transaction lifecycle orchestration.
//!
//! Every write transition takes the order's lease, makes at most one awaited
//! call to the processor, validates the answer and only then touches the
//! order. Audit notes are best effort.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::leases::{OrderLease, OrderLeases};
use super::notes;
use crate::adapters::RecordStore;
use crate::config::{CaptureMode, GatewayConfig};
use crate::domain::{captures_on_transition, Order, OrderStatus, TransactionState};
use crate::error::GatewayError;
use crate::paylike::{
    join_field_errors, CapturePayload, RefundPayload, TransactionApi, TransactionResponse,
    TransportError, VoidPayload,
};
use crate::ports::{OrderStore, StoreError};
use crate::signature;
use crate::validation::{validate, Expectation, ValidationError, ValidationFailure};

pub const PAYMENT_FAILED_NOTICE: &str =
    "We were unable to process your payment. Please try again or use another payment method.";

#[derive(Debug, Clone, PartialEq)]
pub enum PaymentOutcome {
    /// Authorization verified; funds are reserved but not captured.
    Authorized(TransactionResponse),
    Captured(TransactionResponse),
    /// The order already carries a transaction; nothing was sent.
    AlreadyRecorded { transaction_id: String },
    AlreadyCaptured { transaction_id: String },
    /// Zero-total order, paid without a processor call.
    CompletedWithoutCharge { card_id: Option<String> },
}

impl PaymentOutcome {
    pub fn transaction_id(&self) -> Option<&str> {
        match self {
            Self::Authorized(tx) | Self::Captured(tx) => Some(&tx.id),
            Self::AlreadyRecorded { transaction_id } | Self::AlreadyCaptured { transaction_id } => {
                Some(transaction_id)
            }
            Self::CompletedWithoutCharge { .. } => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RefundKind {
    Refunded,
    Voided,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RefundOutcome {
    pub kind: RefundKind,
    pub transaction_id: String,
    /// Minor units returned to the card holder or released.
    pub amount: i64,
    pub response: TransactionResponse,
}

/// Fields posted by the checkout page.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PaymentRequest {
    pub paylike_token: Option<String>,
    pub paylike_card_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum CheckoutStep {
    /// Direct checkout is off; the shopper pays on the order's payment page.
    PaymentPage,
    Paid(PaymentOutcome),
}

/// Query parameters of the return redirect.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReturnParams {
    pub reference: Option<String>,
    pub signature: Option<String>,
    pub transaction_id: Option<String>,
    pub amount: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReturnOutcome {
    Cart,
    Checkout { notice: String },
    OrderReceived { order_id: String },
}

/// Values the payment widget needs for one order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckoutForm {
    pub order_id: String,
    pub public_key: String,
    pub currency: String,
    pub amount: i64,
    pub total: String,
    pub signature: String,
    pub testmode: bool,
}

pub struct Gateway {
    config: GatewayConfig,
    api: Arc<dyn TransactionApi>,
    orders: Arc<dyn OrderStore>,
    records: RecordStore,
    leases: OrderLeases,
}

impl Gateway {
    pub fn new(
        config: GatewayConfig,
        api: Arc<dyn TransactionApi>,
        orders: Arc<dyn OrderStore>,
    ) -> Self {
        Self {
            config,
            api,
            records: RecordStore::new(orders.clone()),
            orders,
            leases: OrderLeases::new(),
        }
    }

    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    pub async fn checkout_form(&self, order_id: &str) -> Result<CheckoutForm, GatewayError> {
        let order = self.orders.get_order(order_id).await?;
        let total = order.total_string();

        Ok(CheckoutForm {
            signature: signature::sign_with(
                self.config.signature_algorithm,
                &total,
                &order.id,
                &self.config.public_key,
            ),
            amount: order.minor_amount(),
            public_key: self.config.public_key.clone(),
            currency: order.currency,
            order_id: order.id,
            total,
            testmode: self.config.testmode,
        })
    }

    /// Checkout submission with direct checkout.
    pub async fn process_payment(
        &self,
        order_id: &str,
        request: PaymentRequest,
    ) -> Result<CheckoutStep, GatewayError> {
        if !self.config.direct_checkout {
            return Ok(CheckoutStep::PaymentPage);
        }

        let order = self.orders.get_order(order_id).await?;

        if order.total > Decimal::ZERO {
            let token = non_empty(request.paylike_token)
                .ok_or_else(|| ValidationError::missing("paylike_token"))?;
            let outcome = self.authorize(order_id, &token).await?;
            Ok(CheckoutStep::Paid(outcome))
        } else {
            let card_id = non_empty(request.paylike_card_id);
            let outcome = self
                .complete_without_charge(order_id, card_id.as_deref())
                .await?;
            Ok(CheckoutStep::Paid(outcome))
        }
    }

    /// Return redirect from the hosted payment flow.
    pub async fn handle_return(&self, params: ReturnParams) -> ReturnOutcome {
        let (Some(reference), Some(token), Some(transaction_id), Some(amount)) = (
            non_empty(params.reference),
            non_empty(params.signature),
            non_empty(params.transaction_id),
            non_empty(params.amount),
        ) else {
            tracing::info!("Return callback is missing a parameter");
            return ReturnOutcome::Cart;
        };

        if !signature::verify_with(
            self.config.signature_algorithm,
            &token,
            &amount,
            &reference,
            &self.config.public_key,
        ) {
            tracing::warn!(order_id = %reference, "Return callback signature does not match");
            return ReturnOutcome::Cart;
        }

        match self.authorize(&reference, &transaction_id).await {
            Ok(_) => ReturnOutcome::OrderReceived {
                order_id: reference,
            },
            Err(GatewayError::Store(StoreError::NotFound(_))) => {
                tracing::warn!(order_id = %reference, "Return callback for unknown order");
                ReturnOutcome::Cart
            }
            Err(err) => {
                tracing::warn!(order_id = %reference, error = %err, "Return callback payment failed");
                ReturnOutcome::Checkout {
                    notice: PAYMENT_FAILED_NOTICE.to_string(),
                }
            }
        }
    }

    /// NEW -> AUTHORIZED (delayed) or NEW -> CAPTURED (instant).
    pub async fn authorize(
        &self,
        order_id: &str,
        transaction_id: &str,
    ) -> Result<PaymentOutcome, GatewayError> {
        let _lease = self.lease(order_id)?;
        let order = self.orders.get_order(order_id).await?;
        let record = self.records.load(order_id).await?;

        if let Some(existing) = record.transaction_id {
            tracing::info!(order_id, transaction_id = %existing, "Order already has a Paylike transaction");
            return Ok(PaymentOutcome::AlreadyRecorded {
                transaction_id: existing,
            });
        }

        tracing::info!(
            order_id,
            transaction_id,
            total = %order.total,
            currency = %order.currency,
            capture_mode = %self.config.capture_mode,
            "Processing Paylike payment"
        );

        let expected = Expectation::for_order(&order);

        match self.config.capture_mode {
            CaptureMode::Delayed => {
                let result = self.api.fetch(transaction_id).await;
                let tx = self
                    .settle(order_id, result, Some(&expected), notes::verify_failed)
                    .await?;
                self.record_payment(&order, transaction_id, &tx, false).await?;
                self.note(order_id, &notes::authorization_details(&tx)).await;
                Ok(PaymentOutcome::Authorized(tx))
            }
            CaptureMode::Instant => {
                let payload = CapturePayload {
                    amount: expected.amount,
                    currency: expected.currency.clone(),
                };
                let result = self.api.capture(transaction_id, &payload).await;
                let tx = self
                    .settle(order_id, result, Some(&expected), notes::capture_failed)
                    .await?;
                self.record_payment(&order, transaction_id, &tx, true).await?;
                self.note(order_id, &notes::capture_details(&tx)).await;
                Ok(PaymentOutcome::Captured(tx))
            }
        }
    }

    /// AUTHORIZED -> CAPTURED. `amount` overrides the order total.
    pub async fn capture(
        &self,
        order_id: &str,
        amount: Option<Decimal>,
    ) -> Result<PaymentOutcome, GatewayError> {
        let _lease = self.lease(order_id)?;
        let order = self.orders.get_order(order_id).await?;
        let record = self.records.load(order_id).await?;

        let transaction_id = record
            .transaction_id
            .ok_or_else(|| GatewayError::MissingTransaction(order_id.to_string()))?;

        if record.captured {
            tracing::info!(order_id, transaction_id = %transaction_id, "Transaction already captured");
            return Ok(PaymentOutcome::AlreadyCaptured { transaction_id });
        }

        let expected = Expectation::for_capture(&order, amount);
        let capture_amount = expected.captured_amount.unwrap_or(expected.amount);
        tracing::info!(
            order_id,
            transaction_id = %transaction_id,
            amount = capture_amount,
            "Capturing Paylike transaction"
        );

        let payload = CapturePayload {
            amount: capture_amount,
            currency: expected.currency.clone(),
        };
        let result = self.api.capture(&transaction_id, &payload).await;
        let tx = self
            .settle(order_id, result, Some(&expected), notes::capture_failed)
            .await?;

        self.records.mark_captured(order_id).await?;
        self.note(order_id, &notes::capture_details(&tx)).await;
        Ok(PaymentOutcome::Captured(tx))
    }

    /// Refund when captured, void otherwise. The captured flag is left as is.
    pub async fn refund(
        &self,
        order_id: &str,
        amount: Option<Decimal>,
        reason: Option<&str>,
    ) -> Result<RefundOutcome, GatewayError> {
        let _lease = self.lease(order_id)?;
        let order = self.orders.get_order(order_id).await?;
        let record = self.records.load(order_id).await?;

        let transaction_id = record
            .transaction_id
            .ok_or_else(|| GatewayError::MissingTransaction(order_id.to_string()))?;
        let minor = amount.map(|amount| crate::amount::normalize(amount, &order.currency));

        tracing::info!(
            order_id,
            transaction_id = %transaction_id,
            amount = ?minor,
            captured = record.captured,
            "Refunding Paylike transaction"
        );

        let (kind, result) = if record.captured {
            let payload = RefundPayload {
                amount: minor,
                descriptor: reason
                    .map(str::trim)
                    .filter(|reason| !reason.is_empty())
                    .map(ToString::to_string),
            };
            (
                RefundKind::Refunded,
                self.api.refund(&transaction_id, &payload).await,
            )
        } else {
            let payload = VoidPayload { amount: minor };
            (
                RefundKind::Voided,
                self.api.void(&transaction_id, &payload).await,
            )
        };

        let tx = self
            .settle(order_id, result, None, notes::refund_failed)
            .await?;

        let (reported, note) = match kind {
            RefundKind::Refunded => {
                let amount = tx.refunded_amount.or(minor).unwrap_or(tx.amount);
                (amount, notes::refund_details(&tx, amount))
            }
            RefundKind::Voided => {
                let amount = tx.voided_amount.or(minor).unwrap_or(tx.amount);
                (amount, notes::void_details(&tx, amount))
            }
        };
        self.note(order_id, &note).await;

        Ok(RefundOutcome {
            kind,
            transaction_id,
            amount: reported,
            response: tx,
        })
    }

    /// Zero-total order: stores the card reference, if any, and marks it paid.
    pub async fn complete_without_charge(
        &self,
        order_id: &str,
        card_id: Option<&str>,
    ) -> Result<PaymentOutcome, GatewayError> {
        let _lease = self.lease(order_id)?;
        let order = self.orders.get_order(order_id).await?;

        if order.total > Decimal::ZERO {
            return Err(ValidationError::new(
                ValidationFailure::AmountMismatch {
                    expected: 0,
                    actual: order.minor_amount(),
                },
                &[],
            )
            .into());
        }

        let card_id = card_id.map(str::trim).filter(|id| !id.is_empty());
        if let Some(card_id) = card_id {
            self.records.save_card(order_id, card_id).await?;
        }
        self.orders.mark_paid(order_id).await?;

        tracing::info!(order_id, card_saved = card_id.is_some(), "Zero amount order completed");
        Ok(PaymentOutcome::CompletedWithoutCharge {
            card_id: card_id.map(ToString::to_string),
        })
    }

    /// Captures an authorized order when its status change releases the
    /// funds. Returns `None` when the change does not capture.
    pub async fn on_status_change(
        &self,
        order_id: &str,
        from: OrderStatus,
        to: OrderStatus,
    ) -> Result<Option<PaymentOutcome>, GatewayError> {
        if !captures_on_transition(from, to, self.config.compatibility_mode) {
            return Ok(None);
        }

        let record = self.records.load(order_id).await?;
        if record.state() != TransactionState::Authorized {
            tracing::debug!(order_id, state = ?record.state(), "Nothing to capture on status change");
            return Ok(None);
        }

        self.capture(order_id, None).await.map(Some)
    }

    async fn record_payment(
        &self,
        order: &Order,
        requested_id: &str,
        tx: &TransactionResponse,
        captured: bool,
    ) -> Result<(), GatewayError> {
        let transaction_id = if tx.id.is_empty() {
            requested_id
        } else {
            tx.id.as_str()
        };

        self.records
            .save_transaction(&order.id, transaction_id, captured)
            .await?;
        self.orders.mark_paid(&order.id).await?;
        Ok(())
    }

    /// Validates a processor answer; a failure leaves an audit note.
    async fn settle(
        &self,
        order_id: &str,
        result: Result<TransactionResponse, TransportError>,
        expected: Option<&Expectation>,
        failure_note: fn(&str) -> String,
    ) -> Result<TransactionResponse, GatewayError> {
        let outcome = match result {
            Ok(response) => validate(response, expected).map_err(GatewayError::from),
            Err(err) => Err(GatewayError::from(err)),
        };

        if let Err(err) = &outcome {
            tracing::warn!(order_id, error = %err, "Paylike transaction rejected");
            self.note(order_id, &failure_note(&failure_detail(err))).await;
        }

        outcome
    }

    async fn note(&self, order_id: &str, text: &str) {
        if let Err(err) = self.orders.add_note(order_id, text).await {
            tracing::error!(order_id, error = %err, "Failed to add order note");
        }
    }

    fn lease(&self, order_id: &str) -> Result<OrderLease, GatewayError> {
        self.leases.try_acquire(order_id).ok_or_else(|| {
            tracing::warn!(order_id, "Order is already being processed");
            GatewayError::InProgress(order_id.to_string())
        })
    }
}

fn failure_detail(err: &GatewayError) -> String {
    match err {
        GatewayError::Transport(transport) => {
            let field_errors = transport.field_errors();
            if field_errors.is_empty() {
                transport.to_string()
            } else {
                join_field_errors(&field_errors)
            }
        }
        GatewayError::Validation(validation) => validation.message.clone(),
        other => other.to_string(),
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|value| !value.trim().is_empty())
}
