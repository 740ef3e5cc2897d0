//! Order entity as seen by the gateway.
//! The Order Store owns the lifecycle; the gateway reads totals and writes
//! transaction metadata.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::amount;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OrderStatus {
    #[default]
    Pending,
    OnHold,
    Processing,
    Completed,
    Cancelled,
    Refunded,
    Failed,
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Pending => "pending",
            Self::OnHold => "on-hold",
            Self::Processing => "processing",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
            Self::Refunded => "refunded",
            Self::Failed => "failed",
        };
        write!(f, "{}", name)
    }
}

/// Whether moving an order from `from` to `to` releases an authorization.
///
/// `on-hold` to `processing` or `completed` always captures. With
/// compatibility mode off, `processing` to `completed` captures as well.
pub fn captures_on_transition(from: OrderStatus, to: OrderStatus, compatibility_mode: bool) -> bool {
    match (from, to) {
        (OrderStatus::OnHold, OrderStatus::Processing | OrderStatus::Completed) => true,
        (OrderStatus::Processing, OrderStatus::Completed) => !compatibility_mode,
        _ => false,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: String,
    pub total: Decimal,
    pub currency: String,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
    pub paid_at: Option<DateTime<Utc>>,
}

impl Order {
    pub fn new(id: impl Into<String>, total: Decimal, currency: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            total,
            currency: currency.into().to_uppercase(),
            status: OrderStatus::Pending,
            created_at: Utc::now(),
            paid_at: None,
        }
    }

    /// The order total in the processor's minor units.
    pub fn minor_amount(&self) -> i64 {
        amount::normalize(self.total, &self.currency)
    }

    pub fn is_paid(&self) -> bool {
        self.paid_at.is_some()
    }

    /// Total as the string the return signature is computed over.
    pub fn total_string(&self) -> String {
        self.total.to_string()
    }
}

/// Where an order's processor transaction stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionState {
    New,
    Authorized,
    Captured,
}

/// Transaction metadata persisted on an order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionRecord {
    pub transaction_id: Option<String>,
    pub captured: bool,
    pub card_id: Option<String>,
}

impl TransactionRecord {
    pub fn state(&self) -> TransactionState {
        match (&self.transaction_id, self.captured) {
            (None, _) => TransactionState::New,
            (Some(_), false) => TransactionState::Authorized,
            (Some(_), true) => TransactionState::Captured,
        }
    }
}
