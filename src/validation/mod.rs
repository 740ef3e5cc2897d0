//! Checks a processor response against the order it is supposed to pay.

use rust_decimal::Decimal;
use thiserror::Error;

use crate::amount;
use crate::domain::Order;
use crate::paylike::types::{join_field_errors, FieldError, TransactionResponse};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationFailure {
    /// The processor did not report the transaction as successful.
    #[error("transaction was not successful")]
    Unsuccessful,
    #[error("amount: expected {expected}, got {actual}")]
    AmountMismatch { expected: i64, actual: i64 },
    #[error("capturedAmount: expected {expected}, got {}", .actual.map_or_else(|| "none".to_string(), |a| a.to_string()))]
    CapturedAmountMismatch { expected: i64, actual: Option<i64> },
    #[error("currency: expected {expected}, got {actual}")]
    CurrencyMismatch { expected: String, actual: String },
    #[error("{0}: is required")]
    MissingField(&'static str),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct ValidationError {
    pub failure: ValidationFailure,
    pub message: String,
}

impl ValidationError {
    /// Message is the processor's field errors when it sent any, otherwise
    /// the failure itself.
    pub fn new(failure: ValidationFailure, field_errors: &[FieldError]) -> Self {
        let message = if field_errors.is_empty() {
            failure.to_string()
        } else {
            join_field_errors(field_errors)
        };
        Self { failure, message }
    }

    pub fn missing(field: &'static str) -> Self {
        Self::new(ValidationFailure::MissingField(field), &[])
    }
}

pub type ValidationResult = Result<TransactionResponse, ValidationError>;

/// Amount and currency a transaction must carry to pay an order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Expectation {
    pub amount: i64,
    pub currency: String,
    /// Set for a partial capture; the authorized `amount` stays the order total.
    pub captured_amount: Option<i64>,
}

impl Expectation {
    pub fn for_order(order: &Order) -> Self {
        Self {
            amount: order.minor_amount(),
            currency: order.currency.clone(),
            captured_amount: None,
        }
    }

    /// Capture of `amount` instead of the order total when given.
    pub fn for_capture(order: &Order, amount: Option<Decimal>) -> Self {
        Self {
            captured_amount: amount.map(|amount| amount::normalize(amount, &order.currency)),
            ..Self::for_order(order)
        }
    }
}

/// Accepts `response` only if it is successful and, when an expectation is
/// given, carries exactly the expected amounts and currency.
pub fn validate(response: TransactionResponse, expected: Option<&Expectation>) -> ValidationResult {
    if !response.successful {
        return Err(ValidationError::new(
            ValidationFailure::Unsuccessful,
            &response.field_errors,
        ));
    }

    if let Some(expected) = expected {
        if response.currency != expected.currency {
            return Err(ValidationError::new(
                ValidationFailure::CurrencyMismatch {
                    expected: expected.currency.clone(),
                    actual: response.currency.clone(),
                },
                &response.field_errors,
            ));
        }

        if response.amount != expected.amount {
            return Err(ValidationError::new(
                ValidationFailure::AmountMismatch {
                    expected: expected.amount,
                    actual: response.amount,
                },
                &response.field_errors,
            ));
        }

        if let Some(captured) = expected.captured_amount {
            if response.captured_amount != Some(captured) {
                return Err(ValidationError::new(
                    ValidationFailure::CapturedAmountMismatch {
                        expected: captured,
                        actual: response.captured_amount,
                    },
                    &response.field_errors,
                ));
            }
        }
    }

    Ok(response)
}
