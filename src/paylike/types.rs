//! Wire types for the Paylike transactions API.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::fmt;

/// A single field-level error reported by the processor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    #[serde(default)]
    pub field: String,
    #[serde(default)]
    pub message: String,
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Joins field errors as `field: message` pairs separated by a single space.
pub fn join_field_errors(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Transaction state as returned by fetch, capture, void and refund.
///
/// Every field tolerates being absent so a partial body still decodes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionResponse {
    #[serde(default, deserialize_with = "lenient_bool")]
    pub successful: bool,
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub amount: i64,
    #[serde(default)]
    pub currency: String,
    #[serde(default)]
    pub captured_amount: Option<i64>,
    #[serde(default)]
    pub refunded_amount: Option<i64>,
    #[serde(default)]
    pub voided_amount: Option<i64>,
    #[serde(default)]
    pub created: Option<String>,
    #[serde(default)]
    pub field_errors: Vec<FieldError>,
}

impl TransactionResponse {
    /// A response that carries only the processor's rejection reasons.
    pub fn rejected(field_errors: Vec<FieldError>) -> Self {
        Self {
            successful: false,
            field_errors,
            ..Self::default()
        }
    }

    pub fn created_display(&self) -> &str {
        self.created.as_deref().unwrap_or("unknown")
    }

    /// Decodes a 2xx body: `{"transaction": {...}}`, a bare transaction
    /// object, or an array of field errors. `None` when the shape is unknown.
    pub fn from_body(body: &Value) -> Option<Self> {
        match body {
            Value::Object(map) => {
                let inner = map.get("transaction").unwrap_or(body);
                serde_json::from_value(inner.clone()).ok()
            }
            Value::Array(_) => serde_json::from_value::<Vec<FieldError>>(body.clone())
                .ok()
                .map(Self::rejected),
            _ => None,
        }
    }
}

/// The processor has answered with `true`, `1` and `"1"` over time.
fn lenient_bool<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Bool(flag) => flag,
        Value::Number(number) => number.as_i64() == Some(1),
        Value::String(text) => matches!(text.as_str(), "1" | "true"),
        _ => false,
    })
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CapturePayload {
    pub amount: i64,
    pub currency: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct VoidPayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RefundPayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub descriptor: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_decode_transaction_envelope() {
        let body = json!({
            "transaction": {
                "id": "tx_1",
                "successful": true,
                "amount": 2500,
                "currency": "USD",
                "capturedAmount": 2500,
                "refundedAmount": 0,
                "voidedAmount": 0,
                "created": "2024-03-01T10:15:00.000Z",
                "merchantId": "m_1"
            }
        });

        let tx = TransactionResponse::from_body(&body).unwrap();
        assert!(tx.successful);
        assert_eq!(tx.id, "tx_1");
        assert_eq!(tx.amount, 2500);
        assert_eq!(tx.captured_amount, Some(2500));
        assert_eq!(tx.created_display(), "2024-03-01T10:15:00.000Z");
        assert!(tx.field_errors.is_empty());
    }

    #[test]
    fn test_decode_tolerates_missing_fields_and_numeric_flag() {
        let body = json!({ "transaction": { "id": "tx_2", "successful": 1 } });

        let tx = TransactionResponse::from_body(&body).unwrap();
        assert!(tx.successful);
        assert_eq!(tx.amount, 0);
        assert_eq!(tx.currency, "");
        assert_eq!(tx.refunded_amount, None);
        assert_eq!(tx.created_display(), "unknown");
    }

    #[test]
    fn test_decode_field_error_array() {
        let body = json!([
            { "field": "amount", "message": "exceeds authorized amount" },
            { "field": "currency", "message": "mismatch" }
        ]);

        let tx = TransactionResponse::from_body(&body).unwrap();
        assert!(!tx.successful);
        assert_eq!(
            join_field_errors(&tx.field_errors),
            "amount: exceeds authorized amount currency: mismatch"
        );
    }

    #[test]
    fn test_decode_rejects_scalars() {
        assert!(TransactionResponse::from_body(&json!("ok")).is_none());
    }

    #[test]
    fn test_payloads_omit_absent_fields() {
        let refund = RefundPayload {
            amount: Some(500),
            descriptor: None,
        };
        assert_eq!(serde_json::to_value(&refund).unwrap(), json!({ "amount": 500 }));
        assert_eq!(serde_json::to_value(VoidPayload::default()).unwrap(), json!({}));
    }
}
