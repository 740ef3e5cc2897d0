//! Audit notes written on orders.

use crate::paylike::TransactionResponse;

pub fn authorization_details(tx: &TransactionResponse) -> String {
    format!(
        "Paylike authorization complete.\nTransaction ID: {}\nPayment amount: {}\nTransaction authorized at: {}",
        tx.id,
        tx.amount,
        tx.created_display()
    )
}

pub fn capture_details(tx: &TransactionResponse) -> String {
    format!(
        "Paylike capture complete.\nTransaction ID: {}\nAuthorized amount: {}\nCaptured amount: {}\nCharge authorized at: {}",
        tx.id,
        tx.amount,
        tx.captured_amount.unwrap_or(tx.amount),
        tx.created_display()
    )
}

pub fn refund_details(tx: &TransactionResponse, amount: i64) -> String {
    format!(
        "Paylike transaction refunded.\nTransaction ID: {}\nRefund amount: {}\nTransaction authorized at: {}",
        tx.id,
        amount,
        tx.created_display()
    )
}

pub fn void_details(tx: &TransactionResponse, amount: i64) -> String {
    format!(
        "Paylike authorization voided.\nTransaction ID: {}\nVoided amount: {}\nTransaction authorized at: {}",
        tx.id,
        amount,
        tx.created_display()
    )
}

pub fn verify_failed(error: &str) -> String {
    format!("Unable to verify transaction!\nError: {}", error)
}

pub fn capture_failed(error: &str) -> String {
    format!("Unable to capture transaction!\nError: {}", error)
}

pub fn refund_failed(error: &str) -> String {
    format!("Unable to refund transaction!\nError: {}", error)
}
