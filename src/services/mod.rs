pub mod gateway;
pub mod leases;
pub mod notes;

pub use gateway::{
    CheckoutForm, CheckoutStep, Gateway, PaymentOutcome, PaymentRequest, RefundKind,
    RefundOutcome, ReturnOutcome, ReturnParams, PAYMENT_FAILED_NOTICE,
};
pub use leases::{OrderLease, OrderLeases};
