pub mod client;
pub mod types;

pub use client::{Operation, PaylikeClient, TransactionApi, TransportError, DEFAULT_API_URL};
pub use types::{
    join_field_errors, CapturePayload, FieldError, RefundPayload, TransactionResponse, VoidPayload,
};
