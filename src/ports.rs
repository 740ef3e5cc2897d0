//! Boundary to the platform's order persistence.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::Order;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("order {0} not found")]
    NotFound(String),

    #[error("order {order_id}: {key} already holds a different value")]
    Conflict { order_id: String, key: String },

    #[error("order store failure: {0}")]
    Backend(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Order persistence owned by the e-commerce platform.
///
/// Metadata is string keyed; [`crate::adapters::RecordStore`] gives it a
/// typed shape.
#[async_trait]
pub trait OrderStore: Send + Sync {
    async fn get_order(&self, order_id: &str) -> StoreResult<Order>;

    async fn set_metadata(&self, order_id: &str, key: &str, value: &str) -> StoreResult<()>;

    async fn get_metadata(&self, order_id: &str, key: &str) -> StoreResult<Option<String>>;

    /// Marks the order paid. Repeated calls leave the first payment time.
    async fn mark_paid(&self, order_id: &str) -> StoreResult<()>;

    async fn add_note(&self, order_id: &str, text: &str) -> StoreResult<()>;
}
