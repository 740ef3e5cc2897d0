//! In-memory implementation of OrderStore.

use async_trait::async_trait;
use chrono::Utc;
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::{Order, OrderStatus};
use crate::ports::{OrderStore, StoreError, StoreResult};

#[derive(Debug, Clone)]
struct StoredOrder {
    order: Order,
    metadata: HashMap<String, String>,
    notes: Vec<String>,
}

/// A thread-safe in-memory order store.
///
/// Backs the reference host and the tests; the platform's own store replaces
/// it in a real deployment.
#[derive(Debug, Default, Clone)]
pub struct InMemoryOrderStore {
    orders: Arc<RwLock<HashMap<String, StoredOrder>>>,
    next_id: Arc<AtomicU64>,
}

impl InMemoryOrderStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert(&self, order: Order) {
        let mut orders = self.orders.write().await;
        orders.insert(
            order.id.clone(),
            StoredOrder {
                order,
                metadata: HashMap::new(),
                notes: Vec::new(),
            },
        );
    }

    /// Creates a pending order with the next sequential id.
    pub async fn create(&self, total: Decimal, currency: &str) -> Order {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        let order = Order::new(id.to_string(), total, currency);
        self.insert(order.clone()).await;
        order
    }

    pub async fn notes(&self, order_id: &str) -> Vec<String> {
        let orders = self.orders.read().await;
        orders
            .get(order_id)
            .map(|stored| stored.notes.clone())
            .unwrap_or_default()
    }

    pub async fn set_status(&self, order_id: &str, status: OrderStatus) -> StoreResult<()> {
        let mut orders = self.orders.write().await;
        let stored = orders
            .get_mut(order_id)
            .ok_or_else(|| StoreError::NotFound(order_id.to_string()))?;
        stored.order.status = status;
        Ok(())
    }
}

#[async_trait]
impl OrderStore for InMemoryOrderStore {
    async fn get_order(&self, order_id: &str) -> StoreResult<Order> {
        let orders = self.orders.read().await;
        orders
            .get(order_id)
            .map(|stored| stored.order.clone())
            .ok_or_else(|| StoreError::NotFound(order_id.to_string()))
    }

    async fn set_metadata(&self, order_id: &str, key: &str, value: &str) -> StoreResult<()> {
        let mut orders = self.orders.write().await;
        let stored = orders
            .get_mut(order_id)
            .ok_or_else(|| StoreError::NotFound(order_id.to_string()))?;
        stored.metadata.insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn get_metadata(&self, order_id: &str, key: &str) -> StoreResult<Option<String>> {
        let orders = self.orders.read().await;
        let stored = orders
            .get(order_id)
            .ok_or_else(|| StoreError::NotFound(order_id.to_string()))?;
        Ok(stored.metadata.get(key).cloned())
    }

    async fn mark_paid(&self, order_id: &str) -> StoreResult<()> {
        let mut orders = self.orders.write().await;
        let stored = orders
            .get_mut(order_id)
            .ok_or_else(|| StoreError::NotFound(order_id.to_string()))?;

        if stored.order.paid_at.is_none() {
            stored.order.paid_at = Some(Utc::now());
        }
        if matches!(
            stored.order.status,
            OrderStatus::Pending | OrderStatus::OnHold | OrderStatus::Failed
        ) {
            stored.order.status = OrderStatus::Processing;
        }
        Ok(())
    }

    async fn add_note(&self, order_id: &str, text: &str) -> StoreResult<()> {
        let mut orders = self.orders.write().await;
        let stored = orders
            .get_mut(order_id)
            .ok_or_else(|| StoreError::NotFound(order_id.to_string()))?;
        stored.notes.push(text.to_string());
        Ok(())
    }
}
