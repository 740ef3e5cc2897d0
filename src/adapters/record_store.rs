//! Typed view of the transaction metadata kept on an order.

use std::sync::Arc;

use crate::domain::TransactionRecord;
use crate::ports::{OrderStore, StoreError, StoreResult};

pub const TRANSACTION_ID_KEY: &str = "_paylike_transaction_id";
pub const CAPTURED_KEY: &str = "_paylike_transaction_captured";
pub const CARD_ID_KEY: &str = "_paylike_card_id";

const YES: &str = "yes";
const NO: &str = "no";

/// Translates [`TransactionRecord`] to and from order metadata keys.
#[derive(Clone)]
pub struct RecordStore {
    orders: Arc<dyn OrderStore>,
}

impl RecordStore {
    pub fn new(orders: Arc<dyn OrderStore>) -> Self {
        Self { orders }
    }

    pub async fn load(&self, order_id: &str) -> StoreResult<TransactionRecord> {
        let transaction_id = self.non_empty(order_id, TRANSACTION_ID_KEY).await?;
        let captured = self.non_empty(order_id, CAPTURED_KEY).await?;
        let card_id = self.non_empty(order_id, CARD_ID_KEY).await?;

        Ok(TransactionRecord {
            transaction_id,
            captured: captured.as_deref() == Some(YES),
            card_id,
        })
    }

    /// Stores the transaction id and its captured flag.
    ///
    /// An order keeps the first transaction id it was given; a different id
    /// is refused, and a stored `captured = yes` is never lowered.
    pub async fn save_transaction(
        &self,
        order_id: &str,
        transaction_id: &str,
        captured: bool,
    ) -> StoreResult<()> {
        let current = self.load(order_id).await?;

        match current.transaction_id.as_deref() {
            Some(existing) if existing != transaction_id => {
                return Err(StoreError::Conflict {
                    order_id: order_id.to_string(),
                    key: TRANSACTION_ID_KEY.to_string(),
                });
            }
            Some(_) => {}
            None => {
                self.orders
                    .set_metadata(order_id, TRANSACTION_ID_KEY, transaction_id)
                    .await?;
            }
        }

        let captured = captured || current.captured;
        self.orders
            .set_metadata(order_id, CAPTURED_KEY, if captured { YES } else { NO })
            .await
    }

    pub async fn mark_captured(&self, order_id: &str) -> StoreResult<()> {
        self.orders.set_metadata(order_id, CAPTURED_KEY, YES).await
    }

    pub async fn save_card(&self, order_id: &str, card_id: &str) -> StoreResult<()> {
        self.orders.set_metadata(order_id, CARD_ID_KEY, card_id).await
    }

    async fn non_empty(&self, order_id: &str, key: &str) -> StoreResult<Option<String>> {
        Ok(self
            .orders
            .get_metadata(order_id, key)
            .await?
            .filter(|value| !value.is_empty()))
    }
}
