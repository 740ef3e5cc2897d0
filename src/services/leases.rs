//! Per-order leases serializing write transitions within this process.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

#[derive(Debug, Default, Clone)]
pub struct OrderLeases {
    held: Arc<Mutex<HashSet<String>>>,
}

impl OrderLeases {
    pub fn new() -> Self {
        Self::default()
    }

    /// Takes the lease for `order_id`, or `None` while another holder has it.
    pub fn try_acquire(&self, order_id: &str) -> Option<OrderLease> {
        let mut held = self.held.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        if !held.insert(order_id.to_string()) {
            return None;
        }

        Some(OrderLease {
            order_id: order_id.to_string(),
            held: Arc::clone(&self.held),
        })
    }
}

/// Released on drop.
#[derive(Debug)]
pub struct OrderLease {
    order_id: String,
    held: Arc<Mutex<HashSet<String>>>,
}

impl Drop for OrderLease {
    fn drop(&mut self) {
        let mut held = self.held.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        held.remove(&self.order_id);
    }
}
