pub mod order;

pub use order::{captures_on_transition, Order, OrderStatus, TransactionRecord, TransactionState};
