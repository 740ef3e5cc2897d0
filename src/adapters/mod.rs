pub mod in_memory_order_store;
pub mod record_store;

pub use in_memory_order_store::InMemoryOrderStore;
pub use record_store::RecordStore;
