pub mod memory_order_store;
pub mod postgres_order_store;

pub use memory_order_store::MemoryOrderStore;
pub use postgres_order_store::PostgresOrderStore;
