//! Storage boundary for processes, health checks and inventory.
//!
//! The traits make no storage assumptions; `InMemoryBloodBank` backs tests and
//! local development.

pub mod in_memory;
pub mod r#trait;

pub use in_memory::InMemoryBloodBank;
pub use r#trait::{
    Commit, HealthCheckStore, InventoryStore, ProcessStore, StoreError, TransactionalStore,
};
