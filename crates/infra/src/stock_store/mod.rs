//! Stock record + ledger persistence boundary.
//!
//! This module defines the infrastructure-facing abstraction for storing stock
//! records and appending ledger entries without making storage assumptions.
//! Record writes and ledger appends of one mutation always go through a single
//! atomic [`InventoryStore::commit`].

pub mod in_memory;
pub mod r#trait;

pub use in_memory::InMemoryInventoryStore;
pub use r#trait::{Changeset, Committed, InventoryStore, LedgerStore, RecordWrite, StockStore, StoreError};
