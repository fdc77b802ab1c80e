//! Inventory quantity domain.
//!
//! This crate contains the business rules for stock records, reservations,
//! transfers and the audit ledger, implemented purely as deterministic domain
//! logic (no IO, no HTTP, no storage).

pub mod classify;
pub mod command;
pub mod error;
pub mod ledger;
pub mod stock;

pub use classify::{
    Classification, Severity, StockStatus, StockThresholds, assess, assess_available, classify, severity,
};
pub use command::{
    AdjustKind, AdjustStock, Destination, IssueStock, ReceiveStock, ReleaseStock, ReserveStock,
    TransferStock,
};
pub use error::{StockError, StockResult};
pub use ledger::{LedgerEntry, MovementContext, QuantityPool, ReferenceKind, TransactionType};
pub use stock::{Movement, StockKey, StockRecord};
