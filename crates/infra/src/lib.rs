//! Infrastructure layer: stores, engines, collaborators, configuration.

pub mod catalog;
pub mod config;
pub mod engine;
pub mod ledger_query;
pub mod listing;
pub mod notifier;
pub mod query;
pub mod reference;
pub mod stock_store;


pub use catalog::{Catalog, InMemoryCatalog, PlaceNames, ProductInfo};
pub use config::EngineConfig;
pub use engine::{MutationEngine, MutationError, MutationOutcome, TransferOutcome};
pub use ledger_query::{LedgerFilter, LedgerPage, LedgerQuery, LedgerSort, LedgerSortKey, TransactionSummary};
pub use listing::{
    StatusCounts, StockFilter, StockListPage, StockListQuery, StockListing, StockListingEngine, StockSort,
    StockSortKey,
};
pub use notifier::{FanoutNotifier, InMemoryNotifier, Notifier, NotifyError, StockAlert, TracingNotifier};
pub use query::{Pagination, SortDirection};
pub use reference::{ReferenceIdGenerator, SequentialReferenceIds, UuidReferenceIds};
pub use stock_store::{InMemoryInventoryStore, InventoryStore, LedgerStore, StockStore, StoreError};
