//! Shared primitives for the stockpile crates: typed ids, versioning and the
//! base error type.

pub mod aggregate;
pub mod error;
pub mod id;

pub use aggregate::{AggregateRoot, ExpectedVersion};
pub use error::DomainError;
pub use id::{LedgerEntryId, LocationId, ProductId, RackId, RoomId, StockId, UserId};
