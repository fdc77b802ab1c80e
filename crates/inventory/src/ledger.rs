//! Append-only audit trail of quantity-affecting events.

use core::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use stockpile_core::{DomainError, LedgerEntryId, StockId, UserId};

use crate::stock::{Movement, StockKey, StockRecord};

/// Kind of quantity-affecting event recorded in the ledger.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionType {
    Inward,
    Outward,
    Adjustment,
    Reservation,
    Release,
    Transfer,
}

impl TransactionType {
    pub const ALL: [TransactionType; 6] = [
        TransactionType::Inward,
        TransactionType::Outward,
        TransactionType::Adjustment,
        TransactionType::Reservation,
        TransactionType::Release,
        TransactionType::Transfer,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::Inward => "inward",
            TransactionType::Outward => "outward",
            TransactionType::Adjustment => "adjustment",
            TransactionType::Reservation => "reservation",
            TransactionType::Release => "release",
            TransactionType::Transfer => "transfer",
        }
    }
}

impl core::fmt::Display for TransactionType {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransactionType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TransactionType::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| DomainError::validation(format!("unknown transaction type '{s}'")))
    }
}

/// Which field of the stock record a ledger delta applies to.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuantityPool {
    /// The on-hand `quantity` field.
    OnHand,
    /// The `reserved_quantity` field.
    Reserved,
}

/// What a reference id correlates.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReferenceKind {
    Adjustment,
    Reservation,
    Release,
    Transfer,
    Receipt,
    Issue,
}

impl ReferenceKind {
    /// Short prefix used when generating human-readable reference ids.
    pub fn prefix(&self) -> &'static str {
        match self {
            ReferenceKind::Adjustment => "ADJ",
            ReferenceKind::Reservation => "RSV",
            ReferenceKind::Release => "REL",
            ReferenceKind::Transfer => "TRF",
            ReferenceKind::Receipt => "RCV",
            ReferenceKind::Issue => "ISS",
        }
    }
}

/// Who/why/when of one logical mutation, shared by all of its ledger legs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MovementContext {
    pub reason: String,
    pub notes: Option<String>,
    pub performed_by: UserId,
    pub reference_id: String,
    pub reference_kind: ReferenceKind,
    pub occurred_at: DateTime<Utc>,
}

/// One immutable ledger row.
///
/// `resulting_quantity == previous_quantity + quantity`, measured on the field
/// named by `pool`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub id: LedgerEntryId,
    pub stock_id: StockId,
    #[serde(flatten)]
    pub key: StockKey,
    pub transaction_type: TransactionType,
    pub pool: QuantityPool,
    /// Signed delta: positive increases the pool, negative decreases it.
    pub quantity: i64,
    pub previous_quantity: i64,
    pub resulting_quantity: i64,
    pub reason: String,
    pub notes: Option<String>,
    pub performed_by: UserId,
    pub transaction_date: DateTime<Utc>,
    pub reference_id: String,
    pub reference_type: ReferenceKind,
}

impl LedgerEntry {
    /// Build the ledger leg describing `movement` applied to `record`.
    pub fn record(id: LedgerEntryId, record: &StockRecord, movement: &Movement, ctx: &MovementContext) -> Self {
        Self {
            id,
            stock_id: record.id_typed(),
            key: *record.key(),
            transaction_type: movement.transaction_type,
            pool: movement.pool,
            quantity: movement.delta,
            previous_quantity: movement.previous,
            resulting_quantity: movement.resulting,
            reason: ctx.reason.clone(),
            notes: ctx.notes.clone(),
            performed_by: ctx.performed_by,
            transaction_date: ctx.occurred_at,
            reference_id: ctx.reference_id.clone(),
            reference_type: ctx.reference_kind,
        }
    }

    pub fn is_balanced(&self) -> bool {
        self.previous_quantity.checked_add(self.quantity) == Some(self.resulting_quantity)
    }
}
