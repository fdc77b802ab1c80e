//! Mutation commands accepted by the inventory engine.
//!
//! Each command validates its own shape (`validate`) before any store access;
//! business rules that need the current record live on `StockRecord`.

use core::str::FromStr;

use serde::{Deserialize, Serialize};

use stockpile_core::{DomainError, LocationId, ProductId, RackId, RoomId, StockId, UserId};

use crate::error::{StockError, StockResult};
use crate::stock::StockKey;

/// How an adjustment changes the on-hand quantity.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdjustKind {
    Add,
    Subtract,
    /// Replace the quantity outright.
    Set,
}

impl FromStr for AdjustKind {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "add" => Ok(AdjustKind::Add),
            "subtract" => Ok(AdjustKind::Subtract),
            "set" => Ok(AdjustKind::Set),
            other => Err(DomainError::validation(format!(
                "adjustment type must be one of: add, subtract, set (got '{other}')"
            ))),
        }
    }
}

/// Command: AdjustStock.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdjustStock {
    pub stock_id: StockId,
    pub kind: AdjustKind,
    pub quantity: i64,
    pub reason: String,
    pub notes: Option<String>,
    pub performed_by: UserId,
}

impl AdjustStock {
    pub fn validate(&self) -> StockResult<()> {
        match self.kind {
            AdjustKind::Set if self.quantity < 0 => {
                return Err(StockError::validation("quantity cannot be negative"));
            }
            AdjustKind::Add | AdjustKind::Subtract => ensure_positive(self.quantity)?,
            AdjustKind::Set => {}
        }
        ensure_reason(&self.reason)
    }
}

/// Command: ReserveStock.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReserveStock {
    pub stock_id: StockId,
    pub quantity: i64,
    pub reason: String,
    pub performed_by: UserId,
    /// Caller-supplied id used to detect duplicate submission.
    pub reference_id: Option<String>,
}

impl ReserveStock {
    pub fn validate(&self) -> StockResult<()> {
        ensure_positive(self.quantity)?;
        ensure_reason(&self.reason)?;
        ensure_reference(self.reference_id.as_deref())
    }
}

/// Command: ReleaseStock.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReleaseStock {
    pub stock_id: StockId,
    pub quantity: i64,
    pub reason: String,
    pub performed_by: UserId,
    pub reference_id: Option<String>,
}

impl ReleaseStock {
    pub fn validate(&self) -> StockResult<()> {
        ensure_positive(self.quantity)?;
        ensure_reason(&self.reason)?;
        ensure_reference(self.reference_id.as_deref())
    }
}

/// Target of a transfer within the same product.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Destination {
    pub location_id: LocationId,
    pub room_id: Option<RoomId>,
    pub rack_id: Option<RackId>,
}

/// Command: TransferStock.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferStock {
    pub source_stock_id: StockId,
    pub quantity: i64,
    pub destination: Destination,
    /// When present, must match the source record's product.
    pub expected_product_id: Option<ProductId>,
    /// When present, must match the source record's location.
    pub expected_location_id: Option<LocationId>,
    pub performed_by: UserId,
    pub notes: Option<String>,
    pub reference_id: Option<String>,
}

impl TransferStock {
    pub fn validate(&self) -> StockResult<()> {
        ensure_positive(self.quantity)?;
        ensure_reference(self.reference_id.as_deref())
    }
}

/// Command: ReceiveStock (inward movement into a key, creating it if needed).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReceiveStock {
    pub key: StockKey,
    pub quantity: i64,
    pub reason: String,
    pub notes: Option<String>,
    pub performed_by: UserId,
    pub reference_id: Option<String>,
}

impl ReceiveStock {
    pub fn validate(&self) -> StockResult<()> {
        ensure_positive(self.quantity)?;
        ensure_reason(&self.reason)?;
        ensure_reference(self.reference_id.as_deref())
    }
}

/// Command: IssueStock (outward movement of unreserved units).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueStock {
    pub stock_id: StockId,
    pub quantity: i64,
    pub reason: String,
    pub notes: Option<String>,
    pub performed_by: UserId,
    pub reference_id: Option<String>,
}

impl IssueStock {
    pub fn validate(&self) -> StockResult<()> {
        ensure_positive(self.quantity)?;
        ensure_reason(&self.reason)?;
        ensure_reference(self.reference_id.as_deref())
    }
}

fn ensure_positive(quantity: i64) -> StockResult<()> {
    if quantity <= 0 {
        return Err(StockError::validation("quantity must be positive"));
    }
    Ok(())
}

fn ensure_reason(reason: &str) -> StockResult<()> {
    if reason.trim().is_empty() {
        return Err(StockError::validation("reason cannot be empty"));
    }
    Ok(())
}

fn ensure_reference(reference_id: Option<&str>) -> StockResult<()> {
    match reference_id {
        Some(r) if r.trim().is_empty() => Err(StockError::validation("reference_id cannot be blank")),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn adjust(kind: AdjustKind, quantity: i64, reason: &str) -> AdjustStock {
        AdjustStock {
            stock_id: StockId::new(),
            kind,
            quantity,
            reason: reason.to_string(),
            notes: None,
            performed_by: UserId::new(),
        }
    }

    #[test]
    fn set_accepts_zero_but_add_does_not() {
        assert!(adjust(AdjustKind::Set, 0, "recount").validate().is_ok());
        assert!(adjust(AdjustKind::Add, 0, "recount").validate().is_err());
        assert!(adjust(AdjustKind::Set, -1, "recount").validate().is_err());
    }

    #[test]
    fn blank_reason_is_rejected() {
        let err = adjust(AdjustKind::Add, 1, "   ").validate().unwrap_err();
        assert_eq!(err, StockError::validation("reason cannot be empty"));
    }

    #[test]
    fn blank_reference_is_rejected() {
        let cmd = ReserveStock {
            stock_id: StockId::new(),
            quantity: 1,
            reason: "order 17".to_string(),
            performed_by: UserId::new(),
            reference_id: Some(String::new()),
        };
        assert!(cmd.validate().is_err());
    }

    #[test]
    fn adjust_kind_parses() {
        assert_eq!("SUBTRACT".parse::<AdjustKind>().unwrap(), AdjustKind::Subtract);
        assert!("multiply".parse::<AdjustKind>().is_err());
    }
}
