//! Stock status classification against product thresholds.
//!
//! Classification is a pure function of the available quantity and the product's
//! min/max levels. The same single-label result drives listing filters, global
//! status counts and notification triggers.

use core::str::FromStr;

use serde::{Deserialize, Serialize};

use stockpile_core::DomainError;

use crate::stock::StockRecord;

/// Product-level stock thresholds. `0` means "not configured".
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StockThresholds {
    pub min_stock_level: i64,
    pub max_stock_level: i64,
}

impl StockThresholds {
    pub fn new(min_stock_level: i64, max_stock_level: i64) -> Self {
        Self {
            min_stock_level,
            max_stock_level,
        }
    }

    pub fn is_out_of_stock(&self, available: i64) -> bool {
        available <= 0
    }

    pub fn is_low_stock(&self, available: i64) -> bool {
        self.min_stock_level > 0 && available > 0 && available < self.min_stock_level
    }

    pub fn is_over_stock(&self, available: i64) -> bool {
        self.max_stock_level > 0 && available > self.max_stock_level
    }

    pub fn is_in_stock(&self, available: i64) -> bool {
        available > 0
            && (self.min_stock_level == 0 || available >= self.min_stock_level)
            && (self.max_stock_level == 0 || available <= self.max_stock_level)
    }
}

/// Derived stock status (never stored).
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StockStatus {
    OutOfStock,
    LowStock,
    OverStock,
    InStock,
}

impl StockStatus {
    /// All statuses in precedence order.
    pub const ALL: [StockStatus; 4] = [
        StockStatus::OutOfStock,
        StockStatus::LowStock,
        StockStatus::OverStock,
        StockStatus::InStock,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            StockStatus::OutOfStock => "out_of_stock",
            StockStatus::LowStock => "low_stock",
            StockStatus::OverStock => "over_stock",
            StockStatus::InStock => "in_stock",
        }
    }

    /// Whether this status should raise a notification.
    pub fn is_alert(&self) -> bool {
        !matches!(self, StockStatus::InStock)
    }
}

impl core::fmt::Display for StockStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StockStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        StockStatus::ALL
            .into_iter()
            .find(|st| st.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| DomainError::validation(format!("unknown stock status '{s}'")))
    }
}

/// Urgency attached to an alerting status.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Info,
    Warning,
    Critical,
}

/// Status plus severity for one record.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Classification {
    pub status: StockStatus,
    pub severity: Option<Severity>,
}

/// Single-label classification.
///
/// Precedence: out_of_stock > low_stock > over_stock > in_stock. The only overlap
/// between predicates (low and over at once) needs `max < min`, a misconfigured
/// product; it reports as low_stock.
pub fn classify(available: i64, thresholds: &StockThresholds) -> StockStatus {
    if thresholds.is_out_of_stock(available) {
        StockStatus::OutOfStock
    } else if thresholds.is_low_stock(available) {
        StockStatus::LowStock
    } else if thresholds.is_over_stock(available) {
        StockStatus::OverStock
    } else {
        StockStatus::InStock
    }
}

/// Severity of `status` at `available` units.
///
/// - low_stock: critical at <= 25% of min, warning at <= 50%, else info
/// - over_stock: warning at >= 200% of max, else info
/// - out_of_stock: always critical
pub fn severity(status: StockStatus, available: i64, thresholds: &StockThresholds) -> Option<Severity> {
    let available = i128::from(available);
    let min = i128::from(thresholds.min_stock_level);
    let max = i128::from(thresholds.max_stock_level);

    match status {
        StockStatus::InStock => None,
        StockStatus::OutOfStock => Some(Severity::Critical),
        StockStatus::LowStock => Some(if available * 4 <= min {
            Severity::Critical
        } else if available * 2 <= min {
            Severity::Warning
        } else {
            Severity::Info
        }),
        StockStatus::OverStock => Some(if available >= max * 2 {
            Severity::Warning
        } else {
            Severity::Info
        }),
    }
}

/// Classify a stock record by its available quantity.
pub fn assess(record: &StockRecord, thresholds: &StockThresholds) -> Classification {
    assess_available(record.available_quantity(), thresholds)
}

pub fn assess_available(available: i64, thresholds: &StockThresholds) -> Classification {
    let status = classify(available, thresholds);
    Classification {
        status,
        severity: severity(status, available, thresholds),
    }
}
