//! Threshold notifications.
//!
//! Alerts are handed to an injected [`Notifier`] after a mutation commits.
//! Delivery is fire-and-forget: the engine logs a failed notification and moves on.

use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

use stockpile_core::{ProductId, StockId};
use stockpile_inventory::{Severity, StockStatus};

/// One threshold crossing observed after a committed write.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockAlert {
    /// out_of_stock, low_stock or over_stock.
    pub status: StockStatus,
    pub severity: Severity,
    pub stock_id: StockId,
    pub product_id: ProductId,
    pub product_name: String,
    pub part_no: String,
    /// Available quantity after the write (0 for a deleted record).
    pub current_stock: i64,
    /// min level for out/low alerts, max level for over alerts.
    pub threshold: i64,
    pub location_name: String,
    pub room_name: Option<String>,
    pub rack_name: Option<String>,
    pub raised_at: DateTime<Utc>,
}

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("notification delivery failed: {0}")]
    Delivery(String),
}

pub trait Notifier: Send + Sync {
    fn notify(&self, alert: &StockAlert) -> Result<(), NotifyError>;
}

impl<N> Notifier for Arc<N>
where
    N: Notifier + ?Sized,
{
    fn notify(&self, alert: &StockAlert) -> Result<(), NotifyError> {
        (**self).notify(alert)
    }
}

/// Writes alerts to the tracing pipeline.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, alert: &StockAlert) -> Result<(), NotifyError> {
        match alert.severity {
            Severity::Critical | Severity::Warning => warn!(
                status = %alert.status,
                severity = ?alert.severity,
                stock_id = %alert.stock_id,
                product = %alert.product_name,
                part_no = %alert.part_no,
                current_stock = alert.current_stock,
                threshold = alert.threshold,
                location = %alert.location_name,
                "stock alert"
            ),
            Severity::Info => info!(
                status = %alert.status,
                stock_id = %alert.stock_id,
                product = %alert.product_name,
                current_stock = alert.current_stock,
                threshold = alert.threshold,
                location = %alert.location_name,
                "stock alert"
            ),
        }
        Ok(())
    }
}

/// Inbox for tests and the API's notification feed.
#[derive(Debug, Default)]
pub struct InMemoryNotifier {
    inner: Mutex<Vec<StockAlert>>,
}

impl InMemoryNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn all(&self) -> Vec<StockAlert> {
        match self.inner.lock() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

impl Notifier for InMemoryNotifier {
    fn notify(&self, alert: &StockAlert) -> Result<(), NotifyError> {
        self.inner
            .lock()
            .map_err(|_| NotifyError::Delivery("inbox lock poisoned".to_string()))?
            .push(alert.clone());
        Ok(())
    }
}

/// Delivers to every inner notifier; reports the first failure after trying all.
#[derive(Default)]
pub struct FanoutNotifier {
    targets: Vec<Arc<dyn Notifier>>,
}

impl FanoutNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, target: Arc<dyn Notifier>) -> Self {
        self.targets.push(target);
        self
    }
}

impl core::fmt::Debug for FanoutNotifier {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("FanoutNotifier")
            .field("targets", &self.targets.len())
            .finish()
    }
}

impl Notifier for FanoutNotifier {
    fn notify(&self, alert: &StockAlert) -> Result<(), NotifyError> {
        let mut first_error = None;
        for target in &self.targets {
            if let Err(e) = target.notify(alert) {
                first_error.get_or_insert(e);
            }
        }
        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Broken;

    impl Notifier for Broken {
        fn notify(&self, _alert: &StockAlert) -> Result<(), NotifyError> {
            Err(NotifyError::Delivery("smtp down".to_string()))
        }
    }

    fn alert() -> StockAlert {
        StockAlert {
            status: StockStatus::LowStock,
            severity: Severity::Info,
            stock_id: StockId::new(),
            product_id: ProductId::new(),
            product_name: "Bolt".to_string(),
            part_no: "B-1".to_string(),
            current_stock: 4,
            threshold: 5,
            location_name: "Main".to_string(),
            room_name: None,
            rack_name: None,
            raised_at: Utc::now(),
        }
    }

    #[test]
    fn fanout_delivers_past_a_failing_target() {
        let inbox = Arc::new(InMemoryNotifier::new());
        let fanout = FanoutNotifier::new()
            .with(Arc::new(Broken))
            .with(inbox.clone())
            .with(Arc::new(TracingNotifier));

        assert!(fanout.notify(&alert()).is_err());
        assert_eq!(inbox.all().len(), 1);
    }

    #[test]
    fn empty_fanout_is_ok() {
        assert!(FanoutNotifier::new().notify(&alert()).is_ok());
    }
}
