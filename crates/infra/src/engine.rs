//! Mutation engine: the only write path for stock quantities.
//!
//! Every operation follows the same pipeline:
//!
//! ```text
//! Command
//!   ↓
//! 1. Validate the command (no store access)
//!   ↓
//! 2. Read the affected record(s) and require the product in the catalog
//!   ↓
//! 3. Decide: pure `StockRecord` methods produce a `Movement` or a business error
//!   ↓
//! 4. Apply the movement(s) and build the ledger entries
//!   ↓
//! 5. Commit records + ledger in one atomic changeset (optimistic versions)
//!   ↓
//! 6. Classify every affected record and hand threshold alerts to the notifier
//! ```
//!
//! A commit that loses an optimistic race (stale version, key created
//! concurrently) writes nothing; the engine goes back to step 2, up to
//! `max_retries` more times, and then surfaces `ConcurrencyConflict`.
//!
//! Notification failures are logged and dropped. Every other failure is
//! returned to the caller, and a failed operation leaves no trace in the store.

use chrono::Utc;
use thiserror::Error;
use tracing::{debug, info, instrument, warn};

use stockpile_core::{DomainError, LedgerEntryId, LocationId, ProductId, StockId, UserId};
use stockpile_inventory::{
    AdjustStock, IssueStock, LedgerEntry, Movement, MovementContext, ReceiveStock, ReferenceKind,
    ReleaseStock, ReserveStock, StockError, StockRecord, StockResult, StockStatus, TransferStock,
    assess,
};

use crate::catalog::{Catalog, ProductInfo};
use crate::config::EngineConfig;
use crate::notifier::{Notifier, StockAlert};
use crate::reference::{ReferenceIdGenerator, UuidReferenceIds};
use crate::stock_store::{Changeset, Committed, InventoryStore, RecordWrite, StoreError};

/// Error surfaced by [`MutationEngine`] operations.
///
/// - **Validation**: malformed command, rejected before the store is touched
/// - **NotFound**: stock record or product does not exist
/// - **business rules** (`InsufficientStock` .. `NoopTransfer`): rejected after the read, before any write
/// - **DuplicateSubmission**: the caller's reference id was already committed
/// - **ConcurrencyConflict**: every attempt lost an optimistic race
/// - **Storage**: the backend failed
#[derive(Debug, Error)]
pub enum MutationError {
    #[error("validation failed: {0}")]
    Validation(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("insufficient stock: requested {requested}, only {available} on hand")]
    InsufficientStock { requested: i64, available: i64 },

    #[error("insufficient available stock: requested {requested}, only {available} available")]
    InsufficientAvailableStock { requested: i64, available: i64 },

    #[error("cannot release {requested}: only {reserved} reserved")]
    ExcessiveRelease { requested: i64, reserved: i64 },

    #[error("quantity {quantity} would fall below reserved quantity {reserved}")]
    ReservedExceedsQuantity { quantity: i64, reserved: i64 },

    #[error("product mismatch: expected {expected}, stock record holds {actual}")]
    ProductMismatch { expected: ProductId, actual: ProductId },

    #[error("location mismatch: expected {expected}, stock record is at {actual}")]
    LocationMismatch { expected: LocationId, actual: LocationId },

    #[error("source and destination are the same stock key")]
    NoopTransfer,

    #[error("reference id '{0}' was already submitted")]
    DuplicateSubmission(String),

    #[error("concurrent modification after {attempts} attempt(s): {message}")]
    ConcurrencyConflict { attempts: u32, message: String },

    #[error("invariant violated: {0}")]
    InvariantViolation(String),

    #[error("storage failure: {0}")]
    Storage(#[source] StoreError),
}

impl MutationError {
    /// Stable machine-readable code.
    pub fn code(&self) -> &'static str {
        match self {
            MutationError::Validation(_) => "validation_error",
            MutationError::NotFound(_) => "not_found",
            MutationError::InsufficientStock { .. } => "insufficient_stock",
            MutationError::InsufficientAvailableStock { .. } => "insufficient_available_stock",
            MutationError::ExcessiveRelease { .. } => "excessive_release",
            MutationError::ReservedExceedsQuantity { .. } => "reserved_exceeds_quantity",
            MutationError::ProductMismatch { .. } => "product_mismatch",
            MutationError::LocationMismatch { .. } => "location_mismatch",
            MutationError::NoopTransfer => "noop_transfer",
            MutationError::DuplicateSubmission(_) => "duplicate_submission",
            MutationError::ConcurrencyConflict { .. } => "concurrency_conflict",
            MutationError::InvariantViolation(_) => "invariant_violation",
            MutationError::Storage(_) => "storage_error",
        }
    }

    fn stock_not_found(id: StockId) -> Self {
        MutationError::NotFound(format!("stock record {id}"))
    }
}

impl From<StockError> for MutationError {
    fn from(value: StockError) -> Self {
        match value {
            StockError::Validation(msg) => MutationError::Validation(msg),
            StockError::InsufficientStock { requested, available } => {
                MutationError::InsufficientStock { requested, available }
            }
            StockError::InsufficientAvailableStock { requested, available } => {
                MutationError::InsufficientAvailableStock { requested, available }
            }
            StockError::ExcessiveRelease { requested, reserved } => {
                MutationError::ExcessiveRelease { requested, reserved }
            }
            StockError::ReservedExceedsQuantity { quantity, reserved } => {
                MutationError::ReservedExceedsQuantity { quantity, reserved }
            }
            StockError::ProductMismatch { expected, actual } => MutationError::ProductMismatch { expected, actual },
            StockError::LocationMismatch { expected, actual } => MutationError::LocationMismatch { expected, actual },
            StockError::NoopTransfer => MutationError::NoopTransfer,
            StockError::InvariantViolation(msg) => MutationError::InvariantViolation(msg),
        }
    }
}

impl From<StoreError> for MutationError {
    fn from(value: StoreError) -> Self {
        match value {
            StoreError::Concurrency(message) => MutationError::ConcurrencyConflict { attempts: 1, message },
            StoreError::DuplicateReference(reference) => MutationError::DuplicateSubmission(reference),
            StoreError::InvalidQuery(msg) => MutationError::Validation(msg),
            StoreError::InvalidWrite(msg) => MutationError::InvariantViolation(msg),
            backend @ StoreError::Backend(_) => MutationError::Storage(backend),
        }
    }
}

impl From<DomainError> for MutationError {
    fn from(value: DomainError) -> Self {
        match value {
            DomainError::Validation(msg) | DomainError::InvalidId(msg) => MutationError::Validation(msg),
        }
    }
}

/// Result of a single-record mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MutationOutcome {
    pub reference_id: String,
    /// Final state of the record; carries the committed version unless `deleted`.
    pub record: StockRecord,
    /// The write emptied the record and removed it.
    pub deleted: bool,
    pub entry: LedgerEntry,
}

/// Result of a transfer: both legs share `reference_id`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferOutcome {
    pub reference_id: String,
    pub source: StockRecord,
    pub source_deleted: bool,
    pub destination: StockRecord,
    pub outbound: LedgerEntry,
    pub inbound: LedgerEntry,
}

/// Who/why of an operation, before a reference id and timestamp are attached.
struct Audit {
    reason: String,
    notes: Option<String>,
    performed_by: UserId,
    reference_kind: ReferenceKind,
}

/// One attempt's worth of decided writes.
struct Plan {
    changeset: Changeset,
    /// Final state of every written record (deleted ones included).
    affected: Vec<StockRecord>,
    product: ProductInfo,
}

/// Validates and applies stock mutations against an [`InventoryStore`].
///
/// ## Generic Parameters
///
/// - `S`: record + ledger store (`InMemoryInventoryStore` in tests)
/// - `C`: catalog used to require products and name places in alerts
/// - `N`: notifier receiving threshold alerts
/// - `G`: reference id generator
#[derive(Debug)]
pub struct MutationEngine<S, C, N, G = UuidReferenceIds> {
    store: S,
    catalog: C,
    notifier: N,
    reference_ids: G,
    config: EngineConfig,
}

impl<S, C, N> MutationEngine<S, C, N, UuidReferenceIds> {
    pub fn new(store: S, catalog: C, notifier: N) -> Self {
        Self {
            store,
            catalog,
            notifier,
            reference_ids: UuidReferenceIds,
            config: EngineConfig::default(),
        }
    }
}

impl<S, C, N, G> MutationEngine<S, C, N, G> {
    pub fn with_reference_ids<G2>(self, reference_ids: G2) -> MutationEngine<S, C, N, G2> {
        MutationEngine {
            store: self.store,
            catalog: self.catalog,
            notifier: self.notifier,
            reference_ids,
            config: self.config,
        }
    }

    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn store(&self) -> &S {
        &self.store
    }
}

impl<S, C, N, G> MutationEngine<S, C, N, G>
where
    S: InventoryStore,
    C: Catalog,
    N: Notifier,
    G: ReferenceIdGenerator,
{
    /// Manual correction of the on-hand quantity (add, subtract or set).
    #[instrument(skip_all, fields(stock_id = %cmd.stock_id, kind = ?cmd.kind, quantity = cmd.quantity))]
    pub fn adjust(&self, cmd: AdjustStock) -> Result<MutationOutcome, MutationError> {
        cmd.validate()?;
        let audit = Audit {
            reason: cmd.reason.trim().to_string(),
            notes: cmd.notes.clone(),
            performed_by: cmd.performed_by,
            reference_kind: ReferenceKind::Adjustment,
        };
        self.mutate_one(
            "adjust",
            None,
            audit,
            || self.load(cmd.stock_id),
            |record| record.adjust(cmd.kind, cmd.quantity),
        )
    }

    /// Hold units of available stock.
    #[instrument(skip_all, fields(stock_id = %cmd.stock_id, quantity = cmd.quantity))]
    pub fn reserve(&self, cmd: ReserveStock) -> Result<MutationOutcome, MutationError> {
        cmd.validate()?;
        let audit = Audit {
            reason: cmd.reason.trim().to_string(),
            notes: None,
            performed_by: cmd.performed_by,
            reference_kind: ReferenceKind::Reservation,
        };
        self.mutate_one(
            "reserve",
            cmd.reference_id.clone(),
            audit,
            || self.load(cmd.stock_id),
            |record| record.reserve(cmd.quantity),
        )
    }

    /// Give back previously reserved units.
    #[instrument(skip_all, fields(stock_id = %cmd.stock_id, quantity = cmd.quantity))]
    pub fn release(&self, cmd: ReleaseStock) -> Result<MutationOutcome, MutationError> {
        cmd.validate()?;
        let audit = Audit {
            reason: cmd.reason.trim().to_string(),
            notes: None,
            performed_by: cmd.performed_by,
            reference_kind: ReferenceKind::Release,
        };
        self.mutate_one(
            "release",
            cmd.reference_id.clone(),
            audit,
            || self.load(cmd.stock_id),
            |record| record.release(cmd.quantity),
        )
    }

    /// Inward movement: goods arrive at a key, creating its record if needed.
    #[instrument(skip_all, fields(key = %cmd.key, quantity = cmd.quantity))]
    pub fn receive(&self, cmd: ReceiveStock) -> Result<MutationOutcome, MutationError> {
        cmd.validate()?;
        let audit = Audit {
            reason: cmd.reason.trim().to_string(),
            notes: cmd.notes.clone(),
            performed_by: cmd.performed_by,
            reference_kind: ReferenceKind::Receipt,
        };
        self.mutate_one(
            "receive",
            cmd.reference_id.clone(),
            audit,
            || Ok(self.store.find_or_create(&cmd.key)?),
            |record| record.receive(cmd.quantity),
        )
    }

    /// Outward movement: unreserved goods leave.
    #[instrument(skip_all, fields(stock_id = %cmd.stock_id, quantity = cmd.quantity))]
    pub fn issue(&self, cmd: IssueStock) -> Result<MutationOutcome, MutationError> {
        cmd.validate()?;
        let audit = Audit {
            reason: cmd.reason.trim().to_string(),
            notes: cmd.notes.clone(),
            performed_by: cmd.performed_by,
            reference_kind: ReferenceKind::Issue,
        };
        self.mutate_one(
            "issue",
            cmd.reference_id.clone(),
            audit,
            || self.load(cmd.stock_id),
            |record| record.issue(cmd.quantity),
        )
    }

    /// Move units between two keys of the same product in one commit.
    ///
    /// The destination is resolved by exact key (absent room/rack included) and
    /// created when missing. The source is removed if it ends up empty.
    #[instrument(skip_all, fields(source = %cmd.source_stock_id, quantity = cmd.quantity))]
    pub fn transfer(&self, cmd: TransferStock) -> Result<TransferOutcome, MutationError> {
        cmd.validate()?;
        let (reference_id, unique_reference) = self.reference_for(ReferenceKind::Transfer, cmd.reference_id.clone())?;

        let (committed, affected) = self.execute("transfer", || {
            let source_read = self.load(cmd.source_stock_id)?;

            if let Some(expected) = cmd.expected_product_id {
                if expected != source_read.product_id() {
                    return Err(StockError::ProductMismatch {
                        expected,
                        actual: source_read.product_id(),
                    }
                    .into());
                }
            }
            if let Some(expected) = cmd.expected_location_id {
                if expected != source_read.location_id() {
                    return Err(StockError::LocationMismatch {
                        expected,
                        actual: source_read.location_id(),
                    }
                    .into());
                }
            }

            let product = self.require_product(source_read.product_id())?;
            let outbound = source_read.transfer_out(cmd.quantity)?;

            let destination_key = source_read.key().relocated(&cmd.destination);
            if &destination_key == source_read.key() {
                return Err(MutationError::NoopTransfer);
            }
            let destination_read = self.store.find_or_create(&destination_key)?;
            let inbound = destination_read.transfer_in(cmd.quantity)?;

            let now = Utc::now();
            let context = MovementContext {
                reason: format!("transfer to {destination_key}"),
                notes: cmd.notes.clone(),
                performed_by: cmd.performed_by,
                reference_id: reference_id.clone(),
                reference_kind: ReferenceKind::Transfer,
                occurred_at: now,
            };

            let mut source = source_read.clone();
            source.apply(&outbound, now)?;
            let mut destination = destination_read.clone();
            destination.apply(&inbound, now)?;

            let ledger = vec![
                LedgerEntry::record(LedgerEntryId::new(), &source, &outbound, &context),
                LedgerEntry::record(LedgerEntryId::new(), &destination, &inbound, &context),
            ];
            let delete_empty = self.config.delete_empty_records;
            let changeset = Changeset {
                writes: vec![
                    RecordWrite::for_transition(&source_read, source.clone(), delete_empty),
                    RecordWrite::for_transition(&destination_read, destination.clone(), delete_empty),
                ],
                ledger,
                unique_reference: unique_reference.clone(),
            }
            .sorted();

            Ok(Plan {
                changeset,
                affected: vec![source, destination],
                product,
            })
        })?;

        let [source, destination] = affected.try_into().map_err(|_| {
            MutationError::InvariantViolation("transfer must affect exactly two records".to_string())
        })?;
        let source_deleted = committed.deleted.contains(&source.id_typed());
        let source = committed.record(source.id_typed()).cloned().unwrap_or(source);
        let destination = committed
            .record(destination.id_typed())
            .cloned()
            .unwrap_or(destination);

        let leg = |id: StockId| {
            committed
                .ledger
                .iter()
                .find(|e| e.stock_id == id)
                .cloned()
                .ok_or_else(|| MutationError::InvariantViolation(format!("missing transfer leg for {id}")))
        };
        let outbound = leg(source.id_typed())?;
        let inbound = leg(destination.id_typed())?;

        info!(
            reference_id = %reference_id,
            source = %source.id_typed(),
            destination = %destination.id_typed(),
            quantity = cmd.quantity,
            source_deleted,
            "stock transferred"
        );

        Ok(TransferOutcome {
            reference_id,
            source,
            source_deleted,
            destination,
            outbound,
            inbound,
        })
    }

    fn load(&self, id: StockId) -> Result<StockRecord, MutationError> {
        self.store.get(id)?.ok_or_else(|| MutationError::stock_not_found(id))
    }

    fn require_product(&self, id: ProductId) -> Result<ProductInfo, MutationError> {
        self.catalog
            .product(id)
            .ok_or_else(|| MutationError::NotFound(format!("product {id}")))
    }

    /// Reference id for one operation, plus the uniqueness guard when the caller chose it.
    fn reference_for(
        &self,
        kind: ReferenceKind,
        supplied: Option<String>,
    ) -> Result<(String, Option<String>), MutationError> {
        match supplied.map(|r| r.trim().to_string()) {
            Some(reference) => {
                if !self.store.by_reference(&reference)?.is_empty() {
                    return Err(MutationError::DuplicateSubmission(reference));
                }
                Ok((reference.clone(), Some(reference)))
            }
            None => Ok((self.reference_ids.generate(kind), None)),
        }
    }

    fn mutate_one(
        &self,
        operation: &'static str,
        supplied_reference: Option<String>,
        audit: Audit,
        load: impl Fn() -> Result<StockRecord, MutationError>,
        decide: impl Fn(&StockRecord) -> StockResult<Movement>,
    ) -> Result<MutationOutcome, MutationError> {
        let (reference_id, unique_reference) = self.reference_for(audit.reference_kind, supplied_reference)?;

        let (committed, affected) = self.execute(operation, || {
            let read = load()?;
            let product = self.require_product(read.product_id())?;
            let movement = decide(&read)?;

            let now = Utc::now();
            let mut next = read.clone();
            next.apply(&movement, now)?;

            let context = MovementContext {
                reason: audit.reason.clone(),
                notes: audit.notes.clone(),
                performed_by: audit.performed_by,
                reference_id: reference_id.clone(),
                reference_kind: audit.reference_kind,
                occurred_at: now,
            };
            let entry = LedgerEntry::record(LedgerEntryId::new(), &next, &movement, &context);

            Ok(Plan {
                changeset: Changeset {
                    writes: vec![RecordWrite::for_transition(
                        &read,
                        next.clone(),
                        self.config.delete_empty_records,
                    )],
                    ledger: vec![entry],
                    unique_reference: unique_reference.clone(),
                },
                affected: vec![next],
                product,
            })
        })?;

        let final_state = affected
            .into_iter()
            .next()
            .ok_or_else(|| MutationError::InvariantViolation(format!("{operation} affected no record")))?;
        let id = final_state.id_typed();
        let deleted = committed.deleted.contains(&id);
        let record = committed.record(id).cloned().unwrap_or(final_state);
        let entry = committed
            .ledger
            .into_iter()
            .next()
            .ok_or_else(|| MutationError::InvariantViolation(format!("{operation} wrote no ledger entry")))?;

        info!(
            operation,
            reference_id = %reference_id,
            stock_id = %id,
            delta = entry.quantity,
            quantity = record.quantity(),
            reserved = record.reserved_quantity(),
            deleted,
            "stock mutation committed"
        );

        Ok(MutationOutcome {
            reference_id,
            record,
            deleted,
            entry,
        })
    }

    /// Optimistic read → decide → commit loop.
    fn execute(
        &self,
        operation: &'static str,
        mut plan: impl FnMut() -> Result<Plan, MutationError>,
    ) -> Result<(Committed, Vec<StockRecord>), MutationError> {
        let attempts = self.config.max_retries.saturating_add(1);
        let mut last_conflict = String::new();

        for attempt in 1..=attempts {
            let Plan {
                changeset,
                affected,
                product,
            } = plan()?;

            match self.store.commit(changeset) {
                Ok(committed) => {
                    self.raise_alerts(&product, &affected);
                    return Ok((committed, affected));
                }
                Err(StoreError::Concurrency(message)) => {
                    debug!(operation, attempt, %message, "commit lost an optimistic race; retrying");
                    last_conflict = message;
                }
                Err(e) => return Err(e.into()),
            }
        }

        warn!(operation, attempts, message = %last_conflict, "giving up after repeated concurrency conflicts");
        Err(MutationError::ConcurrencyConflict {
            attempts,
            message: last_conflict,
        })
    }

    /// Classify each affected record and notify for out/low/over stock.
    fn raise_alerts(&self, product: &ProductInfo, affected: &[StockRecord]) {
        for record in affected {
            let classification = assess(record, &product.thresholds);
            let Some(severity) = classification.severity else {
                continue;
            };
            if !classification.status.is_alert() {
                continue;
            }

            let places = self.catalog.place_names(record.key());
            let threshold = match classification.status {
                StockStatus::OverStock => product.thresholds.max_stock_level,
                _ => product.thresholds.min_stock_level,
            };
            let alert = StockAlert {
                status: classification.status,
                severity,
                stock_id: record.id_typed(),
                product_id: product.product_id,
                product_name: product.name.clone(),
                part_no: product.part_no.clone(),
                current_stock: record.available_quantity(),
                threshold,
                location_name: places.location_name,
                room_name: places.room_name,
                rack_name: places.rack_name,
                raised_at: Utc::now(),
            };

            if let Err(e) = self.notifier.notify(&alert) {
                warn!(
                    stock_id = %alert.stock_id,
                    status = %alert.status,
                    error = %e,
                    "stock alert could not be delivered"
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use stockpile_core::AggregateRoot;
    use stockpile_inventory::{AdjustKind, StockKey};

    use crate::catalog::InMemoryCatalog;
    use crate::notifier::InMemoryNotifier;
    use crate::reference::SequentialReferenceIds;
    use crate::stock_store::{InMemoryInventoryStore, StockStore};

    type Engine = MutationEngine<
        Arc<InMemoryInventoryStore>,
        Arc<InMemoryCatalog>,
        Arc<InMemoryNotifier>,
        SequentialReferenceIds,
    >;

    fn engine() -> (Engine, ProductId, LocationId) {
        let catalog = Arc::new(InMemoryCatalog::new());
        let product = ProductId::new();
        let location = LocationId::new();
        catalog.upsert_product(ProductInfo::new(product, "Widget", "W-1").with_thresholds(5, 0));
        catalog.upsert_location(location, "Main");
        let engine = MutationEngine::new(
            Arc::new(InMemoryInventoryStore::new()),
            catalog,
            Arc::new(InMemoryNotifier::new()),
        )
        .with_reference_ids(SequentialReferenceIds::new());
        (engine, product, location)
    }

    fn receive(engine: &Engine, key: StockKey, quantity: i64) -> MutationOutcome {
        engine
            .receive(ReceiveStock {
                key,
                quantity,
                reason: "goods in".to_string(),
                notes: None,
                performed_by: UserId::new(),
                reference_id: None,
            })
            .unwrap()
    }

    #[test]
    fn validation_happens_before_store_access() {
        let (engine, _, _) = engine();
        let err = engine
            .adjust(AdjustStock {
                stock_id: StockId::new(),
                kind: AdjustKind::Add,
                quantity: 0,
                reason: "x".to_string(),
                notes: None,
                performed_by: UserId::new(),
            })
            .unwrap_err();
        assert!(matches!(err, MutationError::Validation(_)));
    }

    #[test]
    fn unknown_product_is_not_found() {
        let (engine, _, location) = engine();
        let err = engine
            .receive(ReceiveStock {
                key: StockKey::new(ProductId::new(), location),
                quantity: 1,
                reason: "goods in".to_string(),
                notes: None,
                performed_by: UserId::new(),
                reference_id: None,
            })
            .unwrap_err();
        assert_eq!(err.code(), "not_found");
        assert!(engine.store().list().unwrap().is_empty());
    }

    #[test]
    fn receive_creates_then_updates_record() {
        let (engine, product, location) = engine();
        let key = StockKey::new(product, location);

        let first = receive(&engine, key, 4);
        assert_eq!(first.reference_id, "RCV-000001");
        assert_eq!(first.record.version(), 1);

        let second = receive(&engine, key, 6);
        assert_eq!(second.record.id_typed(), first.record.id_typed());
        assert_eq!(second.record.quantity(), 10);
        assert_eq!(second.record.version(), 2);
        assert_eq!(second.entry.previous_quantity, 4);
    }

    #[test]
    fn low_stock_alert_after_receive() {
        let (engine, product, location) = engine();
        receive(&engine, StockKey::new(product, location), 2);

        let alerts = engine.notifier.all();
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].status, StockStatus::LowStock);
        assert_eq!(alerts[0].threshold, 5);
        assert_eq!(alerts[0].location_name, "Main");
    }

    #[test]
    fn store_error_mapping() {
        let err: MutationError = StoreError::DuplicateReference("RSV-1".to_string()).into();
        assert_eq!(err.code(), "duplicate_submission");
        let err: MutationError = StoreError::Backend("disk".to_string()).into();
        assert_eq!(err.code(), "storage_error");
    }
}
