use std::sync::Arc;

use thiserror::Error;

use stockpile_core::{AggregateRoot, ExpectedVersion, LedgerEntryId, StockId};
use stockpile_inventory::{LedgerEntry, StockKey, StockRecord};

use crate::ledger_query::{LedgerPage, LedgerQuery};

/// Store operation error.
///
/// These are **infrastructure errors** (storage, concurrency, malformed writes)
/// as opposed to business-rule failures, which are decided before a write is
/// ever attempted.
///
/// - **Concurrency**: a record changed (or appeared) since it was read
/// - **DuplicateReference**: a caller-supplied reference id was already committed
/// - **InvalidWrite**: the changeset itself is malformed (would break an invariant)
/// - **InvalidQuery**: a query could not be compiled
/// - **Backend**: I/O or lock failure; retryable
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("optimistic concurrency check failed: {0}")]
    Concurrency(String),

    #[error("reference id '{0}' already recorded")]
    DuplicateReference(String),

    #[error("invalid write: {0}")]
    InvalidWrite(String),

    #[error("invalid query: {0}")]
    InvalidQuery(String),

    #[error("storage backend failure: {0}")]
    Backend(String),
}

/// One record-level write inside a [`Changeset`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordWrite {
    /// Persist a record that must not exist yet (neither its id nor its key).
    Insert(StockRecord),
    /// Replace a record that must still be at `expected`.
    Update {
        record: StockRecord,
        expected: ExpectedVersion,
    },
    /// Remove a record that must still be at `expected`; `record` is its final,
    /// empty state.
    Delete {
        record: StockRecord,
        expected: ExpectedVersion,
    },
}

impl RecordWrite {
    pub fn record(&self) -> &StockRecord {
        match self {
            RecordWrite::Insert(record)
            | RecordWrite::Update { record, .. }
            | RecordWrite::Delete { record, .. } => record,
        }
    }

    pub fn key(&self) -> &StockKey {
        self.record().key()
    }

    /// Pick the write that persists `next`, given the `read` snapshot it evolved from.
    ///
    /// Records never persisted before are inserted; persisted records that end up
    /// empty are deleted when `delete_empty` is set.
    pub fn for_transition(read: &StockRecord, next: StockRecord, delete_empty: bool) -> Self {
        if read.version() == 0 {
            RecordWrite::Insert(next)
        } else if delete_empty && next.is_empty() {
            RecordWrite::Delete {
                record: next,
                expected: ExpectedVersion::of(read),
            }
        } else {
            RecordWrite::Update {
                record: next,
                expected: ExpectedVersion::of(read),
            }
        }
    }
}

/// Everything one mutation writes, applied all-or-nothing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Changeset {
    pub writes: Vec<RecordWrite>,
    pub ledger: Vec<LedgerEntry>,
    /// When set, the commit fails with `DuplicateReference` if any committed
    /// ledger entry already carries this reference id.
    pub unique_reference: Option<String>,
}

impl Changeset {
    /// Order writes by stock key so multi-record commits always touch records
    /// in the same global order.
    pub fn sorted(mut self) -> Self {
        self.writes.sort_by(|a, b| a.key().cmp(b.key()));
        self
    }
}

/// Result of a successful commit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Committed {
    /// Records as persisted (new versions), in write order; deleted records excluded.
    pub records: Vec<StockRecord>,
    pub deleted: Vec<StockId>,
    pub ledger: Vec<LedgerEntry>,
}

impl Committed {
    pub fn record(&self, id: StockId) -> Option<&StockRecord> {
        self.records.iter().find(|r| r.id_typed() == id)
    }
}

/// Stock record table.
///
/// Every write is a single-record atomic replace guarded by an
/// [`ExpectedVersion`]; the store assigns the next version on commit.
pub trait StockStore: Send + Sync {
    fn get(&self, id: StockId) -> Result<Option<StockRecord>, StoreError>;

    fn find_by_key(&self, key: &StockKey) -> Result<Option<StockRecord>, StoreError>;

    /// The record at `key`, or a fresh unsaved record (version 0) for it.
    ///
    /// A fresh record is persisted by the first commit that writes it.
    fn find_or_create(&self, key: &StockKey) -> Result<StockRecord, StoreError>;

    /// Persist `record` if the stored version (0 when absent) matches `expected`.
    fn upsert(&self, record: StockRecord, expected: ExpectedVersion) -> Result<StockRecord, StoreError>;

    /// Remove an empty record (quantity and reserved both 0).
    fn delete(&self, id: StockId, expected: ExpectedVersion) -> Result<(), StoreError>;

    fn list(&self) -> Result<Vec<StockRecord>, StoreError>;
}

/// Append-only ledger. No update or delete operations exist.
pub trait LedgerStore: Send + Sync {
    fn append(&self, entry: LedgerEntry) -> Result<LedgerEntryId, StoreError>;

    fn query(&self, query: &LedgerQuery) -> Result<LedgerPage, StoreError>;

    /// All entries correlated by one reference id, oldest first.
    fn by_reference(&self, reference_id: &str) -> Result<Vec<LedgerEntry>, StoreError>;
}

/// Combined store able to write records and ledger entries atomically.
pub trait InventoryStore: StockStore + LedgerStore {
    /// Apply every write and append every ledger entry, or nothing.
    ///
    /// Implementations must:
    /// - check each write's expected version against the stored record
    /// - reject inserts whose id or key already exists (as a concurrency error)
    /// - reject ledger entries that do not balance
    /// - enforce `unique_reference`
    /// - assign `version + 1` to every inserted/updated record
    fn commit(&self, changeset: Changeset) -> Result<Committed, StoreError>;
}

impl<S> StockStore for Arc<S>
where
    S: StockStore + ?Sized,
{
    fn get(&self, id: StockId) -> Result<Option<StockRecord>, StoreError> {
        (**self).get(id)
    }

    fn find_by_key(&self, key: &StockKey) -> Result<Option<StockRecord>, StoreError> {
        (**self).find_by_key(key)
    }

    fn find_or_create(&self, key: &StockKey) -> Result<StockRecord, StoreError> {
        (**self).find_or_create(key)
    }

    fn upsert(&self, record: StockRecord, expected: ExpectedVersion) -> Result<StockRecord, StoreError> {
        (**self).upsert(record, expected)
    }

    fn delete(&self, id: StockId, expected: ExpectedVersion) -> Result<(), StoreError> {
        (**self).delete(id, expected)
    }

    fn list(&self) -> Result<Vec<StockRecord>, StoreError> {
        (**self).list()
    }
}

impl<S> LedgerStore for Arc<S>
where
    S: LedgerStore + ?Sized,
{
    fn append(&self, entry: LedgerEntry) -> Result<LedgerEntryId, StoreError> {
        (**self).append(entry)
    }

    fn query(&self, query: &LedgerQuery) -> Result<LedgerPage, StoreError> {
        (**self).query(query)
    }

    fn by_reference(&self, reference_id: &str) -> Result<Vec<LedgerEntry>, StoreError> {
        (**self).by_reference(reference_id)
    }
}

impl<S> InventoryStore for Arc<S>
where
    S: InventoryStore + ?Sized,
{
    fn commit(&self, changeset: Changeset) -> Result<Committed, StoreError> {
        (**self).commit(changeset)
    }
}
