use std::collections::{HashMap, HashSet};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::Utc;

use stockpile_core::{AggregateRoot, ExpectedVersion, LedgerEntryId, StockId};
use stockpile_inventory::{LedgerEntry, StockKey, StockRecord};

use super::r#trait::{
    Changeset, Committed, InventoryStore, LedgerStore, RecordWrite, StockStore, StoreError,
};
use crate::ledger_query::{self, LedgerPage, LedgerQuery};

#[derive(Debug, Default)]
struct State {
    records: HashMap<StockId, StockRecord>,
    by_key: HashMap<StockKey, StockId>,
    /// Append order.
    ledger: Vec<LedgerEntry>,
    references: HashSet<String>,
}

/// In-memory stock table + ledger.
///
/// A single lock guards records and ledger together, which makes every commit
/// atomic. Intended for tests/dev. Not optimized for performance.
#[derive(Debug, Default)]
pub struct InMemoryInventoryStore {
    state: RwLock<State>,
}

impl InMemoryInventoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every ledger entry in append order.
    pub fn ledger_entries(&self) -> Result<Vec<LedgerEntry>, StoreError> {
        Ok(self.read()?.ledger.clone())
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, State>, StoreError> {
        self.state
            .read()
            .map_err(|_| StoreError::Backend("lock poisoned".to_string()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, State>, StoreError> {
        self.state
            .write()
            .map_err(|_| StoreError::Backend("lock poisoned".to_string()))
    }
}

impl State {
    fn stored_version(&self, id: StockId) -> u64 {
        self.records.get(&id).map(|r| r.version()).unwrap_or(0)
    }

    fn check_existing(&self, record: &StockRecord, expected: ExpectedVersion) -> Result<(), StoreError> {
        let id = record.id_typed();
        let stored = self
            .records
            .get(&id)
            .ok_or_else(|| StoreError::Concurrency(format!("stock record {id} no longer exists")))?;

        if !expected.matches(stored.version()) {
            return Err(StoreError::Concurrency(format!(
                "stock record {id}: expected {expected:?}, found {}",
                stored.version()
            )));
        }
        if stored.key() != record.key() {
            return Err(StoreError::InvalidWrite(format!("stock record {id}: key cannot change")));
        }
        Ok(())
    }

    /// Validate the whole changeset before touching anything.
    fn validate(&self, changeset: &Changeset) -> Result<(), StoreError> {
        let mut ids = HashSet::new();
        let mut keys = HashSet::new();

        for write in &changeset.writes {
            let record = write.record();
            if !ids.insert(record.id_typed()) || !keys.insert(*record.key()) {
                return Err(StoreError::InvalidWrite(format!(
                    "stock record {} written twice in one commit",
                    record.id_typed()
                )));
            }
            record
                .check_invariants()
                .map_err(|e| StoreError::InvalidWrite(e.to_string()))?;

            match write {
                RecordWrite::Insert(record) => {
                    if self.records.contains_key(&record.id_typed()) {
                        return Err(StoreError::Concurrency(format!(
                            "stock record {} already exists",
                            record.id_typed()
                        )));
                    }
                    if self.by_key.contains_key(record.key()) {
                        return Err(StoreError::Concurrency(format!(
                            "stock key {} already exists",
                            record.key()
                        )));
                    }
                }
                RecordWrite::Update { record, expected } => self.check_existing(record, *expected)?,
                RecordWrite::Delete { record, expected } => {
                    self.check_existing(record, *expected)?;
                    if !record.is_empty() {
                        return Err(StoreError::InvalidWrite(format!(
                            "stock record {} still holds stock",
                            record.id_typed()
                        )));
                    }
                }
            }
        }

        for entry in &changeset.ledger {
            if !entry.is_balanced() {
                return Err(StoreError::InvalidWrite(format!(
                    "ledger entry {} does not balance",
                    entry.id
                )));
            }
        }

        if let Some(reference) = &changeset.unique_reference {
            if self.references.contains(reference) {
                return Err(StoreError::DuplicateReference(reference.clone()));
            }
        }

        Ok(())
    }

    fn put(&mut self, record: StockRecord) -> StockRecord {
        let version = self.stored_version(record.id_typed()) + 1;
        let stamped = record.stamped(version);
        self.by_key.insert(*stamped.key(), stamped.id_typed());
        self.records.insert(stamped.id_typed(), stamped.clone());
        stamped
    }

    fn remove(&mut self, id: StockId) {
        if let Some(record) = self.records.remove(&id) {
            self.by_key.remove(record.key());
        }
    }

    fn push_entry(&mut self, entry: LedgerEntry) {
        self.references.insert(entry.reference_id.clone());
        self.ledger.push(entry);
    }

    fn apply(&mut self, changeset: Changeset) -> Committed {
        let mut records = Vec::new();
        let mut deleted = Vec::new();

        for write in changeset.writes {
            match write {
                RecordWrite::Insert(record) | RecordWrite::Update { record, .. } => {
                    records.push(self.put(record));
                }
                RecordWrite::Delete { record, .. } => {
                    self.remove(record.id_typed());
                    deleted.push(record.id_typed());
                }
            }
        }

        if let Some(reference) = changeset.unique_reference {
            self.references.insert(reference);
        }
        for entry in &changeset.ledger {
            self.push_entry(entry.clone());
        }

        Committed {
            records,
            deleted,
            ledger: changeset.ledger,
        }
    }
}

impl StockStore for InMemoryInventoryStore {
    fn get(&self, id: StockId) -> Result<Option<StockRecord>, StoreError> {
        Ok(self.read()?.records.get(&id).cloned())
    }

    fn find_by_key(&self, key: &StockKey) -> Result<Option<StockRecord>, StoreError> {
        let state = self.read()?;
        Ok(state.by_key.get(key).and_then(|id| state.records.get(id)).cloned())
    }

    fn find_or_create(&self, key: &StockKey) -> Result<StockRecord, StoreError> {
        Ok(self
            .find_by_key(key)?
            .unwrap_or_else(|| StockRecord::new(StockId::new(), *key, Utc::now())))
    }

    fn upsert(&self, record: StockRecord, expected: ExpectedVersion) -> Result<StockRecord, StoreError> {
        record
            .check_invariants()
            .map_err(|e| StoreError::InvalidWrite(e.to_string()))?;

        let mut state = self.write()?;
        let id = record.id_typed();
        let actual = state.stored_version(id);
        if !expected.matches(actual) {
            return Err(StoreError::Concurrency(format!(
                "stock record {id}: expected {expected:?}, found {actual}"
            )));
        }

        match state.records.get(&id) {
            Some(stored) if stored.key() != record.key() => {
                return Err(StoreError::InvalidWrite(format!("stock record {id}: key cannot change")));
            }
            Some(_) => {}
            None => {
                if state.by_key.contains_key(record.key()) {
                    return Err(StoreError::Concurrency(format!(
                        "stock key {} already exists",
                        record.key()
                    )));
                }
            }
        }

        Ok(state.put(record))
    }

    fn delete(&self, id: StockId, expected: ExpectedVersion) -> Result<(), StoreError> {
        let mut state = self.write()?;
        let stored = state
            .records
            .get(&id)
            .ok_or_else(|| StoreError::InvalidWrite(format!("stock record {id} does not exist")))?;

        if !expected.matches(stored.version()) {
            return Err(StoreError::Concurrency(format!(
                "stock record {id}: expected {expected:?}, found {}",
                stored.version()
            )));
        }
        if !stored.is_empty() {
            return Err(StoreError::InvalidWrite(format!("stock record {id} still holds stock")));
        }

        state.remove(id);
        Ok(())
    }

    fn list(&self) -> Result<Vec<StockRecord>, StoreError> {
        Ok(self.read()?.records.values().cloned().collect())
    }
}

impl LedgerStore for InMemoryInventoryStore {
    fn append(&self, entry: LedgerEntry) -> Result<LedgerEntryId, StoreError> {
        if !entry.is_balanced() {
            return Err(StoreError::InvalidWrite(format!(
                "ledger entry {} does not balance",
                entry.id
            )));
        }
        let id = entry.id;
        self.write()?.push_entry(entry);
        Ok(id)
    }

    fn query(&self, query: &LedgerQuery) -> Result<LedgerPage, StoreError> {
        let state = self.read()?;
        ledger_query::run(&state.ledger, query)
    }

    fn by_reference(&self, reference_id: &str) -> Result<Vec<LedgerEntry>, StoreError> {
        Ok(self
            .read()?
            .ledger
            .iter()
            .filter(|e| e.reference_id == reference_id)
            .cloned()
            .collect())
    }
}

impl InventoryStore for InMemoryInventoryStore {
    fn commit(&self, changeset: Changeset) -> Result<Committed, StoreError> {
        let mut state = self.write()?;
        state.validate(&changeset)?;
        Ok(state.apply(changeset))
    }
}
