//! Ledger query interface for inspection and audit.
//!
//! Filters are typed (every field optional) and compiled once into a predicate;
//! results are sorted deterministically, paginated, and summarized per
//! transaction type.

use core::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use stockpile_core::{LocationId, ProductId, StockId};
use stockpile_inventory::{LedgerEntry, TransactionType};

use crate::query::{Pagination, SearchPattern, SortDirection};
use crate::stock_store::StoreError;

/// Filter criteria for ledger queries.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerFilter {
    pub product_id: Option<ProductId>,
    pub location_id: Option<LocationId>,
    pub stock_id: Option<StockId>,
    pub transaction_type: Option<TransactionType>,
    pub reference_id: Option<String>,
    /// Inclusive lower bound on `transaction_date`.
    pub from: Option<DateTime<Utc>>,
    /// Exclusive upper bound on `transaction_date`.
    pub to: Option<DateTime<Utc>>,
    /// Free text over reason, notes and reference id.
    pub search: Option<String>,
}

impl LedgerFilter {
    /// Build the predicate this filter describes.
    pub fn compile(&self) -> Result<LedgerPredicate, StoreError> {
        if let (Some(from), Some(to)) = (self.from, self.to) {
            if from > to {
                return Err(StoreError::InvalidQuery(format!(
                    "date range is inverted (from {from} > to {to})"
                )));
            }
        }
        let search = match &self.search {
            Some(s) => SearchPattern::new(s)?,
            None => None,
        };
        Ok(LedgerPredicate {
            filter: self.clone(),
            search,
        })
    }
}

/// Compiled form of a [`LedgerFilter`].
#[derive(Debug, Clone)]
pub struct LedgerPredicate {
    filter: LedgerFilter,
    search: Option<SearchPattern>,
}

impl LedgerPredicate {
    pub fn matches(&self, entry: &LedgerEntry) -> bool {
        let f = &self.filter;
        f.product_id.is_none_or(|p| entry.key.product_id == p)
            && f.location_id.is_none_or(|l| entry.key.location_id == l)
            && f.stock_id.is_none_or(|s| entry.stock_id == s)
            && f.transaction_type.is_none_or(|t| entry.transaction_type == t)
            && f.reference_id.as_deref().is_none_or(|r| entry.reference_id == r)
            && f.from.is_none_or(|from| entry.transaction_date >= from)
            && f.to.is_none_or(|to| entry.transaction_date < to)
            && self.search.as_ref().is_none_or(|s| {
                s.matches_any([
                    Some(entry.reason.as_str()),
                    entry.notes.as_deref(),
                    Some(entry.reference_id.as_str()),
                ])
            })
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LedgerSortKey {
    #[default]
    TransactionDate,
    Quantity,
    TransactionType,
}

impl FromStr for LedgerSortKey {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "transaction_date" | "transactionDate" | "date" => Ok(LedgerSortKey::TransactionDate),
            "quantity" => Ok(LedgerSortKey::Quantity),
            "transaction_type" | "transactionType" | "type" => Ok(LedgerSortKey::TransactionType),
            other => Err(StoreError::InvalidQuery(format!("unknown ledger sort key '{other}'"))),
        }
    }
}

/// Default: newest first.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerSort {
    pub key: LedgerSortKey,
    pub direction: SortDirection,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerQuery {
    pub filter: LedgerFilter,
    pub sort: LedgerSort,
    pub pagination: Pagination,
}

/// Count and total absolute quantity for one transaction type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionSummary {
    pub transaction_type: TransactionType,
    pub count: u64,
    pub total_quantity: u64,
}

/// Paginated ledger result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerPage {
    pub entries: Vec<LedgerEntry>,
    /// Entries matching the filter (across all pages).
    pub total: u64,
    pub page: u32,
    pub page_size: u32,
    pub pages: u64,
    /// One row per transaction type, over the whole filtered set.
    pub summary: Vec<TransactionSummary>,
}

/// Run `query` over entries held in memory (any order).
pub fn run(entries: &[LedgerEntry], query: &LedgerQuery) -> Result<LedgerPage, StoreError> {
    let predicate = query.filter.compile()?;
    let mut matched: Vec<&LedgerEntry> = entries.iter().filter(|e| predicate.matches(e)).collect();

    let summary = summarize(matched.iter().copied());

    let sort = query.sort;
    matched.sort_by(|a, b| {
        let primary = match sort.key {
            LedgerSortKey::TransactionDate => a.transaction_date.cmp(&b.transaction_date),
            LedgerSortKey::Quantity => a.quantity.cmp(&b.quantity),
            LedgerSortKey::TransactionType => a.transaction_type.as_str().cmp(b.transaction_type.as_str()),
        };
        sort.direction
            .apply(primary)
            .then_with(|| sort.direction.apply(a.id.cmp(&b.id)))
    });

    let total = matched.len() as u64;
    let pagination = query.pagination;
    let entries = pagination.slice(matched).into_iter().cloned().collect();

    Ok(LedgerPage {
        entries,
        total,
        page: pagination.page(),
        page_size: pagination.page_size(),
        pages: pagination.pages(total),
        summary,
    })
}

fn summarize<'a>(entries: impl Iterator<Item = &'a LedgerEntry>) -> Vec<TransactionSummary> {
    let mut summary: Vec<TransactionSummary> = TransactionType::ALL
        .into_iter()
        .map(|transaction_type| TransactionSummary {
            transaction_type,
            count: 0,
            total_quantity: 0,
        })
        .collect();

    for entry in entries {
        if let Some(row) = summary
            .iter_mut()
            .find(|row| row.transaction_type == entry.transaction_type)
        {
            // Totals pin at u64::MAX rather than wrap.
            row.count = row.count.saturating_add(1);
            row.total_quantity = row.total_quantity.saturating_add(entry.quantity.unsigned_abs());
        }
    }

    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use stockpile_core::{LedgerEntryId, UserId};
    use stockpile_inventory::{AdjustKind, MovementContext, ReferenceKind, StockKey, StockRecord};

    struct Fixture {
        key: StockKey,
        entries: Vec<LedgerEntry>,
        t0: DateTime<Utc>,
    }

    fn entry(record: &mut StockRecord, kind: &str, amount: i64, reason: &str, reference: &str, at: DateTime<Utc>) -> LedgerEntry {
        let (movement, reference_kind) = match kind {
            "receive" => (record.receive(amount).unwrap(), ReferenceKind::Receipt),
            "subtract" => (record.adjust(AdjustKind::Subtract, amount).unwrap(), ReferenceKind::Adjustment),
            "reserve" => (record.reserve(amount).unwrap(), ReferenceKind::Reservation),
            other => panic!("unknown kind {other}"),
        };
        let ctx = MovementContext {
            reason: reason.to_string(),
            notes: None,
            performed_by: UserId::new(),
            reference_id: reference.to_string(),
            reference_kind,
            occurred_at: at,
        };
        let e = LedgerEntry::record(LedgerEntryId::new(), record, &movement, &ctx);
        record.apply(&movement, at).unwrap();
        e
    }

    fn fixture() -> Fixture {
        let t0 = Utc::now();
        let key = StockKey::new(ProductId::new(), LocationId::new());
        let mut record = StockRecord::new(StockId::new(), key, t0);
        let entries = vec![
            entry(&mut record, "receive", 10, "PO 1001 received", "RCV-1", t0),
            entry(&mut record, "subtract", 2, "damaged in transit", "ADJ-1", t0 + Duration::minutes(1)),
            entry(&mut record, "reserve", 3, "order a+b", "RSV-1", t0 + Duration::minutes(2)),
            entry(&mut record, "receive", 5, "PO 1002 received", "RCV-2", t0 + Duration::minutes(3)),
        ];
        Fixture { key, entries, t0 }
    }

    #[test]
    fn default_sort_is_newest_first() {
        let f = fixture();
        let page = run(&f.entries, &LedgerQuery::default()).unwrap();
        assert_eq!(page.total, 4);
        assert_eq!(page.entries[0].reference_id, "RCV-2");
        assert_eq!(page.entries[3].reference_id, "RCV-1");
    }

    #[test]
    fn summary_counts_absolute_quantities_per_type() {
        let f = fixture();
        let page = run(&f.entries, &LedgerQuery::default()).unwrap();
        let row = |t: TransactionType| *page.summary.iter().find(|r| r.transaction_type == t).unwrap();

        assert_eq!(row(TransactionType::Inward).count, 2);
        assert_eq!(row(TransactionType::Inward).total_quantity, 15);
        assert_eq!(row(TransactionType::Adjustment).total_quantity, 2);
        assert_eq!(row(TransactionType::Transfer).count, 0);
    }

    #[test]
    fn filters_by_type_and_date_range() {
        let f = fixture();
        let query = LedgerQuery {
            filter: LedgerFilter {
                product_id: Some(f.key.product_id),
                transaction_type: Some(TransactionType::Inward),
                from: Some(f.t0 + Duration::seconds(30)),
                ..Default::default()
            },
            ..Default::default()
        };
        let page = run(&f.entries, &query).unwrap();
        assert_eq!(page.total, 1);
        assert_eq!(page.entries[0].reference_id, "RCV-2");
    }

    #[test]
    fn summary_saturates_instead_of_overflowing() {
        let t0 = Utc::now();
        let entries: Vec<LedgerEntry> = (0..3)
            .map(|i| {
                let key = StockKey::new(ProductId::new(), LocationId::new());
                let mut record = StockRecord::new(StockId::new(), key, t0);
                entry(&mut record, "receive", i64::MAX, "bulk intake", &format!("RCV-{i}"), t0)
            })
            .collect();

        let page = run(&entries, &LedgerQuery::default()).unwrap();
        let inward = page
            .summary
            .iter()
            .find(|r| r.transaction_type == TransactionType::Inward)
            .unwrap();
        assert_eq!(inward.count, 3);
        assert_eq!(inward.total_quantity, u64::MAX);
    }

    #[test]
    fn filters_by_location_stock_and_reference() {
        let f = fixture();
        let stock_id = f.entries[0].stock_id;
        let count = |filter: LedgerFilter| {
            let query = LedgerQuery {
                filter,
                ..Default::default()
            };
            run(&f.entries, &query).unwrap().total
        };

        assert_eq!(
            count(LedgerFilter {
                location_id: Some(f.key.location_id),
                ..Default::default()
            }),
            4
        );
        assert_eq!(
            count(LedgerFilter {
                location_id: Some(LocationId::new()),
                ..Default::default()
            }),
            0
        );
        assert_eq!(
            count(LedgerFilter {
                stock_id: Some(stock_id),
                ..Default::default()
            }),
            4
        );
        assert_eq!(
            count(LedgerFilter {
                stock_id: Some(StockId::new()),
                ..Default::default()
            }),
            0
        );
        assert_eq!(
            count(LedgerFilter {
                reference_id: Some("RSV-1".to_string()),
                ..Default::default()
            }),
            1
        );
        // Exact match only.
        assert_eq!(
            count(LedgerFilter {
                reference_id: Some("RSV".to_string()),
                ..Default::default()
            }),
            0
        );
    }

    #[test]
    fn search_is_literal_and_case_insensitive() {
        let f = fixture();
        let search = |s: &str| {
            let query = LedgerQuery {
                filter: LedgerFilter {
                    search: Some(s.to_string()),
                    ..Default::default()
                },
                ..Default::default()
            };
            run(&f.entries, &query).unwrap().total
        };
        assert_eq!(search("A+B"), 1);
        assert_eq!(search("po 100"), 2);
        assert_eq!(search("adj-"), 1);
        assert_eq!(search("."), 0);
    }

    #[test]
    fn inverted_date_range_is_invalid() {
        let f = fixture();
        let query = LedgerQuery {
            filter: LedgerFilter {
                from: Some(f.t0 + Duration::minutes(5)),
                to: Some(f.t0),
                ..Default::default()
            },
            ..Default::default()
        };
        assert!(matches!(run(&f.entries, &query), Err(StoreError::InvalidQuery(_))));
    }

    #[test]
    fn pages_are_reported() {
        let f = fixture();
        let query = LedgerQuery {
            pagination: Pagination::new(Some(2), Some(3)),
            sort: LedgerSort {
                key: LedgerSortKey::Quantity,
                direction: SortDirection::Asc,
            },
            ..Default::default()
        };
        let page = run(&f.entries, &query).unwrap();
        assert_eq!(page.pages, 2);
        assert_eq!(page.entries.len(), 1);
        assert_eq!(page.entries[0].quantity, 10);
    }
}
