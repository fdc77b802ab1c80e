//! Stock listing: records joined with catalog data, filtered, sorted and paged.
//!
//! Status filters and the global status counts both use the single-label
//! classification, so a record is never counted under two statuses.

use core::cmp::Ordering;
use core::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use stockpile_core::{AggregateRoot, LocationId, ProductId, RackId, RoomId, StockId};
use stockpile_inventory::{Severity, StockRecord, StockStatus, StockThresholds, assess};

use crate::catalog::Catalog;
use crate::config::EngineConfig;
use crate::query::{SearchPattern, SortDirection};
use crate::stock_store::{StockStore, StoreError};

pub const UNKNOWN_PRODUCT: &str = "Unknown product";

/// Filter criteria for stock listings. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StockFilter {
    pub product_id: Option<ProductId>,
    pub location_id: Option<LocationId>,
    pub room_id: Option<RoomId>,
    pub rack_id: Option<RackId>,
    /// Product name, brand, model or part number.
    pub search: Option<String>,
    pub category: Option<String>,
    pub department: Option<String>,
    pub brand: Option<String>,
    /// Any of these statuses; empty means no status filter.
    pub statuses: Vec<StockStatus>,
}

impl StockFilter {
    pub fn compile(&self) -> Result<StockPredicate, StoreError> {
        let search = match &self.search {
            Some(s) => SearchPattern::new(s)?,
            None => None,
        };
        Ok(StockPredicate {
            product_id: self.product_id,
            location_id: self.location_id,
            room_id: self.room_id,
            rack_id: self.rack_id,
            search,
            category: normalized(self.category.as_deref()),
            department: normalized(self.department.as_deref()),
            brand: normalized(self.brand.as_deref()),
            statuses: self.statuses.clone(),
        })
    }
}

fn normalized(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_lowercase)
}

fn eq_ignore_case(expected: &Option<String>, actual: Option<&str>) -> bool {
    match expected {
        None => true,
        Some(expected) => actual.is_some_and(|a| a.trim().to_lowercase() == *expected),
    }
}

/// Compiled form of a [`StockFilter`].
#[derive(Debug, Clone)]
pub struct StockPredicate {
    product_id: Option<ProductId>,
    location_id: Option<LocationId>,
    room_id: Option<RoomId>,
    rack_id: Option<RackId>,
    search: Option<SearchPattern>,
    category: Option<String>,
    department: Option<String>,
    brand: Option<String>,
    statuses: Vec<StockStatus>,
}

impl StockPredicate {
    pub fn matches(&self, row: &StockListing) -> bool {
        self.product_id.is_none_or(|p| row.product_id == p)
            && self.location_id.is_none_or(|l| row.location_id == l)
            && self.room_id.is_none_or(|r| row.room_id == Some(r))
            && self.rack_id.is_none_or(|r| row.rack_id == Some(r))
            && eq_ignore_case(&self.category, row.category.as_deref())
            && eq_ignore_case(&self.department, row.department.as_deref())
            && eq_ignore_case(&self.brand, row.brand.as_deref())
            && (self.statuses.is_empty() || self.statuses.contains(&row.status))
            && self.search.as_ref().is_none_or(|s| {
                s.matches_any([
                    Some(row.product_name.as_str()),
                    row.brand.as_deref(),
                    row.model.as_deref(),
                    Some(row.part_no.as_str()),
                ])
            })
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StockSortKey {
    Quantity,
    ReservedQuantity,
    AvailableQuantity,
    #[default]
    LastUpdated,
    ProductName,
    PartNo,
    Brand,
    LocationName,
    RoomName,
    RackName,
    Status,
}

impl StockSortKey {
    pub const ALL: [StockSortKey; 11] = [
        StockSortKey::Quantity,
        StockSortKey::ReservedQuantity,
        StockSortKey::AvailableQuantity,
        StockSortKey::LastUpdated,
        StockSortKey::ProductName,
        StockSortKey::PartNo,
        StockSortKey::Brand,
        StockSortKey::LocationName,
        StockSortKey::RoomName,
        StockSortKey::RackName,
        StockSortKey::Status,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            StockSortKey::Quantity => "quantity",
            StockSortKey::ReservedQuantity => "reserved_quantity",
            StockSortKey::AvailableQuantity => "available_quantity",
            StockSortKey::LastUpdated => "last_updated",
            StockSortKey::ProductName => "product_name",
            StockSortKey::PartNo => "part_no",
            StockSortKey::Brand => "brand",
            StockSortKey::LocationName => "location_name",
            StockSortKey::RoomName => "room_name",
            StockSortKey::RackName => "rack_name",
            StockSortKey::Status => "status",
        }
    }

    fn compare(self, a: &StockListing, b: &StockListing) -> Ordering {
        fn text(a: Option<&str>, b: Option<&str>) -> Ordering {
            let a = a.map(str::to_lowercase);
            let b = b.map(str::to_lowercase);
            a.cmp(&b)
        }

        match self {
            StockSortKey::Quantity => a.quantity.cmp(&b.quantity),
            StockSortKey::ReservedQuantity => a.reserved_quantity.cmp(&b.reserved_quantity),
            StockSortKey::AvailableQuantity => a.available_quantity.cmp(&b.available_quantity),
            StockSortKey::LastUpdated => a.last_updated.cmp(&b.last_updated),
            StockSortKey::ProductName => text(Some(&a.product_name), Some(&b.product_name)),
            StockSortKey::PartNo => text(Some(&a.part_no), Some(&b.part_no)),
            StockSortKey::Brand => text(a.brand.as_deref(), b.brand.as_deref()),
            StockSortKey::LocationName => text(Some(&a.location_name), Some(&b.location_name)),
            StockSortKey::RoomName => text(a.room_name.as_deref(), b.room_name.as_deref()),
            StockSortKey::RackName => text(a.rack_name.as_deref(), b.rack_name.as_deref()),
            StockSortKey::Status => a.status.cmp(&b.status),
        }
    }
}

impl FromStr for StockSortKey {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted: String = s
            .trim()
            .chars()
            .filter(|c| *c != '_')
            .flat_map(char::to_lowercase)
            .collect();
        StockSortKey::ALL
            .into_iter()
            .find(|k| k.as_str().replace('_', "") == wanted)
            .ok_or_else(|| StoreError::InvalidQuery(format!("unknown stock sort key '{s}'")))
    }
}

/// Default: most recently updated first.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockSort {
    pub key: StockSortKey,
    pub direction: SortDirection,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockListQuery {
    pub filter: StockFilter,
    pub sort: StockSort,
    /// 1-indexed; defaults to 1.
    pub page: Option<u32>,
    /// Defaults to, and is capped by, the configured page sizes.
    pub page_size: Option<u32>,
}

/// One listed stock record with its joined catalog data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockListing {
    pub id: StockId,
    pub product_id: ProductId,
    pub location_id: LocationId,
    pub room_id: Option<RoomId>,
    pub rack_id: Option<RackId>,
    pub product_name: String,
    pub part_no: String,
    pub brand: Option<String>,
    pub model: Option<String>,
    pub category: Option<String>,
    pub department: Option<String>,
    pub location_name: String,
    pub room_name: Option<String>,
    pub rack_name: Option<String>,
    pub quantity: i64,
    pub reserved_quantity: i64,
    pub available_quantity: i64,
    pub thresholds: StockThresholds,
    pub status: StockStatus,
    pub severity: Option<Severity>,
    pub version: u64,
    pub created_at: DateTime<Utc>,
    pub last_updated: DateTime<Utc>,
}

impl StockListing {
    /// Join `record` with the catalog. Unknown products list with placeholder
    /// names and no thresholds.
    pub fn join(record: &StockRecord, catalog: &impl Catalog) -> Self {
        let key = record.key();
        let product = catalog.product(key.product_id);
        let places = catalog.place_names(key);
        let thresholds = product.as_ref().map(|p| p.thresholds).unwrap_or_default();
        let classification = assess(record, &thresholds);

        let (product_name, part_no, brand, model, category, department) = match product {
            Some(p) => (p.name, p.part_no, p.brand, p.model, p.category, p.department),
            None => (UNKNOWN_PRODUCT.to_string(), String::new(), None, None, None, None),
        };

        Self {
            id: record.id_typed(),
            product_id: key.product_id,
            location_id: key.location_id,
            room_id: key.room_id,
            rack_id: key.rack_id,
            product_name,
            part_no,
            brand,
            model,
            category,
            department,
            location_name: places.location_name,
            room_name: places.room_name,
            rack_name: places.rack_name,
            quantity: record.quantity(),
            reserved_quantity: record.reserved_quantity(),
            available_quantity: record.available_quantity(),
            thresholds,
            status: classification.status,
            severity: classification.severity,
            version: record.version(),
            created_at: record.created_at(),
            last_updated: record.last_updated(),
        }
    }
}

/// Per-status record counts over the whole table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusCounts {
    pub total: u64,
    pub out_of_stock: u64,
    pub low_stock: u64,
    pub over_stock: u64,
    pub in_stock: u64,
}

impl StatusCounts {
    fn add(&mut self, status: StockStatus) {
        self.total += 1;
        match status {
            StockStatus::OutOfStock => self.out_of_stock += 1,
            StockStatus::LowStock => self.low_stock += 1,
            StockStatus::OverStock => self.over_stock += 1,
            StockStatus::InStock => self.in_stock += 1,
        }
    }

    pub fn get(&self, status: StockStatus) -> u64 {
        match status {
            StockStatus::OutOfStock => self.out_of_stock,
            StockStatus::LowStock => self.low_stock,
            StockStatus::OverStock => self.over_stock,
            StockStatus::InStock => self.in_stock,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockListPage {
    pub records: Vec<StockListing>,
    /// Rows matching the filter.
    pub total: u64,
    pub page: u32,
    pub page_size: u32,
    pub pages: u64,
    pub status_counts: StatusCounts,
}

/// Read-side engine over the stock table and catalog.
#[derive(Debug)]
pub struct StockListingEngine<S, C> {
    store: S,
    catalog: C,
    config: EngineConfig,
}

impl<S, C> StockListingEngine<S, C>
where
    S: StockStore,
    C: Catalog,
{
    pub fn new(store: S, catalog: C) -> Self {
        Self {
            store,
            catalog,
            config: EngineConfig::default(),
        }
    }

    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    /// Every record, joined.
    fn rows(&self) -> Result<Vec<StockListing>, StoreError> {
        Ok(self
            .store
            .list()?
            .iter()
            .map(|record| StockListing::join(record, &self.catalog))
            .collect())
    }

    pub fn list(&self, query: &StockListQuery) -> Result<StockListPage, StoreError> {
        let predicate = query.filter.compile()?;
        let pagination = self.config.pagination(query.page, query.page_size);

        let rows = self.rows()?;
        let mut status_counts = StatusCounts::default();
        for row in &rows {
            status_counts.add(row.status);
        }

        let mut matched: Vec<StockListing> = rows.into_iter().filter(|row| predicate.matches(row)).collect();
        let sort = query.sort;
        matched.sort_by(|a, b| {
            sort.direction
                .apply(sort.key.compare(a, b))
                .then_with(|| sort.direction.apply(a.id.cmp(&b.id)))
        });

        let total = matched.len() as u64;
        Ok(StockListPage {
            records: pagination.slice(matched),
            total,
            page: pagination.page(),
            page_size: pagination.page_size(),
            pages: pagination.pages(total),
            status_counts,
        })
    }

    pub fn status_counts(&self) -> Result<StatusCounts, StoreError> {
        let mut counts = StatusCounts::default();
        for row in self.rows()? {
            counts.add(row.status);
        }
        Ok(counts)
    }

    /// One record, joined.
    pub fn get(&self, id: StockId) -> Result<Option<StockListing>, StoreError> {
        Ok(self
            .store
            .get(id)?
            .map(|record| StockListing::join(&record, &self.catalog)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use stockpile_core::ExpectedVersion;
    use stockpile_inventory::StockKey;

    use crate::catalog::{InMemoryCatalog, ProductInfo};
    use crate::stock_store::InMemoryInventoryStore;

    struct Fixture {
        engine: StockListingEngine<Arc<InMemoryInventoryStore>, Arc<InMemoryCatalog>>,
        main: LocationId,
        annex: LocationId,
    }

    fn seed(store: &InMemoryInventoryStore, key: StockKey, quantity: i64) {
        let record = store.find_or_create(&key).unwrap();
        let mut next = record.clone();
        let movement = record.receive(quantity).unwrap();
        next.apply(&movement, Utc::now()).unwrap();
        store.upsert(next, ExpectedVersion::ABSENT).unwrap();
    }

    fn fixture() -> Fixture {
        let store = Arc::new(InMemoryInventoryStore::new());
        let catalog = Arc::new(InMemoryCatalog::new());
        let main = LocationId::new();
        let annex = LocationId::new();
        catalog.upsert_location(main, "Main");
        catalog.upsert_location(annex, "annex");

        let products = [
            ProductInfo::new(ProductId::new(), "Part A+B", "AB-1")
                .with_brand("Acme")
                .with_category("Hardware")
                .with_thresholds(5, 100),
            ProductInfo::new(ProductId::new(), "aab washer", "W-2")
                .with_brand("acme")
                .with_thresholds(10, 0),
            ProductInfo::new(ProductId::new(), "Bolt", "B-3")
                .with_brand("Bolter")
                .with_model("X1")
                .with_department("Maintenance")
                .with_thresholds(0, 20),
        ];
        for p in &products {
            catalog.upsert_product(p.clone());
        }

        seed(&store, StockKey::new(products[0].product_id, main), 50);
        seed(&store, StockKey::new(products[1].product_id, main), 3);
        seed(&store, StockKey::new(products[2].product_id, annex), 30);
        seed(&store, StockKey::new(products[0].product_id, annex), 1);

        Fixture {
            engine: StockListingEngine::new(store, catalog),
            main,
            annex,
        }
    }

    fn list(f: &Fixture, filter: StockFilter) -> StockListPage {
        f.engine
            .list(&StockListQuery {
                filter,
                ..Default::default()
            })
            .unwrap()
    }

    #[test]
    fn search_matches_metacharacters_literally() {
        let f = fixture();
        let page = list(
            &f,
            StockFilter {
                search: Some("a+b".to_string()),
                ..Default::default()
            },
        );
        assert_eq!(page.total, 2);
        assert!(page.records.iter().all(|r| r.product_name == "Part A+B"));
    }

    #[test]
    fn search_covers_model_and_part_no() {
        let f = fixture();
        let by = |s: &str| {
            list(
                &f,
                StockFilter {
                    search: Some(s.to_string()),
                    ..Default::default()
                },
            )
            .total
        };
        assert_eq!(by("x1"), 1);
        assert_eq!(by("w-2"), 1);
    }

    #[test]
    fn brand_filter_is_case_insensitive_equality() {
        let f = fixture();
        let page = list(
            &f,
            StockFilter {
                brand: Some(" ACME ".to_string()),
                ..Default::default()
            },
        );
        assert_eq!(page.total, 3);
    }

    #[test]
    fn category_and_department_filters_match_trimmed_and_case_insensitive() {
        let f = fixture();
        let by = |category: Option<&str>, department: Option<&str>| {
            list(
                &f,
                StockFilter {
                    category: category.map(str::to_string),
                    department: department.map(str::to_string),
                    ..Default::default()
                },
            )
        };

        let page = by(Some(" hardware"), None);
        assert_eq!(page.total, 2);
        assert!(page.records.iter().all(|r| r.product_name == "Part A+B"));

        let page = by(None, Some("MAINTENANCE "));
        assert_eq!(page.total, 1);
        assert_eq!(page.records[0].product_name, "Bolt");

        assert_eq!(by(Some("Hardware"), Some("Maintenance")).total, 0);
        assert_eq!(by(Some("Hard"), None).total, 0);
    }

    #[test]
    fn status_filter_ors_and_counts_cover_whole_table() {
        let f = fixture();
        let page = list(
            &f,
            StockFilter {
                location_id: Some(f.main),
                statuses: vec![StockStatus::LowStock, StockStatus::OverStock],
                ..Default::default()
            },
        );
        assert_eq!(page.total, 1);
        assert_eq!(page.records[0].status, StockStatus::LowStock);

        let counts = page.status_counts;
        assert_eq!(counts.total, 4);
        assert_eq!(counts.low_stock, 2);
        assert_eq!(counts.over_stock, 1);
        assert_eq!(counts.in_stock, 1);
        assert_eq!(counts, f.engine.status_counts().unwrap());
    }

    #[test]
    fn sorts_strings_case_insensitively_with_pagination() {
        let f = fixture();
        let page = f
            .engine
            .list(&StockListQuery {
                sort: StockSort {
                    key: StockSortKey::ProductName,
                    direction: SortDirection::Asc,
                },
                page: Some(1),
                page_size: Some(3),
                ..Default::default()
            })
            .unwrap();
        let names: Vec<&str> = page.records.iter().map(|r| r.product_name.as_str()).collect();
        assert_eq!(names, vec!["aab washer", "Bolt", "Part A+B"]);
        assert_eq!(page.pages, 2);
    }

    #[test]
    fn location_name_sort_descending() {
        let f = fixture();
        let page = f
            .engine
            .list(&StockListQuery {
                sort: StockSort {
                    key: StockSortKey::LocationName,
                    direction: SortDirection::Desc,
                },
                ..Default::default()
            })
            .unwrap();
        assert_eq!(page.records[0].location_id, f.main);
        assert_eq!(page.records[3].location_id, f.annex);
    }

    #[test]
    fn sort_keys_parse_from_either_case() {
        assert_eq!("lastUpdated".parse::<StockSortKey>().unwrap(), StockSortKey::LastUpdated);
        assert_eq!("reserved_quantity".parse::<StockSortKey>().unwrap(), StockSortKey::ReservedQuantity);
        assert!("colour".parse::<StockSortKey>().is_err());
    }
}
