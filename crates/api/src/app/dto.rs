use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::{Value as JsonValue, json};

use stockpile_core::{DomainError, LocationId, ProductId, RackId, RoomId, StockId};
use stockpile_infra::{
    LedgerFilter, LedgerPage, LedgerQuery, LedgerSort, MutationOutcome, Pagination, ProductInfo, SortDirection,
    StockFilter, StockListQuery, StockSort, StoreError, TransferOutcome,
};
use stockpile_inventory::{StockRecord, StockStatus, StockThresholds, TransactionType};

// -------------------------
// Request DTOs
// -------------------------

#[derive(Debug, Deserialize)]
pub struct ReceiveStockRequest {
    pub product_id: ProductId,
    pub location_id: LocationId,
    pub room_id: Option<RoomId>,
    pub rack_id: Option<RackId>,
    pub quantity: i64,
    pub reason: String,
    pub notes: Option<String>,
    pub reference_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AdjustStockRequest {
    /// add | subtract | set
    #[serde(rename = "type")]
    pub kind: String,
    pub quantity: i64,
    pub reason: String,
    pub notes: Option<String>,
}

/// Body for both reserve and release.
#[derive(Debug, Deserialize)]
pub struct ReservationRequest {
    pub quantity: i64,
    pub reason: String,
    pub reference_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct IssueStockRequest {
    pub quantity: i64,
    pub reason: String,
    pub notes: Option<String>,
    pub reference_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct TransferStockRequest {
    pub quantity: i64,
    pub location_id: LocationId,
    pub room_id: Option<RoomId>,
    pub rack_id: Option<RackId>,
    pub expected_product_id: Option<ProductId>,
    pub expected_location_id: Option<LocationId>,
    pub notes: Option<String>,
    pub reference_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpsertProductRequest {
    pub name: String,
    pub part_no: String,
    pub brand: Option<String>,
    pub model: Option<String>,
    pub category: Option<String>,
    pub department: Option<String>,
    #[serde(default)]
    pub min_stock_level: i64,
    #[serde(default)]
    pub max_stock_level: i64,
}

impl UpsertProductRequest {
    pub fn into_product(self, product_id: ProductId) -> ProductInfo {
        ProductInfo {
            product_id,
            name: self.name,
            part_no: self.part_no,
            brand: self.brand,
            model: self.model,
            category: self.category,
            department: self.department,
            thresholds: StockThresholds::new(self.min_stock_level, self.max_stock_level),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct NameRequest {
    pub name: String,
}

// -------------------------
// Query parameters
// -------------------------

/// `GET /stock` query string. Ids arrive as strings so malformed ones map to 400.
#[derive(Debug, Default, Deserialize)]
pub struct StockListParams {
    pub page: Option<u32>,
    pub page_size: Option<u32>,
    pub search: Option<String>,
    pub product_id: Option<String>,
    pub location_id: Option<String>,
    pub room_id: Option<String>,
    pub rack_id: Option<String>,
    pub category: Option<String>,
    pub department: Option<String>,
    pub brand: Option<String>,
    /// Comma-separated statuses, OR'd.
    pub status: Option<String>,
    pub sort_by: Option<String>,
    pub sort_order: Option<String>,
}

#[derive(Debug)]
pub enum ParamError {
    Domain(DomainError),
    Query(StoreError),
}

impl From<DomainError> for ParamError {
    fn from(value: DomainError) -> Self {
        ParamError::Domain(value)
    }
}

impl From<StoreError> for ParamError {
    fn from(value: StoreError) -> Self {
        ParamError::Query(value)
    }
}

fn parse_opt<T>(raw: Option<&str>) -> Result<Option<T>, ParamError>
where
    T: core::str::FromStr,
    ParamError: From<T::Err>,
{
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        Some(s) => Ok(Some(s.parse()?)),
        None => Ok(None),
    }
}

impl StockListParams {
    pub fn into_query(self) -> Result<StockListQuery, ParamError> {
        let statuses = match self.status.as_deref() {
            Some(raw) => raw
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::parse::<StockStatus>)
                .collect::<Result<Vec<_>, _>>()?,
            None => Vec::new(),
        };

        Ok(StockListQuery {
            filter: StockFilter {
                product_id: parse_opt::<ProductId>(self.product_id.as_deref())?,
                location_id: parse_opt::<LocationId>(self.location_id.as_deref())?,
                room_id: parse_opt::<RoomId>(self.room_id.as_deref())?,
                rack_id: parse_opt::<RackId>(self.rack_id.as_deref())?,
                search: self.search,
                category: self.category,
                department: self.department,
                brand: self.brand,
                statuses,
            },
            sort: StockSort {
                key: parse_opt(self.sort_by.as_deref())?.unwrap_or_default(),
                direction: parse_opt::<SortDirection>(self.sort_order.as_deref())?.unwrap_or_default(),
            },
            page: self.page,
            page_size: self.page_size,
        })
    }
}

/// `GET /ledger` query string.
#[derive(Debug, Default, Deserialize)]
pub struct LedgerParams {
    pub product_id: Option<String>,
    pub location_id: Option<String>,
    pub stock_id: Option<String>,
    pub transaction_type: Option<String>,
    pub reference_id: Option<String>,
    /// RFC3339, inclusive.
    pub from: Option<DateTime<Utc>>,
    /// RFC3339, exclusive.
    pub to: Option<DateTime<Utc>>,
    pub search: Option<String>,
    pub sort_by: Option<String>,
    pub sort_order: Option<String>,
    pub page: Option<u32>,
    pub page_size: Option<u32>,
}

impl LedgerParams {
    pub fn into_query(self, pagination: Pagination) -> Result<LedgerQuery, ParamError> {
        Ok(LedgerQuery {
            filter: LedgerFilter {
                product_id: parse_opt::<ProductId>(self.product_id.as_deref())?,
                location_id: parse_opt::<LocationId>(self.location_id.as_deref())?,
                stock_id: parse_opt::<StockId>(self.stock_id.as_deref())?,
                transaction_type: parse_opt::<TransactionType>(self.transaction_type.as_deref())?,
                reference_id: self.reference_id.filter(|r| !r.trim().is_empty()),
                from: self.from,
                to: self.to,
                search: self.search,
            },
            sort: LedgerSort {
                key: parse_opt(self.sort_by.as_deref())?.unwrap_or_default(),
                direction: parse_opt::<SortDirection>(self.sort_order.as_deref())?.unwrap_or_default(),
            },
            pagination,
        })
    }
}

// -------------------------
// Response mapping
// -------------------------

pub fn record_to_json(record: &StockRecord) -> JsonValue {
    json!({
        "id": record.id_typed().to_string(),
        "product_id": record.product_id().to_string(),
        "location_id": record.location_id().to_string(),
        "room_id": record.key().room_id.map(|r| r.to_string()),
        "rack_id": record.key().rack_id.map(|r| r.to_string()),
        "quantity": record.quantity(),
        "reserved_quantity": record.reserved_quantity(),
        "available_quantity": record.available_quantity(),
        "last_updated": record.last_updated().to_rfc3339(),
    })
}

pub fn outcome_to_json(outcome: &MutationOutcome) -> JsonValue {
    json!({
        "reference_id": outcome.reference_id,
        "deleted": outcome.deleted,
        "record": record_to_json(&outcome.record),
        "entry": outcome.entry,
    })
}

pub fn transfer_to_json(outcome: &TransferOutcome) -> JsonValue {
    json!({
        "reference_id": outcome.reference_id,
        "source": record_to_json(&outcome.source),
        "source_deleted": outcome.source_deleted,
        "destination": record_to_json(&outcome.destination),
        "entries": [outcome.outbound, outcome.inbound],
    })
}

pub fn ledger_page_to_json(page: &LedgerPage) -> JsonValue {
    json!({
        "items": page.entries,
        "total": page.total,
        "page": page.page,
        "page_size": page.page_size,
        "pages": page.pages,
        "summary": page.summary,
    })
}
