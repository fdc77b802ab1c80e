//! Read-only catalog collaborator: products and place names.
//!
//! The engine only needs to know that a product exists and what its thresholds
//! are; the listing engine additionally joins names for display and search.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use serde::{Deserialize, Serialize};

use stockpile_core::{LocationId, ProductId, RackId, RoomId};
use stockpile_inventory::{StockKey, StockThresholds};

pub const UNKNOWN_LOCATION: &str = "Unknown location";
pub const UNKNOWN_ROOM: &str = "Unknown room";
pub const UNKNOWN_RACK: &str = "Unknown rack";

/// Product as seen by the inventory engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductInfo {
    pub product_id: ProductId,
    pub name: String,
    pub part_no: String,
    #[serde(default)]
    pub brand: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub department: Option<String>,
    #[serde(default)]
    pub thresholds: StockThresholds,
}

impl ProductInfo {
    pub fn new(product_id: ProductId, name: impl Into<String>, part_no: impl Into<String>) -> Self {
        Self {
            product_id,
            name: name.into(),
            part_no: part_no.into(),
            brand: None,
            model: None,
            category: None,
            department: None,
            thresholds: StockThresholds::default(),
        }
    }

    pub fn with_thresholds(mut self, min_stock_level: i64, max_stock_level: i64) -> Self {
        self.thresholds = StockThresholds::new(min_stock_level, max_stock_level);
        self
    }

    pub fn with_brand(mut self, brand: impl Into<String>) -> Self {
        self.brand = Some(brand.into());
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn with_department(mut self, department: impl Into<String>) -> Self {
        self.department = Some(department.into());
        self
    }
}

/// Display names for the place a stock key points at.
///
/// Missing location names degrade to a placeholder; room and rack names are
/// `None` when the key has no room/rack and a placeholder when the id is unknown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaceNames {
    pub location_name: String,
    pub room_name: Option<String>,
    pub rack_name: Option<String>,
}

/// Catalog lookups used by the engines.
pub trait Catalog: Send + Sync {
    fn product(&self, id: ProductId) -> Option<ProductInfo>;

    fn location_name(&self, id: LocationId) -> Option<String>;

    fn room_name(&self, id: RoomId) -> Option<String>;

    fn rack_name(&self, id: RackId) -> Option<String>;

    fn place_names(&self, key: &StockKey) -> PlaceNames {
        PlaceNames {
            location_name: self
                .location_name(key.location_id)
                .unwrap_or_else(|| UNKNOWN_LOCATION.to_string()),
            room_name: key
                .room_id
                .map(|id| self.room_name(id).unwrap_or_else(|| UNKNOWN_ROOM.to_string())),
            rack_name: key
                .rack_id
                .map(|id| self.rack_name(id).unwrap_or_else(|| UNKNOWN_RACK.to_string())),
        }
    }
}

impl<C> Catalog for Arc<C>
where
    C: Catalog + ?Sized,
{
    fn product(&self, id: ProductId) -> Option<ProductInfo> {
        (**self).product(id)
    }

    fn location_name(&self, id: LocationId) -> Option<String> {
        (**self).location_name(id)
    }

    fn room_name(&self, id: RoomId) -> Option<String> {
        (**self).room_name(id)
    }

    fn rack_name(&self, id: RackId) -> Option<String> {
        (**self).rack_name(id)
    }
}

#[derive(Debug, Default)]
struct CatalogState {
    products: HashMap<ProductId, ProductInfo>,
    locations: HashMap<LocationId, String>,
    rooms: HashMap<RoomId, String>,
    racks: HashMap<RackId, String>,
}

/// In-memory catalog, filled by the caller (seeding, tests, the API's PUT routes).
#[derive(Debug, Default)]
pub struct InMemoryCatalog {
    state: RwLock<CatalogState>,
}

impl InMemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn upsert_product(&self, product: ProductInfo) {
        self.write(|s| {
            s.products.insert(product.product_id, product);
        });
    }

    pub fn upsert_location(&self, id: LocationId, name: impl Into<String>) {
        let name = name.into();
        self.write(|s| {
            s.locations.insert(id, name);
        });
    }

    pub fn upsert_room(&self, id: RoomId, name: impl Into<String>) {
        let name = name.into();
        self.write(|s| {
            s.rooms.insert(id, name);
        });
    }

    pub fn upsert_rack(&self, id: RackId, name: impl Into<String>) {
        let name = name.into();
        self.write(|s| {
            s.racks.insert(id, name);
        });
    }

    pub fn products(&self) -> Vec<ProductInfo> {
        self.read(|s| s.products.values().cloned().collect())
            .unwrap_or_default()
    }

    fn write(&self, f: impl FnOnce(&mut CatalogState)) {
        match self.state.write() {
            Ok(mut guard) => f(&mut guard),
            Err(poisoned) => f(&mut poisoned.into_inner()),
        }
    }

    fn read<T>(&self, f: impl FnOnce(&CatalogState) -> T) -> Option<T> {
        self.state.read().ok().map(|guard| f(&guard))
    }
}

impl Catalog for InMemoryCatalog {
    fn product(&self, id: ProductId) -> Option<ProductInfo> {
        self.read(|s| s.products.get(&id).cloned()).flatten()
    }

    fn location_name(&self, id: LocationId) -> Option<String> {
        self.read(|s| s.locations.get(&id).cloned()).flatten()
    }

    fn room_name(&self, id: RoomId) -> Option<String> {
        self.read(|s| s.rooms.get(&id).cloned()).flatten()
    }

    fn rack_name(&self, id: RackId) -> Option<String> {
        self.read(|s| s.racks.get(&id).cloned()).flatten()
    }
}
