use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, put},
};

use stockpile_core::{LocationId, ProductId, RackId, RoomId};

use crate::app::routes::path_id;
use crate::app::services::AppServices;
use crate::app::{dto, errors};

pub fn router() -> Router {
    Router::new()
        .route("/products", get(list_products))
        .route("/products/:id", put(upsert_product))
        .route("/locations/:id", put(upsert_location))
        .route("/rooms/:id", put(upsert_room))
        .route("/racks/:id", put(upsert_rack))
}

pub async fn list_products(Extension(services): Extension<Arc<AppServices>>) -> impl IntoResponse {
    let products = services.catalog.products();
    Json(serde_json::json!({
        "total": products.len(),
        "items": products,
    }))
}

pub async fn upsert_product(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
    Json(body): Json<dto::UpsertProductRequest>,
) -> axum::response::Response {
    let product_id: ProductId = match path_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    if body.name.trim().is_empty() || body.part_no.trim().is_empty() {
        return errors::json_error(
            StatusCode::BAD_REQUEST,
            "validation_error",
            "name and part_no are required",
        );
    }

    let product = body.into_product(product_id);
    services.catalog.upsert_product(product.clone());
    (StatusCode::OK, Json(product)).into_response()
}

pub async fn upsert_location(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
    Json(body): Json<dto::NameRequest>,
) -> axum::response::Response {
    let location_id: LocationId = match path_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    services.catalog.upsert_location(location_id, body.name.clone());
    named(location_id.to_string(), body.name)
}

pub async fn upsert_room(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
    Json(body): Json<dto::NameRequest>,
) -> axum::response::Response {
    let room_id: RoomId = match path_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    services.catalog.upsert_room(room_id, body.name.clone());
    named(room_id.to_string(), body.name)
}

pub async fn upsert_rack(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
    Json(body): Json<dto::NameRequest>,
) -> axum::response::Response {
    let rack_id: RackId = match path_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    services.catalog.upsert_rack(rack_id, body.name.clone());
    named(rack_id.to_string(), body.name)
}

fn named(id: String, name: String) -> axum::response::Response {
    (StatusCode::OK, Json(serde_json::json!({ "id": id, "name": name }))).into_response()
}
