use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path, Query},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};

use stockpile_core::StockId;
use stockpile_inventory::{
    AdjustKind, AdjustStock, Destination, IssueStock, ReceiveStock, ReleaseStock, ReserveStock, StockKey,
    TransferStock,
};

use crate::app::routes::path_id;
use crate::app::services::AppServices;
use crate::app::{dto, errors};
use crate::context::ActorContext;

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_stock))
        .route("/status-counts", get(status_counts))
        .route("/receive", post(receive_stock))
        .route("/:id", get(get_stock))
        .route("/:id/adjust", post(adjust_stock))
        .route("/:id/reserve", post(reserve_stock))
        .route("/:id/release", post(release_stock))
        .route("/:id/issue", post(issue_stock))
        .route("/:id/transfer", post(transfer_stock))
}

pub async fn list_stock(
    Extension(services): Extension<Arc<AppServices>>,
    Query(params): Query<dto::StockListParams>,
) -> axum::response::Response {
    let query = match params.into_query() {
        Ok(q) => q,
        Err(e) => return errors::param_error_to_response(e),
    };

    match services.listing.list(&query) {
        Ok(page) => (StatusCode::OK, Json(page)).into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn status_counts(Extension(services): Extension<Arc<AppServices>>) -> axum::response::Response {
    match services.listing.status_counts() {
        Ok(counts) => (StatusCode::OK, Json(counts)).into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn get_stock(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let stock_id: StockId = match path_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    match services.listing.get(stock_id) {
        Ok(Some(row)) => (StatusCode::OK, Json(row)).into_response(),
        Ok(None) => errors::json_error(StatusCode::NOT_FOUND, "not_found", format!("stock record {stock_id} not found")),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn receive_stock(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(actor): Extension<ActorContext>,
    Json(body): Json<dto::ReceiveStockRequest>,
) -> axum::response::Response {
    let mut key = StockKey::new(body.product_id, body.location_id);
    key.room_id = body.room_id;
    key.rack_id = body.rack_id;

    let cmd = ReceiveStock {
        key,
        quantity: body.quantity,
        reason: body.reason,
        notes: body.notes,
        performed_by: actor.user_id(),
        reference_id: body.reference_id,
    };

    match services.engine.receive(cmd) {
        Ok(outcome) => (StatusCode::CREATED, Json(dto::outcome_to_json(&outcome))).into_response(),
        Err(e) => errors::mutation_error_to_response(e),
    }
}

pub async fn adjust_stock(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(actor): Extension<ActorContext>,
    Path(id): Path<String>,
    Json(body): Json<dto::AdjustStockRequest>,
) -> axum::response::Response {
    let stock_id: StockId = match path_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let kind: AdjustKind = match body.kind.parse() {
        Ok(k) => k,
        Err(e) => return errors::domain_error_to_response(e),
    };

    let cmd = AdjustStock {
        stock_id,
        kind,
        quantity: body.quantity,
        reason: body.reason,
        notes: body.notes,
        performed_by: actor.user_id(),
    };

    match services.engine.adjust(cmd) {
        Ok(outcome) => (StatusCode::OK, Json(dto::outcome_to_json(&outcome))).into_response(),
        Err(e) => errors::mutation_error_to_response(e),
    }
}

pub async fn reserve_stock(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(actor): Extension<ActorContext>,
    Path(id): Path<String>,
    Json(body): Json<dto::ReservationRequest>,
) -> axum::response::Response {
    let stock_id: StockId = match path_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    let cmd = ReserveStock {
        stock_id,
        quantity: body.quantity,
        reason: body.reason,
        performed_by: actor.user_id(),
        reference_id: body.reference_id,
    };

    match services.engine.reserve(cmd) {
        Ok(outcome) => (StatusCode::OK, Json(dto::outcome_to_json(&outcome))).into_response(),
        Err(e) => errors::mutation_error_to_response(e),
    }
}

pub async fn release_stock(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(actor): Extension<ActorContext>,
    Path(id): Path<String>,
    Json(body): Json<dto::ReservationRequest>,
) -> axum::response::Response {
    let stock_id: StockId = match path_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    let cmd = ReleaseStock {
        stock_id,
        quantity: body.quantity,
        reason: body.reason,
        performed_by: actor.user_id(),
        reference_id: body.reference_id,
    };

    match services.engine.release(cmd) {
        Ok(outcome) => (StatusCode::OK, Json(dto::outcome_to_json(&outcome))).into_response(),
        Err(e) => errors::mutation_error_to_response(e),
    }
}

pub async fn issue_stock(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(actor): Extension<ActorContext>,
    Path(id): Path<String>,
    Json(body): Json<dto::IssueStockRequest>,
) -> axum::response::Response {
    let stock_id: StockId = match path_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    let cmd = IssueStock {
        stock_id,
        quantity: body.quantity,
        reason: body.reason,
        notes: body.notes,
        performed_by: actor.user_id(),
        reference_id: body.reference_id,
    };

    match services.engine.issue(cmd) {
        Ok(outcome) => (StatusCode::OK, Json(dto::outcome_to_json(&outcome))).into_response(),
        Err(e) => errors::mutation_error_to_response(e),
    }
}

pub async fn transfer_stock(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(actor): Extension<ActorContext>,
    Path(id): Path<String>,
    Json(body): Json<dto::TransferStockRequest>,
) -> axum::response::Response {
    let source_stock_id: StockId = match path_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    let cmd = TransferStock {
        source_stock_id,
        quantity: body.quantity,
        destination: Destination {
            location_id: body.location_id,
            room_id: body.room_id,
            rack_id: body.rack_id,
        },
        expected_product_id: body.expected_product_id,
        expected_location_id: body.expected_location_id,
        performed_by: actor.user_id(),
        notes: body.notes,
        reference_id: body.reference_id,
    };

    match services.engine.transfer(cmd) {
        Ok(outcome) => (StatusCode::OK, Json(dto::transfer_to_json(&outcome))).into_response(),
        Err(e) => errors::mutation_error_to_response(e),
    }
}
