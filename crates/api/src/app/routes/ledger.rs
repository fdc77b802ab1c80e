use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path, Query},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};

use stockpile_infra::LedgerStore;

use crate::app::services::AppServices;
use crate::app::{dto, errors};

pub fn router() -> Router {
    Router::new()
        .route("/", get(query_ledger))
        .route("/reference/:reference_id", get(by_reference))
}

pub async fn query_ledger(
    Extension(services): Extension<Arc<AppServices>>,
    Query(params): Query<dto::LedgerParams>,
) -> axum::response::Response {
    let pagination = services.config.pagination(params.page, params.page_size);
    let query = match params.into_query(pagination) {
        Ok(q) => q,
        Err(e) => return errors::param_error_to_response(e),
    };

    match services.store.query(&query) {
        Ok(page) => (StatusCode::OK, Json(dto::ledger_page_to_json(&page))).into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

/// All legs sharing one reference id (one entry, or two for a transfer).
pub async fn by_reference(
    Extension(services): Extension<Arc<AppServices>>,
    Path(reference_id): Path<String>,
) -> axum::response::Response {
    match services.store.by_reference(&reference_id) {
        Ok(entries) if entries.is_empty() => errors::json_error(
            StatusCode::NOT_FOUND,
            "not_found",
            format!("no ledger entries for reference {reference_id}"),
        ),
        Ok(entries) => (
            StatusCode::OK,
            Json(serde_json::json!({
                "reference_id": reference_id,
                "items": entries,
            })),
        )
            .into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}
