use std::sync::Arc;

use axum::{Json, extract::Extension, http::StatusCode, response::IntoResponse};

use crate::app::services::AppServices;
use crate::context::ActorContext;

pub async fn health() -> StatusCode {
    StatusCode::OK
}

pub async fn whoami(Extension(actor): Extension<ActorContext>) -> impl IntoResponse {
    Json(serde_json::json!({
        "user_id": actor.user_id().to_string(),
    }))
}

/// Stock alerts raised since startup, oldest first.
pub async fn notifications(Extension(services): Extension<Arc<AppServices>>) -> impl IntoResponse {
    let alerts = services.alerts.all();
    Json(serde_json::json!({
        "total": alerts.len(),
        "items": alerts,
    }))
}
