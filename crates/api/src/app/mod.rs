//! HTTP API application wiring (Axum router + service wiring).
//!
//! - `services.rs`: engine/store/catalog wiring
//! - `routes/`: HTTP routes + handlers (one file per area)
//! - `dto.rs`: request/response DTOs and JSON mapping helpers
//! - `errors.rs`: consistent error responses

use std::sync::Arc;

use axum::{Extension, Router, routing::get};
use tower::ServiceBuilder;

use stockpile_infra::EngineConfig;

use crate::middleware;

pub mod dto;
pub mod errors;
pub mod routes;
pub mod services;

/// Build the full HTTP router with fresh in-memory services.
pub fn build_app(config: EngineConfig) -> Router {
    router_with(Arc::new(services::build_services(config)))
}

/// Build the router around existing services.
pub fn router_with(services: Arc<services::AppServices>) -> Router {
    // Inventory routes: require an acting user.
    let protected = routes::router()
        .layer(Extension(services))
        .layer(axum::middleware::from_fn(middleware::actor_middleware));

    Router::new()
        .route("/health", get(routes::system::health))
        .merge(protected)
        .layer(ServiceBuilder::new())
}
