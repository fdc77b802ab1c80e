use axum::{Router, routing::get};

use stockpile_core::DomainError;

use crate::app::errors;

pub mod catalog;
pub mod ledger;
pub mod stock;
pub mod system;

/// Router for all endpoints that act on behalf of a user.
pub fn router() -> Router {
    Router::new()
        .route("/whoami", get(system::whoami))
        .route("/notifications", get(system::notifications))
        .nest("/stock", stock::router())
        .nest("/ledger", ledger::router())
        .nest("/catalog", catalog::router())
}

/// Parse a typed id from a path segment, mapping failures to a 400 response.
pub(crate) fn path_id<T>(raw: &str) -> Result<T, axum::response::Response>
where
    T: core::str::FromStr<Err = DomainError>,
{
    raw.trim().parse().map_err(errors::domain_error_to_response)
}
