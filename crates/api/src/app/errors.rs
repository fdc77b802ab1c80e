use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use stockpile_core::DomainError;
use stockpile_infra::{MutationError, StoreError};

pub fn mutation_error_to_response(err: MutationError) -> axum::response::Response {
    let status = match &err {
        MutationError::Validation(_) => StatusCode::BAD_REQUEST,
        MutationError::NotFound(_) => StatusCode::NOT_FOUND,
        MutationError::DuplicateSubmission(_) | MutationError::ConcurrencyConflict { .. } => StatusCode::CONFLICT,
        MutationError::InsufficientStock { .. }
        | MutationError::InsufficientAvailableStock { .. }
        | MutationError::ExcessiveRelease { .. }
        | MutationError::ReservedExceedsQuantity { .. }
        | MutationError::ProductMismatch { .. }
        | MutationError::LocationMismatch { .. }
        | MutationError::NoopTransfer
        | MutationError::InvariantViolation(_) => StatusCode::UNPROCESSABLE_ENTITY,
        MutationError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    if status == StatusCode::INTERNAL_SERVER_ERROR {
        tracing::error!(error = %err, "mutation failed");
    }
    json_error(status, err.code(), err.to_string())
}

pub fn store_error_to_response(err: StoreError) -> axum::response::Response {
    match err {
        StoreError::InvalidQuery(msg) => json_error(StatusCode::BAD_REQUEST, "invalid_query", msg),
        other => mutation_error_to_response(other.into()),
    }
}

pub fn domain_error_to_response(err: DomainError) -> axum::response::Response {
    match err {
        DomainError::InvalidId(msg) => json_error(StatusCode::BAD_REQUEST, "invalid_id", msg),
        other => mutation_error_to_response(other.into()),
    }
}

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}

pub fn param_error_to_response(err: super::dto::ParamError) -> axum::response::Response {
    match err {
        super::dto::ParamError::Domain(e) => domain_error_to_response(e),
        super::dto::ParamError::Query(e) => store_error_to_response(e),
    }
}
