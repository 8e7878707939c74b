use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use flashcart_core::{DomainError, Retry};

/// Map a core error to its transport status.
///
/// The body carries the retry class so clients can tell "try again" from
/// "wait for stock" from "never".
pub fn domain_error_to_response(err: DomainError) -> axum::response::Response {
    let (status, code) = match &err {
        DomainError::NotFound(_) => (StatusCode::NOT_FOUND, "not_found"),
        DomainError::ItemNotFound(_) => (StatusCode::NOT_FOUND, "item_not_found"),
        DomainError::Unauthorized => (StatusCode::FORBIDDEN, "unauthorized"),
        DomainError::EmptyCart => (StatusCode::BAD_REQUEST, "empty_cart"),
        DomainError::Validation(_) => (StatusCode::BAD_REQUEST, "validation_error"),
        DomainError::InsufficientStock { .. } => (StatusCode::CONFLICT, "insufficient_stock"),
        DomainError::VersionConflict { .. } => (StatusCode::CONFLICT, "version_conflict"),
        DomainError::ReservationFailed => (StatusCode::CONFLICT, "reservation_failed"),
    };

    let retry = match err.retry_class() {
        Retry::Immediately => "immediately",
        Retry::WhenRestocked => "when_restocked",
        Retry::Never => "never",
    };

    (
        status,
        axum::Json(json!({
            "error": code,
            "message": err.to_string(),
            "retry": retry,
        })),
    )
        .into_response()
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

/// Parse a path or body id, answering 400 on garbage.
pub fn parse_id<T: std::str::FromStr>(raw: &str, what: &'static str) -> Result<T, axum::response::Response> {
    raw.parse()
        .map_err(|_| json_error(StatusCode::BAD_REQUEST, "invalid_id", format!("invalid {what} id")))
}
