use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use retrohub_core::error::CoreError;
use serde_json::json;

/// Application-level error type for HTTP handlers.
///
/// Wraps [`CoreError`] for domain errors and adds HTTP-specific variants.
/// Implements [`IntoResponse`] to produce consistent JSON error responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A domain-level error from `retrohub_core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A database error from sqlx.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A bad request with a human-readable message.
    #[error("Bad request: {0}")]
    BadRequest(String),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            // --- CoreError variants ---
            AppError::Core(core) => match core {
                CoreError::NotFound { entity, id } => (
                    StatusCode::NOT_FOUND,
                    "NOT_FOUND",
                    format!("{entity} with id {id} not found"),
                ),
                CoreError::InvalidRange(msg) => {
                    (StatusCode::BAD_REQUEST, "INVALID_RANGE", msg.clone())
                }
                CoreError::InvalidFormat(msg) => {
                    (StatusCode::BAD_REQUEST, "INVALID_FORMAT", msg.clone())
                }
                CoreError::OverlapConflict {
                    product_id,
                    conflicting_id,
                } => (
                    StatusCode::CONFLICT,
                    "OVERLAP_CONFLICT",
                    match conflicting_id {
                        Some(id) => format!(
                            "Date range overlaps discount {id} for product {product_id}"
                        ),
                        None => format!(
                            "Date range overlaps an existing discount for product {product_id}"
                        ),
                    },
                ),
                CoreError::Unauthorized(msg) => {
                    (StatusCode::UNAUTHORIZED, "UNAUTHORIZED", msg.clone())
                }
                CoreError::Forbidden(msg) => (StatusCode::FORBIDDEN, "FORBIDDEN", msg.clone()),
            },

            // --- Database errors ---
            AppError::Database(err) => classify_sqlx_error(err),

            // --- HTTP-specific errors ---
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone()),
        };

        let body = json!({
            "error": message,
            "code": code,
        });

        (status, axum::Json(body)).into_response()
    }
}

/// PostgreSQL SQLSTATE codes the API distinguishes.
mod sqlstate {
    pub const NUMERIC_VALUE_OUT_OF_RANGE: &str = "22003";
    pub const UNIQUE_VIOLATION: &str = "23505";
    pub const CHECK_VIOLATION: &str = "23514";
    pub const EXCLUSION_VIOLATION: &str = "23P01";
}

/// Classify a sqlx error into an HTTP status, error code, and message.
///
/// - `RowNotFound` maps to 404.
/// - Exclusion violations (overlapping discount windows) map to 409.
/// - Check violations and numeric overflow (out-of-range values) map to 400.
/// - Unique constraint violations (constraint name starting with `uq_`) map to 409.
/// - Everything else maps to 500 with a sanitized message.
fn classify_sqlx_error(err: &sqlx::Error) -> (StatusCode, &'static str, String) {
    match err {
        sqlx::Error::RowNotFound => (
            StatusCode::NOT_FOUND,
            "NOT_FOUND",
            "Resource not found".to_string(),
        ),
        sqlx::Error::Database(db_err) => {
            let constraint = db_err.constraint().unwrap_or("unknown");
            match db_err.code().as_deref() {
                Some(sqlstate::EXCLUSION_VIOLATION) => {
                    return (
                        StatusCode::CONFLICT,
                        "OVERLAP_CONFLICT",
                        format!("Date range violates constraint: {constraint}"),
                    );
                }
                Some(sqlstate::CHECK_VIOLATION) => {
                    return (
                        StatusCode::BAD_REQUEST,
                        "INVALID_RANGE",
                        format!("Value violates constraint: {constraint}"),
                    );
                }
                Some(sqlstate::NUMERIC_VALUE_OUT_OF_RANGE) => {
                    return (
                        StatusCode::BAD_REQUEST,
                        "INVALID_RANGE",
                        "Numeric value out of range".to_string(),
                    );
                }
                Some(sqlstate::UNIQUE_VIOLATION) if constraint.starts_with("uq_") => {
                    return (
                        StatusCode::CONFLICT,
                        "CONFLICT",
                        format!("Duplicate value violates unique constraint: {constraint}"),
                    );
                }
                _ => {}
            }
            tracing::error!(error = %db_err, "Database error");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                "An internal error occurred".to_string(),
            )
        }
        other => {
            tracing::error!(error = %other, "Database error");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                "An internal error occurred".to_string(),
            )
        }
    }
}
