use actix_web::{HttpResponse, http::StatusCode};
use serde_json::json;
use thiserror::Error;

/// Failure taxonomy surfaced by the check-in core and its HTTP layer.
///
/// `AlreadyCheckedIn` and `NoActiveCheckin` are business-state conflicts, not
/// bugs and not client-input errors; they get their own status so callers can
/// branch on conflict vs bad request vs unauthenticated.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    InvalidInput(String),

    #[error("Already checked in")]
    AlreadyCheckedIn,

    #[error("No active check-in")]
    NoActiveCheckin,

    #[error("Authentication required")]
    Unauthenticated,

    /// Transient storage failure. The whole operation is safe to retry from
    /// the caller's side since every mutation is a single atomic statement.
    #[error("Storage unavailable")]
    Storage(#[source] sqlx::Error),
}

impl From<sqlx::Error> for ApiError {
    fn from(e: sqlx::Error) -> Self {
        ApiError::Storage(e)
    }
}

impl actix_web::ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            ApiError::AlreadyCheckedIn | ApiError::NoActiveCheckin => StatusCode::CONFLICT,
            ApiError::Unauthenticated => StatusCode::UNAUTHORIZED,
            ApiError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        if let ApiError::Storage(source) = self {
            tracing::error!(error = %source, "storage failure");
        }
        // Display never carries a raw driver error string.
        HttpResponse::build(self.status_code()).json(json!({ "error": self.to_string() }))
    }
}
