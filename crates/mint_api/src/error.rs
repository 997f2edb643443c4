use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use mint_core::{Error, ErrorKind};

/// A core error on its way out of a handler.
///
/// Clients see the stable message for the error's kind, never the internal
/// detail; the detail goes to the log.
#[derive(Debug)]
pub struct ApiError(pub Error);

impl From<Error> for ApiError {
    fn from(e: Error) -> Self {
        ApiError(e)
    }
}

pub fn status_for(kind: ErrorKind) -> StatusCode {
    match kind {
        ErrorKind::NotFound => StatusCode::NOT_FOUND,
        ErrorKind::InsufficientBalance => StatusCode::PAYMENT_REQUIRED,
        ErrorKind::BelowMinimum => StatusCode::UNPROCESSABLE_ENTITY,
        ErrorKind::Conflict => StatusCode::CONFLICT,
        ErrorKind::Invalid => StatusCode::BAD_REQUEST,
        ErrorKind::Transient => StatusCode::SERVICE_UNAVAILABLE,
        ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn code(kind: ErrorKind) -> &'static str {
    match kind {
        ErrorKind::NotFound => "not_found",
        ErrorKind::InsufficientBalance => "insufficient_balance",
        ErrorKind::BelowMinimum => "below_minimum",
        ErrorKind::Conflict => "conflict",
        ErrorKind::Invalid => "invalid",
        ErrorKind::Transient => "transient",
        ErrorKind::Internal => "internal",
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let kind = self.0.kind();
        match kind {
            ErrorKind::Internal => tracing::error!(error = %self.0, "Request failed"),
            ErrorKind::Transient => tracing::warn!(error = %self.0, "Request failed, client may retry"),
            _ => tracing::debug!(error = %self.0, "Request rejected"),
        }

        let body = json!({
            "error": code(kind),
            "message": kind.user_message(),
            "retryable": self.0.is_retryable(),
        });
        (status_for(kind), Json(body)).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
