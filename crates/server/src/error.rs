//! Unified error handling for the HTTP surface.
//!
//! Provides a single error type that maps engine errors to HTTP responses.
//! Every rejection reaches the client with a reason; nothing is silently
//! dropped.

use auction_core::EngineError;
use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

/// Application error type with HTTP response mapping.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Resource not found (404).
    #[error("{0}")]
    NotFound(String),

    /// Admin credentials missing or wrong (403).
    #[error("{0}")]
    Forbidden(String),

    /// Invalid request data (400).
    #[error("{0}")]
    BadRequest(String),

    /// Operation conflicts with the auction's current state (409).
    #[error("{0}")]
    Conflict(String),

    /// Internal error or broken invariant (500).
    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<EngineError> for ApiError {
    fn from(err: EngineError) -> Self {
        let message = err.to_string();
        match err {
            EngineError::UnknownAuction(_)
            | EngineError::UnknownPlayer(_)
            | EngineError::UnknownParticipant(_) => ApiError::NotFound(message),
            EngineError::Unauthorized => ApiError::Forbidden(message),
            EngineError::Validation(_) => ApiError::BadRequest(message),
            EngineError::InvalidState(_)
            | EngineError::AuctionPaused
            | EngineError::NotLive(_)
            | EngineError::TimerExpired
            | EngineError::BidTooLow { .. }
            | EngineError::SquadFull { .. }
            | EngineError::InsufficientFunds { .. } => ApiError::Conflict(message),
            EngineError::InvariantViolation(_) => ApiError::Internal(message),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = Json(json!({
            "error": self.to_string(),
            "status": status.as_u16()
        }));

        (status, body).into_response()
    }
}

/// Result type alias for handlers.
pub type ApiResult<T> = Result<T, ApiError>;
