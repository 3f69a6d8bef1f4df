//! Error types for the API layer.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use marketplace::MarketError;
use thiserror::Error;

/// Errors surfaced by API handlers.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Request carries no usable caller identity.
    #[error("missing or empty x-user-id header")]
    Unauthorized,

    /// Failure from the negotiation core.
    #[error(transparent)]
    Market(#[from] MarketError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            ApiError::Unauthorized => (StatusCode::UNAUTHORIZED, self.to_string()),
            ApiError::Market(err) => {
                let status = match err {
                    MarketError::Validation(_) => StatusCode::BAD_REQUEST,
                    MarketError::NotFound { .. } => StatusCode::NOT_FOUND,
                    MarketError::Forbidden(_) => StatusCode::FORBIDDEN,
                    MarketError::InvalidState(_) => StatusCode::CONFLICT,
                    MarketError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
                };
                if status == StatusCode::INTERNAL_SERVER_ERROR {
                    tracing::error!("Internal error: {}", err);
                }
                (status, err.to_string())
            }
        };

        let body = serde_json::json!({
            "error": message
        });

        (status, Json(body)).into_response()
    }
}

/// Result type for API handlers.
pub type Result<T> = std::result::Result<T, ApiError>;
