//! Error types for marketplace operations.

use database::DatabaseError;
use thiserror::Error;

/// Errors that can occur in the negotiation core.
///
/// Each variant is a distinct, user-visible failure kind; the HTTP layer
/// maps them to status codes one-to-one.
#[derive(Debug, Error)]
pub enum MarketError {
    /// Malformed or inconsistent input, e.g. an offered item not owned by
    /// the claimed party.
    #[error("validation failed: {0}")]
    Validation(String),

    /// Target record absent.
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    /// Acting user is not a participant of the trade or chat.
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// Operation is illegal for the trade's current status.
    #[error("invalid state: {0}")]
    InvalidState(String),

    /// Underlying persistence failure.
    #[error(transparent)]
    Database(DatabaseError),
}

impl From<DatabaseError> for MarketError {
    fn from(err: DatabaseError) -> Self {
        // Missing records surface as NotFound at this layer too; everything
        // else stays an opaque persistence failure.
        match err {
            DatabaseError::NotFound { entity, id } => MarketError::NotFound { entity, id },
            other => MarketError::Database(other),
        }
    }
}

/// Result type for marketplace operations.
pub type Result<T> = std::result::Result<T, MarketError>;
