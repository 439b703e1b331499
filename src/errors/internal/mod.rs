use thiserror::Error;

pub mod authentication;
pub mod authorization;
pub mod conflict;
pub mod database;
pub mod validation;

pub use authentication::AuthenticationError;
pub use authorization::AuthorizationError;
pub use conflict::ConflictError;
pub use database::DatabaseError;
pub use validation::{FieldError, ValidationError};

/// Internal error type for store, service and coordinator operations
///
/// Hybrid design separates infrastructure errors (Database, Crypto, Export) from
/// domain errors that map onto a specific HTTP outcome.
/// Not exposed via API - endpoints must convert with `ApiError::from_internal_error`.
#[derive(Error, Debug)]
pub enum InternalError {
    #[error(transparent)]
    Database(#[from] DatabaseError),

    #[error("Crypto error: {operation} failed: {message}")]
    Crypto { operation: String, message: String },

    #[error("Export error: {0}")]
    Export(String),

    #[error(transparent)]
    Authentication(#[from] AuthenticationError),

    #[error(transparent)]
    Authorization(#[from] AuthorizationError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Missing row, or a row outside the requester's scope
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    #[error(transparent)]
    Conflict(#[from] ConflictError),
}

impl InternalError {
    pub fn database(operation: &str, source: sea_orm::DbErr) -> InternalError {
        InternalError::Database(DatabaseError::Operation {
            operation: operation.to_string(),
            source,
        })
    }

    pub fn transaction_begin(source: sea_orm::DbErr) -> InternalError {
        InternalError::Database(DatabaseError::TransactionBegin { source })
    }

    pub fn transaction_commit(source: sea_orm::DbErr) -> InternalError {
        InternalError::Database(DatabaseError::TransactionCommit { source })
    }

    pub fn crypto(operation: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Crypto {
            operation: operation.into(),
            message: message.into(),
        }
    }

    pub fn not_found(entity: impl Into<String>, id: impl ToString) -> Self {
        Self::NotFound {
            entity: entity.into(),
            id: id.to_string(),
        }
    }

    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation(ValidationError::field(field, message))
    }
}
