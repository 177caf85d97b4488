/// Error types for the storage layer and the payment domain service

use serde::{Deserialize, Serialize};

/// A single rule violation on an input field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    /// Wire name of the offending field (camelCase)
    pub field: String,

    /// Human-readable message
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Errors raised by a `PaymentStore` or `UserStore`
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A payment referenced a user that does not exist
    #[error("User {0} does not exist")]
    OwnerMissing(i64),

    /// A recurring payment's next due date cannot be represented
    #[error("Cannot roll payment over: {}", .0.message)]
    Rollover(FieldError),

    /// Underlying database failure
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Store result type alias
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors returned by the payment domain service
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    /// Input broke one or more field rules; nothing was persisted
    #[error("Validation failed: {} errors", .0.len())]
    Validation(Vec<FieldError>),

    /// The entity does not exist for this caller
    ///
    /// Raised both when the id is absent and when it belongs to another
    /// user, so callers cannot probe for other users' records.
    #[error("{entity} with ID {id} not found")]
    NotFound { entity: &'static str, id: i64 },

    /// Storage failure
    #[error(transparent)]
    Store(StoreError),
}

impl ServiceError {
    pub fn payment_not_found(id: i64) -> Self {
        ServiceError::NotFound {
            entity: "Payment",
            id,
        }
    }
}

impl From<StoreError> for ServiceError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::OwnerMissing(id) => ServiceError::NotFound { entity: "User", id },
            StoreError::Rollover(field) => ServiceError::Validation(vec![field]),
            other => ServiceError::Store(other),
        }
    }
}

/// Service result type alias
pub type ServiceResult<T> = Result<T, ServiceError>;
