//! Storage error types

use sea_orm::DbErr;
use thiserror::Error;

/// Result type for storage operations
pub type StorageResult<T> = std::result::Result<T, StorageError>;

/// Storage-related errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(#[from] DbErr),

    /// Entity not found by id or key
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: String },

    /// A referenced row or unique value rejected the write
    #[error("Constraint violation on {field}: {message}")]
    Constraint { field: String, message: String },

    #[error("Migration failed: {0}")]
    Migration(String),

    #[error("Seed failed: {0}")]
    Seed(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl StorageError {
    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        StorageError::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    pub fn constraint(field: impl Into<String>, message: impl Into<String>) -> Self {
        StorageError::Constraint {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Whether this error means the requested row does not exist
    pub fn is_not_found(&self) -> bool {
        matches!(self, StorageError::NotFound { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_message() {
        let err = StorageError::not_found("issue", "QA-9");
        assert_eq!(err.to_string(), "issue QA-9 not found");
        assert!(err.is_not_found());
        assert!(!StorageError::Seed("x".into()).is_not_found());
    }
}
