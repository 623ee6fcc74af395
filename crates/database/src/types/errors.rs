//! Error types for the database layer

use std::time::Duration;
use thiserror::Error;

/// General database error shared by every repository and the client facade.
///
/// Callers are expected to branch on the variant: `NotFound` and
/// `UniqueViolation` are row-level outcomes reported by the engine,
/// `InvalidQuery` is a shape error rejected before any SQL is issued, and
/// `Connection`/`PoolTimeout` are the transient kinds worth retrying.
#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("database connection error: {0}")]
    Connection(String),

    #[error("database migration error: {0}")]
    Migration(String),

    #[error("{entity} not found")]
    NotFound { entity: &'static str },

    #[error("unique constraint violation: {0}")]
    UniqueViolation(String),

    #[error("invalid query: {0}")]
    InvalidQuery(String),

    #[error("failed to decode {entity} row: {message}")]
    Decode {
        entity: &'static str,
        message: String,
    },

    #[error("could not acquire a connection within {0:?}")]
    PoolTimeout(Duration),

    #[error("transaction exceeded its {0:?} deadline")]
    TransactionTimeout(Duration),

    #[error("database error: {0}")]
    Sqlx(#[from] sqlx::Error),
}

impl DatabaseError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    pub fn is_unique_violation(&self) -> bool {
        matches!(self, Self::UniqueViolation(_))
    }

    pub fn is_invalid_query(&self) -> bool {
        matches!(self, Self::InvalidQuery(_))
    }

    /// Whether the error is transient and the operation can be retried as-is.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Connection(_) | Self::PoolTimeout(_) | Self::TransactionTimeout(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_kinds_are_distinguishable() {
        let not_found = DatabaseError::NotFound { entity: "User" };
        assert!(not_found.is_not_found());
        assert!(!not_found.is_retryable());

        let conflict = DatabaseError::UniqueViolation("users.email".to_string());
        assert!(conflict.is_unique_violation());
        assert!(!conflict.is_retryable());

        let shape = DatabaseError::InvalidQuery("select and include".to_string());
        assert!(shape.is_invalid_query());

        let transient = DatabaseError::PoolTimeout(Duration::from_secs(2));
        assert!(transient.is_retryable());
    }
}
