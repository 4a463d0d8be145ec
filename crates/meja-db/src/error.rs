//! Storage errors.
//!
//! The cart swallows these (it logs and keeps its last-known-good list);
//! the session repositories return them to the API layer.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DbError {
    // =========================================================================
    // Connection
    // =========================================================================
    /// The database could not be opened (bad path, permissions, disk).
    #[error("Cannot open database: {0}")]
    ConnectionFailed(String),

    #[error("Schema migration failed: {0}")]
    MigrationFailed(String),

    /// Every connection stayed busy until the acquire timeout.
    #[error("No database connection available")]
    PoolExhausted,

    // =========================================================================
    // Operations
    // =========================================================================
    #[error("Storage query failed: {0}")]
    QueryFailed(String),

    /// A document did not (de)serialize, e.g. a row written by an older build.
    #[error("Invalid stored value for '{key}': {reason}")]
    InvalidValue { key: String, reason: String },

    /// The backend refused the write.
    #[error("Storage unavailable: {0}")]
    Unavailable(String),

    #[error("Storage error: {0}")]
    Internal(String),
}

impl DbError {
    pub fn invalid_value(key: impl Into<String>, reason: impl ToString) -> Self {
        DbError::InvalidValue {
            key: key.into(),
            reason: reason.to_string(),
        }
    }
}

impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::PoolTimedOut => DbError::PoolExhausted,
            sqlx::Error::PoolClosed => DbError::ConnectionFailed("pool closed".into()),
            sqlx::Error::Database(e) => DbError::QueryFailed(e.message().to_string()),
            other => DbError::Internal(other.to_string()),
        }
    }
}

impl From<sqlx::migrate::MigrateError> for DbError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        DbError::MigrationFailed(err.to_string())
    }
}

pub type DbResult<T> = Result<T, DbError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = DbError::invalid_value("user", "missing field `orderType`");
        assert_eq!(
            err.to_string(),
            "Invalid stored value for 'user': missing field `orderType`"
        );
        assert_eq!(DbError::PoolExhausted.to_string(), "No database connection available");
    }

    #[test]
    fn test_pool_errors_map() {
        assert!(matches!(
            DbError::from(sqlx::Error::PoolTimedOut),
            DbError::PoolExhausted
        ));
        assert!(matches!(
            DbError::from(sqlx::Error::PoolClosed),
            DbError::ConnectionFailed(_)
        ));
        assert!(matches!(
            DbError::from(sqlx::Error::RowNotFound),
            DbError::Internal(_)
        ));
    }
}
