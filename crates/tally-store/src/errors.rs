//! Error types for the persistence layer.

use thiserror::Error;

/// Errors that can occur during store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// `SQLite` database error.
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// Connection pool error.
    #[error("connection pool error: {0}")]
    Pool(#[from] r2d2::Error),

    /// Schema migration failed.
    #[error("migration error: {message}")]
    Migration {
        /// Describes which migration failed and why.
        message: String,
    },

    /// Requested contest was not found.
    #[error("contest not found: {0}")]
    ContestNotFound(i64),

    /// The operation can't be applied to the given input.
    #[error("invalid operation: {0}")]
    InvalidOperation(String),
}

/// Convenience type alias for store results.
pub type Result<T> = std::result::Result<T, StoreError>;

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sqlite_error_display() {
        let err = StoreError::Sqlite(rusqlite::Error::QueryReturnedNoRows);
        assert!(err.to_string().contains("sqlite error"));
    }

    #[test]
    fn migration_error_display() {
        let err = StoreError::Migration {
            message: "v001 failed: table already exists".into(),
        };
        assert_eq!(
            err.to_string(),
            "migration error: v001 failed: table already exists"
        );
    }

    #[test]
    fn contest_not_found_display() {
        assert_eq!(
            StoreError::ContestNotFound(42).to_string(),
            "contest not found: 42"
        );
    }

    #[test]
    fn from_rusqlite_error() {
        let err: StoreError = rusqlite::Error::QueryReturnedNoRows.into();
        assert!(matches!(err, StoreError::Sqlite(_)));
    }
}
