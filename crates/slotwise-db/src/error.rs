//! # Database Error Types
//!
//! Error types for database operations.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Propagation                                    │
//! │                                                                         │
//! │  SQLite Error (sqlx::Error)                                            │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  DbError (this module) ← Categorized by ErrorKind / SQLite result code │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  BookingError (coordinator) ← UniqueViolation → TimeSlotConflict       │
//! │                                everything else → TransientStoreError   │
//! │                                                                         │
//! │  DbError never crosses the coordinator boundary.                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::time::Duration;

use slotwise_core::BookingError;
use sqlx::error::ErrorKind;
use thiserror::Error;

/// SQLite primary result codes that mean "another connection holds the lock".
const SQLITE_BUSY: i32 = 5;
const SQLITE_LOCKED: i32 = 6;

/// Extended result code for a UNIQUE constraint (primary keys report 1555).
const SQLITE_CONSTRAINT_UNIQUE: i32 = 2067;

/// Partial unique index over occupied reservation starts.
const SLOT_INDEX: &str = "ux_reservations_occupied_start";

/// Database operation errors.
#[derive(Debug, Error)]
pub enum DbError {
    /// Entity not found in database.
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// Unique constraint violation.
    ///
    /// ## When This Occurs
    /// - Two occupying reservations starting at the same minute for the same
    ///   staff or pool (`ux_reservations_occupied_start`)
    /// - Duplicate primary key
    #[error("Unique constraint failed: {constraint}")]
    UniqueViolation {
        constraint: String,
        /// SQLite extended result code, when the driver reported one.
        extended_code: Option<i32>,
    },

    /// Foreign key constraint violation.
    #[error("Foreign key violation: {message}")]
    ForeignKeyViolation { message: String },

    /// Another connection holds the write lock and `busy_timeout` expired.
    #[error("Database is busy: {0}")]
    Busy(String),

    /// A unit of work exceeded its deadline and was abandoned.
    #[error("Operation timed out after {0:?}")]
    Timeout(Duration),

    /// Database connection failed.
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// Migration failed.
    #[error("Migration failed: {0}")]
    MigrationFailed(String),

    /// Query execution failed.
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// A stored row could not be turned into a domain value.
    #[error("Corrupt {entity} row {id}: {reason}")]
    CorruptRow {
        entity: String,
        id: String,
        reason: String,
    },

    /// Pool exhausted (all connections in use).
    #[error("Connection pool exhausted")]
    PoolExhausted,

    /// Internal database error.
    #[error("Internal database error: {0}")]
    Internal(String),
}

impl DbError {
    /// Creates a NotFound error for a given entity type and ID.
    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        DbError::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }

    /// Creates a CorruptRow error.
    pub fn corrupt(entity: impl Into<String>, id: impl Into<String>, reason: impl ToString) -> Self {
        DbError::CorruptRow {
            entity: entity.into(),
            id: id.into(),
            reason: reason.to_string(),
        }
    }

    /// True for the unique index that guards occupied reservation starts.
    ///
    /// Only meaningful for errors from inserting a reservation. That index is
    /// the table's only UNIQUE constraint, so `SQLITE_CONSTRAINT_UNIQUE`
    /// identifies it even when the message names no index.
    pub fn is_slot_collision(&self) -> bool {
        match self {
            DbError::UniqueViolation {
                constraint,
                extended_code,
            } => {
                constraint.contains(SLOT_INDEX) || *extended_code == Some(SQLITE_CONSTRAINT_UNIQUE)
            }
            _ => false,
        }
    }

    /// Faults that retrying with the same input cannot fix.
    pub fn is_permanent(&self) -> bool {
        matches!(self, DbError::CorruptRow { .. } | DbError::MigrationFailed(_))
    }
}

/// Convert sqlx errors to DbError.
///
/// ## Error Mapping
/// ```text
/// sqlx::Error::RowNotFound        → DbError::NotFound
/// ErrorKind::UniqueViolation      → DbError::UniqueViolation
/// ErrorKind::ForeignKeyViolation  → DbError::ForeignKeyViolation
/// SQLITE_BUSY / SQLITE_LOCKED     → DbError::Busy
/// sqlx::Error::PoolTimedOut       → DbError::PoolExhausted
/// Other                           → DbError::Internal
/// ```
impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => DbError::NotFound {
                entity: "Record".to_string(),
                id: "unknown".to_string(),
            },

            sqlx::Error::Database(db_err) => {
                let msg = db_err.message().to_string();
                let code = db_err.code().and_then(|c| c.parse::<i32>().ok());

                match db_err.kind() {
                    // "UNIQUE constraint failed: index 'ux_...'" or "table.column"
                    ErrorKind::UniqueViolation => DbError::UniqueViolation {
                        constraint: msg
                            .split("UNIQUE constraint failed: ")
                            .nth(1)
                            .unwrap_or(&msg)
                            .to_string(),
                        extended_code: code,
                    },
                    ErrorKind::ForeignKeyViolation => DbError::ForeignKeyViolation { message: msg },
                    _ => match code.map(|c| c & 0xff) {
                        Some(SQLITE_BUSY) | Some(SQLITE_LOCKED) => DbError::Busy(msg),
                        _ => DbError::QueryFailed(msg),
                    },
                }
            }

            sqlx::Error::PoolTimedOut => DbError::PoolExhausted,

            sqlx::Error::PoolClosed => DbError::ConnectionFailed("Pool is closed".to_string()),

            sqlx::Error::Io(e) => DbError::ConnectionFailed(e.to_string()),

            _ => DbError::Internal(err.to_string()),
        }
    }
}

impl From<sqlx::migrate::MigrateError> for DbError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        DbError::MigrationFailed(err.to_string())
    }
}

/// Collapses storage failures into the booking taxonomy.
///
/// Corrupt rows and failed migrations become `StoreFault`, which is not
/// retryable. Every other variant becomes `TransientStoreError`. A slot
/// collision needs the request's tenant, scope, date and time to become
/// `TimeSlotConflict`, so the coordinator checks
/// [`DbError::is_slot_collision`] before converting.
impl From<DbError> for BookingError {
    fn from(err: DbError) -> Self {
        if err.is_permanent() {
            tracing::error!(error = %err, "Store fault, retrying will not help");
            return BookingError::StoreFault {
                reason: err.to_string(),
            };
        }

        match &err {
            DbError::Busy(_) | DbError::Timeout(_) | DbError::PoolExhausted => {
                tracing::warn!(error = %err, "Store contention");
            }
            _ => tracing::error!(error = %err, "Store operation failed"),
        }
        BookingError::transient(err.to_string())
    }
}

/// Result type for database operations.
pub type DbResult<T> = Result<T, DbError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slot_collision_detection() {
        let err = DbError::UniqueViolation {
            constraint: "index 'ux_reservations_occupied_start'".to_string(),
            extended_code: Some(SQLITE_CONSTRAINT_UNIQUE),
        };
        assert!(err.is_slot_collision());

        // Primary key clash on the reservation id
        let err = DbError::UniqueViolation {
            constraint: "reservations.id".to_string(),
            extended_code: Some(1555),
        };
        assert!(!err.is_slot_collision());
    }

    #[test]
    fn test_slot_collision_by_extended_code() {
        let err = DbError::UniqueViolation {
            constraint: "constraint failed".to_string(),
            extended_code: Some(2067),
        };
        assert!(err.is_slot_collision());

        let err = DbError::UniqueViolation {
            constraint: "constraint failed".to_string(),
            extended_code: None,
        };
        assert!(!err.is_slot_collision());
    }

    #[test]
    fn test_row_not_found_maps_to_not_found() {
        let err: DbError = sqlx::Error::RowNotFound.into();
        assert!(matches!(err, DbError::NotFound { .. }));

        let err: DbError = sqlx::Error::PoolTimedOut.into();
        assert!(matches!(err, DbError::PoolExhausted));
    }

    #[test]
    fn test_store_errors_become_transient() {
        let err: BookingError = DbError::Busy("database is locked".to_string()).into();
        assert!(err.is_retryable());

        let err: BookingError = DbError::Timeout(Duration::from_millis(50)).into();
        assert!(matches!(err, BookingError::TransientStoreError { ref reason } if reason.contains("timed out")));
    }

    #[test]
    fn test_data_faults_are_not_retryable() {
        let err: BookingError = DbError::corrupt("Reservation", "r1", "bad time '25:00'").into();
        assert!(matches!(err, BookingError::StoreFault { ref reason } if reason.contains("r1")));
        assert!(!err.is_retryable());

        let err: BookingError = DbError::MigrationFailed("checksum mismatch".to_string()).into();
        assert!(matches!(err, BookingError::StoreFault { .. }));
        assert!(!err.is_retryable());

        let err: BookingError = DbError::QueryFailed("disk I/O error".to_string()).into();
        assert!(err.is_retryable());
    }
}
