//! # Database Error Types
//!
//! Error types for database operations and number issuance.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Propagation                                    │
//! │                                                                         │
//! │  sqlx::Error                                                           │
//! │       │                                                                 │
//! │       ├── lock wait expired? ──► is_lock_timeout() ──► fallback read   │
//! │       │                          (never reaches the caller)            │
//! │       ▼                                                                 │
//! │  NumberingError::DataAccess  ← original sqlx error, untouched          │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  DbError (this module) ← Adds context and categorization               │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Calling workflow decides whether to retry the whole document          │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use koperasi_core::{CoreError, NumberParseError, ValidationError};
use sqlx::postgres::PgDatabaseError;
use thiserror::Error;

// =============================================================================
// Numbering Errors
// =============================================================================

/// Failures of [`crate::sequence::SequenceGenerator::next`].
///
/// A lock timeout is deliberately absent: it triggers the fallback read and
/// is never reported to the caller.
#[derive(Debug, Error)]
pub enum NumberingError {
    /// No transaction was supplied. Rejected before any query runs.
    #[error("Document numbers can only be issued inside an open transaction")]
    MissingTransaction,

    /// The request itself is invalid (missing variant, unrepresentable year).
    #[error("Invalid numbering request: {0}")]
    InvalidRequest(#[from] CoreError),

    /// The last issued number in the table could not be parsed.
    #[error("Malformed document number '{number}': {source}")]
    MalformedNumber {
        number: String,
        #[source]
        source: NumberParseError,
    },

    /// The scope already issued `u32::MAX` numbers.
    #[error("Running count exhausted for {scope}")]
    RunningCountOverflow { scope: String },

    /// Any storage failure other than a lock timeout, passed through as-is.
    #[error("Data access failed: {0}")]
    DataAccess(#[from] sqlx::Error),
}

impl NumberingError {
    /// Returns true for failures of the request itself, as opposed to the
    /// store or its data.
    pub fn is_precondition(&self) -> bool {
        matches!(
            self,
            NumberingError::MissingTransaction | NumberingError::InvalidRequest(_)
        )
    }
}

/// Result type for number issuance.
pub type NumberingResult<T> = Result<T, NumberingError>;

// =============================================================================
// Lock Timeout Classification
// =============================================================================

/// PostgreSQL `lock_not_available`, raised when `lock_timeout` expires.
const PG_LOCK_NOT_AVAILABLE: &str = "55P03";

/// SQLite primary result code `SQLITE_BUSY`.
const SQLITE_BUSY: i32 = 5;

/// `SQLITE_BUSY_SNAPSHOT`: the read snapshot is stale. Waiting longer cannot
/// fix it, so it is not a timeout.
const SQLITE_BUSY_SNAPSHOT: i32 = 517;

/// Returns true if `err` means "gave up waiting for a lock".
///
/// ## Classification
/// ```text
/// PostgreSQL  55P03 lock_not_available        → timeout
/// PostgreSQL  40P01 deadlock_detected         → NOT a timeout
/// PostgreSQL  any other SQLSTATE              → NOT a timeout
/// SQLite      5 / 261 / 773 (SQLITE_BUSY_*)   → timeout
/// SQLite      517 SQLITE_BUSY_SNAPSHOT        → NOT a timeout
/// anything else                               → NOT a timeout
/// ```
///
/// SQLSTATEs are five characters and often all digits (`42501`), so they
/// never go through the SQLite result-code check.
pub fn is_lock_timeout(err: &sqlx::Error) -> bool {
    let sqlx::Error::Database(db_err) = err else {
        return false;
    };
    let Some(code) = db_err.code() else {
        return false;
    };

    if db_err.try_downcast_ref::<PgDatabaseError>().is_some() || is_sqlstate(&code) {
        return code == PG_LOCK_NOT_AVAILABLE;
    }

    match code.parse::<i32>() {
        Ok(SQLITE_BUSY_SNAPSHOT) => false,
        Ok(extended) => extended & 0xff == SQLITE_BUSY,
        Err(_) => false,
    }
}

/// SQLite result codes top out at four digits; SQLSTATEs are always five.
fn is_sqlstate(code: &str) -> bool {
    code.len() == 5 && code.bytes().all(|b| b.is_ascii_alphanumeric())
}

// =============================================================================
// Database Errors
// =============================================================================

/// Database operation errors.
///
/// These errors wrap sqlx errors and provide additional context
/// for debugging and user feedback.
#[derive(Debug, Error)]
pub enum DbError {
    /// Entity not found in database.
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// Unique constraint violation.
    ///
    /// ## When This Occurs
    /// - Two committed documents received the same number (only possible
    ///   after a lock-timeout fallback read)
    /// - Any other UNIQUE index violation
    #[error("Duplicate {field}: '{value}' already exists")]
    UniqueViolation { field: String, value: String },

    /// Foreign key constraint violation.
    #[error("Foreign key violation: {message}")]
    ForeignKeyViolation { message: String },

    /// Database connection failed.
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// Migration failed.
    #[error("Migration failed: {0}")]
    MigrationFailed(String),

    /// Query execution failed.
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Pool exhausted (all connections in use).
    #[error("Connection pool exhausted")]
    PoolExhausted,

    /// The document failed input validation; nothing was numbered.
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationError),

    /// Number issuance failed.
    #[error("Numbering failed: {0}")]
    Numbering(#[from] NumberingError),

    /// Internal database error.
    #[error("Internal database error: {0}")]
    Internal(String),
}

impl DbError {
    /// Creates a UniqueViolation error.
    pub fn duplicate(field: impl Into<String>, value: impl Into<String>) -> Self {
        DbError::UniqueViolation {
            field: field.into(),
            value: value.into(),
        }
    }
}

/// Convert sqlx errors to DbError.
///
/// ## Error Mapping
/// ```text
/// sqlx::Error::RowNotFound    → DbError::NotFound
/// sqlx::Error::Database       → Constraint kind, else QueryFailed
/// sqlx::Error::PoolTimedOut   → DbError::PoolExhausted
/// Other                       → DbError::Internal
/// ```
impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => DbError::NotFound {
                entity: "Record".to_string(),
                id: "unknown".to_string(),
            },

            sqlx::Error::Database(db_err) => {
                let msg = db_err.message();

                if db_err.is_unique_violation() {
                    // SQLite: "UNIQUE constraint failed: <table>.<column>"
                    // PostgreSQL: constraint name, e.g. "sales_number_key"
                    let field = msg
                        .split("UNIQUE constraint failed: ")
                        .nth(1)
                        .map(str::to_string)
                        .or_else(|| db_err.constraint().map(str::to_string))
                        .unwrap_or_else(|| "unknown".to_string());
                    DbError::UniqueViolation {
                        field,
                        value: "unknown".to_string(),
                    }
                } else if db_err.is_foreign_key_violation() {
                    DbError::ForeignKeyViolation {
                        message: msg.to_string(),
                    }
                } else {
                    DbError::QueryFailed(msg.to_string())
                }
            }

            sqlx::Error::PoolTimedOut => DbError::PoolExhausted,

            sqlx::Error::PoolClosed => DbError::ConnectionFailed("Pool is closed".to_string()),

            _ => DbError::Internal(err.to_string()),
        }
    }
}

impl From<sqlx::migrate::MigrateError> for DbError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        DbError::MigrationFailed(err.to_string())
    }
}

/// Result type for database operations.
pub type DbResult<T> = Result<T, DbError>;

// =============================================================================
// Unit Tests
// =============================================================================
