//! # Sequence Stores
//!
//! The storage capability the sequence generator needs: "read the highest
//! issued number of a scope, holding an exclusive lock on that scope, inside
//! the caller's transaction, giving up after a bounded wait".
//!
//! ## Locking Primitive
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  caller's transaction                                                   │
//! │  ├── SAVEPOINT                                                          │
//! │  │   ├── bound lock wait (busy_timeout / lock_timeout)                  │
//! │  │   ├── upsert sequence_locks[scope]   ← exclusive, held until commit │
//! │  │   └── SELECT number … ORDER BY LENGTH(number) DESC, number DESC     │
//! │  ├── RELEASE SAVEPOINT      (lock stays with the outer transaction)     │
//! │  │                                                                      │
//! │  └── on lock timeout: ROLLBACK TO SAVEPOINT, transaction still usable   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Locking the scope row rather than the last document row also serializes
//! the very first issuer of a period, when no document row exists yet, and
//! guarantees the read after the wait sees the previous holder's insert.

use std::time::Duration;

use async_trait::async_trait;
use koperasi_core::{DocumentCategory, NumberScope};
use thiserror::Error;

use crate::error::is_lock_timeout;

/// Why a locked read did not return a number.
#[derive(Debug, Error)]
pub enum LockedReadError {
    /// The lock was not granted within the wait bound.
    #[error("Sequence lock not acquired within {0:?}")]
    Timeout(Duration),

    /// Any other storage failure.
    #[error(transparent)]
    Database(sqlx::Error),
}

impl LockedReadError {
    /// Sorts a raw sqlx error into timeout or not.
    pub fn classify(err: sqlx::Error, timeout: Duration) -> Self {
        if is_lock_timeout(&err) {
            LockedReadError::Timeout(timeout)
        } else {
            LockedReadError::Database(err)
        }
    }
}

/// Reads the last issued number of a scope.
///
/// Implementations must not cache anything: every call goes to the
/// database through the connection it is given.
#[async_trait]
pub trait SequenceStore: Send + Sync {
    /// The sqlx backend the store talks to.
    type Database: sqlx::Database;

    /// Claims the scope lock within `timeout`, then returns the highest
    /// number issued in `scope`, if any.
    ///
    /// The lock belongs to the transaction `conn` is in and is released at
    /// its commit or rollback. On timeout the transaction is left as it was
    /// before the call.
    async fn last_number_locked(
        &self,
        conn: &mut <Self::Database as sqlx::Database>::Connection,
        scope: &NumberScope,
        timeout: Duration,
    ) -> Result<Option<String>, LockedReadError>;

    /// Returns the highest number issued in `scope` without taking any lock.
    async fn last_number(
        &self,
        conn: &mut <Self::Database as sqlx::Database>::Connection,
        scope: &NumberScope,
    ) -> Result<Option<String>, sqlx::Error>;
}

// =============================================================================
// Shared SQL
// =============================================================================

/// Builds the "highest number in scope" query.
///
/// Ordering by length first keeps `…-1000` above `…-999` once the running
/// count outgrows three digits.
pub(crate) fn last_number_sql(
    category: DocumentCategory,
    placeholders: [&str; 2],
    for_update: bool,
) -> String {
    let [pattern, variant] = placeholders;
    let variant_filter = if category.has_variant() {
        format!(" AND variant = {}", variant)
    } else {
        String::new()
    };
    format!(
        "SELECT number FROM {table} WHERE number LIKE {pattern}{variant_filter} \
         ORDER BY LENGTH(number) DESC, number DESC LIMIT 1{lock}",
        table = category.table(),
        pattern = pattern,
        variant_filter = variant_filter,
        lock = if for_update { " FOR UPDATE" } else { "" },
    )
}

// =============================================================================
// Unit Tests
// =============================================================================
