//! # Sequence Generator
//!
//! Issues the next document number for a category and period inside the
//! caller's transaction.
//!
//! ## Issuance Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      SequenceGenerator::next                            │
//! │                                                                         │
//! │  transaction supplied? ── no ──► MissingTransaction (no query runs)    │
//! │       │ yes                                                             │
//! │       ▼                                                                 │
//! │  NumberRequest ──► NumberScope   (date defaults to today for sales)    │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  store.last_number_locked(scope, 5s)                                   │
//! │       │                                                                 │
//! │       ├── Ok(last) ─────────────────────────────┐                      │
//! │       ├── Timeout ──► warn! ──► store.last_number(scope) (no lock)     │
//! │       │                                         │                      │
//! │       └── other error ──► DataAccess            │                      │
//! │                                                 ▼                      │
//! │                       None ──► 001      Some(n) ──► parse(n) + 1       │
//! │                                                 │                      │
//! │                                                 ▼                      │
//! │                                      formatted number (not inserted)   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Fallback Trade-off
//! The unlocked read after a timeout keeps issuance live under contention,
//! at the cost of possibly handing out a number another transaction is
//! about to commit. The UNIQUE constraint on every `number` column turns
//! that into an insert failure rather than a silent duplicate.
//!
//! Nothing is cached between calls. The lock is held by the caller's
//! transaction and released when it commits or rolls back.

mod postgres;
mod sqlite;
mod store;

pub use postgres::PgSequenceStore;
pub use sqlite::SqliteSequenceStore;
pub use store::{LockedReadError, SequenceStore};

use std::time::Duration;

use chrono::Local;
use koperasi_core::{parse_number, NumberRequest, SequenceNumber};
use sqlx::Transaction;
use tracing::{debug, warn};

use crate::error::{NumberingError, NumberingResult};

/// How long an issuer waits for the scope lock before falling back.
pub const LOCK_TIMEOUT: Duration = Duration::from_secs(5);

/// Issues document numbers through a [`SequenceStore`].
#[derive(Debug, Clone, Default)]
pub struct SequenceGenerator<S> {
    store: S,
}

impl<S: SequenceStore> SequenceGenerator<S> {
    pub fn new(store: S) -> Self {
        SequenceGenerator { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Returns the next number for `request`, formatted.
    ///
    /// The caller inserts the document carrying this number in the same
    /// transaction and commits; the generator itself writes no document.
    ///
    /// ## Errors
    /// - `MissingTransaction` when `tx` is `None`
    /// - `InvalidRequest` for a sale without variant, a dated category
    ///   without date, or an unrepresentable year
    /// - `MalformedNumber` when the last stored number does not parse
    /// - `DataAccess` for any storage failure other than a lock timeout
    pub async fn next(
        &self,
        tx: Option<&mut Transaction<'_, S::Database>>,
        request: &NumberRequest,
    ) -> NumberingResult<String> {
        let number = self.next_sequence(tx, request).await?;
        Ok(number.to_string())
    }

    /// Same as [`SequenceGenerator::next`], returning the structured number.
    pub async fn next_sequence(
        &self,
        tx: Option<&mut Transaction<'_, S::Database>>,
        request: &NumberRequest,
    ) -> NumberingResult<SequenceNumber> {
        let tx = tx.ok_or(NumberingError::MissingTransaction)?;
        let scope = request.scope(Local::now().date_naive())?;

        let locked = self
            .store
            .last_number_locked(&mut **tx, &scope, LOCK_TIMEOUT)
            .await;
        let last = match locked {
            Ok(last) => last,
            Err(LockedReadError::Timeout(waited)) => {
                warn!(
                    scope = %scope.lock_key(),
                    waited_ms = waited.as_millis() as u64,
                    "Sequence lock timed out, reading last number without lock"
                );
                self.store.last_number(&mut **tx, &scope).await?
            }
            Err(LockedReadError::Database(err)) => return Err(NumberingError::DataAccess(err)),
        };

        let next = match last {
            None => scope.number(1),
            Some(number) => {
                let parsed = match parse_number(scope.category(), &number) {
                    Ok(parsed) => parsed,
                    Err(source) => return Err(NumberingError::MalformedNumber { number, source }),
                };
                let successor = parsed.successor().map_err(|_| {
                    NumberingError::RunningCountOverflow {
                        scope: scope.lock_key(),
                    }
                })?;
                scope.number(successor.running_count())
            }
        };

        debug!(number = %next, scope = %scope.lock_key(), "Issued document number");
        Ok(next)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
