//! SQLite sequence store.
//!
//! SQLite has no row locks; writers are serialized by the database-wide
//! write lock. Upserting the scope's `sequence_locks` row takes that lock
//! for the rest of the caller's transaction, and `busy_timeout` bounds how
//! long the upsert waits for it.

use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use koperasi_core::NumberScope;
use sqlx::{Connection, Sqlite, SqliteConnection};
use tracing::{debug, warn};

use super::store::{last_number_sql, LockedReadError, SequenceStore};

const CLAIM_SQL: &str = "INSERT INTO sequence_locks (scope, locked_at) VALUES (?1, ?2) \
                         ON CONFLICT (scope) DO UPDATE SET locked_at = excluded.locked_at";

/// [`SequenceStore`] for the local SQLite database.
#[derive(Debug, Clone, Copy, Default)]
pub struct SqliteSequenceStore;

impl SqliteSequenceStore {
    pub fn new() -> Self {
        SqliteSequenceStore
    }
}

#[async_trait]
impl SequenceStore for SqliteSequenceStore {
    type Database = Sqlite;

    async fn last_number_locked(
        &self,
        conn: &mut SqliteConnection,
        scope: &NumberScope,
        timeout: Duration,
    ) -> Result<Option<String>, LockedReadError> {
        // busy_timeout is per connection, not per transaction: swap it in
        // for the claim and put the pool's value back afterwards.
        let previous: i64 = sqlx::query_scalar("PRAGMA busy_timeout")
            .fetch_one(&mut *conn)
            .await
            .map_err(LockedReadError::Database)?;
        set_busy_timeout(conn, timeout.as_millis() as i64)
            .await
            .map_err(LockedReadError::Database)?;

        let claimed = claim_and_read(conn, scope).await;
        let restored = set_busy_timeout(conn, previous).await;

        settle_claim(claimed, restored, previous, timeout)
    }

    async fn last_number(
        &self,
        conn: &mut SqliteConnection,
        scope: &NumberScope,
    ) -> Result<Option<String>, sqlx::Error> {
        fetch_last(conn, scope).await
    }
}

/// Runs the claim and the read in a savepoint. A timed-out claim rolls the
/// savepoint back so the outer transaction can still run the fallback read.
async fn claim_and_read(
    conn: &mut SqliteConnection,
    scope: &NumberScope,
) -> Result<Option<String>, sqlx::Error> {
    let mut savepoint = Connection::begin(&mut *conn).await?;

    let claim = sqlx::query(CLAIM_SQL)
        .bind(scope.lock_key())
        .bind(Utc::now())
        .execute(&mut *savepoint)
        .await;
    if let Err(err) = claim {
        savepoint.rollback().await?;
        return Err(err);
    }
    debug!(scope = %scope.lock_key(), "Sequence lock claimed");

    let last = fetch_last(&mut savepoint, scope).await?;
    savepoint.commit().await?;
    Ok(last)
}

/// Combines the claim outcome with the busy_timeout restore. The claim's own
/// error wins, so a timed-out claim still reaches the fallback read when the
/// restore fails too.
fn settle_claim(
    claimed: Result<Option<String>, sqlx::Error>,
    restored: Result<(), sqlx::Error>,
    previous_ms: i64,
    timeout: Duration,
) -> Result<Option<String>, LockedReadError> {
    match (claimed, restored) {
        (Ok(last), Ok(())) => Ok(last),
        (Ok(_), Err(restore_err)) => Err(LockedReadError::Database(restore_err)),
        (Err(err), restored) => {
            if let Err(restore_err) = restored {
                warn!(
                    error = %restore_err,
                    busy_timeout_ms = previous_ms,
                    "Could not restore busy_timeout after failed sequence claim"
                );
            }
            Err(LockedReadError::classify(err, timeout))
        }
    }
}

async fn fetch_last(
    conn: &mut SqliteConnection,
    scope: &NumberScope,
) -> Result<Option<String>, sqlx::Error> {
    let sql = last_number_sql(scope.category(), ["?1", "?2"], false);
    let mut query = sqlx::query_scalar::<_, String>(&sql).bind(scope.like_pattern());
    if let Some(variant) = scope.variant() {
        query = query.bind(variant.as_str());
    }
    query.fetch_optional(&mut *conn).await
}

async fn set_busy_timeout(conn: &mut SqliteConnection, millis: i64) -> Result<(), sqlx::Error> {
    sqlx::query(&format!("PRAGMA busy_timeout = {}", millis))
        .execute(&mut *conn)
        .await?;
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
