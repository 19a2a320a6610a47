//! PostgreSQL sequence store.
//!
//! The scope row in `sequence_locks` is the lock: upserting it takes a row
//! lock that the caller's transaction holds until commit. The last document
//! row is additionally read `FOR UPDATE`. Both waits are bounded by a
//! transaction-local `lock_timeout`, set and restored inside a savepoint so a
//! timeout (SQLSTATE 55P03) can be rolled back without aborting the caller's
//! transaction.

use std::time::Duration;

use async_trait::async_trait;
use koperasi_core::NumberScope;
use sqlx::{Connection, PgConnection, Postgres};
use tracing::debug;

use super::store::{last_number_sql, LockedReadError, SequenceStore};

const CLAIM_SQL: &str = "INSERT INTO sequence_locks (scope, locked_at) VALUES ($1, now()) \
                         ON CONFLICT (scope) DO UPDATE SET locked_at = excluded.locked_at";

/// [`SequenceStore`] for a shared PostgreSQL database.
#[derive(Debug, Clone, Copy, Default)]
pub struct PgSequenceStore;

impl PgSequenceStore {
    pub fn new() -> Self {
        PgSequenceStore
    }
}

#[async_trait]
impl SequenceStore for PgSequenceStore {
    type Database = Postgres;

    async fn last_number_locked(
        &self,
        conn: &mut PgConnection,
        scope: &NumberScope,
        timeout: Duration,
    ) -> Result<Option<String>, LockedReadError> {
        claim_and_read(conn, scope, timeout)
            .await
            .map_err(|err| LockedReadError::classify(err, timeout))
    }

    async fn last_number(
        &self,
        conn: &mut PgConnection,
        scope: &NumberScope,
    ) -> Result<Option<String>, sqlx::Error> {
        fetch_last(conn, scope, false).await
    }
}

async fn claim_and_read(
    conn: &mut PgConnection,
    scope: &NumberScope,
    timeout: Duration,
) -> Result<Option<String>, sqlx::Error> {
    let mut savepoint = Connection::begin(&mut *conn).await?;

    match locked_read(&mut savepoint, scope, timeout).await {
        Ok(last) => {
            savepoint.commit().await?;
            Ok(last)
        }
        Err(err) => {
            // The savepoint is aborted after any error; roll it back so the
            // outer transaction accepts further statements.
            savepoint.rollback().await?;
            Err(err)
        }
    }
}

async fn locked_read(
    conn: &mut PgConnection,
    scope: &NumberScope,
    timeout: Duration,
) -> Result<Option<String>, sqlx::Error> {
    let previous: String = sqlx::query_scalar("SELECT current_setting('lock_timeout')")
        .fetch_one(&mut *conn)
        .await?;
    set_lock_timeout(conn, &format!("{}ms", timeout.as_millis())).await?;

    sqlx::query(CLAIM_SQL)
        .bind(scope.lock_key())
        .execute(&mut *conn)
        .await?;
    debug!(scope = %scope.lock_key(), "Sequence lock claimed");

    let last = fetch_last(conn, scope, true).await?;

    set_lock_timeout(conn, &previous).await?;
    Ok(last)
}

async fn fetch_last(
    conn: &mut PgConnection,
    scope: &NumberScope,
    for_update: bool,
) -> Result<Option<String>, sqlx::Error> {
    let sql = last_number_sql(scope.category(), ["$1", "$2"], for_update);
    let mut query = sqlx::query_scalar::<_, String>(&sql).bind(scope.like_pattern());
    if let Some(variant) = scope.variant() {
        query = query.bind(variant.as_str());
    }
    query.fetch_optional(&mut *conn).await
}

async fn set_lock_timeout(conn: &mut PgConnection, value: &str) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT set_config('lock_timeout', $1, true)")
        .bind(value)
        .execute(&mut *conn)
        .await?;
    Ok(())
}
