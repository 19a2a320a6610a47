//! # Purchase Repository
//!
//! Purchase orders placed with suppliers, numbered `PO-YYYYMMDD-NNN` by
//! order date.

use chrono::Utc;
use koperasi_core::validation::validate_new_purchase;
use koperasi_core::{NewPurchase, NumberRequest, NumberScope, Purchase};
use sqlx::{Sqlite, SqliteConnection, SqlitePool, Transaction};
use tracing::{debug, info};
use uuid::Uuid;

use super::insert_error;
use crate::error::DbResult;
use crate::sequence::{SequenceGenerator, SqliteSequenceStore};

const SELECT_PURCHASE: &str = "SELECT id, number, purchase_date, supplier_name, total_cents, \
                               notes, created_at FROM purchases";

/// Repository for purchase order database operations.
#[derive(Debug, Clone)]
pub struct PurchaseRepository {
    pool: SqlitePool,
    generator: SequenceGenerator<SqliteSequenceStore>,
}

impl PurchaseRepository {
    /// Creates a new PurchaseRepository.
    pub fn new(pool: SqlitePool) -> Self {
        PurchaseRepository {
            pool,
            generator: SequenceGenerator::default(),
        }
    }

    /// Numbers and stores a purchase order in its own transaction.
    pub async fn create(&self, new: NewPurchase) -> DbResult<Purchase> {
        let mut tx = self.pool.begin().await?;
        let purchase = self.create_in(&mut tx, new).await?;
        tx.commit().await?;

        info!(number = %purchase.number, "Purchase order created");
        Ok(purchase)
    }

    /// Numbers and stores a purchase order inside the caller's transaction.
    ///
    /// The number is only final once the caller commits.
    pub async fn create_in(
        &self,
        tx: &mut Transaction<'_, Sqlite>,
        new: NewPurchase,
    ) -> DbResult<Purchase> {
        validate_new_purchase(&new)?;

        let request = NumberRequest::purchase(new.purchase_date);
        let number = self.generator.next(Some(&mut *tx), &request).await?;

        let purchase = Purchase {
            id: Uuid::new_v4().to_string(),
            number,
            purchase_date: new.purchase_date,
            supplier_name: new.supplier_name.trim().to_string(),
            total_cents: new.total_cents,
            notes: new.notes,
            created_at: Utc::now(),
        };

        debug!(id = %purchase.id, number = %purchase.number, "Inserting purchase");
        insert_purchase(tx, &purchase).await?;

        Ok(purchase)
    }

    /// Gets a purchase order by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Purchase>> {
        let purchase = sqlx::query_as::<_, Purchase>(&format!("{SELECT_PURCHASE} WHERE id = ?1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(purchase)
    }

    /// Gets a purchase order by its document number.
    pub async fn get_by_number(&self, number: &str) -> DbResult<Option<Purchase>> {
        let purchase =
            sqlx::query_as::<_, Purchase>(&format!("{SELECT_PURCHASE} WHERE number = ?1"))
                .bind(number)
                .fetch_optional(&self.pool)
                .await?;

        Ok(purchase)
    }

    /// Lists the purchase orders of one day, in issue order.
    pub async fn list_in_scope(&self, scope: &NumberScope) -> DbResult<Vec<Purchase>> {
        let purchases = sqlx::query_as::<_, Purchase>(&format!(
            "{SELECT_PURCHASE} WHERE number LIKE ?1 ORDER BY LENGTH(number), number"
        ))
        .bind(scope.like_pattern())
        .fetch_all(&self.pool)
        .await?;

        Ok(purchases)
    }

    /// Counts all purchase orders.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM purchases")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

async fn insert_purchase(conn: &mut SqliteConnection, purchase: &Purchase) -> DbResult<()> {
    sqlx::query(
        r#"
        INSERT INTO purchases (
            id, number, purchase_date, supplier_name,
            total_cents, notes, created_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
        "#,
    )
    .bind(&purchase.id)
    .bind(&purchase.number)
    .bind(purchase.purchase_date)
    .bind(&purchase.supplier_name)
    .bind(purchase.total_cents)
    .bind(&purchase.notes)
    .bind(purchase.created_at)
    .execute(conn)
    .await
    .map_err(|err| insert_error(err, &purchase.number))?;

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
