//! # Sale Repository
//!
//! Database operations for cash and credit sales.
//!
//! ## Sale Numbering
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Sale Numbers                                      │
//! │                                                                         │
//! │   1025-001 T   1025-002 T   1025-003 T     ← cash, October 2025        │
//! │   1025-001 K   1025-002 K                  ← credit, October 2025      │
//! │   1125-001 T                               ← cash, November restarts   │
//! │                                                                         │
//! │   MMYY of the sale date, running count per month and variant           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{Local, Utc};
use koperasi_core::validation::validate_new_sale;
use koperasi_core::{NewSale, NumberRequest, NumberScope, Sale};
use sqlx::{Sqlite, SqliteConnection, SqlitePool, Transaction};
use tracing::{debug, info};
use uuid::Uuid;

use super::insert_error;
use crate::error::DbResult;
use crate::sequence::{SequenceGenerator, SqliteSequenceStore};

const SELECT_SALE: &str = "SELECT id, number, variant, sale_date, member_id, total_cents, \
                           notes, created_at FROM sales";

/// Repository for sale database operations.
#[derive(Debug, Clone)]
pub struct SaleRepository {
    pool: SqlitePool,
    generator: SequenceGenerator<SqliteSequenceStore>,
}

impl SaleRepository {
    /// Creates a new SaleRepository.
    pub fn new(pool: SqlitePool) -> Self {
        SaleRepository {
            pool,
            generator: SequenceGenerator::default(),
        }
    }

    /// Numbers and stores a sale in its own transaction.
    ///
    /// ## Example
    /// ```rust,ignore
    /// let sale = db.sales().create(NewSale {
    ///     variant: SaleVariant::Cash,
    ///     sale_date: None, // today
    ///     member_id: None,
    ///     total_cents: 45_000,
    ///     notes: None,
    /// }).await?;
    /// assert!(sale.number.ends_with(" T"));
    /// ```
    pub async fn create(&self, new: NewSale) -> DbResult<Sale> {
        let mut tx = self.pool.begin().await?;
        let sale = self.create_in(&mut tx, new).await?;
        tx.commit().await?;

        info!(number = %sale.number, variant = %sale.variant, "Sale created");
        Ok(sale)
    }

    /// Numbers and stores a sale inside the caller's transaction.
    ///
    /// The sale date is fixed before numbering so the stored date and the
    /// number's period always agree.
    pub async fn create_in(&self, tx: &mut Transaction<'_, Sqlite>, new: NewSale) -> DbResult<Sale> {
        validate_new_sale(&new)?;

        let sale_date = new
            .sale_date
            .unwrap_or_else(|| Local::now().date_naive());
        let request = NumberRequest::sale(new.variant, Some(sale_date));
        let number = self.generator.next(Some(&mut *tx), &request).await?;

        let sale = Sale {
            id: Uuid::new_v4().to_string(),
            number,
            variant: new.variant,
            sale_date,
            member_id: new.member_id,
            total_cents: new.total_cents,
            notes: new.notes,
            created_at: Utc::now(),
        };

        debug!(id = %sale.id, number = %sale.number, "Inserting sale");
        insert_sale(tx, &sale).await?;

        Ok(sale)
    }

    /// Gets a sale by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Sale>> {
        let sale = sqlx::query_as::<_, Sale>(&format!("{SELECT_SALE} WHERE id = ?1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(sale)
    }

    /// Gets a sale by its document number, e.g. `1025-001 T`.
    pub async fn get_by_number(&self, number: &str) -> DbResult<Option<Sale>> {
        let sale = sqlx::query_as::<_, Sale>(&format!("{SELECT_SALE} WHERE number = ?1"))
            .bind(number)
            .fetch_optional(&self.pool)
            .await?;

        Ok(sale)
    }

    /// Lists the sales of one month and variant, in issue order.
    pub async fn list_in_scope(&self, scope: &NumberScope) -> DbResult<Vec<Sale>> {
        let mut sql = format!("{SELECT_SALE} WHERE number LIKE ?1");
        if scope.variant().is_some() {
            sql.push_str(" AND variant = ?2");
        }
        sql.push_str(" ORDER BY LENGTH(number), number");

        let mut query = sqlx::query_as::<_, Sale>(&sql).bind(scope.like_pattern());
        if let Some(variant) = scope.variant() {
            query = query.bind(variant);
        }
        let sales = query.fetch_all(&self.pool).await?;

        Ok(sales)
    }

    /// Counts all sales.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM sales")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

async fn insert_sale(conn: &mut SqliteConnection, sale: &Sale) -> DbResult<()> {
    sqlx::query(
        r#"
        INSERT INTO sales (
            id, number, variant, sale_date, member_id,
            total_cents, notes, created_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
        "#,
    )
    .bind(&sale.id)
    .bind(&sale.number)
    .bind(sale.variant)
    .bind(sale.sale_date)
    .bind(&sale.member_id)
    .bind(sale.total_cents)
    .bind(&sale.notes)
    .bind(sale.created_at)
    .execute(conn)
    .await
    .map_err(|err| insert_error(err, &sale.number))?;

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DbError;
    use crate::pool::{Database, DbConfig};
    use chrono::NaiveDate;
    use koperasi_core::{DocumentCategory, SaleVariant, ValidationError};

    const MEMBER: &str = "550e8400-e29b-41d4-a716-446655440000";

    fn oct(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 10, day).unwrap()
    }

    fn cash(date: NaiveDate) -> NewSale {
        NewSale {
            variant: SaleVariant::Cash,
            sale_date: Some(date),
            member_id: None,
            total_cents: 45_000,
            notes: None,
        }
    }

    fn credit(date: NaiveDate) -> NewSale {
        NewSale {
            variant: SaleVariant::Credit,
            member_id: Some(MEMBER.to_string()),
            ..cash(date)
        }
    }

    #[tokio::test]
    async fn test_cash_and_credit_count_separately() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let sales = db.sales();

        let numbers = [
            sales.create(cash(oct(1))).await.unwrap().number,
            sales.create(credit(oct(2))).await.unwrap().number,
            sales.create(cash(oct(31))).await.unwrap().number,
            sales.create(credit(oct(31))).await.unwrap().number,
        ];
        assert_eq!(numbers, ["1025-001 T", "1025-001 K", "1025-002 T", "1025-002 K"]);
    }

    #[tokio::test]
    async fn test_new_month_restarts_count() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let sales = db.sales();

        sales.create(cash(oct(30))).await.unwrap();
        let november = sales
            .create(cash(NaiveDate::from_ymd_opt(2025, 11, 1).unwrap()))
            .await
            .unwrap();
        assert_eq!(november.number, "1125-001 T");
    }

    #[tokio::test]
    async fn test_sale_without_date_is_dated_today() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let sale = db
            .sales()
            .create(NewSale {
                sale_date: None,
                ..cash(oct(1))
            })
            .await
            .unwrap();

        let today = Local::now().date_naive();
        assert_eq!(sale.sale_date, today);
        assert_eq!(sale.number, format!("{}-001 T", today.format("%m%y")));
    }

    #[tokio::test]
    async fn test_credit_sale_without_member_is_rejected() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let err = db
            .sales()
            .create(NewSale {
                member_id: None,
                ..credit(oct(1))
            })
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            DbError::Validation(ValidationError::Required { .. })
        ));
        assert_eq!(db.sales().count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_round_trip_through_storage() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let created = db.sales().create(credit(oct(15))).await.unwrap();

        let loaded = db.sales().get_by_number("1025-001 K").await.unwrap().unwrap();
        assert_eq!(loaded.id, created.id);
        assert_eq!(loaded.variant, SaleVariant::Credit);
        assert_eq!(loaded.sale_date, oct(15));
        assert_eq!(loaded.member_id.as_deref(), Some(MEMBER));

        let by_id = db.sales().get_by_id(&created.id).await.unwrap().unwrap();
        assert_eq!(by_id.number, "1025-001 K");
    }

    #[tokio::test]
    async fn test_list_in_scope_filters_variant() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let sales = db.sales();
        sales.create(cash(oct(1))).await.unwrap();
        sales.create(credit(oct(1))).await.unwrap();
        sales.create(cash(oct(2))).await.unwrap();

        let scope = NumberScope::new(DocumentCategory::Sale, oct(20), Some(SaleVariant::Cash))
            .unwrap();
        let listed: Vec<String> = sales
            .list_in_scope(&scope)
            .await
            .unwrap()
            .into_iter()
            .map(|s| s.number)
            .collect();
        assert_eq!(listed, vec!["1025-001 T", "1025-002 T"]);
    }

    #[tokio::test]
    async fn test_sales_in_one_transaction_are_consecutive() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let sales = db.sales();

        let mut tx = db.begin().await.unwrap();
        let a = sales.create_in(&mut tx, cash(oct(5))).await.unwrap();
        let b = sales.create_in(&mut tx, cash(oct(5))).await.unwrap();
        tx.commit().await.unwrap();

        assert_eq!(a.number, "1025-001 T");
        assert_eq!(b.number, "1025-002 T");
    }
}
