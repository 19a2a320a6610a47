//! # Debt Payment Repository
//!
//! Members paying down credit sales. Receipts are numbered
//! `PAY-YYYYMMDD-NNN` by payment date.

use chrono::Utc;
use koperasi_core::validation::validate_new_debt_payment;
use koperasi_core::{DebtPayment, NewDebtPayment, NumberRequest, NumberScope};
use sqlx::{Sqlite, SqliteConnection, SqlitePool, Transaction};
use tracing::{debug, info};
use uuid::Uuid;

use super::insert_error;
use crate::error::DbResult;
use crate::sequence::{SequenceGenerator, SqliteSequenceStore};

const SELECT_PAYMENT: &str = "SELECT id, number, payment_date, member_id, amount_cents, \
                              notes, created_at FROM debt_payments";

/// Repository for debt payment database operations.
#[derive(Debug, Clone)]
pub struct DebtPaymentRepository {
    pool: SqlitePool,
    generator: SequenceGenerator<SqliteSequenceStore>,
}

impl DebtPaymentRepository {
    /// Creates a new DebtPaymentRepository.
    pub fn new(pool: SqlitePool) -> Self {
        DebtPaymentRepository {
            pool,
            generator: SequenceGenerator::default(),
        }
    }

    /// Numbers and stores a payment in its own transaction.
    pub async fn create(&self, new: NewDebtPayment) -> DbResult<DebtPayment> {
        let mut tx = self.pool.begin().await?;
        let payment = self.create_in(&mut tx, new).await?;
        tx.commit().await?;

        info!(number = %payment.number, member_id = %payment.member_id, "Debt payment recorded");
        Ok(payment)
    }

    /// Numbers and stores a payment inside the caller's transaction.
    pub async fn create_in(
        &self,
        tx: &mut Transaction<'_, Sqlite>,
        new: NewDebtPayment,
    ) -> DbResult<DebtPayment> {
        validate_new_debt_payment(&new)?;

        let request = NumberRequest::payment(new.payment_date);
        let number = self.generator.next(Some(&mut *tx), &request).await?;

        let payment = DebtPayment {
            id: Uuid::new_v4().to_string(),
            number,
            payment_date: new.payment_date,
            member_id: new.member_id,
            amount_cents: new.amount_cents,
            notes: new.notes,
            created_at: Utc::now(),
        };

        debug!(id = %payment.id, number = %payment.number, "Inserting debt payment");
        insert_payment(tx, &payment).await?;

        Ok(payment)
    }

    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<DebtPayment>> {
        let payment = sqlx::query_as::<_, DebtPayment>(&format!("{SELECT_PAYMENT} WHERE id = ?1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(payment)
    }

    pub async fn get_by_number(&self, number: &str) -> DbResult<Option<DebtPayment>> {
        let payment =
            sqlx::query_as::<_, DebtPayment>(&format!("{SELECT_PAYMENT} WHERE number = ?1"))
                .bind(number)
                .fetch_optional(&self.pool)
                .await?;

        Ok(payment)
    }

    /// Lists the payments of one day, in issue order.
    pub async fn list_in_scope(&self, scope: &NumberScope) -> DbResult<Vec<DebtPayment>> {
        let payments = sqlx::query_as::<_, DebtPayment>(&format!(
            "{SELECT_PAYMENT} WHERE number LIKE ?1 ORDER BY LENGTH(number), number"
        ))
        .bind(scope.like_pattern())
        .fetch_all(&self.pool)
        .await?;

        Ok(payments)
    }

    /// Sum of all payments made by a member, in cents.
    pub async fn total_paid_by(&self, member_id: &str) -> DbResult<i64> {
        let total: Option<i64> =
            sqlx::query_scalar("SELECT SUM(amount_cents) FROM debt_payments WHERE member_id = ?1")
                .bind(member_id)
                .fetch_one(&self.pool)
                .await?;

        Ok(total.unwrap_or(0))
    }

    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM debt_payments")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

async fn insert_payment(conn: &mut SqliteConnection, payment: &DebtPayment) -> DbResult<()> {
    sqlx::query(
        r#"
        INSERT INTO debt_payments (
            id, number, payment_date, member_id,
            amount_cents, notes, created_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
        "#,
    )
    .bind(&payment.id)
    .bind(&payment.number)
    .bind(payment.payment_date)
    .bind(&payment.member_id)
    .bind(payment.amount_cents)
    .bind(&payment.notes)
    .bind(payment.created_at)
    .execute(conn)
    .await
    .map_err(|err| insert_error(err, &payment.number))?;

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
    use koperasi_core::{DocumentCategory, NewSale, SaleVariant};

    const MEMBER: &str = "550e8400-e29b-41d4-a716-446655440000";

    fn payment(amount_cents: i64) -> NewDebtPayment {
        NewDebtPayment {
            payment_date: NaiveDate::from_ymd_opt(2025, 10, 15).unwrap(),
            member_id: MEMBER.to_string(),
            amount_cents,
            notes: Some("cicilan".to_string()),
        }
    }

    #[tokio::test]
    async fn test_payments_are_numbered_by_day() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.debt_payments();

        let first = repo.create(payment(10_000)).await.unwrap();
        let second = repo.create(payment(25_000)).await.unwrap();

        assert_eq!(first.number, "PAY-20251015-001");
        assert_eq!(second.number, "PAY-20251015-002");
        assert_eq!(repo.total_paid_by(MEMBER).await.unwrap(), 35_000);
        assert_eq!(repo.count().await.unwrap(), 2);

        let loaded = repo.get_by_number(&second.number).await.unwrap().unwrap();
        assert_eq!(loaded.id, second.id);
        assert_eq!(loaded.notes.as_deref(), Some("cicilan"));
        assert!(repo.get_by_id(&first.id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_zero_payment_is_rejected() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let err = db.debt_payments().create(payment(0)).await.unwrap_err();
        assert!(matches!(err, DbError::Validation(_)));
        assert_eq!(db.debt_payments().total_paid_by(MEMBER).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_credit_sale_and_payment_in_one_transaction() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let date = NaiveDate::from_ymd_opt(2025, 10, 15).unwrap();

        let mut tx = db.begin().await.unwrap();
        let sale = db
            .sales()
            .create_in(
                &mut tx,
                NewSale {
                    variant: SaleVariant::Credit,
                    sale_date: Some(date),
                    member_id: Some(MEMBER.to_string()),
                    total_cents: 50_000,
                    notes: None,
                },
            )
            .await
            .unwrap();
        let paid = db
            .debt_payments()
            .create_in(&mut tx, payment(20_000))
            .await
            .unwrap();
        tx.commit().await.unwrap();

        assert_eq!(sale.number, "1025-001 K");
        assert_eq!(paid.number, "PAY-20251015-001");

        let scope = NumberScope::new(DocumentCategory::DebtPayment, date, None).unwrap();
        let listed = db.debt_payments().list_in_scope(&scope).await.unwrap();
        assert_eq!(listed.len(), 1);
    }
}
