//! # Repository Module
//!
//! Document repositories. Each `create` numbers and inserts a document in
//! one transaction.
//!
//! ## Document Creation
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    db.purchases().create(new)                           │
//! │                                                                         │
//! │  validate_new_purchase(&new)   ← rejected input never takes a number   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  BEGIN                                                                 │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SequenceGenerator::next(Some(&mut tx), PO for purchase_date)          │
//! │       │   └── scope lock now held by tx                                │
//! │       ▼                                                                 │
//! │  INSERT INTO purchases (.., number, ..)                                │
//! │       │   └── UNIQUE(number) → DbError::UniqueViolation                │
//! │       ▼                                                                 │
//! │  COMMIT                        ← lock released, next issuer proceeds   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! `create_in` runs the same steps inside a caller-owned transaction, for
//! workflows that write several documents atomically.
//!
//! ## Available Repositories
//!
//! - [`SaleRepository`](sale::SaleRepository) - Cash and credit sales
//! - [`PurchaseRepository`](purchase::PurchaseRepository) - Purchase orders
//! - [`DebtPaymentRepository`](debt_payment::DebtPaymentRepository) - Member debt payments

pub mod debt_payment;
pub mod purchase;
pub mod sale;

use crate::error::DbError;

/// Maps an insert failure, naming the number on a UNIQUE violation.
fn insert_error(err: sqlx::Error, number: &str) -> DbError {
    let duplicate_number = matches!(
        &err,
        sqlx::Error::Database(db_err) if db_err.is_unique_violation()
    );
    if duplicate_number {
        DbError::duplicate("number", number)
    } else {
        DbError::from(err)
    }
}
