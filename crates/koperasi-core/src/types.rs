//! # Domain Types
//!
//! Document categories, sale variants and the document rows whose `number`
//! column the sequence generator fills in.
//!
//! ## Type Overview
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │      Sale       │   │    Purchase     │   │   DebtPayment   │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (UUID)      │   │  id (UUID)      │   │  id (UUID)      │       │
//! │  │  number         │   │  number         │   │  number         │       │
//! │  │  variant (T/K)  │   │  supplier_name  │   │  member_id      │       │
//! │  │  sale_date      │   │  purchase_date  │   │  payment_date   │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐                              │
//! │  │DocumentCategory │   │   SaleVariant   │                              │
//! │  │  ─────────────  │   │  ─────────────  │                              │
//! │  │  Sale           │   │  Cash   (T)     │                              │
//! │  │  Purchase       │   │  Credit (K)     │                              │
//! │  │  DebtPayment    │   └─────────────────┘                              │
//! │  └─────────────────┘                                                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Dual-Key Identity Pattern
//! Every document has:
//! - `id`: UUID v4 - immutable, used for database relations
//! - `number`: human-readable sequence number, issued once and never renumbered

use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

// =============================================================================
// Document Category
// =============================================================================

/// The kind of business document being numbered.
///
/// Each category keeps its own counter space and its own number layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentCategory {
    /// Sales invoice (`MMYY-NNN V`).
    Sale,
    /// Purchase order (`PO-YYYYMMDD-NNN`).
    Purchase,
    /// Member debt payment receipt (`PAY-YYYYMMDD-NNN`).
    DebtPayment,
}

impl DocumentCategory {
    /// Table holding the documents of this category.
    pub const fn table(&self) -> &'static str {
        match self {
            DocumentCategory::Sale => "sales",
            DocumentCategory::Purchase => "purchases",
            DocumentCategory::DebtPayment => "debt_payments",
        }
    }

    /// Stable lowercase label, used in lock keys and log fields.
    pub const fn label(&self) -> &'static str {
        match self {
            DocumentCategory::Sale => "sale",
            DocumentCategory::Purchase => "purchase",
            DocumentCategory::DebtPayment => "debt_payment",
        }
    }

    /// Returns true if numbers of this category carry a cash/credit variant.
    pub const fn has_variant(&self) -> bool {
        matches!(self, DocumentCategory::Sale)
    }
}

impl fmt::Display for DocumentCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// =============================================================================
// Sale Variant
// =============================================================================

/// Cash or credit sale.
///
/// Each variant has its own running count within a month, so the first
/// cash sale and the first credit sale of October 2025 are both `001`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "snake_case")]
pub enum SaleVariant {
    /// Paid on the spot (tunai).
    Cash,
    /// Booked against the member's account (kredit).
    Credit,
}

impl SaleVariant {
    /// The suffix letter used in sale numbers.
    pub const fn letter(&self) -> char {
        match self {
            SaleVariant::Cash => 'T',
            SaleVariant::Credit => 'K',
        }
    }

    /// Parses a suffix letter. Only `T` and `K` are accepted.
    pub fn from_letter(letter: &str) -> Option<Self> {
        match letter {
            "T" => Some(SaleVariant::Cash),
            "K" => Some(SaleVariant::Credit),
            _ => None,
        }
    }

    /// The value stored in the `variant` column.
    pub const fn as_str(&self) -> &'static str {
        match self {
            SaleVariant::Cash => "cash",
            SaleVariant::Credit => "credit",
        }
    }
}

impl fmt::Display for SaleVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Sale
// =============================================================================

/// A sale to a member or walk-in customer.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Sale {
    pub id: String,
    /// Sequence number, e.g. `1025-001 T`.
    pub number: String,
    pub variant: SaleVariant,
    /// Business date; its month and year form the period key.
    pub sale_date: NaiveDate,
    /// Required for credit sales.
    pub member_id: Option<String>,
    pub total_cents: i64,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Input for creating a sale. The number is issued at insert time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewSale {
    pub variant: SaleVariant,
    /// Defaults to today when omitted.
    pub sale_date: Option<NaiveDate>,
    pub member_id: Option<String>,
    pub total_cents: i64,
    pub notes: Option<String>,
}

// =============================================================================
// Purchase
// =============================================================================

/// A purchase order placed with a supplier.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Purchase {
    pub id: String,
    /// Sequence number, e.g. `PO-20251015-001`.
    pub number: String,
    pub purchase_date: NaiveDate,
    pub supplier_name: String,
    pub total_cents: i64,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Input for creating a purchase order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewPurchase {
    pub purchase_date: NaiveDate,
    pub supplier_name: String,
    pub total_cents: i64,
    pub notes: Option<String>,
}

// =============================================================================
// Debt Payment
// =============================================================================

/// A member paying down credit sales.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct DebtPayment {
    pub id: String,
    /// Sequence number, e.g. `PAY-20251015-001`.
    pub number: String,
    pub payment_date: NaiveDate,
    pub member_id: String,
    pub amount_cents: i64,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Input for recording a debt payment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewDebtPayment {
    pub payment_date: NaiveDate,
    pub member_id: String,
    pub amount_cents: i64,
    pub notes: Option<String>,
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_tables() {
        assert_eq!(DocumentCategory::Sale.table(), "sales");
        assert_eq!(DocumentCategory::Purchase.table(), "purchases");
        assert_eq!(DocumentCategory::DebtPayment.table(), "debt_payments");
    }

    #[test]
    fn test_only_sales_have_variants() {
        assert!(DocumentCategory::Sale.has_variant());
        assert!(!DocumentCategory::Purchase.has_variant());
        assert!(!DocumentCategory::DebtPayment.has_variant());
    }

    #[test]
    fn test_variant_letters() {
        assert_eq!(SaleVariant::Cash.letter(), 'T');
        assert_eq!(SaleVariant::Credit.letter(), 'K');
        assert_eq!(SaleVariant::from_letter("T"), Some(SaleVariant::Cash));
        assert_eq!(SaleVariant::from_letter("K"), Some(SaleVariant::Credit));
        assert_eq!(SaleVariant::from_letter("k"), None);
        assert_eq!(SaleVariant::from_letter(""), None);
    }

    #[test]
    fn test_variant_serde() {
        let json = serde_json::to_string(&SaleVariant::Credit).unwrap();
        assert_eq!(json, "\"credit\"");

        let parsed: SaleVariant = serde_json::from_str("\"cash\"").unwrap();
        assert_eq!(parsed, SaleVariant::Cash);
    }
}
