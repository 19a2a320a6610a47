//! # Validation Module
//!
//! Input checks run by the repositories before a document is numbered and
//! inserted. A rejected document never consumes a running count.
//!
//! ## Usage
//! ```rust
//! use koperasi_core::validation::{validate_amount_cents, validate_party_name};
//!
//! validate_amount_cents("total_cents", 125_000).unwrap();
//! validate_party_name("supplier_name", "CV Sumber Rejeki").unwrap();
//! ```

use crate::error::ValidationError;
use crate::types::{NewDebtPayment, NewPurchase, NewSale, SaleVariant};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Maximum length of supplier names and free-form notes.
pub const MAX_NAME_LENGTH: usize = 200;

// =============================================================================
// Field Validators
// =============================================================================

/// Validates a money amount in cents. Documents never carry zero or
/// negative totals.
pub fn validate_amount_cents(field: &str, cents: i64) -> ValidationResult<()> {
    if cents <= 0 {
        return Err(ValidationError::MustBePositive {
            field: field.to_string(),
        });
    }
    Ok(())
}

/// Validates a supplier or party name.
///
/// ## Example
/// ```rust
/// use koperasi_core::validation::validate_party_name;
///
/// assert!(validate_party_name("supplier_name", "UD Makmur").is_ok());
/// assert!(validate_party_name("supplier_name", "  ").is_err());
/// ```
pub fn validate_party_name(field: &str, name: &str) -> ValidationResult<()> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    if name.chars().count() > MAX_NAME_LENGTH {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max: MAX_NAME_LENGTH,
        });
    }

    Ok(())
}

/// Validates a member ID (UUID).
pub fn validate_member_id(id: &str) -> ValidationResult<()> {
    if id.trim().is_empty() {
        return Err(ValidationError::Required {
            field: "member_id".to_string(),
        });
    }

    uuid::Uuid::parse_str(id).map_err(|_| ValidationError::InvalidFormat {
        field: "member_id".to_string(),
        reason: "must be a valid UUID".to_string(),
    })?;

    Ok(())
}

fn validate_notes(notes: Option<&str>) -> ValidationResult<()> {
    match notes {
        Some(notes) if notes.chars().count() > MAX_NAME_LENGTH => Err(ValidationError::TooLong {
            field: "notes".to_string(),
            max: MAX_NAME_LENGTH,
        }),
        _ => Ok(()),
    }
}

// =============================================================================
// Document Validators
// =============================================================================

/// Validates a sale. Credit sales must name the member being billed.
pub fn validate_new_sale(sale: &NewSale) -> ValidationResult<()> {
    validate_amount_cents("total_cents", sale.total_cents)?;
    match (&sale.member_id, sale.variant) {
        (Some(member_id), _) => validate_member_id(member_id)?,
        (None, SaleVariant::Credit) => {
            return Err(ValidationError::Required {
                field: "member_id".to_string(),
            })
        }
        (None, SaleVariant::Cash) => {}
    }
    validate_notes(sale.notes.as_deref())
}

/// Validates a purchase order.
pub fn validate_new_purchase(purchase: &NewPurchase) -> ValidationResult<()> {
    validate_party_name("supplier_name", &purchase.supplier_name)?;
    validate_amount_cents("total_cents", purchase.total_cents)?;
    validate_notes(purchase.notes.as_deref())
}

/// Validates a debt payment.
pub fn validate_new_debt_payment(payment: &NewDebtPayment) -> ValidationResult<()> {
    validate_member_id(&payment.member_id)?;
    validate_amount_cents("amount_cents", payment.amount_cents)?;
    validate_notes(payment.notes.as_deref())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    const MEMBER: &str = "550e8400-e29b-41d4-a716-446655440000";

    fn new_sale(variant: SaleVariant, member_id: Option<&str>) -> NewSale {
        NewSale {
            variant,
            sale_date: None,
            member_id: member_id.map(str::to_string),
            total_cents: 15_000,
            notes: None,
        }
    }

    #[test]
    fn test_validate_amount_cents() {
        assert!(validate_amount_cents("total_cents", 1).is_ok());
        assert!(validate_amount_cents("total_cents", 0).is_err());
        assert!(validate_amount_cents("total_cents", -500).is_err());
    }

    #[test]
    fn test_validate_party_name() {
        assert!(validate_party_name("supplier_name", "PT Tani Jaya").is_ok());
        assert!(validate_party_name("supplier_name", "").is_err());
        assert!(validate_party_name("supplier_name", &"A".repeat(201)).is_err());
    }

    #[test]
    fn test_validate_member_id() {
        assert!(validate_member_id(MEMBER).is_ok());
        assert!(validate_member_id("").is_err());
        assert!(validate_member_id("member-7").is_err());
    }

    #[test]
    fn test_credit_sale_requires_member() {
        assert!(validate_new_sale(&new_sale(SaleVariant::Cash, None)).is_ok());
        assert!(validate_new_sale(&new_sale(SaleVariant::Credit, Some(MEMBER))).is_ok());

        let err = validate_new_sale(&new_sale(SaleVariant::Credit, None)).unwrap_err();
        assert_eq!(err.to_string(), "member_id is required");
    }

    #[test]
    fn test_validate_new_purchase() {
        let purchase = NewPurchase {
            purchase_date: NaiveDate::from_ymd_opt(2025, 10, 15).unwrap(),
            supplier_name: "UD Makmur".to_string(),
            total_cents: 2_500_000,
            notes: Some("beras 50 karung".to_string()),
        };
        assert!(validate_new_purchase(&purchase).is_ok());

        let unnamed = NewPurchase {
            supplier_name: " ".to_string(),
            ..purchase
        };
        assert!(validate_new_purchase(&unnamed).is_err());
    }

    #[test]
    fn test_validate_new_debt_payment() {
        let payment = NewDebtPayment {
            payment_date: NaiveDate::from_ymd_opt(2025, 10, 15).unwrap(),
            member_id: MEMBER.to_string(),
            amount_cents: 0,
            notes: None,
        };
        let err = validate_new_debt_payment(&payment).unwrap_err();
        assert_eq!(err.to_string(), "amount_cents must be positive");
    }
}
