//! # Error Types
//!
//! Domain-specific error types for koperasi-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  koperasi-core errors (this file)                                      │
//! │  ├── CoreError         - Invalid number requests, range limits         │
//! │  ├── NumberParseError  - Malformed persisted document numbers          │
//! │  └── ValidationError   - Input validation failures                     │
//! │                                                                         │
//! │  koperasi-db errors (separate crate)                                   │
//! │  ├── NumberingError    - Sequence issuance failures                    │
//! │  └── DbError           - Database operation failures                   │
//! │                                                                         │
//! │  Flow: NumberParseError → CoreError → NumberingError → DbError         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

use crate::types::DocumentCategory;

// =============================================================================
// Core Error
// =============================================================================

/// Errors raised while building or interpreting sequence numbers.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A sale number was requested without a cash/credit variant.
    #[error("Sale numbers require a variant (cash or credit)")]
    VariantRequired,

    /// A variant was supplied for a category that has none.
    #[error("{category} numbers do not take a variant")]
    VariantNotAllowed { category: DocumentCategory },

    /// Only sales fall back to today's date.
    #[error("{category} numbers require an explicit date")]
    DateRequired { category: DocumentCategory },

    /// The two-digit year in sale numbers only covers 2000-2099.
    #[error("Year {year} cannot be represented in a document number")]
    YearOutOfRange { year: i32 },

    /// Month outside 1-12.
    #[error("Month {month} is not a calendar month")]
    InvalidMonth { month: u32 },

    /// The running count would exceed `u32::MAX`.
    #[error("Running count overflow for period")]
    RunningCountOverflow,

    /// A persisted number could not be parsed.
    #[error("Invalid document number: {0}")]
    Parse(#[from] NumberParseError),

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Parse Error
// =============================================================================

/// Rejections produced by [`crate::numbering::parse_number`].
///
/// Every variant carries the offending input so a corrupted row can be found
/// from the log line alone.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NumberParseError {
    /// The input does not start with the category's literal prefix.
    #[error("'{input}' does not start with '{expected}'")]
    WrongPrefix { input: String, expected: &'static str },

    /// A literal separator is missing or appears the wrong number of times.
    #[error("'{input}' is missing separator '{separator}'")]
    MissingSeparator { input: String, separator: char },

    /// The period portion is not a valid month/year or calendar date.
    #[error("'{input}' has an invalid period '{period}'")]
    InvalidPeriod { input: String, period: String },

    /// The running count is not a canonical zero-padded number.
    #[error("'{input}' has an invalid running count '{count}'")]
    InvalidRunningCount { input: String, count: String },

    /// The sale variant letter is neither `T` nor `K`.
    #[error("'{input}' has an unknown variant '{variant}'")]
    UnknownVariant { input: String, variant: String },
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// Raised by [`crate::validation`] before a document is inserted.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Invalid format (e.g., invalid UUID).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
