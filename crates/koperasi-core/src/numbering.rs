//! # Document Numbering
//!
//! Pure formatting and parsing of document sequence numbers.
//!
//! ## Number Layouts
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Category      Layout              Example            Period key       │
//! │  ────────────  ──────────────────  ─────────────────  ───────────────  │
//! │  Sale          MMYY-NNN V          1025-001 T         month + year     │
//! │  Purchase      PO-YYYYMMDD-NNN     PO-20251015-001    calendar date    │
//! │  DebtPayment   PAY-YYYYMMDD-NNN    PAY-20251015-001   calendar date    │
//! │                                                                         │
//! │  NNN: running count, zero-padded to 3. Widens past 999 (1025-1000 T).  │
//! │  V:   T = cash (tunai), K = credit (kredit).                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The layouts are kept as a per-category rule table on purpose: sales are
//! keyed by month and carry a variant, the other two are keyed by day and
//! carry none. Existing rows already use these exact strings.
//!
//! Sale numbers store a two-digit year and are read back as `20YY`, so only
//! years 2000-2099 are representable.
//!
//! ## Example
//! ```rust
//! use chrono::NaiveDate;
//! use koperasi_core::numbering::{format_number, parse_number, NumberScope};
//! use koperasi_core::{DocumentCategory, SaleVariant};
//!
//! let date = NaiveDate::from_ymd_opt(2025, 10, 15).unwrap();
//! let scope = NumberScope::new(DocumentCategory::Sale, date, Some(SaleVariant::Cash)).unwrap();
//! let first = scope.number(1);
//!
//! assert_eq!(format_number(&first), "1025-001 T");
//! assert_eq!(parse_number(DocumentCategory::Sale, "1025-001 T").unwrap(), first);
//! ```

use std::fmt;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult, NumberParseError};
use crate::types::{DocumentCategory, SaleVariant};

/// Minimum width of the running count.
pub const COUNT_WIDTH: usize = 3;

/// Literal prefix of purchase order numbers.
pub const PURCHASE_PREFIX: &str = "PO-";

/// Literal prefix of debt payment numbers.
pub const PAYMENT_PREFIX: &str = "PAY-";

const PERIOD_SEPARATOR: char = '-';
const VARIANT_SEPARATOR: char = ' ';

// =============================================================================
// Period Key
// =============================================================================

/// The date-derived portion of a number that scopes its running count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PeriodKey {
    /// Month and four-digit year (sales).
    Monthly { year: i32, month: u32 },
    /// Full calendar date (purchases and payments).
    Daily(NaiveDate),
}

impl PeriodKey {
    /// Creates a monthly key. The year must fit the two-digit layout.
    pub fn monthly(year: i32, month: u32) -> CoreResult<Self> {
        if !(1..=12).contains(&month) {
            return Err(CoreError::InvalidMonth { month });
        }
        if !(2000..=2099).contains(&year) {
            return Err(CoreError::YearOutOfRange { year });
        }
        Ok(PeriodKey::Monthly { year, month })
    }

    /// Creates a daily key. The year must fit in four digits.
    pub fn daily(date: NaiveDate) -> CoreResult<Self> {
        if !(0..=9999).contains(&date.year()) {
            return Err(CoreError::YearOutOfRange { year: date.year() });
        }
        Ok(PeriodKey::Daily(date))
    }

    /// Derives the key a category uses for `date`.
    pub fn for_category(category: DocumentCategory, date: NaiveDate) -> CoreResult<Self> {
        match category {
            DocumentCategory::Sale => PeriodKey::monthly(date.year(), date.month()),
            DocumentCategory::Purchase | DocumentCategory::DebtPayment => PeriodKey::daily(date),
        }
    }
}

/// Renders `MMYY` or `YYYYMMDD`.
impl fmt::Display for PeriodKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PeriodKey::Monthly { year, month } => write!(f, "{:02}{:02}", month, year % 100),
            PeriodKey::Daily(date) => {
                write!(f, "{:04}{:02}{:02}", date.year(), date.month(), date.day())
            }
        }
    }
}

// =============================================================================
// Number Scope
// =============================================================================

/// One independent counter: a category, a period and (for sales) a variant.
///
/// All numbers in a scope share [`NumberScope::prefix`]; the sequence
/// generator looks for the highest one to decide what comes next.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NumberScope {
    category: DocumentCategory,
    period: PeriodKey,
    variant: Option<SaleVariant>,
}

impl NumberScope {
    /// Builds the scope for a category and business date.
    ///
    /// ## Errors
    /// - `VariantRequired` for a sale without a variant
    /// - `VariantNotAllowed` for a purchase or payment with one
    /// - `YearOutOfRange` when the date cannot be encoded
    pub fn new(
        category: DocumentCategory,
        date: NaiveDate,
        variant: Option<SaleVariant>,
    ) -> CoreResult<Self> {
        check_variant(category, variant)?;
        Ok(NumberScope {
            category,
            period: PeriodKey::for_category(category, date)?,
            variant,
        })
    }

    pub fn category(&self) -> DocumentCategory {
        self.category
    }

    pub fn period(&self) -> PeriodKey {
        self.period
    }

    pub fn variant(&self) -> Option<SaleVariant> {
        self.variant
    }

    /// Everything before the running count: `1025-`, `PO-20251015-`.
    pub fn prefix(&self) -> String {
        format!(
            "{}{}{}",
            category_literal(self.category),
            self.period,
            PERIOD_SEPARATOR
        )
    }

    /// SQL `LIKE` pattern matching every number with this prefix.
    pub fn like_pattern(&self) -> String {
        format!("{}%", self.prefix())
    }

    /// Key of the row that serializes issuers of this scope,
    /// e.g. `sale:1025-:T` or `purchase:PO-20251015-`.
    pub fn lock_key(&self) -> String {
        match self.variant {
            Some(variant) => format!(
                "{}:{}:{}",
                self.category.label(),
                self.prefix(),
                variant.letter()
            ),
            None => format!("{}:{}", self.category.label(), self.prefix()),
        }
    }

    /// The number with the given running count in this scope.
    pub fn number(&self, running_count: u32) -> SequenceNumber {
        SequenceNumber {
            category: self.category,
            period: self.period,
            running_count,
            variant: self.variant,
        }
    }
}

// =============================================================================
// Sequence Number
// =============================================================================

/// A parsed or freshly issued document number.
///
/// Converts to its canonical string with [`format_number`] (or `Display`)
/// and back with [`parse_number`]; the two are exact inverses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SequenceNumber {
    category: DocumentCategory,
    period: PeriodKey,
    running_count: u32,
    variant: Option<SaleVariant>,
}

impl SequenceNumber {
    /// Creates a number for a category, business date and running count.
    pub fn new(
        category: DocumentCategory,
        date: NaiveDate,
        running_count: u32,
        variant: Option<SaleVariant>,
    ) -> CoreResult<Self> {
        Ok(NumberScope::new(category, date, variant)?.number(running_count))
    }

    pub fn category(&self) -> DocumentCategory {
        self.category
    }

    pub fn period(&self) -> PeriodKey {
        self.period
    }

    pub fn running_count(&self) -> u32 {
        self.running_count
    }

    pub fn variant(&self) -> Option<SaleVariant> {
        self.variant
    }

    /// The counter this number belongs to.
    pub fn scope(&self) -> NumberScope {
        NumberScope {
            category: self.category,
            period: self.period,
            variant: self.variant,
        }
    }

    /// The next number in the same scope.
    pub fn successor(&self) -> CoreResult<Self> {
        let running_count = self
            .running_count
            .checked_add(1)
            .ok_or(CoreError::RunningCountOverflow)?;
        Ok(SequenceNumber {
            running_count,
            ..*self
        })
    }
}

impl fmt::Display for SequenceNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&format_number(self))
    }
}

// =============================================================================
// Formatting
// =============================================================================

/// Formats a number in its category's canonical layout.
pub fn format_number(number: &SequenceNumber) -> String {
    let mut out = format!(
        "{}{:0width$}",
        number.scope().prefix(),
        number.running_count,
        width = COUNT_WIDTH
    );
    if let Some(variant) = number.variant {
        out.push(VARIANT_SEPARATOR);
        out.push(variant.letter());
    }
    out
}

// =============================================================================
// Parsing
// =============================================================================

/// Parses a persisted number of the given category.
///
/// Strict: anything that [`format_number`] could not have produced is
/// rejected, including unknown variant letters and non-canonical padding.
///
/// ## Example
/// ```rust
/// use koperasi_core::numbering::parse_number;
/// use koperasi_core::{DocumentCategory, SaleVariant};
///
/// let number = parse_number(DocumentCategory::Sale, "0925-042 K").unwrap();
/// assert_eq!(number.running_count(), 42);
/// assert_eq!(number.variant(), Some(SaleVariant::Credit));
///
/// assert!(parse_number(DocumentCategory::Sale, "0925-042").is_err());
/// assert!(parse_number(DocumentCategory::Purchase, "PO-2025-001").is_err());
/// ```
pub fn parse_number(
    category: DocumentCategory,
    input: &str,
) -> Result<SequenceNumber, NumberParseError> {
    match category {
        DocumentCategory::Sale => parse_sale(input),
        DocumentCategory::Purchase => parse_daily(category, PURCHASE_PREFIX, input),
        DocumentCategory::DebtPayment => parse_daily(category, PAYMENT_PREFIX, input),
    }
}

/// `MMYY-NNN V`
fn parse_sale(input: &str) -> Result<SequenceNumber, NumberParseError> {
    let (period, rest) = input
        .split_once(PERIOD_SEPARATOR)
        .ok_or_else(|| missing_separator(input, PERIOD_SEPARATOR))?;
    let (count, letter) = rest
        .split_once(VARIANT_SEPARATOR)
        .ok_or_else(|| missing_separator(input, VARIANT_SEPARATOR))?;

    let invalid_period = || NumberParseError::InvalidPeriod {
        input: input.to_string(),
        period: period.to_string(),
    };
    if period.len() != 4 || !is_ascii_digits(period) {
        return Err(invalid_period());
    }
    let month: u32 = period[..2].parse().map_err(|_| invalid_period())?;
    let year: i32 = format!("20{}", &period[2..])
        .parse()
        .map_err(|_| invalid_period())?;
    let period = PeriodKey::monthly(year, month).map_err(|_| invalid_period())?;

    let running_count = parse_count(input, count)?;

    let variant = SaleVariant::from_letter(letter).ok_or_else(|| {
        NumberParseError::UnknownVariant {
            input: input.to_string(),
            variant: letter.to_string(),
        }
    })?;

    Ok(SequenceNumber {
        category: DocumentCategory::Sale,
        period,
        running_count,
        variant: Some(variant),
    })
}

/// `PO-YYYYMMDD-NNN` / `PAY-YYYYMMDD-NNN`
fn parse_daily(
    category: DocumentCategory,
    prefix: &'static str,
    input: &str,
) -> Result<SequenceNumber, NumberParseError> {
    let rest = input
        .strip_prefix(prefix)
        .ok_or_else(|| NumberParseError::WrongPrefix {
            input: input.to_string(),
            expected: prefix,
        })?;
    let (date, count) = rest
        .split_once(PERIOD_SEPARATOR)
        .ok_or_else(|| missing_separator(input, PERIOD_SEPARATOR))?;

    let invalid_period = || NumberParseError::InvalidPeriod {
        input: input.to_string(),
        period: date.to_string(),
    };
    if date.len() != 8 || !is_ascii_digits(date) {
        return Err(invalid_period());
    }
    let year: i32 = date[..4].parse().map_err(|_| invalid_period())?;
    let month: u32 = date[4..6].parse().map_err(|_| invalid_period())?;
    let day: u32 = date[6..].parse().map_err(|_| invalid_period())?;
    let date = NaiveDate::from_ymd_opt(year, month, day).ok_or_else(invalid_period)?;
    let period = PeriodKey::daily(date).map_err(|_| invalid_period())?;

    let running_count = parse_count(input, count)?;

    Ok(SequenceNumber {
        category,
        period,
        running_count,
        variant: None,
    })
}

/// Accepts only what `{:03}` produces: at least three digits, and no extra
/// leading zeros once the count is wider than that.
fn parse_count(input: &str, count: &str) -> Result<u32, NumberParseError> {
    let invalid = || NumberParseError::InvalidRunningCount {
        input: input.to_string(),
        count: count.to_string(),
    };
    if count.is_empty() || !is_ascii_digits(count) {
        return Err(invalid());
    }
    let value: u32 = count.parse().map_err(|_| invalid())?;
    if format!("{:0width$}", value, width = COUNT_WIDTH) != count {
        return Err(invalid());
    }
    Ok(value)
}

fn category_literal(category: DocumentCategory) -> &'static str {
    match category {
        DocumentCategory::Sale => "",
        DocumentCategory::Purchase => PURCHASE_PREFIX,
        DocumentCategory::DebtPayment => PAYMENT_PREFIX,
    }
}

fn check_variant(category: DocumentCategory, variant: Option<SaleVariant>) -> CoreResult<()> {
    match (category.has_variant(), variant) {
        (true, None) => Err(CoreError::VariantRequired),
        (false, Some(_)) => Err(CoreError::VariantNotAllowed { category }),
        _ => Ok(()),
    }
}

fn missing_separator(input: &str, separator: char) -> NumberParseError {
    NumberParseError::MissingSeparator {
        input: input.to_string(),
        separator,
    }
}

fn is_ascii_digits(s: &str) -> bool {
    s.bytes().all(|b| b.is_ascii_digit())
}

// =============================================================================
// Number Request
// =============================================================================

/// What a document-creation workflow asks the sequence generator for.
///
/// Carries the raw collaborator inputs; they are checked when the request is
/// resolved into a [`NumberScope`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NumberRequest {
    category: DocumentCategory,
    date: Option<NaiveDate>,
    variant: Option<SaleVariant>,
}

impl NumberRequest {
    /// Raw request, validated by [`NumberRequest::scope`].
    pub fn new(
        category: DocumentCategory,
        date: Option<NaiveDate>,
        variant: Option<SaleVariant>,
    ) -> Self {
        NumberRequest {
            category,
            date,
            variant,
        }
    }

    /// A sale number. `None` means "today".
    pub fn sale(variant: SaleVariant, date: Option<NaiveDate>) -> Self {
        NumberRequest::new(DocumentCategory::Sale, date, Some(variant))
    }

    /// A purchase order number.
    pub fn purchase(date: NaiveDate) -> Self {
        NumberRequest::new(DocumentCategory::Purchase, Some(date), None)
    }

    /// A debt payment receipt number.
    pub fn payment(date: NaiveDate) -> Self {
        NumberRequest::new(DocumentCategory::DebtPayment, Some(date), None)
    }

    pub fn category(&self) -> DocumentCategory {
        self.category
    }

    pub fn date(&self) -> Option<NaiveDate> {
        self.date
    }

    pub fn variant(&self) -> Option<SaleVariant> {
        self.variant
    }

    /// Resolves the counter this request draws from.
    ///
    /// `today` is only used for sales without a date; the caller supplies it
    /// so this crate never reads the clock.
    pub fn scope(&self, today: NaiveDate) -> CoreResult<NumberScope> {
        let date = match (self.date, self.category) {
            (Some(date), _) => date,
            (None, DocumentCategory::Sale) => today,
            (None, category) => return Err(CoreError::DateRequired { category }),
        };
        NumberScope::new(self.category, date, self.variant)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
