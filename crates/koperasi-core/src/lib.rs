//! # koperasi-core: Pure Business Logic
//!
//! Numbering rules and domain types for the cooperative-store backend. No
//! I/O happens in this crate: the storage layer (`koperasi-db`) reads the
//! last issued number and asks this crate what comes next.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Koperasi Architecture                            │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │          Document workflows (sales, purchases, payments)        │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ open transaction                       │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │         koperasi-db: SequenceGenerator + repositories           │   │
//! │  │         locked read of last number → insert → commit            │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ pure calls                             │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ koperasi-core (THIS CRATE) ★                    │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐                  │   │
//! │  │   │   types   │  │ numbering │  │ validation│                  │   │
//! │  │   │ Category  │  │ format    │  │  amounts  │                  │   │
//! │  │   │ Variant   │  │ parse     │  │  members  │                  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘                  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO CLOCK • PURE FUNCTIONS              │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Document categories, sale variants, document rows
//! - [`numbering`] - Period keys, sequence numbers, formatter and parser
//! - [`error`] - Domain error types
//! - [`validation`] - Document input validation
//!
//! ## Example Usage
//!
//! ```rust
//! use koperasi_core::numbering::parse_number;
//! use koperasi_core::DocumentCategory;
//!
//! let last = parse_number(DocumentCategory::Purchase, "PO-20251015-041").unwrap();
//! let next = last.successor().unwrap();
//! assert_eq!(next.to_string(), "PO-20251015-042");
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod numbering;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{CoreError, CoreResult, NumberParseError, ValidationError};
pub use numbering::{
    format_number, parse_number, NumberRequest, NumberScope, PeriodKey, SequenceNumber,
};
pub use types::*;
