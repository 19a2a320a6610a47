//! # koperasi-db: Database Layer
//!
//! Storage for the cooperative store's documents and the sequence generator
//! that gives each one its number. SQLite for a store's own database, with
//! a PostgreSQL sequence store for shared deployments.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Koperasi Data Flow                               │
//! │                                                                         │
//! │  Checkout / purchasing / member desk                                   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                   koperasi-db (THIS CRATE)                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │   Database    │    │  Repositories │    │  Migrations  │  │   │
//! │  │   │   (pool.rs)   │    │ SaleRepo      │    │  (embedded)  │  │   │
//! │  │   │               │◄───│ PurchaseRepo  │    │ sqlite/      │  │   │
//! │  │   │ SqlitePool    │    │ DebtPaymentRepo│   │ postgres/    │  │   │
//! │  │   └───────────────┘    └───────┬───────┘    └──────────────┘  │   │
//! │  │                                │                               │   │
//! │  │                    ┌───────────▼───────────┐                   │   │
//! │  │                    │  SequenceGenerator    │                   │   │
//! │  │                    │  Sqlite / Pg stores   │                   │   │
//! │  │                    └───────────────────────┘                   │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite (WAL) or PostgreSQL                                            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database and numbering error types
//! - [`sequence`] - Sequence generator and its stores
//! - [`repository`] - Sale, purchase and debt payment repositories
//!
//! ## Usage
//!
//! ```rust,ignore
//! use koperasi_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::from_env()?).await?;
//!
//! let order = db.purchases().create(NewPurchase {
//!     purchase_date: date,
//!     supplier_name: "UD Makmur".into(),
//!     total_cents: 2_500_000,
//!     notes: None,
//! }).await?;
//! println!("{}", order.number); // PO-20251015-001
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;
pub mod sequence;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{is_lock_timeout, DbError, DbResult, NumberingError, NumberingResult};
pub use pool::{ConfigError, Database, DbConfig};
pub use sequence::{
    LockedReadError, PgSequenceStore, SequenceGenerator, SequenceStore, SqliteSequenceStore,
    LOCK_TIMEOUT,
};

// Repository re-exports for convenience
pub use repository::debt_payment::DebtPaymentRepository;
pub use repository::purchase::PurchaseRepository;
pub use repository::sale::SaleRepository;
