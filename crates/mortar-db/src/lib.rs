//! # mortar-db: Database Layer for Mortar
//!
//! This crate provides database access for the Mortar back-office.
//! It uses SQLite for local storage with sqlx for async operations.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Mortar Data Flow                                 │
//! │                                                                         │
//! │  Back-office command (create_sale)                                      │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    mortar-db (THIS CRATE)                       │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │   Database    │    │  Repositories │    │  Migrations  │  │   │
//! │  │   │   (pool.rs)   │    │               │    │  (embedded)  │  │   │
//! │  │   │               │    │ CategoryRepo  │    │              │  │   │
//! │  │   │ SqlitePool    │◄───│ ProductRepo   │    │ 0001_schema  │  │   │
//! │  │   │ Connection    │    │ SaleRepo      │    │ 0002_default │  │   │
//! │  │   │ Management    │    │ ReportRepo    │    │  categories  │  │   │
//! │  │   └───────────────┘    └───────────────┘    └──────────────┘  │   │
//! │  │                                                                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     SQLite Database                             │   │
//! │  │   <data dir>/mortar.db                                          │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - Repository implementations (catalog, parties,
//!   transactions, reports)
//!
//! ## Usage
//!
//! ```rust,ignore
//! use mortar_db::{Database, DbConfig};
//!
//! // Migrations run on connect unless disabled in the config
//! let db = Database::new(DbConfig::new("path/to/mortar.db")).await?;
//!
//! let cement = db.products().search("ciment").await?;
//! let sale = db.sales().create(&draft).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};

// Repository re-exports for convenience
pub use repository::category::CategoryRepository;
pub use repository::party::{
    ClientKind, ClientRepository, PartyKind, PartyRepository, SupplierKind, SupplierRepository,
};
pub use repository::product::ProductRepository;
pub use repository::purchase::PurchaseRepository;
pub use repository::report::ReportRepository;
pub use repository::sale::SaleRepository;
