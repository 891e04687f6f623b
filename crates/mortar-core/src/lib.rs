//! # mortar-core: Pure Business Logic for Mortar
//!
//! Business rules of the store back-office as pure functions with zero I/O
//! dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          Mortar Architecture                            │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    Presentation layer (external)                │   │
//! │  │    Catalog ──► Sales ──► Purchases ──► Reports ──► Export       │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    backoffice commands                          │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ mortar-core (THIS CRATE) ★                      │   │
//! │  │                                                                 │   │
//! │  │   ┌─────────┐ ┌─────────┐ ┌─────────┐ ┌─────────┐ ┌─────────┐  │   │
//! │  │   │  types  │ │  money  │ │  stock  │ │ search  │ │ export  │  │   │
//! │  │   └─────────┘ └─────────┘ └─────────┘ └─────────┘ └─────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    mortar-db (Database Layer)                   │   │
//! │  │       SQLite queries, migrations, repositories, transactions    │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Product, Category, Client, Sale, Purchase, ...)
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`error`] - Domain error types
//! - [`validation`] - Input validation rules
//! - [`stock`] - Planning of stock-consistent sales and purchases
//! - [`search`] - Case-insensitive substring matching
//! - [`calendar`] - Calendar-day and month windows for reports
//! - [`export`] - Delimited-text rendering of the product catalog
//!
//! ## Example Usage
//!
//! ```rust
//! use mortar_core::money::Money;
//!
//! let sale_price = Money::parse("150").unwrap();
//! let line_total = sale_price.multiply_quantity(4);
//! assert_eq!(line_total, Money::from_major_minor(600, 0));
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod calendar;
pub mod error;
pub mod export;
pub mod money;
pub mod search;
pub mod stock;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Reorder threshold applied when a product is created without one.
pub const DEFAULT_REORDER_THRESHOLD: i64 = 5;

/// Maximum quantity on a single sale or purchase line.
///
/// ## Business Reason
/// Catches typos (an extra zero on a pallet of bricks) without getting in
/// the way of bulk orders.
pub const MAX_LINE_QUANTITY: i64 = 1_000_000;

/// Maximum number of lines on a single sale or purchase.
pub const MAX_TRANSACTION_LINES: usize = 200;

/// Default number of rows returned by "recent sales/purchases" lists.
pub const DEFAULT_RECENT_LIMIT: u32 = 100;
