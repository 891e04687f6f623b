//! # Domain Types
//!
//! Core domain types used throughout Mortar.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  Catalog                 Parties                 Transactions           │
//! │  ┌──────────────┐        ┌──────────────┐        ┌──────────────────┐   │
//! │  │  Category    │        │   Client     │◄───────│ Sale             │   │
//! │  │  name UNIQUE │        │   Supplier   │◄──┐    │  └── SaleLine*   │   │
//! │  └──────▲───────┘        └──────────────┘   │    └────────┬─────────┘   │
//! │         │ 0..1                              └────│ Purchase         │   │
//! │  ┌──────┴───────┐                                │  └── PurchaseLine*│  │
//! │  │  Product     │◄───────────────────────────────┴──────────┘           │
//! │  │  quantity    │         every line references one Product            │
//! │  └──────────────┘                                                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Row types vs input types
//! Row types (`Product`, `Sale`, ...) mirror database rows and derive
//! `sqlx::FromRow` when the `sqlx` feature is on. Input types
//! (`ProductInput`, `SaleDraft`, ...) carry what a caller submits; ids and
//! timestamps are assigned by the repositories.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;

// =============================================================================
// Category
// =============================================================================

/// A product family (Ciment, Briques, Plomberie, ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Category {
    pub id: String,
    /// Unique across categories.
    pub name: String,
    pub description: Option<String>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

/// Fields a caller supplies to create or update a category.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CategoryInput {
    pub name: String,
    pub description: Option<String>,
}

// =============================================================================
// Product
// =============================================================================

/// A stocked article.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Product {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Display name.
    pub name: String,

    pub description: Option<String>,

    /// Category this product is filed under, if any.
    pub category_id: Option<String>,

    /// What the store pays a supplier per unit, in centimes.
    pub purchase_price_cents: i64,

    /// What a client pays per unit, in centimes.
    pub sale_price_cents: i64,

    /// Units on hand.
    pub quantity: i64,

    /// Quantity at or below which the product is flagged low-stock.
    pub reorder_threshold: i64,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,

    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Returns the purchase price as Money.
    #[inline]
    pub fn purchase_price(&self) -> Money {
        Money::from_cents(self.purchase_price_cents)
    }

    /// Returns the sale price as Money.
    #[inline]
    pub fn sale_price(&self) -> Money {
        Money::from_cents(self.sale_price_cents)
    }

    /// Quantity at or below the reorder threshold.
    #[inline]
    pub fn is_low_stock(&self) -> bool {
        self.quantity <= self.reorder_threshold
    }

    /// Whether `quantity` units can be sold from current stock.
    #[inline]
    pub fn can_supply(&self, quantity: i64) -> bool {
        self.quantity >= quantity
    }
}

/// Fields a caller supplies to create or update a product.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ProductInput {
    pub name: String,
    pub description: Option<String>,
    pub category_id: Option<String>,
    pub purchase_price_cents: i64,
    pub sale_price_cents: i64,
    pub quantity: i64,
    /// `None` applies [`crate::DEFAULT_REORDER_THRESHOLD`].
    pub reorder_threshold: Option<i64>,
}

// =============================================================================
// Parties
// =============================================================================

/// Someone the store sells to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Client {
    pub id: String,
    pub name: String,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub notes: Option<String>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

/// Someone the store buys from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Supplier {
    pub id: String,
    pub name: String,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub notes: Option<String>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

/// Contact fields shared by clients and suppliers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PartyInput {
    pub name: String,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub notes: Option<String>,
}

// =============================================================================
// Sale
// =============================================================================

/// Header of a recorded sale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Sale {
    pub id: String,
    pub client_id: String,
    #[ts(as = "String")]
    pub sold_at: DateTime<Utc>,
    /// Σ line quantity × unit price.
    pub total_cents: i64,
    pub notes: Option<String>,
}

impl Sale {
    #[inline]
    pub fn total(&self) -> Money {
        Money::from_cents(self.total_cents)
    }
}

/// A line of a sale. The unit price is frozen at the time of sale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct SaleLine {
    pub id: String,
    pub sale_id: String,
    pub product_id: String,
    /// Zero-based order of the line within its sale.
    pub position: i64,
    pub quantity: i64,
    pub unit_price_cents: i64,
}

impl SaleLine {
    #[inline]
    pub fn line_total(&self) -> Money {
        Money::from_cents(self.unit_price_cents).multiply_quantity(self.quantity)
    }
}

/// A sale together with its ordered lines.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SaleDetails {
    pub sale: Sale,
    pub lines: Vec<SaleLine>,
}

/// One requested line of a new sale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SaleLineRequest {
    pub product_id: String,
    pub quantity: i64,
}

/// Everything needed to record a sale.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SaleDraft {
    pub client_id: String,
    pub lines: Vec<SaleLineRequest>,
    pub notes: Option<String>,
    /// Defaults to now when absent.
    #[ts(as = "Option<String>")]
    pub sold_at: Option<DateTime<Utc>>,
}

// =============================================================================
// Purchase
// =============================================================================

/// Header of a recorded purchase from a supplier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Purchase {
    pub id: String,
    pub supplier_id: String,
    #[ts(as = "String")]
    pub purchased_at: DateTime<Utc>,
    pub total_cents: i64,
    pub notes: Option<String>,
}

impl Purchase {
    #[inline]
    pub fn total(&self) -> Money {
        Money::from_cents(self.total_cents)
    }
}

/// A line of a purchase, priced as negotiated with the supplier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct PurchaseLine {
    pub id: String,
    pub purchase_id: String,
    pub product_id: String,
    pub position: i64,
    pub quantity: i64,
    pub unit_price_cents: i64,
}

impl PurchaseLine {
    #[inline]
    pub fn line_total(&self) -> Money {
        Money::from_cents(self.unit_price_cents).multiply_quantity(self.quantity)
    }
}

/// A purchase together with its ordered lines.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PurchaseDetails {
    pub purchase: Purchase,
    pub lines: Vec<PurchaseLine>,
}

/// One requested line of a new purchase.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PurchaseLineRequest {
    pub product_id: String,
    pub quantity: i64,
    pub unit_price_cents: i64,
}

/// Everything needed to record a purchase.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PurchaseDraft {
    pub supplier_id: String,
    pub lines: Vec<PurchaseLineRequest>,
    pub notes: Option<String>,
    #[ts(as = "Option<String>")]
    pub purchased_at: Option<DateTime<Utc>>,
}

// =============================================================================
// Listing & Reporting Rows
// =============================================================================

/// A sale header joined with its client's name, for lists and reports.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct SaleSummary {
    pub id: String,
    pub client_id: String,
    /// `None` only if the client row is missing.
    pub client_name: Option<String>,
    #[ts(as = "String")]
    pub sold_at: DateTime<Utc>,
    pub total_cents: i64,
}

/// A purchase header joined with its supplier's name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct PurchaseSummary {
    pub id: String,
    pub supplier_id: String,
    pub supplier_name: Option<String>,
    #[ts(as = "String")]
    pub purchased_at: DateTime<Utc>,
    pub total_cents: i64,
}

/// Value of the stock on hand at both price levels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct StockValuation {
    /// Σ quantity × purchase price.
    pub purchase_value_cents: i64,
    /// Σ quantity × sale price.
    pub sale_value_cents: i64,
}

/// Answer to "can I sell N of this product right now?".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Availability {
    pub product_id: String,
    pub available: i64,
    pub requested: i64,
    pub sufficient: bool,
}

/// Home-screen statistics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct DashboardSummary {
    pub product_count: i64,
    pub valuation: StockValuation,
    pub sales_today_cents: i64,
    pub low_stock_count: i64,
    pub month_margin_cents: i64,
}

/// One product as it appears in the catalog export.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct CatalogRow {
    pub id: String,
    pub name: String,
    pub category_name: Option<String>,
    pub purchase_price_cents: i64,
    pub sale_price_cents: i64,
    pub quantity: i64,
    pub reorder_threshold: i64,
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn product(quantity: i64, threshold: i64) -> Product {
        let now = Utc::now();
        Product {
            id: "p-1".to_string(),
            name: "Brique rouge 8 trous".to_string(),
            description: None,
            category_id: None,
            purchase_price_cents: 2_500,
            sale_price_cents: 3_500,
            quantity,
            reorder_threshold: threshold,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_low_stock_is_inclusive() {
        assert!(product(5, 5).is_low_stock());
        assert!(product(0, 5).is_low_stock());
        assert!(!product(6, 5).is_low_stock());
    }

    #[test]
    fn test_can_supply() {
        let p = product(3, 5);
        assert!(p.can_supply(3));
        assert!(!p.can_supply(5));
    }

    #[test]
    fn test_line_total() {
        let line = SaleLine {
            id: "l".to_string(),
            sale_id: "s".to_string(),
            product_id: "p".to_string(),
            position: 0,
            quantity: 4,
            unit_price_cents: 15_000,
        };
        assert_eq!(line.line_total().cents(), 60_000);
    }

    #[test]
    fn test_sale_draft_from_json() {
        let draft: SaleDraft = serde_json::from_str(
            r#"{"client_id":"c-1","lines":[{"product_id":"p-1","quantity":2}],"notes":null}"#,
        )
        .unwrap();

        assert_eq!(draft.client_id, "c-1");
        assert_eq!(draft.lines[0].quantity, 2);
        assert!(draft.sold_at.is_none());
    }
}
