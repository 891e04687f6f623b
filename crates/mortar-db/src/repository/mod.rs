//! # Repository Module
//!
//! Database repository implementations for Mortar.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Repository Layout                                    │
//! │                                                                         │
//! │  Backoffice command                                                    │
//! │       │                                                                 │
//! │       │  db.sales().create(&draft)                                     │
//! │       ▼                                                                 │
//! │  SaleRepository ── pool.begin() ─────────────────────────┐             │
//! │       │  reads client + product snapshots   (&mut *tx)   │ one         │
//! │       │  mortar_core::stock::plan_sale                   │ sqlx        │
//! │       │  INSERT header, lines; UPDATE stock (&mut *tx)   │ Transaction │
//! │       ▼  tx.commit()  ◄──────────────────────────────────┘             │
//! │  SQLite Database                                                       │
//! │                                                                         │
//! │  Any early return drops the Transaction, which rolls it back.          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`CategoryRepository`](category::CategoryRepository) - product families
//! - [`ProductRepository`](product::ProductRepository) - catalog and manual stock moves
//! - [`ClientRepository`](party::ClientRepository) / [`SupplierRepository`](party::SupplierRepository)
//! - [`SaleRepository`](sale::SaleRepository) - stock-consistent sales
//! - [`PurchaseRepository`](purchase::PurchaseRepository) - stock-consistent purchases
//! - [`ReportRepository`](report::ReportRepository) - read-only aggregates

use chrono::{DateTime, Utc};
use sqlx::SqliteConnection;
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use mortar_core::stock::StockDelta;

pub mod category;
pub mod party;
pub mod product;
pub mod purchase;
pub mod report;
pub mod sale;

/// Generates a new entity id (UUID v4).
pub fn generate_id() -> String {
    Uuid::new_v4().to_string()
}

/// Applies stock deltas on the caller's connection, usually a transaction.
///
/// Deltas are relative (`quantity = quantity + ?`) so the write never
/// depends on a value read earlier in Rust.
pub(crate) async fn apply_stock_deltas(
    conn: &mut SqliteConnection,
    deltas: &[StockDelta],
    now: DateTime<Utc>,
) -> DbResult<()> {
    for change in deltas {
        debug!(product_id = %change.product_id, delta = change.delta, "Applying stock delta");

        let result = sqlx::query(
            r#"
            UPDATE products
            SET quantity = quantity + ?2,
                updated_at = ?3
            WHERE id = ?1
            "#,
        )
        .bind(&change.product_id)
        .bind(change.delta)
        .bind(now)
        .execute(&mut *conn)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", &change.product_id));
        }
    }
    Ok(())
}

/// Counts rows of `table` whose `column` equals `id`.
///
/// Table and column names come from constants in this crate, never from
/// user input.
pub(crate) async fn count_references(
    conn: &mut SqliteConnection,
    table: &str,
    column: &str,
    id: &str,
) -> DbResult<i64> {
    let sql = format!("SELECT COUNT(*) FROM {} WHERE {} = ?1", table, column);
    let count: i64 = sqlx::query_scalar(&sql)
        .bind(id)
        .fetch_one(&mut *conn)
        .await?;
    Ok(count)
}

/// Maps a foreign-key failure raised by a DELETE onto `HasDependents`.
///
/// Reference counts are checked before deleting; this covers any
/// reference the counts do not know about.
pub(crate) fn delete_conflict(entity: &str, id: &str, err: sqlx::Error) -> DbError {
    match DbError::from(err) {
        DbError::ForeignKeyViolation { .. } => {
            DbError::has_dependents(entity, id, "other records")
        }
        other => other,
    }
}

/// Commits a transaction, tagging failures as `TransactionFailed`.
pub(crate) async fn commit(tx: sqlx::Transaction<'_, sqlx::Sqlite>) -> DbResult<()> {
    tx.commit()
        .await
        .map_err(|e| DbError::TransactionFailed(e.to_string()))
}

// =============================================================================
// Test Fixtures
// =============================================================================

#[cfg(test)]
pub(crate) mod fixtures {
    use mortar_core::{Client, PartyInput, Product, ProductInput, Supplier};

    use crate::{Database, DbConfig};

    pub async fn database() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    pub async fn product(db: &Database, name: &str, quantity: i64, purchase: i64, sale: i64) -> Product {
        db.products()
            .create(&ProductInput {
                name: name.to_string(),
                purchase_price_cents: purchase,
                sale_price_cents: sale,
                quantity,
                ..Default::default()
            })
            .await
            .unwrap()
    }

    pub async fn client(db: &Database, name: &str) -> Client {
        db.clients()
            .create(&PartyInput {
                name: name.to_string(),
                ..Default::default()
            })
            .await
            .unwrap()
    }

    pub async fn supplier(db: &Database, name: &str) -> Supplier {
        db.suppliers()
            .create(&PartyInput {
                name: name.to_string(),
                ..Default::default()
            })
            .await
            .unwrap()
    }

    pub async fn stock_of(db: &Database, product_id: &str) -> i64 {
        db.products().get(product_id).await.unwrap().quantity
    }
}
