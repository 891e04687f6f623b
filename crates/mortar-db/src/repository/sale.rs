//! # Sale Repository
//!
//! Records and cancels sales. Every write here moves stock, and every
//! stock move happens inside the same `sqlx::Transaction` as the rows that
//! justify it.
//!
//! ## Sale Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Sale Lifecycle                                    │
//! │                                                                         │
//! │  1. CREATE  (one transaction)                                          │
//! │     ├── client exists?                 no  → NotFound                  │
//! │     ├── every product exists?          no  → NotFound                  │
//! │     ├── plan_sale (pre-sale stock)     no  → InsufficientStock         │
//! │     ├── INSERT sales, sale_lines                                       │
//! │     ├── UPDATE products.quantity -= per-product demand                 │
//! │     └── COMMIT                                                          │
//! │                                                                         │
//! │  2. IMMUTABLE  (no line edits)                                         │
//! │                                                                         │
//! │  3. CANCEL  (one transaction)                                          │
//! │     ├── read lines                                                     │
//! │     ├── UPDATE products.quantity += sold quantities                    │
//! │     ├── DELETE sale_lines, sales                                       │
//! │     └── COMMIT                                                          │
//! │                                                                         │
//! │  Early return at any step drops the transaction → full rollback.      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use sqlx::{SqliteConnection, SqlitePool};
use tracing::{debug, info, warn};

use crate::error::{DbError, DbResult};
use crate::repository::{apply_stock_deltas, commit, generate_id};
use mortar_core::stock::{plan_sale, sale_reversal, validate_sale_draft, ProductSnapshot};
use mortar_core::validation::normalize_optional;
use mortar_core::{Sale, SaleDetails, SaleDraft, SaleLine, SaleSummary, DEFAULT_RECENT_LIMIT};

/// Repository for sale database operations.
#[derive(Debug, Clone)]
pub struct SaleRepository {
    pool: SqlitePool,
}

impl SaleRepository {
    /// Creates a new SaleRepository.
    pub fn new(pool: SqlitePool) -> Self {
        SaleRepository { pool }
    }

    /// Records a sale and decrements stock, atomically.
    ///
    /// Unit prices are the products' sale prices at the moment of the sale.
    /// Every line is checked against stock as it was before the sale;
    /// lines naming the same product are summed first.
    ///
    /// ## Returns
    /// * `Ok(SaleDetails)` - the stored sale and its lines
    /// * `Err(DbError::NotFound)` - unknown client or product
    /// * `Err(DbError::Domain(InsufficientStock))` - nothing was written
    ///
    /// ## Example
    /// ```rust,ignore
    /// let sale = db.sales().create(&SaleDraft {
    ///     client_id: client.id.clone(),
    ///     lines: vec![SaleLineRequest { product_id: cement.id.clone(), quantity: 4 }],
    ///     ..Default::default()
    /// }).await?;
    /// ```
    pub async fn create(&self, draft: &SaleDraft) -> DbResult<SaleDetails> {
        validate_sale_draft(draft)?;

        debug!(
            client_id = %draft.client_id,
            lines = draft.lines.len(),
            "Recording sale"
        );

        let mut tx = self.pool.begin().await?;

        ensure_client(&mut tx, &draft.client_id).await?;

        let mut snapshots: Vec<ProductSnapshot> = Vec::new();
        for line in &draft.lines {
            if snapshots.iter().any(|s| s.id == line.product_id) {
                continue;
            }
            snapshots.push(fetch_snapshot(&mut tx, &line.product_id).await?);
        }

        let plan = plan_sale(draft, &snapshots).map_err(|e| {
            warn!(client_id = %draft.client_id, error = %e, "Sale rejected");
            DbError::from(e)
        })?;

        let now = Utc::now();
        let sale = Sale {
            id: generate_id(),
            client_id: draft.client_id.clone(),
            sold_at: draft.sold_at.unwrap_or(now),
            total_cents: plan.total.cents(),
            notes: normalize_optional(draft.notes.as_deref()),
        };

        sqlx::query(
            r#"
            INSERT INTO sales (id, client_id, sold_at, total_cents, notes)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
        )
        .bind(&sale.id)
        .bind(&sale.client_id)
        .bind(sale.sold_at)
        .bind(sale.total_cents)
        .bind(&sale.notes)
        .execute(&mut *tx)
        .await?;

        let mut lines = Vec::with_capacity(plan.lines.len());
        for planned in &plan.lines {
            let line = SaleLine {
                id: generate_id(),
                sale_id: sale.id.clone(),
                product_id: planned.product_id.clone(),
                position: planned.position,
                quantity: planned.quantity,
                unit_price_cents: planned.unit_price_cents,
            };

            sqlx::query(
                r#"
                INSERT INTO sale_lines (id, sale_id, product_id, position, quantity, unit_price_cents)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                "#,
            )
            .bind(&line.id)
            .bind(&line.sale_id)
            .bind(&line.product_id)
            .bind(line.position)
            .bind(line.quantity)
            .bind(line.unit_price_cents)
            .execute(&mut *tx)
            .await?;

            lines.push(line);
        }

        apply_stock_deltas(&mut tx, &plan.deltas, now).await?;

        commit(tx).await?;

        info!(
            sale_id = %sale.id,
            client_id = %sale.client_id,
            total = %plan.total,
            lines = lines.len(),
            "Sale recorded"
        );

        Ok(SaleDetails { sale, lines })
    }

    /// Cancels a sale: puts its goods back on the shelves and deletes it.
    ///
    /// ## Returns
    /// * `Ok(SaleDetails)` - what was cancelled
    /// * `Err(DbError::NotFound)` - no such sale
    pub async fn cancel(&self, id: &str) -> DbResult<SaleDetails> {
        debug!(sale_id = %id, "Cancelling sale");

        let mut tx = self.pool.begin().await?;

        let details = fetch_details(&mut tx, id).await?;

        apply_stock_deltas(&mut tx, &sale_reversal(&details.lines), Utc::now()).await?;

        sqlx::query("DELETE FROM sale_lines WHERE sale_id = ?1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM sales WHERE id = ?1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        commit(tx).await?;

        info!(sale_id = %id, total_cents = details.sale.total_cents, "Sale cancelled");
        Ok(details)
    }

    /// Gets a sale with its lines in position order.
    ///
    /// ## Returns
    /// * `Err(DbError::NotFound)` - no such sale
    pub async fn get(&self, id: &str) -> DbResult<SaleDetails> {
        let mut conn = self.pool.acquire().await?;
        fetch_details(&mut conn, id).await
    }

    /// Most recent sales first, with client names.
    ///
    /// `None` applies [`DEFAULT_RECENT_LIMIT`].
    pub async fn recent(&self, limit: Option<u32>) -> DbResult<Vec<SaleSummary>> {
        let limit = limit.unwrap_or(DEFAULT_RECENT_LIMIT);

        let sales = sqlx::query_as::<_, SaleSummary>(
            r#"
            SELECT s.id, s.client_id, c.name AS client_name, s.sold_at, s.total_cents
            FROM sales s
            LEFT JOIN clients c ON c.id = s.client_id
            ORDER BY s.sold_at DESC, s.id
            LIMIT ?1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(sales)
    }

    /// Counts recorded sales.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM sales")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}

// =============================================================================
// Connection-level helpers
// =============================================================================

async fn ensure_client(conn: &mut SqliteConnection, client_id: &str) -> DbResult<()> {
    let found: Option<String> = sqlx::query_scalar("SELECT id FROM clients WHERE id = ?1")
        .bind(client_id)
        .fetch_optional(&mut *conn)
        .await?;

    match found {
        Some(_) => Ok(()),
        None => Err(DbError::not_found("Client", client_id)),
    }
}

async fn fetch_snapshot(conn: &mut SqliteConnection, product_id: &str) -> DbResult<ProductSnapshot> {
    sqlx::query_as::<_, ProductSnapshot>(
        "SELECT id, name, quantity, sale_price_cents FROM products WHERE id = ?1",
    )
    .bind(product_id)
    .fetch_optional(&mut *conn)
    .await?
    .ok_or_else(|| DbError::not_found("Product", product_id))
}

async fn fetch_details(conn: &mut SqliteConnection, id: &str) -> DbResult<SaleDetails> {
    let sale = sqlx::query_as::<_, Sale>(
        "SELECT id, client_id, sold_at, total_cents, notes FROM sales WHERE id = ?1",
    )
    .bind(id)
    .fetch_optional(&mut *conn)
    .await?
    .ok_or_else(|| DbError::not_found("Sale", id))?;

    let lines = sqlx::query_as::<_, SaleLine>(
        r#"
        SELECT id, sale_id, product_id, position, quantity, unit_price_cents
        FROM sale_lines
        WHERE sale_id = ?1
        ORDER BY position
        "#,
    )
    .bind(id)
    .fetch_all(&mut *conn)
    .await?;

    Ok(SaleDetails { sale, lines })
}

// =============================================================================
// Unit Tests
// =============================================================================
