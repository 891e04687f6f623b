//! # Purchase Repository
//!
//! Records and cancels purchases from suppliers. The mirror image of
//! [`SaleRepository`](super::sale::SaleRepository): prices come from the
//! supplier's invoice, stock goes up on creation and down on cancellation.
//!
//! ```text
//! create  : supplier? products? ─► INSERT purchases, purchase_lines
//!                                ─► quantity += received      (one tx)
//! cancel  : read lines ─► quantity -= received, no floor
//!                      ─► DELETE purchase_lines, purchases    (one tx)
//! ```

use chrono::Utc;
use sqlx::{SqliteConnection, SqlitePool};
use tracing::{debug, info, warn};

use crate::error::{DbError, DbResult};
use crate::repository::{apply_stock_deltas, commit, generate_id};
use mortar_core::stock::{plan_purchase, purchase_reversal};
use mortar_core::validation::normalize_optional;
use mortar_core::{
    Purchase, PurchaseDetails, PurchaseDraft, PurchaseLine, PurchaseSummary, DEFAULT_RECENT_LIMIT,
};

/// Repository for purchase database operations.
#[derive(Debug, Clone)]
pub struct PurchaseRepository {
    pool: SqlitePool,
}

impl PurchaseRepository {
    /// Creates a new PurchaseRepository.
    pub fn new(pool: SqlitePool) -> Self {
        PurchaseRepository { pool }
    }

    /// Records a purchase and increments stock, atomically.
    ///
    /// ## Returns
    /// * `Ok(PurchaseDetails)` - the stored purchase and its lines
    /// * `Err(DbError::NotFound)` - unknown supplier or product
    pub async fn create(&self, draft: &PurchaseDraft) -> DbResult<PurchaseDetails> {
        let plan = plan_purchase(draft).map_err(|e| {
            warn!(supplier_id = %draft.supplier_id, error = %e, "Purchase rejected");
            DbError::from(e)
        })?;

        debug!(
            supplier_id = %draft.supplier_id,
            lines = draft.lines.len(),
            "Recording purchase"
        );

        let mut tx = self.pool.begin().await?;

        ensure_exists(&mut tx, "suppliers", "Supplier", &draft.supplier_id).await?;
        for change in &plan.deltas {
            ensure_exists(&mut tx, "products", "Product", &change.product_id).await?;
        }

        let now = Utc::now();
        let purchase = Purchase {
            id: generate_id(),
            supplier_id: draft.supplier_id.clone(),
            purchased_at: draft.purchased_at.unwrap_or(now),
            total_cents: plan.total.cents(),
            notes: normalize_optional(draft.notes.as_deref()),
        };

        sqlx::query(
            r#"
            INSERT INTO purchases (id, supplier_id, purchased_at, total_cents, notes)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
        )
        .bind(&purchase.id)
        .bind(&purchase.supplier_id)
        .bind(purchase.purchased_at)
        .bind(purchase.total_cents)
        .bind(&purchase.notes)
        .execute(&mut *tx)
        .await?;

        let mut lines = Vec::with_capacity(plan.lines.len());
        for planned in &plan.lines {
            let line = PurchaseLine {
                id: generate_id(),
                purchase_id: purchase.id.clone(),
                product_id: planned.product_id.clone(),
                position: planned.position,
                quantity: planned.quantity,
                unit_price_cents: planned.unit_price_cents,
            };

            sqlx::query(
                r#"
                INSERT INTO purchase_lines (id, purchase_id, product_id, position, quantity, unit_price_cents)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                "#,
            )
            .bind(&line.id)
            .bind(&line.purchase_id)
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
            purchase_id = %purchase.id,
            supplier_id = %purchase.supplier_id,
            total = %plan.total,
            lines = lines.len(),
            "Purchase recorded"
        );

        Ok(PurchaseDetails { purchase, lines })
    }

    /// Cancels a purchase: removes the received goods from stock and
    /// deletes it.
    ///
    /// Stock is not floored at zero; if part of the delivery was already
    /// sold, the product ends up negative.
    ///
    /// ## Returns
    /// * `Err(DbError::NotFound)` - no such purchase
    pub async fn cancel(&self, id: &str) -> DbResult<PurchaseDetails> {
        debug!(purchase_id = %id, "Cancelling purchase");

        let mut tx = self.pool.begin().await?;

        let details = fetch_details(&mut tx, id).await?;

        apply_stock_deltas(&mut tx, &purchase_reversal(&details.lines), Utc::now()).await?;

        sqlx::query("DELETE FROM purchase_lines WHERE purchase_id = ?1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM purchases WHERE id = ?1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        commit(tx).await?;

        info!(purchase_id = %id, total_cents = details.purchase.total_cents, "Purchase cancelled");
        Ok(details)
    }

    /// Gets a purchase with its lines in position order.
    pub async fn get(&self, id: &str) -> DbResult<PurchaseDetails> {
        let mut conn = self.pool.acquire().await?;
        fetch_details(&mut conn, id).await
    }

    /// Most recent purchases first, with supplier names.
    pub async fn recent(&self, limit: Option<u32>) -> DbResult<Vec<PurchaseSummary>> {
        let limit = limit.unwrap_or(DEFAULT_RECENT_LIMIT);

        let purchases = sqlx::query_as::<_, PurchaseSummary>(
            r#"
            SELECT p.id, p.supplier_id, s.name AS supplier_name, p.purchased_at, p.total_cents
            FROM purchases p
            LEFT JOIN suppliers s ON s.id = p.supplier_id
            ORDER BY p.purchased_at DESC, p.id
            LIMIT ?1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(purchases)
    }

    /// Counts recorded purchases.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM purchases")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}

async fn ensure_exists(
    conn: &mut SqliteConnection,
    table: &str,
    entity: &str,
    id: &str,
) -> DbResult<()> {
    let sql = format!("SELECT id FROM {} WHERE id = ?1", table);
    let found: Option<String> = sqlx::query_scalar(&sql)
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;

    match found {
        Some(_) => Ok(()),
        None => Err(DbError::not_found(entity, id)),
    }
}

async fn fetch_details(conn: &mut SqliteConnection, id: &str) -> DbResult<PurchaseDetails> {
    let purchase = sqlx::query_as::<_, Purchase>(
        "SELECT id, supplier_id, purchased_at, total_cents, notes FROM purchases WHERE id = ?1",
    )
    .bind(id)
    .fetch_optional(&mut *conn)
    .await?
    .ok_or_else(|| DbError::not_found("Purchase", id))?;

    let lines = sqlx::query_as::<_, PurchaseLine>(
        r#"
        SELECT id, purchase_id, product_id, position, quantity, unit_price_cents
        FROM purchase_lines
        WHERE purchase_id = ?1
        ORDER BY position
        "#,
    )
    .bind(id)
    .fetch_all(&mut *conn)
    .await?;

    Ok(PurchaseDetails { purchase, lines })
}

// =============================================================================
// Unit Tests
// =============================================================================
