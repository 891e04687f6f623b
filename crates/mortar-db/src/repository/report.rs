//! # Report Repository
//!
//! Read-only aggregates over the catalog and the transaction history.
//! Nothing here writes, so every query is idempotent.
//!
//! ## Calendar Days
//! Days and months are the store's local calendar. They are turned into
//! UTC windows by [`mortar_core::calendar`] and compared against the stored
//! timestamps:
//!
//! ```text
//! daily_sales_total(2024-03-15)
//!     └── day_window(Local, 2024-03-15) = [start, end)
//!         └── SUM(total_cents) WHERE sold_at >= start AND sold_at < end
//! ```
//!
//! ## Monthly Margin
//! Margin is computed against each product's *current* purchase price,
//! not the price paid when the goods were bought.

use chrono::{Local, NaiveDate};
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::DbResult;
use mortar_core::calendar::{day_window, month_window, range_window, year_month, Window};
use mortar_core::{
    DashboardSummary, Money, Product, PurchaseSummary, SaleSummary, StockValuation,
};

/// Repository for reporting queries.
#[derive(Debug, Clone)]
pub struct ReportRepository {
    pool: SqlitePool,
}

impl ReportRepository {
    /// Creates a new ReportRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ReportRepository { pool }
    }

    /// Sales dated within `[start, end]` (calendar days, inclusive),
    /// newest first.
    ///
    /// ## Returns
    /// * `Err(DbError::Domain(..))` - `start` is after `end`
    pub async fn sales_between(&self, start: NaiveDate, end: NaiveDate) -> DbResult<Vec<SaleSummary>> {
        let window = range_window(&Local, start, end)?;

        debug!(%start, %end, "Listing sales in range");

        let sales = sqlx::query_as::<_, SaleSummary>(
            r#"
            SELECT s.id, s.client_id, c.name AS client_name, s.sold_at, s.total_cents
            FROM sales s
            LEFT JOIN clients c ON c.id = s.client_id
            WHERE s.sold_at >= ?1 AND s.sold_at < ?2
            ORDER BY s.sold_at DESC, s.id
            "#,
        )
        .bind(window.start)
        .bind(window.end)
        .fetch_all(&self.pool)
        .await?;

        Ok(sales)
    }

    /// Purchases dated within `[start, end]`, newest first.
    pub async fn purchases_between(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> DbResult<Vec<PurchaseSummary>> {
        let window = range_window(&Local, start, end)?;

        let purchases = sqlx::query_as::<_, PurchaseSummary>(
            r#"
            SELECT p.id, p.supplier_id, s.name AS supplier_name, p.purchased_at, p.total_cents
            FROM purchases p
            LEFT JOIN suppliers s ON s.id = p.supplier_id
            WHERE p.purchased_at >= ?1 AND p.purchased_at < ?2
            ORDER BY p.purchased_at DESC, p.id
            "#,
        )
        .bind(window.start)
        .bind(window.end)
        .fetch_all(&self.pool)
        .await?;

        Ok(purchases)
    }

    /// Sum of sale totals on one calendar day.
    pub async fn daily_sales_total(&self, day: NaiveDate) -> DbResult<Money> {
        let window = day_window(&Local, day)?;
        self.sales_total_in(window).await
    }

    async fn sales_total_in(&self, window: Window) -> DbResult<Money> {
        let total: i64 = sqlx::query_scalar(
            r#"
            SELECT COALESCE(SUM(total_cents), 0)
            FROM sales
            WHERE sold_at >= ?1 AND sold_at < ?2
            "#,
        )
        .bind(window.start)
        .bind(window.end)
        .fetch_one(&self.pool)
        .await?;

        Ok(Money::from_cents(total))
    }

    /// Products at or below their reorder threshold, lowest stock first.
    pub async fn low_stock(&self) -> DbResult<Vec<Product>> {
        let products = sqlx::query_as::<_, Product>(
            r#"
            SELECT
                id, name, description, category_id,
                purchase_price_cents, sale_price_cents,
                quantity, reorder_threshold,
                created_at, updated_at
            FROM products
            WHERE quantity <= reorder_threshold
            ORDER BY quantity, name, id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        debug!(count = products.len(), "Low-stock products");
        Ok(products)
    }

    /// Number of products at or below their reorder threshold.
    pub async fn low_stock_count(&self) -> DbResult<i64> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM products WHERE quantity <= reorder_threshold")
                .fetch_one(&self.pool)
                .await?;
        Ok(count)
    }

    /// Value of the stock on hand at purchase and at sale prices.
    pub async fn stock_valuation(&self) -> DbResult<StockValuation> {
        let (purchase_value_cents, sale_value_cents): (i64, i64) = sqlx::query_as(
            r#"
            SELECT
                COALESCE(SUM(quantity * purchase_price_cents), 0),
                COALESCE(SUM(quantity * sale_price_cents), 0)
            FROM products
            "#,
        )
        .fetch_one(&self.pool)
        .await?;

        Ok(StockValuation {
            purchase_value_cents,
            sale_value_cents,
        })
    }

    /// Σ (unit price − current purchase price) × quantity over the sale
    /// lines of a calendar month.
    ///
    /// ## Returns
    /// * `Err(DbError::Domain(..))` - month outside 1..=12
    pub async fn monthly_margin(&self, year: i32, month: u32) -> DbResult<Money> {
        let window = month_window(&Local, year, month)?;

        let margin: i64 = sqlx::query_scalar(
            r#"
            SELECT COALESCE(SUM((sl.unit_price_cents - p.purchase_price_cents) * sl.quantity), 0)
            FROM sale_lines sl
            JOIN sales s ON s.id = sl.sale_id
            JOIN products p ON p.id = sl.product_id
            WHERE s.sold_at >= ?1 AND s.sold_at < ?2
            "#,
        )
        .bind(window.start)
        .bind(window.end)
        .fetch_one(&self.pool)
        .await?;

        debug!(year, month, margin_cents = margin, "Monthly margin");
        Ok(Money::from_cents(margin))
    }

    /// Margin of the current local month.
    pub async fn current_month_margin(&self) -> DbResult<Money> {
        let (year, month) = year_month(Local::now().date_naive());
        self.monthly_margin(year, month).await
    }

    /// Home-screen statistics for `today`.
    pub async fn dashboard(&self, today: NaiveDate) -> DbResult<DashboardSummary> {
        let product_count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products")
            .fetch_one(&self.pool)
            .await?;
        let valuation = self.stock_valuation().await?;
        let sales_today = self.daily_sales_total(today).await?;
        let low_stock_count = self.low_stock_count().await?;
        let (year, month) = year_month(today);
        let month_margin = self.monthly_margin(year, month).await?;

        Ok(DashboardSummary {
            product_count,
            valuation,
            sales_today_cents: sales_today.cents(),
            low_stock_count,
            month_margin_cents: month_margin.cents(),
        })
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::fixtures;
    use crate::{Database, DbError};
    use chrono::{DateTime, Duration, Utc};
    use mortar_core::{CoreError, ProductInput, SaleDraft, SaleLineRequest};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    /// 10:00 local time on `day`.
    fn at_ten(day: NaiveDate) -> DateTime<Utc> {
        day_window(&Local, day).unwrap().start + Duration::hours(10)
    }

    async fn sell(db: &Database, client_id: &str, product_id: &str, qty: i64, when: DateTime<Utc>) -> i64 {
        db.sales()
            .create(&SaleDraft {
                client_id: client_id.to_string(),
                lines: vec![SaleLineRequest {
                    product_id: product_id.to_string(),
                    quantity: qty,
                }],
                notes: None,
                sold_at: Some(when),
            })
            .await
            .unwrap()
            .sale
            .total_cents
    }

    #[tokio::test]
    async fn test_daily_total_and_range() {
        let db = fixtures::database().await;
        let p = fixtures::product(&db, "Ciment", 100, 9_000, 11_500).await;
        let c = fixtures::client(&db, "M. Larbi").await;

        sell(&db, &c.id, &p.id, 2, at_ten(date(2024, 3, 14))).await;
        sell(&db, &c.id, &p.id, 1, at_ten(date(2024, 3, 15))).await;
        sell(&db, &c.id, &p.id, 3, at_ten(date(2024, 3, 15))).await;
        sell(&db, &c.id, &p.id, 1, at_ten(date(2024, 3, 16))).await;

        let reports = db.reports();
        assert_eq!(
            reports.daily_sales_total(date(2024, 3, 15)).await.unwrap().cents(),
            4 * 11_500
        );
        assert!(reports.daily_sales_total(date(2024, 3, 17)).await.unwrap().is_zero());

        let range = reports
            .sales_between(date(2024, 3, 15), date(2024, 3, 16))
            .await
            .unwrap();
        assert_eq!(range.len(), 3);
        assert!(range[0].sold_at >= range[1].sold_at);
        assert_eq!(range[0].client_name.as_deref(), Some("M. Larbi"));

        let single = reports
            .sales_between(date(2024, 3, 14), date(2024, 3, 14))
            .await
            .unwrap();
        assert_eq!(single.len(), 1);
    }

    #[tokio::test]
    async fn test_inverted_range_is_validation_error() {
        let db = fixtures::database().await;
        let err = db
            .reports()
            .sales_between(date(2024, 3, 16), date(2024, 3, 15))
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::Domain(CoreError::Validation(_))));
    }

    #[tokio::test]
    async fn test_low_stock_is_ordered_and_idempotent() {
        let db = fixtures::database().await;
        fixtures::product(&db, "Colle carrelage", 5, 1, 2).await;
        fixtures::product(&db, "Joint", 2, 1, 2).await;
        fixtures::product(&db, "Enduit", 2, 1, 2).await;
        fixtures::product(&db, "Sable", 50, 1, 2).await;
        db.products()
            .create(&ProductInput {
                name: "Béton prêt".to_string(),
                quantity: 15,
                reorder_threshold: Some(20),
                ..Default::default()
            })
            .await
            .unwrap();

        let first = db.reports().low_stock().await.unwrap();
        let names: Vec<&str> = first.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["Enduit", "Joint", "Colle carrelage", "Béton prêt"]);

        let second = db.reports().low_stock().await.unwrap();
        assert_eq!(first, second);
        assert_eq!(db.reports().low_stock_count().await.unwrap(), 4);
    }

    #[tokio::test]
    async fn test_stock_valuation() {
        let db = fixtures::database().await;
        fixtures::product(&db, "Ciment", 10, 9_000, 11_500).await;
        fixtures::product(&db, "Brique", 1_000, 20, 35).await;

        let valuation = db.reports().stock_valuation().await.unwrap();
        assert_eq!(valuation.purchase_value_cents, 10 * 9_000 + 1_000 * 20);
        assert_eq!(valuation.sale_value_cents, 10 * 11_500 + 1_000 * 35);
    }

    #[tokio::test]
    async fn test_monthly_margin_uses_current_purchase_price() {
        let db = fixtures::database().await;
        let p = fixtures::product(&db, "Peinture", 50, 4_000, 6_000).await;
        let c = fixtures::client(&db, "M. Djebbar").await;

        sell(&db, &c.id, &p.id, 3, at_ten(date(2024, 5, 2))).await;
        sell(&db, &c.id, &p.id, 1, at_ten(date(2024, 5, 31))).await;
        sell(&db, &c.id, &p.id, 10, at_ten(date(2024, 6, 1))).await;

        let reports = db.reports();
        assert_eq!(reports.monthly_margin(2024, 5).await.unwrap().cents(), 4 * 2_000);

        db.products()
            .update(
                &p.id,
                &ProductInput {
                    name: "Peinture".to_string(),
                    purchase_price_cents: 5_000,
                    sale_price_cents: 6_000,
                    quantity: 36,
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(reports.monthly_margin(2024, 5).await.unwrap().cents(), 4 * 1_000);

        assert!(reports.monthly_margin(2024, 0).await.is_err());
    }

    #[tokio::test]
    async fn test_dashboard() {
        let db = fixtures::database().await;
        let today = Local::now().date_naive();
        let p = fixtures::product(&db, "Ciment", 10, 9_000, 11_500).await;
        fixtures::product(&db, "Joint", 1, 100, 200).await;
        let c = fixtures::client(&db, "M. Kaci").await;

        let total = sell(&db, &c.id, &p.id, 2, Utc::now()).await;

        let dashboard = db.reports().dashboard(today).await.unwrap();
        assert_eq!(dashboard.product_count, 2);
        assert_eq!(dashboard.sales_today_cents, total);
        assert_eq!(dashboard.low_stock_count, 1);
        assert_eq!(dashboard.month_margin_cents, 2 * 2_500);
        assert_eq!(dashboard.valuation.purchase_value_cents, 8 * 9_000 + 100);
        assert_eq!(
            db.reports().current_month_margin().await.unwrap().cents(),
            dashboard.month_margin_cents
        );
    }
}
