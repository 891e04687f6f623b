//! # Report Commands
//!
//! Read-only views: the home-screen dashboard, low-stock alerts, stock
//! valuation, date-range listings and margins.
//!
//! Dates arrive from the UI as `YYYY-MM-DD` strings and are read as local
//! calendar days.

use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};
use tracing::debug;
use ts_rs::TS;

use crate::commands::product::ProductDto;
use crate::commands::purchase::PurchaseSummaryDto;
use crate::commands::sale::SaleSummaryDto;
use crate::error::ApiError;
use crate::state::DbState;
use mortar_core::{DashboardSummary, StockValuation, ValidationError};

/// Home-screen statistics.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct DashboardDto {
    pub product_count: i64,
    pub purchase_value_cents: i64,
    pub sale_value_cents: i64,
    pub sales_today_cents: i64,
    pub low_stock_count: i64,
    pub month_margin_cents: i64,
}

impl From<DashboardSummary> for DashboardDto {
    fn from(d: DashboardSummary) -> Self {
        DashboardDto {
            product_count: d.product_count,
            purchase_value_cents: d.valuation.purchase_value_cents,
            sale_value_cents: d.valuation.sale_value_cents,
            sales_today_cents: d.sales_today_cents,
            low_stock_count: d.low_stock_count,
            month_margin_cents: d.month_margin_cents,
        }
    }
}

/// Stock on hand valued at purchase and at sale prices.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct StockValuationDto {
    pub purchase_value_cents: i64,
    pub sale_value_cents: i64,
}

impl From<StockValuation> for StockValuationDto {
    fn from(v: StockValuation) -> Self {
        StockValuationDto {
            purchase_value_cents: v.purchase_value_cents,
            sale_value_cents: v.sale_value_cents,
        }
    }
}

fn parse_day(field: &str, input: &str) -> Result<NaiveDate, ApiError> {
    NaiveDate::parse_from_str(input.trim(), "%Y-%m-%d").map_err(|_| {
        ApiError::from(ValidationError::InvalidFormat {
            field: field.to_string(),
            reason: "expected YYYY-MM-DD".to_string(),
        })
    })
}

/// Statistics for today, in local time.
pub async fn dashboard(db: &DbState) -> Result<DashboardDto, ApiError> {
    let today = Local::now().date_naive();
    debug!(%today, "dashboard command");
    let summary = db.inner().reports().dashboard(today).await?;
    Ok(DashboardDto::from(summary))
}

/// Products at or below their reorder threshold, lowest stock first.
pub async fn low_stock_alerts(db: &DbState) -> Result<Vec<ProductDto>, ApiError> {
    debug!("low_stock_alerts command");
    let products = db.inner().reports().low_stock().await?;
    Ok(products.into_iter().map(ProductDto::from).collect())
}

pub async fn stock_valuation(db: &DbState) -> Result<StockValuationDto, ApiError> {
    debug!("stock_valuation command");
    let valuation = db.inner().reports().stock_valuation().await?;
    Ok(StockValuationDto::from(valuation))
}

/// Sales dated from `start` to `end`, both days included.
pub async fn sales_between(
    db: &DbState,
    start: String,
    end: String,
) -> Result<Vec<SaleSummaryDto>, ApiError> {
    debug!(start = %start, end = %end, "sales_between command");
    let start = parse_day("start date", &start)?;
    let end = parse_day("end date", &end)?;
    let sales = db.inner().reports().sales_between(start, end).await?;
    Ok(sales.into_iter().map(SaleSummaryDto::from).collect())
}

/// Purchases dated from `start` to `end`, both days included.
pub async fn purchases_between(
    db: &DbState,
    start: String,
    end: String,
) -> Result<Vec<PurchaseSummaryDto>, ApiError> {
    debug!(start = %start, end = %end, "purchases_between command");
    let start = parse_day("start date", &start)?;
    let end = parse_day("end date", &end)?;
    let purchases = db.inner().reports().purchases_between(start, end).await?;
    Ok(purchases.into_iter().map(PurchaseSummaryDto::from).collect())
}

/// Sum of sale totals on one day, in cents.
pub async fn daily_sales_total(db: &DbState, day: String) -> Result<i64, ApiError> {
    debug!(day = %day, "daily_sales_total command");
    let day = parse_day("day", &day)?;
    let total = db.inner().reports().daily_sales_total(day).await?;
    Ok(total.cents())
}

/// Gross margin of a month, in cents, against current purchase prices.
pub async fn monthly_margin(db: &DbState, year: i32, month: u32) -> Result<i64, ApiError> {
    debug!(year, month, "monthly_margin command");
    let margin = db.inner().reports().monthly_margin(year, month).await?;
    Ok(margin.cents())
}

pub async fn current_month_margin(db: &DbState) -> Result<i64, ApiError> {
    debug!("current_month_margin command");
    Ok(db.inner().reports().current_month_margin().await?.cents())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::test_support::context;
    use crate::error::ErrorCode;
    use chrono::Datelike;
    use mortar_core::{PartyInput, ProductInput, SaleDraft, SaleLineRequest};

    /// One product (stock 10, bought 100, sold 150) and a sale of 4.
    async fn seed_sale(db: &DbState) -> String {
        let client = db
            .inner()
            .clients()
            .create(&PartyInput {
                name: "Chantier Haddad".into(),
                ..PartyInput::default()
            })
            .await
            .unwrap();
        let product = db
            .inner()
            .products()
            .create(&ProductInput {
                name: "Plâtre 40kg".into(),
                purchase_price_cents: 100,
                sale_price_cents: 150,
                quantity: 10,
                reorder_threshold: Some(6),
                ..ProductInput::default()
            })
            .await
            .unwrap();
        db.inner()
            .sales()
            .create(&SaleDraft {
                client_id: client.id,
                lines: vec![SaleLineRequest {
                    product_id: product.id.clone(),
                    quantity: 4,
                }],
                ..SaleDraft::default()
            })
            .await
            .unwrap();
        product.id
    }

    #[tokio::test]
    async fn test_dashboard_after_sale() {
        let ctx = context().await;
        seed_sale(&ctx.db).await;

        let summary = dashboard(&ctx.db).await.unwrap();
        assert_eq!(summary.product_count, 1);
        assert_eq!(summary.purchase_value_cents, 600);
        assert_eq!(summary.sale_value_cents, 900);
        assert_eq!(summary.sales_today_cents, 600);
        assert_eq!(summary.low_stock_count, 1);
        assert_eq!(summary.month_margin_cents, 200);
    }

    #[tokio::test]
    async fn test_low_stock_is_stable() {
        let ctx = context().await;
        let product_id = seed_sale(&ctx.db).await;

        let first = low_stock_alerts(&ctx.db).await.unwrap();
        let second = low_stock_alerts(&ctx.db).await.unwrap();
        assert_eq!(first.len(), 1);
        assert_eq!(first[0].id, product_id);
        assert_eq!(
            first.iter().map(|p| &p.id).collect::<Vec<_>>(),
            second.iter().map(|p| &p.id).collect::<Vec<_>>()
        );
    }

    #[tokio::test]
    async fn test_ranges_and_totals() {
        let ctx = context().await;
        seed_sale(&ctx.db).await;

        let today = Local::now().date_naive();
        let day = today.format("%Y-%m-%d").to_string();

        let sales = sales_between(&ctx.db, day.clone(), day.clone()).await.unwrap();
        assert_eq!(sales.len(), 1);
        assert_eq!(sales[0].client_name.as_deref(), Some("Chantier Haddad"));

        assert!(purchases_between(&ctx.db, day.clone(), day.clone())
            .await
            .unwrap()
            .is_empty());

        assert_eq!(daily_sales_total(&ctx.db, day).await.unwrap(), 600);
        assert_eq!(
            monthly_margin(&ctx.db, today.year(), today.month()).await.unwrap(),
            200
        );
        assert_eq!(current_month_margin(&ctx.db).await.unwrap(), 200);
        assert_eq!(stock_valuation(&ctx.db).await.unwrap().sale_value_cents, 900);
    }

    #[tokio::test]
    async fn test_bad_dates_rejected() {
        let ctx = context().await;

        let err = sales_between(&ctx.db, "17/10/2026".into(), "2026-10-18".into())
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
        assert!(err.message.contains("start date"));

        let err = sales_between(&ctx.db, "2026-10-18".into(), "2026-10-17".into())
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);

        let err = monthly_margin(&ctx.db, 2026, 13).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
    }
}
