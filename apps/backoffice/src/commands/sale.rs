//! # Sale Commands
//!
//! Recording and cancelling sales. Stock moves with the sale in the same
//! database transaction; these commands only shape input and output.

use serde::{Deserialize, Serialize};
use tracing::debug;
use ts_rs::TS;

use crate::error::ApiError;
use crate::state::{ConfigState, DbState};
use mortar_core::{SaleDetails, SaleDraft, SaleLine, SaleLineRequest, SaleSummary};

/// One line of a sale or purchase, as displayed.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct TransactionLineDto {
    pub product_id: String,
    pub position: i64,
    pub quantity: i64,
    pub unit_price_cents: i64,
    pub line_total_cents: i64,
}

impl From<SaleLine> for TransactionLineDto {
    fn from(line: SaleLine) -> Self {
        TransactionLineDto {
            line_total_cents: line.line_total().cents(),
            product_id: line.product_id,
            position: line.position,
            quantity: line.quantity,
            unit_price_cents: line.unit_price_cents,
        }
    }
}

/// A sale with its lines.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct SaleDto {
    pub id: String,
    pub client_id: String,
    /// RFC 3339 timestamp
    pub sold_at: String,
    pub total_cents: i64,
    pub notes: Option<String>,
    pub lines: Vec<TransactionLineDto>,
}

impl From<SaleDetails> for SaleDto {
    fn from(details: SaleDetails) -> Self {
        let SaleDetails { sale, lines } = details;
        SaleDto {
            id: sale.id,
            client_id: sale.client_id,
            sold_at: sale.sold_at.to_rfc3339(),
            total_cents: sale.total_cents,
            notes: sale.notes,
            lines: lines.into_iter().map(TransactionLineDto::from).collect(),
        }
    }
}

/// Row of the sales list.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct SaleSummaryDto {
    pub id: String,
    pub client_id: String,
    pub client_name: Option<String>,
    pub sold_at: String,
    pub total_cents: i64,
}

impl From<SaleSummary> for SaleSummaryDto {
    fn from(s: SaleSummary) -> Self {
        SaleSummaryDto {
            id: s.id,
            client_id: s.client_id,
            client_name: s.client_name,
            sold_at: s.sold_at.to_rfc3339(),
            total_cents: s.total_cents,
        }
    }
}

/// A line of the sale form. The unit price is always the product's
/// current sale price, so it is not part of the form.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct SaleLineForm {
    pub product_id: String,
    pub quantity: i64,
}

/// Sale form as submitted by the UI.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct SaleForm {
    pub client_id: String,
    pub lines: Vec<SaleLineForm>,
    pub notes: Option<String>,
}

impl From<SaleForm> for SaleDraft {
    fn from(form: SaleForm) -> Self {
        SaleDraft {
            client_id: form.client_id,
            lines: form
                .lines
                .into_iter()
                .map(|l| SaleLineRequest {
                    product_id: l.product_id,
                    quantity: l.quantity,
                })
                .collect(),
            notes: form.notes,
            sold_at: None,
        }
    }
}

/// Records a sale and takes its quantities out of stock.
///
/// ## Returns
/// * `INSUFFICIENT_STOCK` - a product cannot cover its lines; nothing
///   was written
/// * `NOT_FOUND` - unknown client or product
pub async fn create_sale(db: &DbState, form: SaleForm) -> Result<SaleDto, ApiError> {
    debug!(client_id = %form.client_id, lines = form.lines.len(), "create_sale command");
    let details = db.inner().sales().create(&form.into()).await?;
    Ok(SaleDto::from(details))
}

/// Deletes a sale and puts its quantities back in stock.
pub async fn cancel_sale(db: &DbState, id: String) -> Result<SaleDto, ApiError> {
    debug!(id = %id, "cancel_sale command");
    let details = db.inner().sales().cancel(&id).await?;
    Ok(SaleDto::from(details))
}

pub async fn get_sale(db: &DbState, id: String) -> Result<SaleDto, ApiError> {
    debug!(id = %id, "get_sale command");
    Ok(SaleDto::from(db.inner().sales().get(&id).await?))
}

/// Latest sales, newest first, capped at the configured limit.
pub async fn recent_sales(
    db: &DbState,
    config: &ConfigState,
) -> Result<Vec<SaleSummaryDto>, ApiError> {
    debug!(limit = config.recent_limit, "recent_sales command");
    let sales = db.inner().sales().recent(Some(config.recent_limit)).await?;
    Ok(sales.into_iter().map(SaleSummaryDto::from).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::test_support::context;
    use crate::error::{ErrorCode, Feedback};
    use mortar_core::{PartyInput, ProductInput};

    struct Fixture {
        client_id: String,
        product_id: String,
    }

    async fn fixture(db: &DbState) -> Fixture {
        let client = db
            .inner()
            .clients()
            .create(&PartyInput {
                name: "SARL Bâtir Plus".into(),
                ..PartyInput::default()
            })
            .await
            .unwrap();
        let product = db
            .inner()
            .products()
            .create(&ProductInput {
                name: "Ciment CPJ".into(),
                purchase_price_cents: 10_000,
                sale_price_cents: 15_000,
                quantity: 10,
                ..ProductInput::default()
            })
            .await
            .unwrap();
        Fixture {
            client_id: client.id,
            product_id: product.id,
        }
    }

    fn form(f: &Fixture, quantity: i64) -> SaleForm {
        SaleForm {
            client_id: f.client_id.clone(),
            lines: vec![SaleLineForm {
                product_id: f.product_id.clone(),
                quantity,
            }],
            notes: None,
        }
    }

    #[tokio::test]
    async fn test_sale_and_cancel() {
        let ctx = context().await;
        let f = fixture(&ctx.db).await;

        let sale = create_sale(&ctx.db, form(&f, 4)).await.unwrap();
        assert_eq!(sale.total_cents, 60_000);
        assert_eq!(sale.lines.len(), 1);
        assert_eq!(sale.lines[0].line_total_cents, 60_000);

        let stock = ctx.db.inner().products().get(&f.product_id).await.unwrap();
        assert_eq!(stock.quantity, 6);

        let listed = recent_sales(&ctx.db, &ctx.config).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].client_name.as_deref(), Some("SARL Bâtir Plus"));

        cancel_sale(&ctx.db, sale.id.clone()).await.unwrap();
        let stock = ctx.db.inner().products().get(&f.product_id).await.unwrap();
        assert_eq!(stock.quantity, 10);

        let err = get_sale(&ctx.db, sale.id).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);
    }

    #[tokio::test]
    async fn test_insufficient_stock_feedback() {
        let ctx = context().await;
        let f = fixture(&ctx.db).await;

        let result = create_sale(&ctx.db, form(&f, 11)).await;
        let feedback = Feedback::from_result(&result, "Vente enregistrée");

        assert!(!feedback.success);
        assert!(feedback.message.contains("Ciment CPJ"));
        assert_eq!(result.unwrap_err().code, ErrorCode::InsufficientStock);
        assert!(recent_sales(&ctx.db, &ctx.config).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_empty_sale_rejected() {
        let ctx = context().await;
        let f = fixture(&ctx.db).await;

        let err = create_sale(
            &ctx.db,
            SaleForm {
                client_id: f.client_id,
                ..SaleForm::default()
            },
        )
        .await
        .unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
    }

    #[tokio::test]
    async fn test_recent_respects_configured_limit() {
        let ctx = context().await;
        let f = fixture(&ctx.db).await;
        for _ in 0..3 {
            create_sale(&ctx.db, form(&f, 1)).await.unwrap();
        }

        let config = ConfigState {
            recent_limit: 2,
            ..ctx.config.clone()
        };
        assert_eq!(recent_sales(&ctx.db, &config).await.unwrap().len(), 2);
    }
}
