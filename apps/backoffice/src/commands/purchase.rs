//! # Purchase Commands
//!
//! Deliveries received from suppliers. The unit price is whatever the
//! supplier charged, so unlike a sale it travels with each line.

use serde::{Deserialize, Serialize};
use tracing::debug;
use ts_rs::TS;

use crate::commands::sale::TransactionLineDto;
use crate::error::ApiError;
use crate::state::{ConfigState, DbState};
use mortar_core::{
    Money, PurchaseDetails, PurchaseDraft, PurchaseLine, PurchaseLineRequest, PurchaseSummary,
};

impl From<PurchaseLine> for TransactionLineDto {
    fn from(line: PurchaseLine) -> Self {
        TransactionLineDto {
            line_total_cents: line.line_total().cents(),
            product_id: line.product_id,
            position: line.position,
            quantity: line.quantity,
            unit_price_cents: line.unit_price_cents,
        }
    }
}

/// A purchase with its lines.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct PurchaseDto {
    pub id: String,
    pub supplier_id: String,
    /// RFC 3339 timestamp
    pub purchased_at: String,
    pub total_cents: i64,
    pub notes: Option<String>,
    pub lines: Vec<TransactionLineDto>,
}

impl From<PurchaseDetails> for PurchaseDto {
    fn from(details: PurchaseDetails) -> Self {
        let PurchaseDetails { purchase, lines } = details;
        PurchaseDto {
            id: purchase.id,
            supplier_id: purchase.supplier_id,
            purchased_at: purchase.purchased_at.to_rfc3339(),
            total_cents: purchase.total_cents,
            notes: purchase.notes,
            lines: lines.into_iter().map(TransactionLineDto::from).collect(),
        }
    }
}

/// Row of the purchases list.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct PurchaseSummaryDto {
    pub id: String,
    pub supplier_id: String,
    pub supplier_name: Option<String>,
    pub purchased_at: String,
    pub total_cents: i64,
}

impl From<PurchaseSummary> for PurchaseSummaryDto {
    fn from(p: PurchaseSummary) -> Self {
        PurchaseSummaryDto {
            id: p.id,
            supplier_id: p.supplier_id,
            supplier_name: p.supplier_name,
            purchased_at: p.purchased_at.to_rfc3339(),
            total_cents: p.total_cents,
        }
    }
}

/// A line of the purchase form; the price is typed by the user.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct PurchaseLineForm {
    pub product_id: String,
    pub quantity: i64,
    pub unit_price: String,
}

/// Purchase form as submitted by the UI.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct PurchaseForm {
    pub supplier_id: String,
    pub lines: Vec<PurchaseLineForm>,
    pub notes: Option<String>,
}

impl PurchaseForm {
    /// Parses the typed unit prices into a draft.
    pub fn into_draft(self) -> Result<PurchaseDraft, ApiError> {
        let lines = self
            .lines
            .into_iter()
            .map(|l| -> Result<PurchaseLineRequest, ApiError> {
                let price = Money::parse_as(&l.unit_price, "unit price")?;
                Ok(PurchaseLineRequest {
                    product_id: l.product_id,
                    quantity: l.quantity,
                    unit_price_cents: price.cents(),
                })
            })
            .collect::<Result<Vec<_>, ApiError>>()?;

        Ok(PurchaseDraft {
            supplier_id: self.supplier_id,
            lines,
            notes: self.notes,
            purchased_at: None,
        })
    }
}

/// Records a delivery and adds its quantities to stock.
pub async fn create_purchase(db: &DbState, form: PurchaseForm) -> Result<PurchaseDto, ApiError> {
    debug!(supplier_id = %form.supplier_id, lines = form.lines.len(), "create_purchase command");
    let draft = form.into_draft()?;
    let details = db.inner().purchases().create(&draft).await?;
    Ok(PurchaseDto::from(details))
}

/// Deletes a purchase and takes its quantities back out of stock.
///
/// Stock may go below zero if the goods were already sold.
pub async fn cancel_purchase(db: &DbState, id: String) -> Result<PurchaseDto, ApiError> {
    debug!(id = %id, "cancel_purchase command");
    let details = db.inner().purchases().cancel(&id).await?;
    Ok(PurchaseDto::from(details))
}

pub async fn get_purchase(db: &DbState, id: String) -> Result<PurchaseDto, ApiError> {
    debug!(id = %id, "get_purchase command");
    Ok(PurchaseDto::from(db.inner().purchases().get(&id).await?))
}

pub async fn recent_purchases(
    db: &DbState,
    config: &ConfigState,
) -> Result<Vec<PurchaseSummaryDto>, ApiError> {
    debug!(limit = config.recent_limit, "recent_purchases command");
    let purchases = db
        .inner()
        .purchases()
        .recent(Some(config.recent_limit))
        .await?;
    Ok(purchases.into_iter().map(PurchaseSummaryDto::from).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::test_support::context;
    use crate::error::ErrorCode;
    use mortar_core::{PartyInput, ProductInput};

    async fn setup(db: &DbState) -> (String, String) {
        let supplier = db
            .inner()
            .suppliers()
            .create(&PartyInput {
                name: "Cimenterie de Meftah".into(),
                ..PartyInput::default()
            })
            .await
            .unwrap();
        let product = db
            .inner()
            .products()
            .create(&ProductInput {
                name: "Ciment CRS".into(),
                purchase_price_cents: 110_000,
                sale_price_cents: 140_000,
                quantity: 5,
                ..ProductInput::default()
            })
            .await
            .unwrap();
        (supplier.id, product.id)
    }

    fn form(supplier_id: &str, product_id: &str, quantity: i64, price: &str) -> PurchaseForm {
        PurchaseForm {
            supplier_id: supplier_id.to_string(),
            lines: vec![PurchaseLineForm {
                product_id: product_id.to_string(),
                quantity,
                unit_price: price.to_string(),
            }],
            notes: Some("Bon de livraison 118".into()),
        }
    }

    #[tokio::test]
    async fn test_purchase_and_cancel() {
        let ctx = context().await;
        let (supplier_id, product_id) = setup(&ctx.db).await;

        let purchase = create_purchase(&ctx.db, form(&supplier_id, &product_id, 20, "1 080,50"))
            .await
            .unwrap();
        assert_eq!(purchase.total_cents, 20 * 108_050);
        assert_eq!(purchase.lines[0].unit_price_cents, 108_050);

        let stock = ctx.db.inner().products().get(&product_id).await.unwrap();
        assert_eq!(stock.quantity, 25);

        let recent = recent_purchases(&ctx.db, &ctx.config).await.unwrap();
        assert_eq!(recent[0].supplier_name.as_deref(), Some("Cimenterie de Meftah"));

        cancel_purchase(&ctx.db, purchase.id.clone()).await.unwrap();
        let stock = ctx.db.inner().products().get(&product_id).await.unwrap();
        assert_eq!(stock.quantity, 5);
        assert_eq!(
            get_purchase(&ctx.db, purchase.id).await.unwrap_err().code,
            ErrorCode::NotFound
        );
    }

    #[tokio::test]
    async fn test_unparseable_price_writes_nothing() {
        let ctx = context().await;
        let (supplier_id, product_id) = setup(&ctx.db).await;

        let err = create_purchase(&ctx.db, form(&supplier_id, &product_id, 20, "1,2,3"))
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);

        let stock = ctx.db.inner().products().get(&product_id).await.unwrap();
        assert_eq!(stock.quantity, 5);
        assert!(recent_purchases(&ctx.db, &ctx.config).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_unknown_supplier() {
        let ctx = context().await;
        let (_, product_id) = setup(&ctx.db).await;

        let err = create_purchase(&ctx.db, form("missing", &product_id, 1, "10"))
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);
    }
}
