//! # Product Commands
//!
//! Catalog maintenance and manual stock handling.
//!
//! ## Form Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Product Form Flow                                    │
//! │                                                                         │
//! │  Prix d'achat: "1 150,00"   Prix de vente: "1450"   Quantité: "40"      │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ProductForm::to_input()                                                │
//! │    • Money::parse_as  → 115000 / 145000 cents                           │
//! │    • parse_integer    → 40                                              │
//! │    • blank threshold  → None                                            │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  create: None → ConfigState::default_reorder_threshold                  │
//! │  update: None → stored threshold kept                                   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ProductRepository::create / update                                     │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ProductDto (lowStock flag computed here)                               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};
use tracing::debug;
use ts_rs::TS;

use crate::error::ApiError;
use crate::state::{ConfigState, DbState};
use mortar_core::validation::{normalize_optional, parse_integer};
use mortar_core::{Availability, Money, Product, ProductInput};

/// Product DTO (Data Transfer Object) for the UI.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct ProductDto {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub category_id: Option<String>,
    pub purchase_price_cents: i64,
    pub sale_price_cents: i64,
    pub quantity: i64,
    pub reorder_threshold: i64,
    /// Quantity at or below the reorder threshold.
    /// Used by the UI to highlight the row.
    pub low_stock: bool,
}

impl From<Product> for ProductDto {
    fn from(p: Product) -> Self {
        let low_stock = p.is_low_stock();
        ProductDto {
            id: p.id,
            name: p.name,
            description: p.description,
            category_id: p.category_id,
            purchase_price_cents: p.purchase_price_cents,
            sale_price_cents: p.sale_price_cents,
            quantity: p.quantity,
            reorder_threshold: p.reorder_threshold,
            low_stock,
        }
    }
}

/// Product form with the numeric fields as typed by the user.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct ProductForm {
    pub name: String,
    pub description: Option<String>,
    pub category_id: Option<String>,
    pub purchase_price: String,
    pub sale_price: String,
    pub quantity: String,
    /// Blank means the configured default on create and the stored value
    /// on update.
    pub reorder_threshold: Option<String>,
}

impl ProductForm {
    /// Parses the text fields into a repository input. A blank threshold
    /// stays `None`.
    pub fn to_input(&self) -> Result<ProductInput, ApiError> {
        let purchase_price = Money::parse_as(&self.purchase_price, "purchase price")?;
        let sale_price = Money::parse_as(&self.sale_price, "sale price")?;
        let quantity = parse_integer("quantity", &self.quantity)?;
        let reorder_threshold = normalize_optional(self.reorder_threshold.as_deref())
            .map(|raw| parse_integer("reorder threshold", &raw))
            .transpose()?;

        Ok(ProductInput {
            name: self.name.clone(),
            description: self.description.clone(),
            category_id: self.category_id.clone(),
            purchase_price_cents: purchase_price.cents(),
            sale_price_cents: sale_price.cents(),
            quantity,
            reorder_threshold,
        })
    }
}

/// Result of a stock availability check.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct AvailabilityDto {
    pub product_id: String,
    pub available: i64,
    pub requested: i64,
    pub sufficient: bool,
}

impl From<Availability> for AvailabilityDto {
    fn from(a: Availability) -> Self {
        AvailabilityDto {
            product_id: a.product_id,
            available: a.available,
            requested: a.requested,
            sufficient: a.sufficient,
        }
    }
}

/// All products, ordered by name.
pub async fn list_products(db: &DbState) -> Result<Vec<ProductDto>, ApiError> {
    debug!("list_products command");
    let products = db.inner().products().list().await?;
    Ok(products.into_iter().map(ProductDto::from).collect())
}

/// Searches products by name or description, case-insensitively.
///
/// ## Arguments
/// * `query` - Search term; empty lists everything
pub async fn search_products(db: &DbState, query: String) -> Result<Vec<ProductDto>, ApiError> {
    let query = query.trim();
    debug!(query = %query, "search_products command");

    let products = db.inner().products().search(query).await?;
    let dtos: Vec<ProductDto> = products.into_iter().map(ProductDto::from).collect();

    debug!(count = dtos.len(), query = %query, "search_products complete");
    Ok(dtos)
}

/// Products filed under a category.
pub async fn list_products_by_category(
    db: &DbState,
    category_id: String,
) -> Result<Vec<ProductDto>, ApiError> {
    debug!(category_id = %category_id, "list_products_by_category command");
    let products = db.inner().products().list_by_category(&category_id).await?;
    Ok(products.into_iter().map(ProductDto::from).collect())
}

/// Gets a single product by its UUID.
pub async fn get_product(db: &DbState, id: String) -> Result<ProductDto, ApiError> {
    debug!(id = %id, "get_product command");
    let product = db.inner().products().get(&id).await?;
    Ok(ProductDto::from(product))
}

pub async fn create_product(
    db: &DbState,
    config: &ConfigState,
    form: ProductForm,
) -> Result<ProductDto, ApiError> {
    debug!(name = %form.name, "create_product command");
    let mut input = form.to_input()?;
    input.reorder_threshold = input
        .reorder_threshold
        .or(Some(config.default_reorder_threshold));
    let product = db.inner().products().create(&input).await?;
    Ok(ProductDto::from(product))
}

/// Replaces a product's editable fields. The quantity is set, not added;
/// a blank threshold keeps the stored one.
pub async fn update_product(
    db: &DbState,
    id: String,
    form: ProductForm,
) -> Result<ProductDto, ApiError> {
    debug!(id = %id, "update_product command");
    let input = form.to_input()?;
    let product = db.inner().products().update(&id, &input).await?;
    Ok(ProductDto::from(product))
}

/// Deletes a product with no transaction history.
pub async fn delete_product(db: &DbState, id: String) -> Result<(), ApiError> {
    debug!(id = %id, "delete_product command");
    db.inner().products().delete(&id).await?;
    Ok(())
}

/// Adds `delta` (possibly negative) to the on-hand quantity.
///
/// ## Returns
/// The updated product, or `VALIDATION_ERROR` when the result would be
/// negative.
pub async fn adjust_stock(db: &DbState, id: String, delta: i64) -> Result<ProductDto, ApiError> {
    debug!(id = %id, delta = delta, "adjust_stock command");
    let product = db.inner().products().adjust_stock(&id, delta).await?;
    Ok(ProductDto::from(product))
}

/// Whether `quantity` units can be sold right now.
pub async fn check_availability(
    db: &DbState,
    id: String,
    quantity: i64,
) -> Result<AvailabilityDto, ApiError> {
    debug!(id = %id, quantity = quantity, "check_availability command");
    let availability = db.inner().products().check_availability(&id, quantity).await?;
    Ok(AvailabilityDto::from(availability))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::test_support::context;
    use crate::error::ErrorCode;

    fn cement_form() -> ProductForm {
        ProductForm {
            name: "Ciment CPJ 42.5".into(),
            description: Some("Sac de 50 kg".into()),
            category_id: None,
            purchase_price: "1 150,00".into(),
            sale_price: "1450".into(),
            quantity: "40".into(),
            reorder_threshold: None,
        }
    }

    #[test]
    fn test_form_parsing() {
        let input = cement_form().to_input().unwrap();
        assert_eq!(input.purchase_price_cents, 115_000);
        assert_eq!(input.sale_price_cents, 145_000);
        assert_eq!(input.quantity, 40);
        assert_eq!(input.reorder_threshold, None);

        let blank = ProductForm {
            reorder_threshold: Some("  ".into()),
            ..cement_form()
        };
        assert_eq!(blank.to_input().unwrap().reorder_threshold, None);

        let explicit = ProductForm {
            reorder_threshold: Some(" 12 ".into()),
            ..cement_form()
        };
        assert_eq!(explicit.to_input().unwrap().reorder_threshold, Some(12));
    }

    #[test]
    fn test_form_rejects_bad_numbers() {
        let bad_price = ProductForm {
            sale_price: "douze".into(),
            ..cement_form()
        };
        let err = bad_price.to_input().unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
        assert!(err.message.contains("sale price"));

        let bad_quantity = ProductForm {
            quantity: "4.5".into(),
            ..cement_form()
        };
        assert_eq!(
            bad_quantity.to_input().unwrap_err().code,
            ErrorCode::ValidationError
        );
    }

    #[tokio::test]
    async fn test_create_search_update() {
        let ctx = context().await;

        let created = create_product(&ctx.db, &ctx.config, cement_form())
            .await
            .unwrap();
        assert_eq!(created.reorder_threshold, ctx.config.default_reorder_threshold);
        assert!(!created.low_stock);

        let hits = search_products(&ctx.db, "  cpj ".into()).await.unwrap();
        assert_eq!(hits.len(), 1);

        let updated = update_product(
            &ctx.db,
            created.id.clone(),
            ProductForm {
                quantity: "3".into(),
                ..cement_form()
            },
        )
        .await
        .unwrap();
        assert_eq!(updated.quantity, 3);
        assert!(updated.low_stock);
    }

    #[tokio::test]
    async fn test_update_keeps_custom_threshold() {
        let ctx = context().await;
        let created = create_product(
            &ctx.db,
            &ctx.config,
            ProductForm {
                reorder_threshold: Some("20".into()),
                ..cement_form()
            },
        )
        .await
        .unwrap();
        assert_eq!(created.reorder_threshold, 20);

        let updated = update_product(
            &ctx.db,
            created.id.clone(),
            ProductForm {
                sale_price: "1500".into(),
                reorder_threshold: None,
                ..cement_form()
            },
        )
        .await
        .unwrap();
        assert_eq!(updated.sale_price_cents, 150_000);
        assert_eq!(updated.reorder_threshold, 20);

        let changed = update_product(
            &ctx.db,
            created.id,
            ProductForm {
                reorder_threshold: Some("45".into()),
                ..cement_form()
            },
        )
        .await
        .unwrap();
        assert_eq!(changed.reorder_threshold, 45);
        assert!(changed.low_stock);
    }

    #[tokio::test]
    async fn test_products_by_category() {
        let ctx = context().await;
        let categories = ctx.db.inner().categories().list().await.unwrap();
        let ciment = categories.iter().find(|c| c.name == "Ciment").unwrap();

        create_product(
            &ctx.db,
            &ctx.config,
            ProductForm {
                category_id: Some(ciment.id.clone()),
                ..cement_form()
            },
        )
        .await
        .unwrap();
        create_product(
            &ctx.db,
            &ctx.config,
            ProductForm {
                name: "Brique rouge".into(),
                ..cement_form()
            },
        )
        .await
        .unwrap();

        let filed = list_products_by_category(&ctx.db, ciment.id.clone())
            .await
            .unwrap();
        assert_eq!(filed.len(), 1);
        assert_eq!(filed[0].name, "Ciment CPJ 42.5");
        assert_eq!(list_products(&ctx.db).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_unknown_category_is_not_found() {
        let ctx = context().await;
        let err = create_product(
            &ctx.db,
            &ctx.config,
            ProductForm {
                category_id: Some("missing".into()),
                ..cement_form()
            },
        )
        .await
        .unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);
    }

    #[tokio::test]
    async fn test_adjust_and_availability() {
        let ctx = context().await;
        let product = create_product(&ctx.db, &ctx.config, cement_form())
            .await
            .unwrap();

        let adjusted = adjust_stock(&ctx.db, product.id.clone(), -15).await.unwrap();
        assert_eq!(adjusted.quantity, 25);

        let err = adjust_stock(&ctx.db, product.id.clone(), -26).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
        assert_eq!(get_product(&ctx.db, product.id.clone()).await.unwrap().quantity, 25);

        let ok = check_availability(&ctx.db, product.id.clone(), 25).await.unwrap();
        assert!(ok.sufficient);
        let short = check_availability(&ctx.db, product.id, 26).await.unwrap();
        assert!(!short.sufficient);
        assert_eq!(short.available, 25);
    }

    #[tokio::test]
    async fn test_delete_product() {
        let ctx = context().await;
        let product = create_product(&ctx.db, &ctx.config, cement_form())
            .await
            .unwrap();

        delete_product(&ctx.db, product.id.clone()).await.unwrap();
        assert_eq!(
            get_product(&ctx.db, product.id).await.unwrap_err().code,
            ErrorCode::NotFound
        );
    }
}
