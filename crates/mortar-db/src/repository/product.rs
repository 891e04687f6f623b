//! # Product Repository
//!
//! Database operations for products.
//!
//! ## Key Operations
//! - CRUD and case-insensitive search
//! - Manual stock adjustments (inventory counts, breakage)
//! - Availability checks before building a sale
//! - Catalog rows for the export
//!
//! ## Stock Ownership
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Who moves products.quantity?                                           │
//! │                                                                         │
//! │  SaleRepository::create / cancel       ──┐                             │
//! │  PurchaseRepository::create / cancel   ──┼─► relative UPDATE in a tx   │
//! │  ProductRepository::adjust_stock       ──┘   (quantity = quantity + d) │
//! │  ProductRepository::update             ───► absolute, from the form    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::{debug, info, warn};

use crate::error::{DbError, DbResult};
use crate::repository::{
    apply_stock_deltas, commit, count_references, delete_conflict, generate_id,
};
use mortar_core::search::filter_matching;
use mortar_core::stock::{check_adjustment, StockDelta};
use mortar_core::validation::{normalize_optional, validate_product, validate_search_query};
use mortar_core::{Availability, CatalogRow, Product, ProductInput, DEFAULT_REORDER_THRESHOLD};

const SELECT_PRODUCT: &str = r#"
    SELECT
        id,
        name,
        description,
        category_id,
        purchase_price_cents,
        sale_price_cents,
        quantity,
        reorder_threshold,
        created_at,
        updated_at
    FROM products
"#;

/// Repository for product database operations.
///
/// ## Usage
/// ```rust,ignore
/// let repo = db.products();
///
/// let cement = repo.search("ciment").await?;
/// let product = repo.get("uuid-here").await?;
/// repo.adjust_stock(&product.id, -2).await?; // two broken bags
/// ```
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

impl ProductRepository {
    /// Creates a new ProductRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ProductRepository { pool }
    }

    /// Lists every product ordered by name.
    pub async fn list(&self) -> DbResult<Vec<Product>> {
        let sql = format!("{} ORDER BY name, id", SELECT_PRODUCT);
        let products = sqlx::query_as::<_, Product>(&sql)
            .fetch_all(&self.pool)
            .await?;
        Ok(products)
    }

    /// Searches products by name or description.
    ///
    /// An empty term returns the full list.
    ///
    /// ## Example
    /// ```rust,ignore
    /// let bricks = repo.search("BRIQUE").await?; // matches "Brique creuse 12"
    /// ```
    pub async fn search(&self, term: &str) -> DbResult<Vec<Product>> {
        let term = validate_search_query(term)?;

        debug!(query = %term, "Searching products");

        let products = filter_matching(self.list().await?, &term);

        debug!(count = products.len(), "Search returned products");
        Ok(products)
    }

    /// Products filed under a category, ordered by name.
    pub async fn list_by_category(&self, category_id: &str) -> DbResult<Vec<Product>> {
        let sql = format!(
            "{} WHERE category_id = ?1 ORDER BY name, id",
            SELECT_PRODUCT
        );
        let products = sqlx::query_as::<_, Product>(&sql)
            .bind(category_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(products)
    }

    /// Gets a product by id, or `None`.
    pub async fn find(&self, id: &str) -> DbResult<Option<Product>> {
        let sql = format!("{} WHERE id = ?1", SELECT_PRODUCT);
        let product = sqlx::query_as::<_, Product>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(product)
    }

    /// Gets a product by id.
    ///
    /// ## Returns
    /// * `Err(DbError::NotFound)` - no such product
    pub async fn get(&self, id: &str) -> DbResult<Product> {
        self.find(id)
            .await?
            .ok_or_else(|| DbError::not_found("Product", id))
    }

    /// Verifies that a referenced category exists.
    async fn ensure_category(&self, category_id: Option<&str>) -> DbResult<()> {
        if let Some(category_id) = category_id {
            let exists: Option<String> =
                sqlx::query_scalar("SELECT id FROM categories WHERE id = ?1")
                    .bind(category_id)
                    .fetch_optional(&self.pool)
                    .await?;
            if exists.is_none() {
                return Err(DbError::not_found("Category", category_id));
            }
        }
        Ok(())
    }

    /// Creates a product.
    ///
    /// A missing reorder threshold defaults to
    /// [`DEFAULT_REORDER_THRESHOLD`].
    ///
    /// ## Returns
    /// * `Err(DbError::NotFound)` - the category does not exist
    pub async fn create(&self, input: &ProductInput) -> DbResult<Product> {
        validate_product(input)?;

        let category_id = normalize_optional(input.category_id.as_deref());
        self.ensure_category(category_id.as_deref()).await?;

        let now = Utc::now();
        let product = Product {
            id: generate_id(),
            name: input.name.trim().to_string(),
            description: normalize_optional(input.description.as_deref()),
            category_id,
            purchase_price_cents: input.purchase_price_cents,
            sale_price_cents: input.sale_price_cents,
            quantity: input.quantity,
            reorder_threshold: input.reorder_threshold.unwrap_or(DEFAULT_REORDER_THRESHOLD),
            created_at: now,
            updated_at: now,
        };

        debug!(name = %product.name, "Inserting product");

        sqlx::query(
            r#"
            INSERT INTO products (
                id, name, description, category_id,
                purchase_price_cents, sale_price_cents,
                quantity, reorder_threshold,
                created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
            "#,
        )
        .bind(&product.id)
        .bind(&product.name)
        .bind(&product.description)
        .bind(&product.category_id)
        .bind(product.purchase_price_cents)
        .bind(product.sale_price_cents)
        .bind(product.quantity)
        .bind(product.reorder_threshold)
        .bind(product.created_at)
        .bind(product.updated_at)
        .execute(&self.pool)
        .await?;

        info!(id = %product.id, name = %product.name, "Product created");
        Ok(product)
    }

    /// Replaces the editable fields of a product, quantity included.
    pub async fn update(&self, id: &str, input: &ProductInput) -> DbResult<Product> {
        validate_product(input)?;

        let category_id = normalize_optional(input.category_id.as_deref());
        self.ensure_category(category_id.as_deref()).await?;

        debug!(id = %id, "Updating product");

        let result = sqlx::query(
            r#"
            UPDATE products SET
                name = ?2,
                description = ?3,
                category_id = ?4,
                purchase_price_cents = ?5,
                sale_price_cents = ?6,
                quantity = ?7,
                reorder_threshold = COALESCE(?8, reorder_threshold),
                updated_at = ?9
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .bind(input.name.trim())
        .bind(normalize_optional(input.description.as_deref()))
        .bind(&category_id)
        .bind(input.purchase_price_cents)
        .bind(input.sale_price_cents)
        .bind(input.quantity)
        .bind(input.reorder_threshold)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", id));
        }

        self.get(id).await
    }

    /// Deletes a product that appears on no sale or purchase line.
    ///
    /// ## Returns
    /// * `Err(DbError::HasDependents)` - the product has transaction history
    /// * `Err(DbError::NotFound)` - no such product
    pub async fn delete(&self, id: &str) -> DbResult<()> {
        let mut conn = self.pool.acquire().await?;

        let sold = count_references(&mut conn, "sale_lines", "product_id", id).await?;
        let bought = count_references(&mut conn, "purchase_lines", "product_id", id).await?;

        if sold + bought > 0 {
            warn!(id = %id, sold, bought, "Refusing to delete product with history");
            return Err(DbError::has_dependents(
                "Product",
                id,
                format!("{} sale line(s) and {} purchase line(s)", sold, bought),
            ));
        }

        let result = sqlx::query("DELETE FROM products WHERE id = ?1")
            .bind(id)
            .execute(&mut *conn)
            .await
            .map_err(|e| delete_conflict("Product", id, e))?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", id));
        }

        info!(id = %id, "Product deleted");
        Ok(())
    }

    /// Moves stock by `delta` outside of any sale or purchase.
    ///
    /// ## Returns
    /// * `Ok(Product)` - the product after the adjustment
    /// * `Err(DbError::Domain(CoreError::NegativeStock))` - the result
    ///   would be below zero; nothing is written
    pub async fn adjust_stock(&self, id: &str, delta: i64) -> DbResult<Product> {
        debug!(id = %id, delta, "Adjusting stock");

        let mut tx = self.pool.begin().await?;

        let current: Option<(String, i64)> =
            sqlx::query_as("SELECT name, quantity FROM products WHERE id = ?1")
                .bind(id)
                .fetch_optional(&mut *tx)
                .await?;
        let (name, quantity) = current.ok_or_else(|| DbError::not_found("Product", id))?;

        let resulting = check_adjustment(&name, quantity, delta)?;

        apply_stock_deltas(
            &mut tx,
            &[StockDelta {
                product_id: id.to_string(),
                delta,
            }],
            Utc::now(),
        )
        .await?;

        commit(tx).await?;

        info!(id = %id, delta, quantity = resulting, "Stock adjusted");
        self.get(id).await
    }

    /// Whether current stock covers `quantity` units.
    pub async fn check_availability(&self, id: &str, quantity: i64) -> DbResult<Availability> {
        let product = self.get(id).await?;
        Ok(Availability {
            product_id: product.id.clone(),
            available: product.quantity,
            requested: quantity,
            sufficient: product.can_supply(quantity),
        })
    }

    /// Counts products.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    /// Catalog rows for the export, with category names, ordered by name.
    pub async fn catalog(&self) -> DbResult<Vec<CatalogRow>> {
        let rows = sqlx::query_as::<_, CatalogRow>(
            r#"
            SELECT
                p.id,
                p.name,
                c.name AS category_name,
                p.purchase_price_cents,
                p.sale_price_cents,
                p.quantity,
                p.reorder_threshold
            FROM products p
            LEFT JOIN categories c ON c.id = p.category_id
            ORDER BY p.name, p.id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::fixtures;
    use mortar_core::{CoreError, PurchaseDraft, PurchaseLineRequest, SaleDraft, SaleLineRequest};

    #[tokio::test]
    async fn test_create_applies_default_threshold() {
        let db = fixtures::database().await;
        let product = fixtures::product(&db, "Sable 0/4", 10, 100, 150).await;

        assert_eq!(product.reorder_threshold, DEFAULT_REORDER_THRESHOLD);
        assert_eq!(db.products().get(&product.id).await.unwrap(), product);
        assert_eq!(db.products().count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_create_rejects_invalid_input() {
        let db = fixtures::database().await;

        let err = db
            .products()
            .create(&ProductInput {
                name: " ".to_string(),
                ..Default::default()
            })
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::Domain(CoreError::Validation(_))));

        let err = db
            .products()
            .create(&ProductInput {
                name: "Gravier".to_string(),
                category_id: Some("missing".to_string()),
                ..Default::default()
            })
            .await
            .unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(db.products().count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_update_and_list_by_category() {
        let db = fixtures::database().await;
        let cement = db
            .categories()
            .list()
            .await
            .unwrap()
            .into_iter()
            .find(|c| c.name == "Ciment")
            .unwrap();
        let product = fixtures::product(&db, "Ciment blanc", 4, 1_000, 1_400).await;

        let updated = db
            .products()
            .update(
                &product.id,
                &ProductInput {
                    name: "Ciment blanc 25kg".to_string(),
                    description: Some("Sac".to_string()),
                    category_id: Some(cement.id.clone()),
                    purchase_price_cents: 1_100,
                    sale_price_cents: 1_500,
                    quantity: 8,
                    reorder_threshold: None,
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.quantity, 8);
        assert_eq!(updated.reorder_threshold, DEFAULT_REORDER_THRESHOLD);
        let in_cement = db.products().list_by_category(&cement.id).await.unwrap();
        assert_eq!(in_cement.len(), 1);
        assert_eq!(in_cement[0].name, "Ciment blanc 25kg");

        assert!(db
            .products()
            .update("missing", &ProductInput { name: "x".into(), ..Default::default() })
            .await
            .unwrap_err()
            .is_not_found());
    }

    #[tokio::test]
    async fn test_search_name_and_description() {
        let db = fixtures::database().await;
        fixtures::product(&db, "Brique creuse 12", 500, 20, 30).await;
        fixtures::product(&db, "Parpaing 20", 300, 50, 70).await;
        db.products()
            .create(&ProductInput {
                name: "Hourdis 16".to_string(),
                description: Some("Entrevous en BRIQUE".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();

        let found = db.products().search("brique").await.unwrap();
        assert_eq!(found.len(), 2);
        assert_eq!(db.products().search("").await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_adjust_stock() {
        let db = fixtures::database().await;
        let product = fixtures::product(&db, "Plâtre", 3, 500, 700).await;

        let after = db.products().adjust_stock(&product.id, 7).await.unwrap();
        assert_eq!(after.quantity, 10);

        let err = db.products().adjust_stock(&product.id, -11).await.unwrap_err();
        assert!(matches!(err, DbError::Domain(CoreError::NegativeStock { .. })));
        assert_eq!(fixtures::stock_of(&db, &product.id).await, 10);

        assert!(db
            .products()
            .adjust_stock("missing", 1)
            .await
            .unwrap_err()
            .is_not_found());
    }

    #[tokio::test]
    async fn test_check_availability() {
        let db = fixtures::database().await;
        let product = fixtures::product(&db, "Chaux", 3, 500, 700).await;

        let ok = db.products().check_availability(&product.id, 3).await.unwrap();
        assert!(ok.sufficient);
        let short = db.products().check_availability(&product.id, 4).await.unwrap();
        assert!(!short.sufficient);
        assert_eq!(short.available, 3);
    }

    #[tokio::test]
    async fn test_delete_unreferenced_product() {
        let db = fixtures::database().await;
        let product = fixtures::product(&db, "Treillis soudé", 3, 500, 700).await;

        db.products().delete(&product.id).await.unwrap();
        assert!(db.products().find(&product.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_delete_product_with_history_conflicts() {
        let db = fixtures::database().await;
        let sold = fixtures::product(&db, "Fer à béton 12", 40, 1_200, 1_600).await;
        let bought = fixtures::product(&db, "Fil recuit", 0, 300, 450).await;
        let client = fixtures::client(&db, "Entreprise Saidi").await;
        let supplier = fixtures::supplier(&db, "Sider El Hadjar").await;

        db.sales()
            .create(&SaleDraft {
                client_id: client.id.clone(),
                lines: vec![SaleLineRequest {
                    product_id: sold.id.clone(),
                    quantity: 5,
                }],
                ..SaleDraft::default()
            })
            .await
            .unwrap();
        db.purchases()
            .create(&PurchaseDraft {
                supplier_id: supplier.id.clone(),
                lines: vec![PurchaseLineRequest {
                    product_id: bought.id.clone(),
                    quantity: 10,
                    unit_price_cents: 300,
                }],
                ..PurchaseDraft::default()
            })
            .await
            .unwrap();

        for id in [&sold.id, &bought.id] {
            let err = db.products().delete(id).await.unwrap_err();
            assert!(matches!(err, DbError::HasDependents { .. }), "{err:?}");
            assert!(db.products().find(id).await.unwrap().is_some());
        }
        assert_eq!(fixtures::stock_of(&db, &sold.id).await, 35);
        assert_eq!(fixtures::stock_of(&db, &bought.id).await, 10);
    }

    #[tokio::test]
    async fn test_catalog_rows_include_category_name() {
        let db = fixtures::database().await;
        let wood = db.categories().search("Bois").await.unwrap().remove(0);
        db.products()
            .create(&ProductInput {
                name: "Chevron 6x8".to_string(),
                category_id: Some(wood.id),
                purchase_price_cents: 45_000,
                sale_price_cents: 60_000,
                quantity: 40,
                ..Default::default()
            })
            .await
            .unwrap();
        fixtures::product(&db, "Agglo", 1, 1, 2).await;

        let rows = db.products().catalog().await.unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].name, "Agglo");
        assert_eq!(rows[0].category_name, None);
        assert_eq!(rows[1].category_name.as_deref(), Some("Bois"));
    }
}
