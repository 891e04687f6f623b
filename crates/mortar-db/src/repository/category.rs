//! # Category Repository
//!
//! Product families. Names are unique; a category cannot be deleted while
//! any product is filed under it.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::{debug, info, warn};

use crate::error::{DbError, DbResult};
use crate::repository::{count_references, delete_conflict, generate_id};
use mortar_core::search::filter_matching;
use mortar_core::validation::{normalize_optional, validate_category, validate_search_query};
use mortar_core::{Category, CategoryInput};

const SELECT_CATEGORY: &str = r#"
    SELECT id, name, description, created_at, updated_at
    FROM categories
"#;

/// Repository for category database operations.
#[derive(Debug, Clone)]
pub struct CategoryRepository {
    pool: SqlitePool,
}

impl CategoryRepository {
    /// Creates a new CategoryRepository.
    pub fn new(pool: SqlitePool) -> Self {
        CategoryRepository { pool }
    }

    /// Lists every category ordered by name.
    pub async fn list(&self) -> DbResult<Vec<Category>> {
        let sql = format!("{} ORDER BY name", SELECT_CATEGORY);
        let categories = sqlx::query_as::<_, Category>(&sql)
            .fetch_all(&self.pool)
            .await?;
        Ok(categories)
    }

    /// Case-insensitive substring search on name and description.
    pub async fn search(&self, term: &str) -> DbResult<Vec<Category>> {
        let term = validate_search_query(term)?;
        Ok(filter_matching(self.list().await?, &term))
    }

    /// Gets a category by id, or `None`.
    pub async fn find(&self, id: &str) -> DbResult<Option<Category>> {
        let sql = format!("{} WHERE id = ?1", SELECT_CATEGORY);
        let category = sqlx::query_as::<_, Category>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(category)
    }

    /// Gets a category by id.
    ///
    /// ## Returns
    /// * `Err(DbError::NotFound)` - no such category
    pub async fn get(&self, id: &str) -> DbResult<Category> {
        self.find(id)
            .await?
            .ok_or_else(|| DbError::not_found("Category", id))
    }

    /// Creates a category.
    ///
    /// ## Returns
    /// * `Err(DbError::UniqueViolation)` - the name is taken
    pub async fn create(&self, input: &CategoryInput) -> DbResult<Category> {
        validate_category(input)?;

        let now = Utc::now();
        let category = Category {
            id: generate_id(),
            name: input.name.trim().to_string(),
            description: normalize_optional(input.description.as_deref()),
            created_at: now,
            updated_at: now,
        };

        debug!(name = %category.name, "Inserting category");

        sqlx::query(
            r#"
            INSERT INTO categories (id, name, description, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
        )
        .bind(&category.id)
        .bind(&category.name)
        .bind(&category.description)
        .bind(category.created_at)
        .bind(category.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| duplicate_name(e, &category.name))?;

        info!(id = %category.id, name = %category.name, "Category created");
        Ok(category)
    }

    /// Renames or re-describes a category.
    pub async fn update(&self, id: &str, input: &CategoryInput) -> DbResult<Category> {
        validate_category(input)?;

        let name = input.name.trim().to_string();
        let description = normalize_optional(input.description.as_deref());

        debug!(id = %id, "Updating category");

        let result = sqlx::query(
            r#"
            UPDATE categories
            SET name = ?2, description = ?3, updated_at = ?4
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .bind(&name)
        .bind(&description)
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(|e| duplicate_name(e, &name))?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Category", id));
        }

        self.get(id).await
    }

    /// Deletes a category that no product references.
    ///
    /// ## Returns
    /// * `Err(DbError::HasDependents)` - products are still filed under it
    /// * `Err(DbError::NotFound)` - no such category
    pub async fn delete(&self, id: &str) -> DbResult<()> {
        let mut conn = self.pool.acquire().await?;

        let products = count_references(&mut conn, "products", "category_id", id).await?;
        if products > 0 {
            warn!(id = %id, products, "Refusing to delete category with products");
            return Err(DbError::has_dependents(
                "Category",
                id,
                format!("{} product(s)", products),
            ));
        }

        let result = sqlx::query("DELETE FROM categories WHERE id = ?1")
            .bind(id)
            .execute(&mut *conn)
            .await
            .map_err(|e| delete_conflict("Category", id, e))?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Category", id));
        }

        info!(id = %id, "Category deleted");
        Ok(())
    }
}

fn duplicate_name(err: sqlx::Error, name: &str) -> DbError {
    match DbError::from(err) {
        DbError::UniqueViolation { .. } => DbError::duplicate("category name", name),
        other => other,
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
