//! # Category Commands

use serde::{Deserialize, Serialize};
use tracing::debug;
use ts_rs::TS;

use crate::error::ApiError;
use crate::state::DbState;
use mortar_core::{Category, CategoryInput};

/// Category as shown in lists and pickers.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct CategoryDto {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
}

impl From<Category> for CategoryDto {
    fn from(c: Category) -> Self {
        CategoryDto {
            id: c.id,
            name: c.name,
            description: c.description,
        }
    }
}

/// Category form as submitted by the UI.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct CategoryForm {
    pub name: String,
    pub description: Option<String>,
}

impl From<CategoryForm> for CategoryInput {
    fn from(form: CategoryForm) -> Self {
        CategoryInput {
            name: form.name,
            description: form.description,
        }
    }
}

/// All categories, ordered by name.
pub async fn list_categories(db: &DbState) -> Result<Vec<CategoryDto>, ApiError> {
    debug!("list_categories command");
    let categories = db.inner().categories().list().await?;
    Ok(categories.into_iter().map(CategoryDto::from).collect())
}

/// Categories whose name or description contains `query`.
pub async fn search_categories(db: &DbState, query: String) -> Result<Vec<CategoryDto>, ApiError> {
    debug!(query = %query, "search_categories command");
    let categories = db.inner().categories().search(&query).await?;
    Ok(categories.into_iter().map(CategoryDto::from).collect())
}

pub async fn get_category(db: &DbState, id: String) -> Result<CategoryDto, ApiError> {
    debug!(id = %id, "get_category command");
    let category = db.inner().categories().get(&id).await?;
    Ok(CategoryDto::from(category))
}

/// Creates a category. A name already in use is a `CONFLICT`.
pub async fn create_category(db: &DbState, form: CategoryForm) -> Result<CategoryDto, ApiError> {
    debug!(name = %form.name, "create_category command");
    let category = db.inner().categories().create(&form.into()).await?;
    Ok(CategoryDto::from(category))
}

pub async fn update_category(
    db: &DbState,
    id: String,
    form: CategoryForm,
) -> Result<CategoryDto, ApiError> {
    debug!(id = %id, "update_category command");
    let category = db.inner().categories().update(&id, &form.into()).await?;
    Ok(CategoryDto::from(category))
}

/// Deletes a category. Refused while products are filed under it.
pub async fn delete_category(db: &DbState, id: String) -> Result<(), ApiError> {
    debug!(id = %id, "delete_category command");
    db.inner().categories().delete(&id).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::test_support::context;
    use crate::error::{ErrorCode, Feedback};

    #[tokio::test]
    async fn test_category_lifecycle() {
        let ctx = context().await;

        let created = create_category(
            &ctx.db,
            CategoryForm {
                name: "Carrelage".into(),
                description: Some("Faïence et grès".into()),
            },
        )
        .await
        .unwrap();

        let found = search_categories(&ctx.db, "carrel".into()).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, created.id);

        let renamed = update_category(
            &ctx.db,
            created.id.clone(),
            CategoryForm {
                name: "Carrelage & faïence".into(),
                description: None,
            },
        )
        .await
        .unwrap();
        assert_eq!(renamed.name, "Carrelage & faïence");

        delete_category(&ctx.db, created.id.clone()).await.unwrap();
        let err = get_category(&ctx.db, created.id).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);
    }

    #[tokio::test]
    async fn test_duplicate_name_feedback() {
        let ctx = context().await;

        let result = create_category(
            &ctx.db,
            CategoryForm {
                name: "Ciment".into(),
                description: None,
            },
        )
        .await;

        let feedback = Feedback::from_result(&result, "Catégorie ajoutée");
        assert!(!feedback.success);
        assert_eq!(result.unwrap_err().code, ErrorCode::Conflict);
    }

    #[tokio::test]
    async fn test_blank_name_rejected() {
        let ctx = context().await;
        let err = create_category(&ctx.db, CategoryForm::default())
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
    }
}
