use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::categories::models::{
    CategoryListRow, CategoryPatch, CategoryRow, CATEGORY_COLUMNS,
};
use crate::proto::{Category, CategoryPk, CreateCategory, UpdateCategory};
use crate::shared::query::{list_query, patch_query, NamedQuery};
use crate::shared::types::{ListParams, Page};

/// Storage operations for categories
#[async_trait]
pub trait CategoryRepository: Send + Sync {
    /// Insert a category under a freshly generated id and return that id.
    async fn create(&self, req: &CreateCategory) -> Result<CategoryPk>;

    async fn get_by_id(&self, pk: &CategoryPk) -> Result<Category>;

    async fn get_list(&self, params: &ListParams) -> Result<Page<Category>>;

    /// Overwrite every column. Returns the number of rows affected.
    async fn update(&self, req: &UpdateCategory) -> Result<u64>;

    /// Overwrite only the columns present in `patch`. Returns the number of
    /// rows affected.
    async fn update_patch(&self, id: &str, patch: CategoryPatch) -> Result<u64>;

    async fn delete(&self, pk: &CategoryPk) -> Result<()>;
}

/// PostgreSQL-backed category repository
pub struct PgCategoryRepository {
    pool: PgPool,
}

impl PgCategoryRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CategoryRepository for PgCategoryRepository {
    async fn create(&self, req: &CreateCategory) -> Result<CategoryPk> {
        let id = Uuid::new_v4().to_string();

        sqlx::query(
            r#"
            INSERT INTO "category" (
                id,
                name,
                parent,
                created_at,
                updated_at
            ) VALUES ($1, $2, $3, NOW(), NOW())
            "#,
        )
        .bind(&id)
        .bind(&req.name)
        .bind(&req.parent)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to insert category: {:?}", e);
            AppError::Database(e)
        })?;

        tracing::info!("Category created: id={}", id);

        Ok(CategoryPk { id })
    }

    async fn get_by_id(&self, pk: &CategoryPk) -> Result<Category> {
        let sql = format!(r#"SELECT {} FROM "category" WHERE id = $1"#, CATEGORY_COLUMNS);

        let category = sqlx::query_as::<_, CategoryRow>(&sql)
            .bind(&pk.id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to get category by id: {:?}", e);
                AppError::Database(e)
            })?;

        category
            .map(Category::from)
            .ok_or_else(|| AppError::NotFound(format!("Category '{}' not found", pk.id)))
    }

    async fn get_list(&self, params: &ListParams) -> Result<Page<Category>> {
        let (sql, args) = list_query("category", CATEGORY_COLUMNS, params)?.into_parts()?;

        let rows = sqlx::query_as_with::<_, CategoryListRow, _>(&sql, args)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to list categories: {:?}", e);
                AppError::Database(e)
            })?;

        let total = rows.first().map(|r| r.total_count).unwrap_or(0);

        Ok(Page {
            items: rows.into_iter().map(|r| r.category.into()).collect(),
            total,
        })
    }

    async fn update(&self, req: &UpdateCategory) -> Result<u64> {
        let (sql, args) = NamedQuery::new()
            .bind("id", req.id.as_str())
            .bind("name", req.name.as_str())
            .bind("parent", req.parent.as_str())
            .compile(
                r#"
                UPDATE "category"
                SET
                    name = :name,
                    parent = :parent,
                    updated_at = NOW()
                WHERE id = :id
                "#,
            )?
            .into_parts()?;

        let result = sqlx::query_with(&sql, args)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to update category: {:?}", e);
                AppError::Database(e)
            })?;

        Ok(result.rows_affected())
    }

    async fn update_patch(&self, id: &str, patch: CategoryPatch) -> Result<u64> {
        let (sql, args) = patch_query("category", id, patch.into_fields())?.into_parts()?;

        let result = sqlx::query_with(&sql, args)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to patch category: {:?}", e);
                AppError::Database(e)
            })?;

        Ok(result.rows_affected())
    }

    async fn delete(&self, pk: &CategoryPk) -> Result<()> {
        sqlx::query(r#"DELETE FROM "category" WHERE id = $1"#)
            .bind(&pk.id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to delete category: {:?}", e);
                AppError::Database(e)
            })?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_request(name: &str) -> CreateCategory {
        CreateCategory {
            name: name.to_string(),
            parent: String::new(),
        }
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "requires DATABASE_URL"]
    async fn test_create_then_get_by_id(pool: PgPool) {
        let repo = PgCategoryRepository::new(pool);

        let pk = repo.create(&create_request("Shoes")).await.unwrap();
        assert!(!pk.id.is_empty());

        let category = repo.get_by_id(&pk).await.unwrap();
        assert_eq!(category.id, pk.id);
        assert_eq!(category.name, "Shoes");
        assert_eq!(category.created_at, category.updated_at);
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "requires DATABASE_URL"]
    async fn test_get_list_pages_with_window_count(pool: PgPool) {
        let repo = PgCategoryRepository::new(pool);
        for i in 0..5 {
            repo.create(&create_request(&format!("Category {}", i)))
                .await
                .unwrap();
        }

        let first = repo.get_list(&ListParams::new("", 2, 0)).await.unwrap();
        assert_eq!(first.items.len(), 2);
        assert_eq!(first.total, 5);

        let second = repo.get_list(&ListParams::new("", 2, 2)).await.unwrap();
        assert_eq!(second.items.len(), 2);
        assert_eq!(second.total, 5);

        let rest = repo.get_list(&ListParams::new("", 2, 4)).await.unwrap();
        assert_eq!(rest.items.len(), 1);
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "requires DATABASE_URL"]
    async fn test_get_list_search_is_literal_and_case_insensitive(pool: PgPool) {
        let repo = PgCategoryRepository::new(pool);
        repo.create(&create_request("Running Shoes")).await.unwrap();
        repo.create(&create_request("Hats")).await.unwrap();

        let found = repo.get_list(&ListParams::new("shoe", 0, 0)).await.unwrap();
        assert_eq!(found.total, 1);
        assert_eq!(found.items[0].name, "Running Shoes");

        let wildcard = repo.get_list(&ListParams::new("%", 0, 0)).await.unwrap();
        assert_eq!(wildcard.total, 0);

        let injected = repo
            .get_list(&ListParams::new("' OR '1'='1", 0, 0))
            .await
            .unwrap();
        assert_eq!(injected.total, 0);
        assert!(injected.items.is_empty());
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "requires DATABASE_URL"]
    async fn test_update_and_patch(pool: PgPool) {
        let repo = PgCategoryRepository::new(pool);
        let pk = repo.create(&create_request("Shoes")).await.unwrap();

        let affected = repo
            .update(&UpdateCategory {
                id: pk.id.clone(),
                name: "Boots".to_string(),
                parent: "root".to_string(),
            })
            .await
            .unwrap();
        assert_eq!(affected, 1);

        let patch = CategoryPatch {
            name: Some("Sandals".to_string()),
            parent: None,
        };
        assert_eq!(repo.update_patch(&pk.id, patch).await.unwrap(), 1);

        let category = repo.get_by_id(&pk).await.unwrap();
        assert_eq!(category.name, "Sandals");
        assert_eq!(category.parent, "root");

        let missing = repo
            .update(&UpdateCategory {
                id: "missing".to_string(),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(missing, 0);
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "requires DATABASE_URL"]
    async fn test_delete_is_idempotent(pool: PgPool) {
        let repo = PgCategoryRepository::new(pool);
        let pk = repo.create(&create_request("Shoes")).await.unwrap();

        repo.delete(&pk).await.unwrap();
        repo.delete(&pk).await.unwrap();

        let err = repo.get_by_id(&pk).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }
}
