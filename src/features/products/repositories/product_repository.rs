use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::products::models::{
    price_to_decimal, ProductListRow, ProductPatch, ProductRow, PRODUCT_COLUMNS,
};
use crate::proto::{CreateProduct, Product, ProductPk, UpdateProduct};
use crate::shared::query::{list_query, patch_query, NamedQuery};
use crate::shared::types::{ListParams, Page};

/// Storage operations for products
#[async_trait]
pub trait ProductRepository: Send + Sync {
    /// Insert a product under a freshly generated id and return that id.
    async fn create(&self, req: &CreateProduct) -> Result<ProductPk>;

    async fn get_by_id(&self, pk: &ProductPk) -> Result<Product>;

    async fn get_list(&self, params: &ListParams) -> Result<Page<Product>>;

    /// Overwrite every column. Returns the number of rows affected.
    async fn update(&self, req: &UpdateProduct) -> Result<u64>;

    /// Overwrite only the columns present in `patch`. Returns the number of
    /// rows affected.
    async fn update_patch(&self, id: &str, patch: ProductPatch) -> Result<u64>;

    async fn delete(&self, pk: &ProductPk) -> Result<()>;
}

/// PostgreSQL-backed product repository
pub struct PgProductRepository {
    pool: PgPool,
}

impl PgProductRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProductRepository for PgProductRepository {
    async fn create(&self, req: &CreateProduct) -> Result<ProductPk> {
        let id = Uuid::new_v4().to_string();
        let price = price_to_decimal(req.price)?;

        sqlx::query(
            r#"
            INSERT INTO "product" (
                id,
                photo,
                name,
                category_id,
                barcode,
                price,
                created_at,
                updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, NOW(), NOW())
            "#,
        )
        .bind(&id)
        .bind(&req.photo)
        .bind(&req.name)
        .bind(&req.category_id)
        .bind(&req.barcode)
        .bind(price)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to insert product: {:?}", e);
            AppError::Database(e)
        })?;

        tracing::info!("Product created: id={}, category_id={}", id, req.category_id);

        Ok(ProductPk { id })
    }

    async fn get_by_id(&self, pk: &ProductPk) -> Result<Product> {
        let sql = format!(r#"SELECT {} FROM "product" WHERE id = $1"#, PRODUCT_COLUMNS);

        sqlx::query_as::<_, ProductRow>(&sql)
            .bind(&pk.id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to get product by id: {:?}", e);
                AppError::Database(e)
            })?
            .map(Product::from)
            .ok_or_else(|| AppError::NotFound(format!("Product '{}' not found", pk.id)))
    }

    async fn get_list(&self, params: &ListParams) -> Result<Page<Product>> {
        let (sql, args) = list_query("product", PRODUCT_COLUMNS, params)?.into_parts()?;

        let rows = sqlx::query_as_with::<_, ProductListRow, _>(&sql, args)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to list products: {:?}", e);
                AppError::Database(e)
            })?;

        let total = rows.first().map(|r| r.total_count).unwrap_or(0);

        Ok(Page {
            items: rows.into_iter().map(|r| r.product.into()).collect(),
            total,
        })
    }

    async fn update(&self, req: &UpdateProduct) -> Result<u64> {
        let (sql, args) = NamedQuery::new()
            .bind("id", req.id.as_str())
            .bind("photo", req.photo.as_str())
            .bind("name", req.name.as_str())
            .bind("category_id", req.category_id.as_str())
            .bind("barcode", req.barcode.as_str())
            .bind("price", price_to_decimal(req.price)?)
            .compile(
                r#"
                UPDATE "product"
                SET
                    photo = :photo,
                    name = :name,
                    category_id = :category_id,
                    barcode = :barcode,
                    price = :price,
                    updated_at = NOW()
                WHERE id = :id
                "#,
            )?
            .into_parts()?;

        let result = sqlx::query_with(&sql, args)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to update product: {:?}", e);
                AppError::Database(e)
            })?;

        Ok(result.rows_affected())
    }

    async fn update_patch(&self, id: &str, patch: ProductPatch) -> Result<u64> {
        let (sql, args) = patch_query("product", id, patch.into_fields()?)?.into_parts()?;

        let result = sqlx::query_with(&sql, args)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to patch product: {:?}", e);
                AppError::Database(e)
            })?;

        Ok(result.rows_affected())
    }

    async fn delete(&self, pk: &ProductPk) -> Result<()> {
        sqlx::query(r#"DELETE FROM "product" WHERE id = $1"#)
            .bind(&pk.id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to delete product: {:?}", e);
                AppError::Database(e)
            })?;

        Ok(())
    }
}
