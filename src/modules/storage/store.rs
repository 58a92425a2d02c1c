use async_trait::async_trait;
use sqlx::PgPool;

use crate::features::categories::{CategoryRepository, PgCategoryRepository};
use crate::features::products::{PgProductRepository, ProductRepository};

/// Entry point to every repository
#[async_trait]
pub trait Storage: Send + Sync {
    fn category(&self) -> &dyn CategoryRepository;

    fn product(&self) -> &dyn ProductRepository;

    /// Release the underlying connections. Calls made afterwards fail.
    async fn close(&self);
}

/// PostgreSQL storage, repositories are built once at startup
pub struct Store {
    pool: PgPool,
    category: PgCategoryRepository,
    product: PgProductRepository,
}

impl Store {
    pub fn new(pool: PgPool) -> Self {
        Self {
            category: PgCategoryRepository::new(pool.clone()),
            product: PgProductRepository::new(pool.clone()),
            pool,
        }
    }
}

#[async_trait]
impl Storage for Store {
    fn category(&self) -> &dyn CategoryRepository {
        &self.category
    }

    fn product(&self) -> &dyn ProductRepository {
        &self.product
    }

    async fn close(&self) {
        self.pool.close().await;
        tracing::info!("Database connection pool closed");
    }
}
