use std::sync::Arc;

use tonic::{Request, Response, Status};

use crate::core::error::AppError;
use crate::features::categories::models::CategoryPatch;
use crate::modules::storage::Storage;
use crate::proto::category_service_server::CategoryService;
use crate::proto::{
    Category, CategoryPk, CreateCategory, Empty, GetListCategoryRequest, GetListCategoryResponse,
    UpdateCategory, UpdatePatchCategory,
};
use crate::shared::types::ListParams;

/// gRPC handler for `product_service.CategoryService`
pub struct CategoryHandler {
    storage: Arc<dyn Storage>,
}

impl CategoryHandler {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self { storage }
    }

    /// Re-read after a successful write. A miss here means the row vanished
    /// between the two statements, reported as `NotFound`.
    async fn reload(&self, id: String) -> Result<Category, Status> {
        self.storage
            .category()
            .get_by_id(&CategoryPk { id })
            .await
            .map_err(|e| {
                tracing::error!("Failed to reload category: {}", e);
                Status::not_found(e.client_message())
            })
    }
}

#[tonic::async_trait]
impl CategoryService for CategoryHandler {
    async fn create(
        &self,
        request: Request<CreateCategory>,
    ) -> Result<Response<Category>, Status> {
        let req = request.into_inner();
        tracing::info!(request = ?req, "CreateCategory");

        let pk = self.storage.category().create(&req).await.map_err(|e| {
            tracing::error!("Failed to create category: {}", e);
            Status::from(e)
        })?;

        let category = self.storage.category().get_by_id(&pk).await.map_err(|e| {
            tracing::error!("Failed to get created category: {}", e);
            Status::from(e)
        })?;

        Ok(Response::new(category))
    }

    async fn get_by_id(&self, request: Request<CategoryPk>) -> Result<Response<Category>, Status> {
        let pk = request.into_inner();
        tracing::info!(request = ?pk, "GetCategoryByID");

        let category = self.storage.category().get_by_id(&pk).await.map_err(|e| {
            tracing::error!("Failed to get category by id: {}", e);
            Status::from(e)
        })?;

        Ok(Response::new(category))
    }

    async fn get_list(
        &self,
        request: Request<GetListCategoryRequest>,
    ) -> Result<Response<GetListCategoryResponse>, Status> {
        let req = request.into_inner();
        tracing::info!(request = ?req, "GetCategoryList");

        let params = ListParams::new(&req.search, req.limit, req.offset);
        let page = self.storage.category().get_list(&params).await.map_err(|e| {
            tracing::error!("Failed to list categories: {}", e);
            Status::from(e)
        })?;

        Ok(Response::new(GetListCategoryResponse {
            count: page.total,
            categories: page.items,
        }))
    }

    async fn update(&self, request: Request<UpdateCategory>) -> Result<Response<Category>, Status> {
        let req = request.into_inner();
        tracing::info!(request = ?req, "UpdateCategory");

        let rows_affected = self.storage.category().update(&req).await.map_err(|e| {
            tracing::error!("Failed to update category: {}", e);
            Status::from(e)
        })?;

        if rows_affected == 0 {
            return Err(AppError::NoRowsAffected.into());
        }

        Ok(Response::new(self.reload(req.id).await?))
    }

    async fn update_patch(
        &self,
        request: Request<UpdatePatchCategory>,
    ) -> Result<Response<Category>, Status> {
        let req = request.into_inner();
        tracing::info!(request = ?req, "UpdatePatchCategory");

        let id = req.id.clone();
        let patch = CategoryPatch::from(req);
        if patch.is_empty() {
            return Err(AppError::EmptyPatch.into());
        }

        let rows_affected = self
            .storage
            .category()
            .update_patch(&id, patch)
            .await
            .map_err(|e| {
                tracing::error!("Failed to patch category: {}", e);
                Status::from(e)
            })?;

        if rows_affected == 0 {
            return Err(AppError::NoRowsAffected.into());
        }

        Ok(Response::new(self.reload(id).await?))
    }

    async fn delete(&self, request: Request<CategoryPk>) -> Result<Response<Empty>, Status> {
        let pk = request.into_inner();
        tracing::info!(request = ?pk, "DeleteCategory");

        self.storage.category().delete(&pk).await.map_err(|e| {
            tracing::error!("Failed to delete category: {}", e);
            Status::from(e)
        })?;

        Ok(Response::new(Empty {}))
    }
}
