use std::sync::Arc;

use tonic::{Request, Response, Status};

use crate::core::error::AppError;
use crate::features::products::models::ProductPatch;
use crate::modules::storage::Storage;
use crate::proto::product_service_server::ProductService;
use crate::proto::{
    CreateProduct, Empty, GetListProductRequest, GetListProductResponse, Product, ProductPk,
    UpdatePatchProduct, UpdateProduct,
};
use crate::shared::types::ListParams;

/// gRPC handler for `product_service.ProductService`
pub struct ProductHandler {
    storage: Arc<dyn Storage>,
}

impl ProductHandler {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self { storage }
    }

    async fn reload(&self, id: String) -> Result<Product, Status> {
        self.storage
            .product()
            .get_by_id(&ProductPk { id })
            .await
            .map_err(|e| {
                tracing::error!("Failed to reload product: {}", e);
                Status::not_found(e.client_message())
            })
    }
}

#[tonic::async_trait]
impl ProductService for ProductHandler {
    async fn create(&self, request: Request<CreateProduct>) -> Result<Response<Product>, Status> {
        let req = request.into_inner();
        tracing::info!(request = ?req, "CreateProduct");

        let pk = self.storage.product().create(&req).await.map_err(|e| {
            tracing::error!("Failed to create product: {}", e);
            Status::from(e)
        })?;

        let product = self.storage.product().get_by_id(&pk).await.map_err(|e| {
            tracing::error!("Failed to get created product: {}", e);
            Status::from(e)
        })?;

        Ok(Response::new(product))
    }

    async fn get_by_id(&self, request: Request<ProductPk>) -> Result<Response<Product>, Status> {
        let pk = request.into_inner();
        tracing::info!(request = ?pk, "GetProductByID");

        let product = self.storage.product().get_by_id(&pk).await.map_err(|e| {
            tracing::error!("Failed to get product by id: {}", e);
            Status::from(e)
        })?;

        Ok(Response::new(product))
    }

    async fn get_list(
        &self,
        request: Request<GetListProductRequest>,
    ) -> Result<Response<GetListProductResponse>, Status> {
        let req = request.into_inner();
        tracing::info!(request = ?req, "GetProductList");

        let params = ListParams::new(&req.search, req.limit, req.offset);
        let page = self.storage.product().get_list(&params).await.map_err(|e| {
            tracing::error!("Failed to list products: {}", e);
            Status::from(e)
        })?;

        Ok(Response::new(GetListProductResponse {
            count: page.total,
            products: page.items,
        }))
    }

    async fn update(&self, request: Request<UpdateProduct>) -> Result<Response<Product>, Status> {
        let req = request.into_inner();
        tracing::info!(request = ?req, "UpdateProduct");

        let rows_affected = self.storage.product().update(&req).await.map_err(|e| {
            tracing::error!("Failed to update product: {}", e);
            Status::from(e)
        })?;

        if rows_affected == 0 {
            return Err(AppError::NoRowsAffected.into());
        }

        Ok(Response::new(self.reload(req.id).await?))
    }

    async fn update_patch(
        &self,
        request: Request<UpdatePatchProduct>,
    ) -> Result<Response<Product>, Status> {
        let req = request.into_inner();
        tracing::info!(request = ?req, "UpdatePatchProduct");

        let id = req.id.clone();
        let patch = ProductPatch::from(req);
        if patch.is_empty() {
            return Err(AppError::EmptyPatch.into());
        }

        let rows_affected = self
            .storage
            .product()
            .update_patch(&id, patch)
            .await
            .map_err(|e| {
                tracing::error!("Failed to patch product: {}", e);
                Status::from(e)
            })?;

        if rows_affected == 0 {
            return Err(AppError::NoRowsAffected.into());
        }

        Ok(Response::new(self.reload(id).await?))
    }

    async fn delete(&self, request: Request<ProductPk>) -> Result<Response<Empty>, Status> {
        let pk = request.into_inner();
        tracing::info!(request = ?pk, "DeleteProduct");

        self.storage.product().delete(&pk).await.map_err(|e| {
            tracing::error!("Failed to delete product: {}", e);
            Status::from(e)
        })?;

        Ok(Response::new(Empty {}))
    }
}
