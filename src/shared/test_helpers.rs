//! In-memory `Storage` used by the handler tests.
//!
//! Mirrors the PostgreSQL repositories closely enough for handler semantics:
//! generated ids, `created_at DESC` ordering, case-insensitive substring
//! search, window-style counts, and affected-row counts.

use std::sync::atomic::{AtomicI64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{Duration, NaiveDate, NaiveDateTime};
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::categories::models::{CategoryPatch, CategoryRow};
use crate::features::categories::CategoryRepository;
use crate::features::products::models::{price_to_decimal, ProductPatch, ProductRow};
use crate::features::products::ProductRepository;
use crate::modules::storage::Storage;
use crate::proto::{
    Category, CategoryPk, CreateCategory, CreateProduct, Product, ProductPk, UpdateCategory,
    UpdateProduct,
};
use crate::shared::types::{ListParams, Page};

/// Deterministic clock plus a count of mutating calls
#[derive(Default)]
struct Ledger {
    ticks: AtomicI64,
    writes: AtomicUsize,
}

impl Ledger {
    /// Every call returns a strictly later timestamp.
    fn now(&self) -> NaiveDateTime {
        let tick = self.ticks.fetch_add(1, Ordering::SeqCst);
        NaiveDate::from_ymd_opt(2024, 1, 1)
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .unwrap_or_default()
            + Duration::seconds(tick)
    }

    fn record_write(&self) {
        self.writes.fetch_add(1, Ordering::SeqCst);
    }
}

pub struct InMemoryStorage {
    ledger: Arc<Ledger>,
    category: InMemoryCategories,
    product: InMemoryProducts,
}

impl Default for InMemoryStorage {
    fn default() -> Self {
        let ledger = Arc::new(Ledger::default());
        Self {
            category: InMemoryCategories {
                ledger: ledger.clone(),
                rows: Mutex::default(),
            },
            product: InMemoryProducts {
                ledger: ledger.clone(),
                rows: Mutex::default(),
            },
            ledger,
        }
    }
}

impl InMemoryStorage {
    /// Number of mutating repository calls so far
    pub fn writes(&self) -> usize {
        self.ledger.writes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Storage for InMemoryStorage {
    fn category(&self) -> &dyn CategoryRepository {
        &self.category
    }

    fn product(&self) -> &dyn ProductRepository {
        &self.product
    }

    async fn close(&self) {}
}

/// Newest first, filtered by name, counted before paging.
fn page<R: Clone, T: From<R>>(
    rows: &[R],
    params: &ListParams,
    name: impl Fn(&R) -> &str,
    created_at: impl Fn(&R) -> NaiveDateTime,
) -> Page<T> {
    let needle = params.search.as_deref().map(str::to_lowercase);
    let mut matching: Vec<&R> = rows
        .iter()
        .filter(|r| match &needle {
            Some(needle) => name(*r).to_lowercase().contains(needle),
            None => true,
        })
        .collect();
    matching.sort_by_key(|r| std::cmp::Reverse(created_at(*r)));

    let total = matching.len() as i64;
    let offset = params.offset.unwrap_or(0) as usize;
    let limit = params.limit.map(|l| l as usize).unwrap_or(usize::MAX);
    let items: Vec<T> = matching
        .into_iter()
        .skip(offset)
        .take(limit)
        .map(|r| T::from(r.clone()))
        .collect();

    // COUNT(*) OVER() yields nothing when the page itself is empty
    let total = if items.is_empty() { 0 } else { total };
    Page { items, total }
}

pub struct InMemoryCategories {
    ledger: Arc<Ledger>,
    rows: Mutex<Vec<CategoryRow>>,
}

#[async_trait]
impl CategoryRepository for InMemoryCategories {
    async fn create(&self, req: &CreateCategory) -> Result<CategoryPk> {
        self.ledger.record_write();
        let now = self.ledger.now();
        let id = Uuid::new_v4().to_string();
        self.rows.lock().unwrap().push(CategoryRow {
            id: id.clone(),
            name: req.name.clone(),
            parent: Some(req.parent.clone()),
            created_at: now,
            updated_at: now,
        });
        Ok(CategoryPk { id })
    }

    async fn get_by_id(&self, pk: &CategoryPk) -> Result<Category> {
        self.rows
            .lock()
            .unwrap()
            .iter()
            .find(|r| r.id == pk.id)
            .cloned()
            .map(Category::from)
            .ok_or_else(|| AppError::NotFound(format!("Category '{}' not found", pk.id)))
    }

    async fn get_list(&self, params: &ListParams) -> Result<Page<Category>> {
        let rows = self.rows.lock().unwrap();
        Ok(page(rows.as_slice(), params, |r| r.name.as_str(), |r| r.created_at))
    }

    async fn update(&self, req: &UpdateCategory) -> Result<u64> {
        self.ledger.record_write();
        let mut rows = self.rows.lock().unwrap();
        let Some(row) = rows.iter_mut().find(|r| r.id == req.id) else {
            return Ok(0);
        };
        row.name = req.name.clone();
        row.parent = Some(req.parent.clone());
        row.updated_at = self.ledger.now();
        Ok(1)
    }

    async fn update_patch(&self, id: &str, patch: CategoryPatch) -> Result<u64> {
        self.ledger.record_write();
        if patch.is_empty() {
            return Err(AppError::EmptyPatch);
        }
        let mut rows = self.rows.lock().unwrap();
        let Some(row) = rows.iter_mut().find(|r| r.id == id) else {
            return Ok(0);
        };
        if let Some(name) = patch.name {
            row.name = name;
        }
        if let Some(parent) = patch.parent {
            row.parent = Some(parent);
        }
        row.updated_at = self.ledger.now();
        Ok(1)
    }

    async fn delete(&self, pk: &CategoryPk) -> Result<()> {
        self.ledger.record_write();
        self.rows.lock().unwrap().retain(|r| r.id != pk.id);
        Ok(())
    }
}

pub struct InMemoryProducts {
    ledger: Arc<Ledger>,
    rows: Mutex<Vec<ProductRow>>,
}

#[async_trait]
impl ProductRepository for InMemoryProducts {
    async fn create(&self, req: &CreateProduct) -> Result<ProductPk> {
        let price = price_to_decimal(req.price)?;
        self.ledger.record_write();
        let now = self.ledger.now();
        let id = Uuid::new_v4().to_string();
        self.rows.lock().unwrap().push(ProductRow {
            id: id.clone(),
            photo: Some(req.photo.clone()),
            name: req.name.clone(),
            category_id: Some(req.category_id.clone()),
            barcode: Some(req.barcode.clone()),
            price: Some(price),
            created_at: now,
            updated_at: now,
        });
        Ok(ProductPk { id })
    }

    async fn get_by_id(&self, pk: &ProductPk) -> Result<Product> {
        self.rows
            .lock()
            .unwrap()
            .iter()
            .find(|r| r.id == pk.id)
            .cloned()
            .map(Product::from)
            .ok_or_else(|| AppError::NotFound(format!("Product '{}' not found", pk.id)))
    }

    async fn get_list(&self, params: &ListParams) -> Result<Page<Product>> {
        let rows = self.rows.lock().unwrap();
        Ok(page(rows.as_slice(), params, |r| r.name.as_str(), |r| r.created_at))
    }

    async fn update(&self, req: &UpdateProduct) -> Result<u64> {
        let price = price_to_decimal(req.price)?;
        self.ledger.record_write();
        let mut rows = self.rows.lock().unwrap();
        let Some(row) = rows.iter_mut().find(|r| r.id == req.id) else {
            return Ok(0);
        };
        row.photo = Some(req.photo.clone());
        row.name = req.name.clone();
        row.category_id = Some(req.category_id.clone());
        row.barcode = Some(req.barcode.clone());
        row.price = Some(price);
        row.updated_at = self.ledger.now();
        Ok(1)
    }

    async fn update_patch(&self, id: &str, patch: ProductPatch) -> Result<u64> {
        self.ledger.record_write();
        if patch.is_empty() {
            return Err(AppError::EmptyPatch);
        }
        let price = patch.price.map(price_to_decimal).transpose()?;
        let mut rows = self.rows.lock().unwrap();
        let Some(row) = rows.iter_mut().find(|r| r.id == id) else {
            return Ok(0);
        };
        if let Some(photo) = patch.photo {
            row.photo = Some(photo);
        }
        if let Some(name) = patch.name {
            row.name = name;
        }
        if let Some(category_id) = patch.category_id {
            row.category_id = Some(category_id);
        }
        if let Some(barcode) = patch.barcode {
            row.barcode = Some(barcode);
        }
        if price.is_some() {
            row.price = price;
        }
        row.updated_at = self.ledger.now();
        Ok(1)
    }

    async fn delete(&self, pk: &ProductPk) -> Result<()> {
        self.ledger.record_write();
        self.rows.lock().unwrap().retain(|r| r.id != pk.id);
        Ok(())
    }
}
