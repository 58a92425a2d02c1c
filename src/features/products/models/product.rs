use chrono::NaiveDateTime;
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::Decimal;
use sqlx::FromRow;

use crate::core::error::{AppError, Result};
use crate::proto;
use crate::shared::query::NamedQuery;

/// Column list shared by every product SELECT
pub const PRODUCT_COLUMNS: &str =
    "id, photo, name, category_id, barcode, price, created_at, updated_at";

/// Database model for product
#[derive(Debug, Clone, FromRow)]
pub struct ProductRow {
    pub id: String,
    pub photo: Option<String>,
    pub name: String,
    pub category_id: Option<String>,
    pub barcode: Option<String>,
    pub price: Option<Decimal>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Product row from a list query, carrying the window count
#[derive(Debug, Clone, FromRow)]
pub struct ProductListRow {
    pub total_count: i64,
    #[sqlx(flatten)]
    pub product: ProductRow,
}

impl From<ProductRow> for proto::Product {
    fn from(p: ProductRow) -> Self {
        Self {
            id: p.id,
            photo: p.photo.unwrap_or_default(),
            name: p.name,
            category_id: p.category_id.unwrap_or_default(),
            barcode: p.barcode.unwrap_or_default(),
            price: p.price.and_then(|d| d.to_f32()).unwrap_or_default(),
            created_at: p.created_at.to_string(),
            updated_at: p.updated_at.to_string(),
        }
    }
}

/// Convert a wire price into the `numeric` column value.
///
/// The conversion keeps only the digits an `f32` actually carries, so `9.99`
/// is stored as `9.99` rather than its binary expansion. Magnitudes beyond
/// `Decimal::MAX` (about 7.9e28) are rejected since they could not be read
/// back into a `Decimal` either.
pub fn price_to_decimal(price: f32) -> Result<Decimal> {
    if !price.is_finite() {
        return Err(AppError::Validation(format!(
            "price {} is not a finite number",
            price
        )));
    }

    Decimal::from_f32(price).ok_or_else(|| {
        AppError::Validation(format!(
            "price {} is out of range, the magnitude must not exceed {}",
            price,
            Decimal::MAX
        ))
    })
}

/// Columns an `UpdatePatch` call may touch. `None` leaves the column as is.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProductPatch {
    pub photo: Option<String>,
    pub name: Option<String>,
    pub category_id: Option<String>,
    pub barcode: Option<String>,
    pub price: Option<f32>,
}

impl ProductPatch {
    pub fn is_empty(&self) -> bool {
        self.photo.is_none()
            && self.name.is_none()
            && self.category_id.is_none()
            && self.barcode.is_none()
            && self.price.is_none()
    }

    /// Bind the present fields under their column names.
    pub fn into_fields(self) -> Result<NamedQuery> {
        let mut fields = NamedQuery::new();
        if let Some(photo) = self.photo {
            fields = fields.bind("photo", photo);
        }
        if let Some(name) = self.name {
            fields = fields.bind("name", name);
        }
        if let Some(category_id) = self.category_id {
            fields = fields.bind("category_id", category_id);
        }
        if let Some(barcode) = self.barcode {
            fields = fields.bind("barcode", barcode);
        }
        if let Some(price) = self.price {
            fields = fields.bind("price", price_to_decimal(price)?);
        }
        Ok(fields)
    }
}

impl From<proto::UpdatePatchProduct> for ProductPatch {
    fn from(req: proto::UpdatePatchProduct) -> Self {
        Self {
            photo: req.photo,
            name: req.name,
            category_id: req.category_id,
            barcode: req.barcode,
            price: req.price,
        }
    }
}
