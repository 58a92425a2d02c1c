mod product;

pub use product::{price_to_decimal, ProductListRow, ProductPatch, ProductRow, PRODUCT_COLUMNS};
