mod category;

pub use category::{CategoryListRow, CategoryPatch, CategoryRow, CATEGORY_COLUMNS};
