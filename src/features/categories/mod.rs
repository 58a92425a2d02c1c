pub mod handlers;
pub mod models;
pub mod repositories;

pub use handlers::CategoryHandler;
pub use repositories::{CategoryRepository, PgCategoryRepository};
