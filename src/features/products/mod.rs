pub mod handlers;
pub mod models;
pub mod repositories;

pub use handlers::ProductHandler;
pub use repositories::{PgProductRepository, ProductRepository};
