mod product_handler;

pub use product_handler::ProductHandler;
