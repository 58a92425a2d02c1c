//! Storage module for the product catalogue
//!
//! `Store` owns the PostgreSQL pool and one repository per entity. Handlers
//! reach the repositories through the `Storage` trait.

mod store;

pub use store::{Storage, Store};
