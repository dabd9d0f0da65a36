//! Repository layer for database persistence.
//!
//! All database access uses Diesel ORM on an embedded SQLite database.

pub mod category;
pub mod context;
pub mod diesel_models;
pub mod image;
pub mod pool;
pub mod util;

pub use category::DieselCategoryRepository;
pub use context::DbContext;
pub use image::{DieselImageRepository, SqlFilter};
pub use pool::{DbError, SqlitePool};
