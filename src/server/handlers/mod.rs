//! HTTP request handlers for the web server.

mod api;
mod categories;
mod images;

// Re-export handlers for use by the router
pub use api::health;
pub use categories::{delete_category, list_categories, upsert_category};
pub use images::{get_images, upsert_image};
