//! Data models for the gallery.

mod category;
mod filter;
mod image;

pub use category::Category;
pub use filter::{CategoryField, CategoryFilter, Clause, ImagePredicate, ImageStatus};
pub use image::{Image, DEFAULT_IMAGE_COUNT};
