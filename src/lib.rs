//! tagallery - REST backend for browsing, paginating and tagging photographs.
//!
//! New photos land in an unprocessed folder and are listed straight from
//! disk. Once tagged they move to a processed folder and their category
//! assignments are kept in an embedded SQLite database.

pub mod cli;
pub mod config;
pub mod error;
pub mod models;
pub mod repository;
pub mod schema;
pub mod server;
pub mod services;
pub mod storage;

pub use error::{GalleryError, Result};
