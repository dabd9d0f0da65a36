//! Service layer for tagallery business logic.
//!
//! [`Gallery`] is built once at startup and shared by every request. It
//! owns the store handles, the image library paths and the per-operation
//! database timeout, and carries the image and category operations.

pub mod categories;
pub mod images;
pub mod unprocessed;

use std::future::Future;
use std::time::Duration;

use crate::config::Settings;
use crate::error::{GalleryError, Result};
use crate::repository::{DbContext, DbError, DieselCategoryRepository, DieselImageRepository};
use crate::storage::ImageLibrary;

pub use images::ImageQuery;
pub use unprocessed::{list_unprocessed, UnprocessedWalk};

/// Application context for the gallery operations.
#[derive(Clone)]
pub struct Gallery {
    db: DbContext,
    images: DieselImageRepository,
    categories: DieselCategoryRepository,
    library: ImageLibrary,
    timeout: Duration,
}

impl Gallery {
    pub fn new(db: DbContext, library: ImageLibrary, timeout: Duration) -> Self {
        Self {
            images: db.images(),
            categories: db.categories(),
            db,
            library,
            timeout,
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(
            settings.create_db_context(),
            settings.image_library(),
            settings.db_timeout,
        )
    }

    pub fn db(&self) -> &DbContext {
        &self.db
    }

    pub fn library(&self) -> &ImageLibrary {
        &self.library
    }

    /// Run a store operation, failing with [`GalleryError::Timeout`] if it
    /// does not finish in time.
    async fn with_timeout<T, F>(&self, operation: F) -> Result<T>
    where
        F: Future<Output = std::result::Result<T, DbError>>,
    {
        match tokio::time::timeout(self.timeout, operation).await {
            Ok(result) => result.map_err(GalleryError::from),
            Err(_) => Err(GalleryError::Timeout(self.timeout)),
        }
    }
}
