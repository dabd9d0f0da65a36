//! Error types shared by the gallery core.

use std::time::Duration;

use thiserror::Error;

/// Errors returned by the pager, repositories and gallery services.
#[derive(Debug, Error)]
pub enum GalleryError {
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Invalid category id: {0}")]
    InvalidCategoryId(String),

    #[error("Category not found: {0}")]
    CategoryNotFound(String),

    #[error("A category named '{0}' already exists")]
    DuplicateCategoryName(String),

    #[error("File already exists: {0}")]
    FileExists(String),

    #[error("Database operation timed out after {0:?}")]
    Timeout(Duration),

    #[error("Database error: {0}")]
    Database(#[from] diesel::result::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl GalleryError {
    /// Whether the caller caused the error (as opposed to the server).
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidRequest(_)
                | Self::InvalidCategoryId(_)
                | Self::CategoryNotFound(_)
                | Self::DuplicateCategoryName(_)
                | Self::FileExists(_)
        )
    }
}

impl From<walkdir::Error> for GalleryError {
    fn from(e: walkdir::Error) -> Self {
        Self::Io(e.into())
    }
}

pub type Result<T> = std::result::Result<T, GalleryError>;
