//! Image listing and upsert.

use std::path::{Component, Path};

use super::unprocessed::list_unprocessed;
use super::Gallery;
use crate::error::{GalleryError, Result};
use crate::models::{Image, ImagePredicate, ImageStatus, DEFAULT_IMAGE_COUNT};
use crate::storage::ImageLibrary;

/// Parameters of an image listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageQuery {
    pub status: ImageStatus,
    pub count: usize,
    pub categories: Vec<String>,
    pub last_image: Option<String>,
    pub starred: Option<String>,
}

impl Default for ImageQuery {
    fn default() -> Self {
        Self {
            status: ImageStatus::Categorized,
            count: DEFAULT_IMAGE_COUNT,
            categories: Vec::new(),
            last_image: None,
            starred: None,
        }
    }
}

impl ImageQuery {
    pub fn new(status: ImageStatus) -> Self {
        Self {
            status,
            ..Default::default()
        }
    }
}

fn join_error(e: tokio::task::JoinError) -> GalleryError {
    GalleryError::Io(std::io::Error::other(e))
}

/// Reject paths that could point outside the image root.
fn validate_file(file: &str) -> Result<()> {
    let path = Path::new(file);
    let escapes = path
        .components()
        .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));

    if file.trim().is_empty() || escapes || path.file_name().is_none() {
        return Err(GalleryError::InvalidRequest(format!(
            "invalid image file: '{}'",
            file
        )));
    }
    Ok(())
}

impl Gallery {
    /// List one page of images for `query.status`.
    ///
    /// `unprocessed` reads the unprocessed folder; every other status is
    /// served from the store.
    pub async fn get_images(&self, query: &ImageQuery) -> Result<Vec<Image>> {
        let predicate = ImagePredicate::for_status(
            query.status,
            &query.categories,
            query.starred.as_deref(),
        );

        match predicate {
            None => self.unprocessed_images(query).await,
            Some(predicate) => {
                self.with_timeout(self.images.list(
                    &predicate,
                    query.last_image.as_deref(),
                    query.count,
                ))
                .await
            }
        }
    }

    async fn unprocessed_images(&self, query: &ImageQuery) -> Result<Vec<Image>> {
        let dir = self.library.unprocessed_dir();
        let folder = self.library.unprocessed_folder().to_string();
        let last_image = query.last_image.clone();
        let count = query.count;

        tokio::task::spawn_blocking(move || {
            list_unprocessed(&dir, &folder, last_image.as_deref(), Some(count))
        })
        .await
        .map_err(join_error)?
    }

    /// Insert or replace an image, keyed by its file.
    ///
    /// An image still in the unprocessed folder is first moved to the
    /// processed folder and its `file` rewritten. If the store write then
    /// fails the move is undone. Returns the record as stored.
    ///
    /// The write keeps running after a timeout. The move is only undone
    /// once the write is known to have failed, so the file always ends up
    /// where the store says it is.
    pub async fn upsert_image(&self, mut image: Image) -> Result<Image> {
        validate_file(&image.file)?;
        image.normalize();

        let original = image.file.clone();
        let moved = image.is_in_folder(self.library.unprocessed_folder());

        if moved {
            let library = self.library.clone();
            let file = original.clone();
            image.file = tokio::task::spawn_blocking(move || library.move_to_processed(&file))
                .await
                .map_err(join_error)??;
        }

        let repo = self.images.clone();
        let record = image.clone();
        let mut write = tokio::spawn(async move { repo.upsert(&record).await });

        let result = match tokio::time::timeout(self.timeout, &mut write).await {
            Ok(joined) => joined
                .map_err(join_error)
                .and_then(|r| r.map_err(GalleryError::from)),
            Err(_) => {
                if moved {
                    let library = self.library.clone();
                    let file = image.file.clone();
                    tokio::spawn(async move {
                        if !matches!(write.await, Ok(Ok(()))) {
                            restore_move(&library, &file, &original);
                        }
                    });
                }
                tracing::warn!(file = %image.file, "Image write still pending after timeout");
                return Err(GalleryError::Timeout(self.timeout));
            }
        };

        if let Err(e) = result {
            if moved {
                restore_move(&self.library, &image.file, &original);
            }
            return Err(e);
        }

        tracing::debug!(file = %image.file, moved, "Upserted image");
        Ok(image)
    }
}

fn restore_move(library: &ImageLibrary, moved: &str, original: &str) {
    if let Err(e) = library.restore(moved, original) {
        tracing::error!(
            file = moved,
            original = original,
            error = %e,
            "Failed to move image back after store error"
        );
    }
}
