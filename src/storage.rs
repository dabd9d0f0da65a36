//! Storage helpers for image files on disk.
//!
//! Image paths stored in the database and returned by the API are relative
//! to the library root: `{unprocessed_folder}/{name}` for new files and
//! `{processed_folder}/{name}` once an image has been upserted.

use std::io;
use std::path::{Path, PathBuf};

use crate::error::{GalleryError, Result};

/// Image root directory and its two working folders.
#[derive(Debug, Clone)]
pub struct ImageLibrary {
    root: PathBuf,
    processed_folder: String,
    unprocessed_folder: String,
}

impl ImageLibrary {
    pub fn new(
        root: impl Into<PathBuf>,
        processed_folder: impl Into<String>,
        unprocessed_folder: impl Into<String>,
    ) -> Self {
        Self {
            root: root.into(),
            processed_folder: processed_folder.into(),
            unprocessed_folder: unprocessed_folder.into(),
        }
    }

    pub fn unprocessed_folder(&self) -> &str {
        &self.unprocessed_folder
    }

    pub fn processed_dir(&self) -> PathBuf {
        self.root.join(&self.processed_folder)
    }

    pub fn unprocessed_dir(&self) -> PathBuf {
        self.root.join(&self.unprocessed_folder)
    }

    /// Create both working folders if missing.
    pub fn ensure_directories(&self) -> io::Result<()> {
        std::fs::create_dir_all(self.processed_dir())?;
        std::fs::create_dir_all(self.unprocessed_dir())
    }

    /// Move a file from the library into the processed folder.
    ///
    /// `file` is relative to the root. Returns the new relative path. Fails
    /// with [`GalleryError::FileExists`] without touching anything if the
    /// processed folder already holds a file with the same name, including
    /// one created concurrently.
    pub fn move_to_processed(&self, file: &str) -> Result<String> {
        let file_name = Path::new(file)
            .file_name()
            .ok_or_else(|| GalleryError::InvalidRequest(format!("not a file path: {}", file)))?;

        let processed_dir = self.processed_dir();
        std::fs::create_dir_all(&processed_dir)?;

        let destination = processed_dir.join(file_name);
        let relative = Path::new(&self.processed_folder)
            .join(file_name)
            .to_string_lossy()
            .into_owned();

        match move_no_clobber(&self.root.join(file), &destination) {
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
                return Err(GalleryError::FileExists(relative));
            }
            result => result?,
        }
        tracing::debug!(from = file, to = %relative, "Moved image to processed folder");

        Ok(relative)
    }

    /// Undo [`ImageLibrary::move_to_processed`].
    pub fn restore(&self, moved: &str, original: &str) -> io::Result<()> {
        move_no_clobber(&self.root.join(moved), &self.root.join(original))
    }
}

/// Move `from` to `to`, failing with `AlreadyExists` if `to` exists.
/// Both paths must be on the same filesystem.
fn move_no_clobber(from: &Path, to: &Path) -> io::Result<()> {
    std::fs::hard_link(from, to)?;
    if let Err(e) = std::fs::remove_file(from) {
        let _ = std::fs::remove_file(to);
        return Err(e);
    }
    Ok(())
}
