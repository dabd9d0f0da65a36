//! Paging over the unprocessed image folder.
//!
//! The folder is flat: only files directly inside it are listed, in byte
//! order of their names. A cursor names the last file the client saw; the
//! page starts right after it. A cursor that never matches yields an empty
//! page.

use std::path::Path;

use walkdir::WalkDir;

use crate::error::Result;
use crate::models::Image;

/// Lazily yields the file names directly inside a directory, sorted.
///
/// Subdirectories are skipped without being descended into. Errors on a
/// single entry are logged and skipped; a failure to read the directory
/// itself is returned once and ends the walk.
pub struct UnprocessedWalk {
    entries: walkdir::IntoIter,
    done: bool,
}

impl UnprocessedWalk {
    pub fn new(dir: &Path) -> Self {
        Self {
            entries: WalkDir::new(dir)
                .min_depth(1)
                .max_depth(1)
                .sort_by_file_name()
                .into_iter(),
            done: false,
        }
    }

    /// Skip everything up to and including `cursor`.
    ///
    /// Only the file name part of `cursor` is compared, so both `a.jpg` and
    /// `unprocessed/a.jpg` resume after `a.jpg`.
    pub fn after(self, cursor: &str) -> impl Iterator<Item = Result<String>> {
        let cursor = Path::new(cursor)
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        let mut found = false;
        self.filter(move |item| match item {
            Err(_) => true,
            Ok(_) if found => true,
            Ok(name) => {
                found = *name == cursor;
                false
            }
        })
    }
}

impl Iterator for UnprocessedWalk {
    type Item = Result<String>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        loop {
            match self.entries.next()? {
                Ok(entry) if entry.file_type().is_dir() => continue,
                Ok(entry) => return Some(Ok(entry.file_name().to_string_lossy().into_owned())),
                Err(e) if e.depth() == 0 => {
                    self.done = true;
                    return Some(Err(e.into()));
                }
                Err(e) => {
                    tracing::warn!(
                        path = ?e.path(),
                        error = %e,
                        "Skipping unreadable entry in unprocessed folder"
                    );
                }
            }
        }
    }
}

/// List one page of the unprocessed folder.
///
/// `folder` is the folder name used as the path prefix of the returned
/// images. `count` of `None` or `Some(0)` means no limit. The directory is
/// created if it does not exist.
pub fn list_unprocessed(
    dir: &Path,
    folder: &str,
    last_image: Option<&str>,
    count: Option<usize>,
) -> Result<Vec<Image>> {
    if !dir.try_exists()? {
        tracing::info!(dir = %dir.display(), "Creating missing unprocessed folder");
        std::fs::create_dir_all(dir)?;
        return Ok(Vec::new());
    }

    let walk = UnprocessedWalk::new(dir);
    let names: Box<dyn Iterator<Item = Result<String>>> = match last_image.filter(|s| !s.is_empty()) {
        Some(cursor) => Box::new(walk.after(cursor)),
        None => Box::new(walk),
    };

    let limit = count.filter(|&n| n > 0).unwrap_or(usize::MAX);

    names
        .take(limit)
        .map(|name| name.map(|name| Image::unprocessed(folder, &name)))
        .collect()
}
