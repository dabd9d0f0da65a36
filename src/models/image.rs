//! Image models for the photo gallery.
//!
//! An image is identified by its `file` path relative to the image root
//! (`processed/abc.jpg`, `unprocessed/abc.jpg`). Category assignments are
//! plain category names, not ids.

use std::path::Path;

use serde::{Deserialize, Serialize};

/// Default page size for image listings.
pub const DEFAULT_IMAGE_COUNT: usize = 15;

/// One photograph and its category assignments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Image {
    /// Path relative to the image root, unique within the store.
    pub file: String,
    /// Categories confirmed by the user.
    #[serde(default, deserialize_with = "nullable_list")]
    pub assigned_categories: Vec<String>,
    /// Categories suggested by an external classifier.
    #[serde(default, deserialize_with = "nullable_list")]
    pub proposed_categories: Vec<String>,
    /// Primary category; kept inside `assigned_categories` on upsert.
    #[serde(default)]
    pub starred_category: Option<String>,
}

/// Accept `null` for category lists and treat it like a missing list.
fn nullable_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<Vec<String>>::deserialize(deserializer)?.unwrap_or_default())
}

impl Image {
    /// Create an image with no category data.
    pub fn new(file: impl Into<String>) -> Self {
        Self {
            file: file.into(),
            assigned_categories: Vec::new(),
            proposed_categories: Vec::new(),
            starred_category: None,
        }
    }

    /// Lightweight record for a file still sitting in the unprocessed folder.
    pub fn unprocessed(folder: &str, file_name: &str) -> Self {
        Self::new(Path::new(folder).join(file_name).to_string_lossy().into_owned())
    }

    /// Whether the image lives directly inside `folder`.
    pub fn is_in_folder(&self, folder: &str) -> bool {
        Path::new(&self.file)
            .parent()
            .is_some_and(|parent| !folder.is_empty() && parent.ends_with(folder))
    }

    /// Bring the record into its persisted shape.
    ///
    /// Duplicate names are dropped (first occurrence wins), an empty starred
    /// category becomes `None`, and a starred category missing from
    /// `assigned_categories` is appended to it.
    pub fn normalize(&mut self) {
        dedup_names(&mut self.assigned_categories);
        dedup_names(&mut self.proposed_categories);

        if self.starred_category.as_deref().is_some_and(str::is_empty) {
            self.starred_category = None;
        }

        if let Some(starred) = &self.starred_category {
            if !self.assigned_categories.contains(starred) {
                self.assigned_categories.push(starred.clone());
            }
        }
    }

    /// Whether the image carries no category data at all.
    pub fn is_uncategorized(&self) -> bool {
        self.assigned_categories.is_empty()
            && self.proposed_categories.is_empty()
            && self.starred_category.as_deref().map_or(true, str::is_empty)
    }
}

fn dedup_names(names: &mut Vec<String>) {
    let mut seen = std::collections::HashSet::new();
    names.retain(|name| seen.insert(name.clone()));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_appends_starred() {
        let mut image = Image::new("processed/a.jpg");
        image.assigned_categories = vec!["Dogs".to_string()];
        image.starred_category = Some("Cats".to_string());

        image.normalize();

        assert_eq!(image.assigned_categories, vec!["Dogs", "Cats"]);
    }

    #[test]
    fn test_normalize_keeps_existing_starred_once() {
        let mut image = Image::new("processed/a.jpg");
        image.assigned_categories = vec!["Cats".to_string(), "Cats".to_string()];
        image.starred_category = Some("Cats".to_string());

        image.normalize();

        assert_eq!(image.assigned_categories, vec!["Cats"]);
    }

    #[test]
    fn test_normalize_drops_empty_starred() {
        let mut image = Image::new("processed/a.jpg");
        image.starred_category = Some(String::new());

        image.normalize();

        assert_eq!(image.starred_category, None);
        assert!(image.assigned_categories.is_empty());
        assert!(image.is_uncategorized());
    }

    #[test]
    fn test_folder_membership() {
        let image = Image::unprocessed("unprocessed", "b.png");
        assert_eq!(image.file, "unprocessed/b.png");
        assert!(image.is_in_folder("unprocessed"));
        assert!(!image.is_in_folder("processed"));
        assert!(!Image::new("b.png").is_in_folder("unprocessed"));
    }

    #[test]
    fn test_deserialize_null_lists() {
        let image: Image = serde_json::from_str(
            r#"{"file":"x.jpg","assignedCategories":null,"starredCategory":null}"#,
        )
        .unwrap();
        assert!(image.assigned_categories.is_empty());
        assert!(image.proposed_categories.is_empty());
        assert_eq!(image.starred_category, None);
    }

    #[test]
    fn test_serialize_camel_case() {
        let mut image = Image::new("processed/x.jpg");
        image.starred_category = Some("A".to_string());
        let json = serde_json::to_value(&image).unwrap();
        assert_eq!(json["file"], "processed/x.jpg");
        assert!(json["assignedCategories"].is_array());
        assert!(json["proposedCategories"].is_array());
        assert_eq!(json["starredCategory"], "A");
    }
}
