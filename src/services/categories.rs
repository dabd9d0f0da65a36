//! Category listing, upsert and deletion.

use uuid::Uuid;

use super::Gallery;
use crate::error::{GalleryError, Result};
use crate::models::Category;
use crate::repository::util::is_unique_violation;
use crate::repository::DbError;

/// Validate a category id and bring it into canonical form.
pub fn parse_category_id(id: &str) -> Result<String> {
    Uuid::parse_str(id.trim())
        .map(|uuid| uuid.hyphenated().to_string())
        .map_err(|_| GalleryError::InvalidCategoryId(id.to_string()))
}

fn duplicate_or(e: DbError, name: &str) -> GalleryError {
    if is_unique_violation(&e) {
        GalleryError::DuplicateCategoryName(name.to_string())
    } else {
        GalleryError::Database(e)
    }
}

impl Gallery {
    pub async fn list_categories(&self) -> Result<Vec<Category>> {
        self.with_timeout(self.categories.get_all()).await
    }

    /// Insert or update a category.
    ///
    /// With an id, the category with that id is updated. Without one, the
    /// category with the same name (ignoring case) is updated, or a new one
    /// is created. Returns the stored category including its id.
    pub async fn upsert_category(&self, mut category: Category) -> Result<Category> {
        category.name = category.name.trim().to_string();
        if category.name.is_empty() {
            return Err(GalleryError::InvalidRequest(
                "category name must not be empty".to_string(),
            ));
        }

        let requested_id = category.id.take().filter(|id| !id.trim().is_empty());

        let id = match requested_id {
            Some(raw) => {
                let id = parse_category_id(&raw)?;
                let updated = self
                    .with_timeout(self.categories.update(&id, &category))
                    .await
                    .map_err(|e| match e {
                        GalleryError::Database(e) => duplicate_or(e, &category.name),
                        other => other,
                    })?;
                if !updated {
                    return Err(GalleryError::CategoryNotFound(id));
                }
                id
            }
            None => {
                let existing = self
                    .with_timeout(self.categories.get_by_name(&category.name))
                    .await?;

                match existing.and_then(|c| c.id) {
                    Some(id) => {
                        self.with_timeout(self.categories.update(&id, &category))
                            .await?;
                        id
                    }
                    None => {
                        let id = Uuid::new_v4().to_string();
                        self.with_timeout(self.categories.insert(&id, &category))
                            .await
                            .map_err(|e| match e {
                                GalleryError::Database(e) => duplicate_or(e, &category.name),
                                other => other,
                            })?;
                        id
                    }
                }
            }
        };

        tracing::info!(id = %id, name = %category.name, "Upserted category");
        category.id = Some(id);
        Ok(category)
    }

    /// Delete a category by id.
    pub async fn delete_category(&self, id: &str) -> Result<()> {
        let id = parse_category_id(id)?;

        if !self.with_timeout(self.categories.delete(&id)).await? {
            return Err(GalleryError::CategoryNotFound(id));
        }

        tracing::info!(id = %id, "Deleted category");
        Ok(())
    }
}
