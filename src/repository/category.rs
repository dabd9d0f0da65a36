//! Diesel-based category repository for SQLite.
//!
//! The `name` column is declared `COLLATE NOCASE`, so equality lookups and
//! the unique index on it are case-insensitive.

use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use super::diesel_models::CategoryRecord;
use super::pool::{DbError, SqlitePool};
use crate::models::Category;
use crate::schema::categories;

/// Diesel-based category repository.
#[derive(Clone)]
pub struct DieselCategoryRepository {
    pool: SqlitePool,
}

impl DieselCategoryRepository {
    /// Create a new category repository with an existing pool.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Get all categories.
    pub async fn get_all(&self) -> Result<Vec<Category>, DbError> {
        let mut conn = self.pool.get().await?;

        categories::table
            .select(CategoryRecord::as_select())
            .load(&mut conn)
            .await
            .map(|records| records.into_iter().map(Category::from).collect())
    }

    /// Get a category by name, ignoring case.
    pub async fn get_by_name(&self, name: &str) -> Result<Option<Category>, DbError> {
        let mut conn = self.pool.get().await?;

        categories::table
            .filter(categories::name.eq(name))
            .select(CategoryRecord::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map(|opt| opt.map(Category::from))
    }

    /// Insert a new category with the given id.
    pub async fn insert(&self, id: &str, category: &Category) -> Result<(), DbError> {
        let mut conn = self.pool.get().await?;

        diesel::insert_into(categories::table)
            .values(&CategoryRecord {
                id: id.to_string(),
                name: category.name.clone(),
                description: category.description.clone(),
            })
            .execute(&mut conn)
            .await?;

        Ok(())
    }

    /// Replace name and description of an existing category.
    ///
    /// Returns false if no category has this id.
    pub async fn update(&self, id: &str, category: &Category) -> Result<bool, DbError> {
        let mut conn = self.pool.get().await?;

        let rows = diesel::update(categories::table.find(id))
            .set((
                categories::name.eq(&category.name),
                categories::description.eq(&category.description),
            ))
            .execute(&mut conn)
            .await?;

        Ok(rows > 0)
    }

    /// Delete a category.
    pub async fn delete(&self, id: &str) -> Result<bool, DbError> {
        let mut conn = self.pool.get().await?;

        let rows = diesel::delete(categories::table.find(id))
            .execute(&mut conn)
            .await?;

        Ok(rows > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::context::DbContext;
    use crate::repository::util::is_unique_violation;
    use tempfile::tempdir;

    async fn setup_repo() -> (DieselCategoryRepository, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let ctx = DbContext::new(&dir.path().join("test.db"));
        ctx.init_schema().await.unwrap();
        (ctx.categories(), dir)
    }

    #[tokio::test]
    async fn test_category_crud() {
        let (repo, _dir) = setup_repo().await;

        let category = Category::new("Landscapes", "Mountains and lakes");
        repo.insert("c1", &category).await.unwrap();

        let all = repo.get_all().await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].id.as_deref(), Some("c1"));
        assert_eq!(all[0].name, "Landscapes");

        let by_name = repo.get_by_name("LANDSCAPES").await.unwrap().unwrap();
        assert_eq!(by_name.id.as_deref(), Some("c1"));

        let renamed = Category::new("Nature", "Outdoors");
        assert!(repo.update("c1", &renamed).await.unwrap());
        assert!(!repo.update("missing", &renamed).await.unwrap());
        let all = repo.get_all().await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].name, "Nature");

        assert!(repo.delete("c1").await.unwrap());
        assert!(!repo.delete("c1").await.unwrap());
        assert!(repo.get_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_name_unique_ignoring_case() {
        let (repo, _dir) = setup_repo().await;

        repo.insert("c1", &Category::new("Portraits", ""))
            .await
            .unwrap();
        let err = repo
            .insert("c2", &Category::new("portraits", ""))
            .await
            .unwrap_err();
        assert!(is_unique_violation(&err));
    }
}
