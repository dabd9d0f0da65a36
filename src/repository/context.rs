//! Database context for managing the connection factory and repository access.
//!
//! Create one context at startup, bootstrap the schema with
//! [`DbContext::init_schema`], then hand out repositories.
//!
//! # Example
//! ```ignore
//! let ctx = DbContext::new(&db_path);
//! ctx.init_schema().await?;
//! let categories = ctx.categories().get_all().await?;
//! ```

use std::path::Path;

use diesel_async::SimpleAsyncConnection;

use super::category::DieselCategoryRepository;
use super::image::DieselImageRepository;
use super::pool::{DbError, SqliteConn, SqlitePool};

/// Owns the connection factory and provides repository access.
#[derive(Clone, Debug)]
pub struct DbContext {
    pool: SqlitePool,
}

impl DbContext {
    /// Create a new database context from a file path.
    pub fn new(db_path: &Path) -> Self {
        Self {
            pool: SqlitePool::from_path(db_path),
        }
    }

    /// Create a new database context from a database URL
    /// (`sqlite:path/to/db.sqlite` or a plain file path).
    pub fn from_url(database_url: &str) -> Self {
        Self {
            pool: SqlitePool::new(database_url),
        }
    }

    /// Get the underlying connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Get an image repository.
    pub fn images(&self) -> DieselImageRepository {
        DieselImageRepository::new(self.pool.clone())
    }

    /// Get a category repository.
    pub fn categories(&self) -> DieselCategoryRepository {
        DieselCategoryRepository::new(self.pool.clone())
    }

    /// Create tables and indexes if they don't exist.
    pub async fn init_schema(&self) -> Result<(), DbError> {
        let mut conn = self.pool.get().await?;
        Self::init_sqlite_schema(&mut conn).await
    }

    async fn init_sqlite_schema(conn: &mut SqliteConn) -> Result<(), DbError> {
        conn.batch_execute(
            r#"
            -- Categories; names are unique ignoring case
            CREATE TABLE IF NOT EXISTS categories (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL COLLATE NOCASE,
                description TEXT NOT NULL DEFAULT ''
            );

            -- Images; id is the insertion-ordered pagination identity
            CREATE TABLE IF NOT EXISTS images (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                file TEXT NOT NULL,
                assigned_categories TEXT NOT NULL DEFAULT '[]',
                proposed_categories TEXT NOT NULL DEFAULT '[]',
                starred_category TEXT
            );

            CREATE UNIQUE INDEX IF NOT EXISTS idx_categories_name ON categories(name COLLATE NOCASE);
            CREATE UNIQUE INDEX IF NOT EXISTS idx_images_file ON images(file);
            "#,
        )
        .await
    }
}
