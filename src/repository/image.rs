//! Diesel-based image repository for SQLite.
//!
//! Images are returned in store identity order (`images.id`, assigned on first
//! insert). Cursors resolve a previously returned `file` to its id and select
//! everything after it.

use diesel::prelude::*;
use diesel::sql_types::Text;
use diesel::sqlite::Sqlite;
use diesel::upsert::excluded;
use diesel_async::RunQueryDsl;

use super::diesel_models::{ImageRecord, NewImage};
use super::pool::{DbError, SqliteConn, SqlitePool};
use crate::models::{CategoryField, Clause, Image, ImagePredicate};
use crate::schema::images;

/// SQL translation of an [`ImagePredicate`]: AND-ed conditions plus the
/// text values bound to their `?` placeholders, in order.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct SqlFilter {
    pub conditions: Vec<String>,
    pub binds: Vec<String>,
}

impl SqlFilter {
    pub fn from_predicate(predicate: &ImagePredicate) -> Self {
        let mut filter = Self::default();
        for clause in predicate.clauses() {
            filter.push(&clause);
        }
        filter
    }

    fn push(&mut self, clause: &Clause) {
        match clause {
            Clause::Uncategorized => {
                self.conditions.push(is_empty(CategoryField::Assigned));
                self.conditions.push(is_empty(CategoryField::Proposed));
                self.conditions.push(
                    "(images.starred_category IS NULL OR images.starred_category = '')"
                        .to_string(),
                );
            }
            Clause::Superset(field, names) => {
                for name in names {
                    self.conditions.push(format!(
                        "EXISTS (SELECT 1 FROM json_each(images.{}) WHERE json_each.value = ?)",
                        column(*field)
                    ));
                    self.binds.push(name.clone());
                }
            }
            Clause::NonEmpty(field) => {
                self.conditions.push(format!(
                    "COALESCE(json_array_length(images.{}), 0) > 0",
                    column(*field)
                ));
            }
            Clause::StarredEquals(name) => {
                self.conditions.push("images.starred_category = ?".to_string());
                self.binds.push(name.clone());
            }
        }
    }

    /// Full SELECT statement with an optional identity cursor and a limit.
    pub fn to_sql(&self, after_id: Option<i64>, limit: usize) -> String {
        let mut conditions = Vec::with_capacity(self.conditions.len() + 1);
        if let Some(id) = after_id {
            conditions.push(format!("images.id > {}", id));
        }
        conditions.extend(self.conditions.iter().cloned());

        let mut sql = String::from(
            "SELECT images.id, images.file, images.assigned_categories, \
             images.proposed_categories, images.starred_category FROM images",
        );
        if !conditions.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&conditions.join(" AND "));
        }
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        sql.push_str(&format!(" ORDER BY images.id ASC LIMIT {}", limit));
        sql
    }
}

fn column(field: CategoryField) -> &'static str {
    match field {
        CategoryField::Assigned => "assigned_categories",
        CategoryField::Proposed => "proposed_categories",
    }
}

fn is_empty(field: CategoryField) -> String {
    format!(
        "COALESCE(json_array_length(images.{}), 0) = 0",
        column(field)
    )
}

/// Diesel-based image repository.
#[derive(Clone)]
pub struct DieselImageRepository {
    pool: SqlitePool,
}

impl DieselImageRepository {
    /// Create a new image repository with an existing pool.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Get an image by its file path.
    pub async fn get(&self, file: &str) -> Result<Option<Image>, DbError> {
        let mut conn = self.pool.get().await?;

        images::table
            .filter(images::file.eq(file))
            .select(ImageRecord::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map(|opt| opt.map(Image::from))
    }

    /// Count all stored images.
    pub async fn count(&self) -> Result<u64, DbError> {
        let mut conn = self.pool.get().await?;

        use diesel::dsl::count_star;
        let count: i64 = images::table.select(count_star()).first(&mut conn).await?;
        Ok(count as u64)
    }

    /// List one page of images matching `predicate`.
    ///
    /// With `last_image`, only images stored after that file are returned.
    /// An unknown `last_image` is logged and ignored, so the page starts from
    /// the beginning.
    pub async fn list(
        &self,
        predicate: &ImagePredicate,
        last_image: Option<&str>,
        count: usize,
    ) -> Result<Vec<Image>, DbError> {
        let mut conn = self.pool.get().await?;

        let after_id = match last_image.filter(|s| !s.is_empty()) {
            Some(file) => {
                let id = Self::find_id(&mut conn, file).await?;
                if id.is_none() {
                    tracing::warn!(
                        last_image = file,
                        "Unable to find lastImage in the database, listing from the start"
                    );
                }
                id
            }
            None => None,
        };

        let filter = SqlFilter::from_predicate(predicate);
        let sql = filter.to_sql(after_id, count);
        tracing::debug!(%sql, binds = ?filter.binds, "Querying images");

        let mut query = diesel::sql_query(sql).into_boxed::<Sqlite>();
        for value in filter.binds {
            query = query.bind::<Text, _>(value);
        }

        let records: Vec<ImageRecord> = query.load(&mut conn).await?;
        Ok(records.into_iter().map(Image::from).collect())
    }

    async fn find_id(conn: &mut SqliteConn, file: &str) -> Result<Option<i64>, DbError> {
        images::table
            .filter(images::file.eq(file))
            .select(images::id)
            .first::<i64>(conn)
            .await
            .optional()
    }

    /// Insert or replace an image keyed by `file`.
    ///
    /// Replacing keeps the original id, so an updated image keeps its place
    /// in listing order.
    pub async fn upsert(&self, image: &Image) -> Result<(), DbError> {
        let mut conn = self.pool.get().await?;
        let record = NewImage::from_image(image);

        diesel::insert_into(images::table)
            .values(&record)
            .on_conflict(images::file)
            .do_update()
            .set((
                images::assigned_categories.eq(excluded(images::assigned_categories)),
                images::proposed_categories.eq(excluded(images::proposed_categories)),
                images::starred_category.eq(excluded(images::starred_category)),
            ))
            .execute(&mut conn)
            .await?;

        Ok(())
    }
}
