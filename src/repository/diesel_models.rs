//! Diesel ORM models for database tables.

use diesel::prelude::*;

use super::util::{decode_names, encode_names};
use crate::models::{Category, Image};
use crate::schema;

/// Image record from the database.
#[derive(Queryable, QueryableByName, Selectable, Debug, Clone)]
#[diesel(table_name = schema::images)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct ImageRecord {
    pub id: i64,
    pub file: String,
    pub assigned_categories: String,
    pub proposed_categories: String,
    pub starred_category: Option<String>,
}

impl From<ImageRecord> for Image {
    fn from(record: ImageRecord) -> Self {
        Image {
            file: record.file,
            assigned_categories: decode_names(&record.assigned_categories),
            proposed_categories: decode_names(&record.proposed_categories),
            starred_category: record.starred_category.filter(|s| !s.is_empty()),
        }
    }
}

/// New image for insertion.
#[derive(Insertable, Debug)]
#[diesel(table_name = schema::images)]
pub struct NewImage<'a> {
    pub file: &'a str,
    pub assigned_categories: String,
    pub proposed_categories: String,
    pub starred_category: Option<&'a str>,
}

impl<'a> NewImage<'a> {
    pub fn from_image(image: &'a Image) -> Self {
        Self {
            file: &image.file,
            assigned_categories: encode_names(&image.assigned_categories),
            proposed_categories: encode_names(&image.proposed_categories),
            starred_category: image.starred_category.as_deref(),
        }
    }
}

/// Category record from the database.
#[derive(Queryable, Selectable, Identifiable, Insertable, Debug, Clone)]
#[diesel(table_name = schema::categories)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct CategoryRecord {
    pub id: String,
    pub name: String,
    pub description: String,
}

impl From<CategoryRecord> for Category {
    fn from(record: CategoryRecord) -> Self {
        Category {
            id: Some(record.id),
            name: record.name,
            description: record.description,
        }
    }
}
