//! Image endpoints.

use axum::{
    extract::{rejection::JsonRejection, RawQuery, State},
    response::IntoResponse,
    Json,
};

use super::super::error::ApiError;
use super::super::AppState;
use crate::error::GalleryError;
use crate::models::{Image, ImageStatus, DEFAULT_IMAGE_COUNT};
use crate::services::images::ImageQuery;

/// Parse the `GET /image` query string.
///
/// `categories` may repeat. `lastImage` (or `last`) is the cursor. A `count`
/// that is not an integer is rejected; zero or negative counts fall back to
/// the default page size.
pub fn parse_image_query(raw: Option<&str>) -> Result<ImageQuery, GalleryError> {
    let mut query = ImageQuery::default();
    let mut count = None;

    for (key, value) in url::form_urlencoded::parse(raw.unwrap_or_default().as_bytes()) {
        match key.as_ref() {
            "status" => query.status = ImageStatus::parse(&value),
            "count" => count = Some(value.into_owned()),
            "categories" => query.categories.push(value.into_owned()),
            "lastImage" | "last" if !value.is_empty() => query.last_image = Some(value.into_owned()),
            "starred" if !value.is_empty() => query.starred = Some(value.into_owned()),
            _ => {}
        }
    }

    if let Some(count) = count.filter(|c| !c.trim().is_empty()) {
        let n: i64 = count
            .trim()
            .parse()
            .map_err(|_| GalleryError::InvalidRequest(format!("invalid count: '{}'", count)))?;
        query.count = usize::try_from(n)
            .ok()
            .filter(|&n| n > 0)
            .unwrap_or(DEFAULT_IMAGE_COUNT);
    }

    Ok(query)
}

/// List images by status, categories and cursor.
pub async fn get_images(
    State(state): State<AppState>,
    RawQuery(raw): RawQuery,
) -> Result<impl IntoResponse, ApiError> {
    let query = parse_image_query(raw.as_deref())?;

    let images = state.gallery.get_images(&query).await?;
    tracing::debug!(
        status = query.status.as_str(),
        count = query.count,
        categories = ?query.categories,
        last_image = ?query.last_image,
        returned = images.len(),
        "Listed images"
    );

    Ok(Json(images))
}

/// Create or update an image, moving it out of the unprocessed folder.
pub async fn upsert_image(
    State(state): State<AppState>,
    body: Result<Json<Image>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(image) = body?;
    let stored = state.gallery.upsert_image(image).await?;
    tracing::info!(file = %stored.file, "Upserted image");
    Ok(Json(stored))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_defaults() {
        let query = parse_image_query(None).unwrap();
        assert_eq!(query.status, ImageStatus::Categorized);
        assert_eq!(query.count, DEFAULT_IMAGE_COUNT);
        assert!(query.categories.is_empty());
        assert!(query.last_image.is_none());
    }

    #[test]
    fn test_parse_repeated_categories_and_cursor() {
        let query = parse_image_query(Some(
            "status=autocategorized&categories=Category+2&categories=Cats%20%26%20Dogs&lastImage=processed%2Fa.jpg&count=5",
        ))
        .unwrap();

        assert_eq!(query.status, ImageStatus::Autocategorized);
        assert_eq!(query.categories, vec!["Category 2", "Cats & Dogs"]);
        assert_eq!(query.last_image.as_deref(), Some("processed/a.jpg"));
        assert_eq!(query.count, 5);
    }

    #[test]
    fn test_parse_count() {
        assert_eq!(parse_image_query(Some("count=0")).unwrap().count, 15);
        assert_eq!(parse_image_query(Some("count=-3")).unwrap().count, 15);
        assert_eq!(parse_image_query(Some("count=")).unwrap().count, 15);
        assert!(matches!(
            parse_image_query(Some("count=ten")),
            Err(GalleryError::InvalidRequest(_))
        ));
    }
}
