//! Category endpoints.

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};

use super::super::error::ApiError;
use super::super::AppState;
use crate::models::Category;

/// List all categories.
pub async fn list_categories(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let categories = state.gallery.list_categories().await?;
    tracing::debug!(count = categories.len(), "Listed categories");
    Ok(Json(categories))
}

/// Create or update a category.
pub async fn upsert_category(
    State(state): State<AppState>,
    body: Result<Json<Category>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(category) = body?;
    let stored = state.gallery.upsert_category(category).await?;
    Ok(Json(stored))
}

/// Delete a category by id.
pub async fn delete_category(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    state.gallery.delete_category(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}
