//! Mapping of gallery errors onto HTTP responses.

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use crate::error::GalleryError;

/// Error returned by the API handlers.
///
/// Rendered as `{"error": "<message>"}` with a status derived from the
/// error kind.
#[derive(Debug)]
pub struct ApiError(pub GalleryError);

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            GalleryError::InvalidRequest(_) | GalleryError::InvalidCategoryId(_) => {
                StatusCode::BAD_REQUEST
            }
            GalleryError::CategoryNotFound(_) => StatusCode::NOT_FOUND,
            GalleryError::DuplicateCategoryName(_) | GalleryError::FileExists(_) => {
                StatusCode::CONFLICT
            }
            GalleryError::Timeout(_) | GalleryError::Database(_) | GalleryError::Io(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl From<GalleryError> for ApiError {
    fn from(e: GalleryError) -> Self {
        Self(e)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self(GalleryError::InvalidRequest(rejection.body_text()))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();

        if self.0.is_client_error() {
            tracing::warn!(status = status.as_u16(), error = %self.0, "Request rejected");
        } else {
            tracing::error!(status = status.as_u16(), error = %self.0, "Request failed");
        }

        (
            status,
            Json(serde_json::json!({ "error": self.0.to_string() })),
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (GalleryError::InvalidRequest("x".into()), StatusCode::BAD_REQUEST),
            (GalleryError::InvalidCategoryId("x".into()), StatusCode::BAD_REQUEST),
            (GalleryError::CategoryNotFound("x".into()), StatusCode::NOT_FOUND),
            (GalleryError::DuplicateCategoryName("x".into()), StatusCode::CONFLICT),
            (GalleryError::FileExists("x".into()), StatusCode::CONFLICT),
            (
                GalleryError::Timeout(Duration::from_secs(1)),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (error, expected) in cases {
            assert_eq!(ApiError(error).status(), expected);
        }
    }
}
