//! API Error Handling
//!
//! Unified error types and conversion for API responses.
//!
//! Authorization and not-found failures are bare status codes. Field
//! validation failures carry the complete field → messages mapping.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use gateway_core::dto::errors::FieldErrors;

use crate::repository::RepositoryError;
use crate::service::program_service::ProgramError;
use crate::storage::StorageError;

/// API error type
#[derive(Debug)]
pub enum ApiError {
    Forbidden,
    NotFound,
    Validation(FieldErrors),
    BadRequest(String),
    PayloadTooLarge(String),
    UnsupportedMediaType(String),
    DatabaseError(RepositoryError),
    StorageError(StorageError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::Forbidden => return StatusCode::FORBIDDEN.into_response(),
            ApiError::NotFound => return StatusCode::NOT_FOUND.into_response(),
            ApiError::Validation(errors) => {
                return (StatusCode::BAD_REQUEST, Json(errors)).into_response();
            }
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::PayloadTooLarge(msg) => (StatusCode::PAYLOAD_TOO_LARGE, msg),
            ApiError::UnsupportedMediaType(msg) => (StatusCode::UNSUPPORTED_MEDIA_TYPE, msg),
            ApiError::DatabaseError(err) => {
                tracing::error!("Database error: {:?}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
            ApiError::StorageError(err) => {
                tracing::error!("Artifact storage error: {:?}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };

        (status, Json(serde_json::json!({ "error": message }))).into_response()
    }
}

impl From<ProgramError> for ApiError {
    fn from(err: ProgramError) -> Self {
        match err {
            ProgramError::NotFound(_) | ProgramError::InvalidPage(_) => ApiError::NotFound,
            ProgramError::Repository(err) => ApiError::DatabaseError(err),
            ProgramError::Storage(err) => ApiError::StorageError(err),
        }
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    async fn body_bytes(response: Response) -> axum::body::Bytes {
        axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_forbidden_and_not_found_have_empty_bodies() {
        let forbidden = ApiError::Forbidden.into_response();
        assert_eq!(forbidden.status(), StatusCode::FORBIDDEN);
        assert!(body_bytes(forbidden).await.is_empty());

        let not_found = ApiError::from(ProgramError::NotFound(Uuid::new_v4())).into_response();
        assert_eq!(not_found.status(), StatusCode::NOT_FOUND);
        assert!(body_bytes(not_found).await.is_empty());
    }

    #[tokio::test]
    async fn test_validation_body_is_field_map() {
        let mut errors = FieldErrors::new();
        errors.add("title", "This field is required.");

        let response = ApiError::Validation(errors).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body: serde_json::Value = serde_json::from_slice(&body_bytes(response).await).unwrap();
        assert_eq!(body, serde_json::json!({"title": ["This field is required."]}));
    }

    #[tokio::test]
    async fn test_internal_errors_hide_details() {
        let response =
            ApiError::from(ProgramError::Repository(RepositoryError::Database(
                sqlx::Error::PoolTimedOut,
            )))
            .into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body: serde_json::Value = serde_json::from_slice(&body_bytes(response).await).unwrap();
        assert_eq!(body, serde_json::json!({"error": "Internal server error"}));
    }
}
