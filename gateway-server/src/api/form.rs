//! Create-request body extraction
//!
//! Turns a multipart form or a JSON object body into a [`ProgramForm`]. Only
//! transport problems are rejected here; field rules belong to the serializer.

use axum::{
    Json,
    body::Bytes,
    extract::{FromRequest, Multipart, Request, multipart::MultipartError},
    http::{StatusCode, header::CONTENT_TYPE},
};
use serde_json::Value;

use crate::api::error::ApiError;
use crate::serializer::{ProgramForm, Upload};

/// Name of the multipart part carrying the program archive
pub const ARTIFACT_FIELD: &str = "artifact";

impl<S> FromRequest<S> for ProgramForm
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let content_type = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_ascii_lowercase();

        if content_type.starts_with("multipart/form-data") {
            let multipart = Multipart::from_request(req, state)
                .await
                .map_err(|e| ApiError::BadRequest(e.body_text()))?;
            read_multipart(multipart).await
        } else if content_type.starts_with("application/json") {
            let Json(value) = Json::<Value>::from_request(req, state)
                .await
                .map_err(|e| ApiError::BadRequest(e.body_text()))?;
            match value {
                Value::Object(object) => Ok(ProgramForm::from_json_object(object)),
                _ => Err(ApiError::BadRequest(
                    "Request body must be a JSON object".to_string(),
                )),
            }
        } else if content_type.is_empty() {
            let body = Bytes::from_request(req, state)
                .await
                .map_err(|e| ApiError::BadRequest(e.body_text()))?;
            if body.is_empty() {
                Ok(ProgramForm::new())
            } else {
                Err(ApiError::UnsupportedMediaType(
                    "Missing Content-Type header".to_string(),
                ))
            }
        } else {
            Err(ApiError::UnsupportedMediaType(format!(
                "Unsupported media type \"{}\"",
                content_type
            )))
        }
    }
}

async fn read_multipart(mut multipart: Multipart) -> Result<ProgramForm, ApiError> {
    let mut form = ProgramForm::new();

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let Some(name) = field.name().map(str::to_string) else {
            continue;
        };

        match field.file_name().map(str::is_empty) {
            // A file part without a filename is an empty file input.
            Some(true) if name == ARTIFACT_FIELD => {
                field.bytes().await.map_err(multipart_error)?;
            }
            Some(false) if name == ARTIFACT_FIELD => {
                let data = field.bytes().await.map_err(multipart_error)?;
                form.set_artifact(Upload { data });
            }
            _ => {
                let text = field.text().await.map_err(multipart_error)?;
                form.insert_text(name, text);
            }
        }
    }

    Ok(form)
}

fn multipart_error(err: MultipartError) -> ApiError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ApiError::PayloadTooLarge(err.body_text())
    } else {
        ApiError::BadRequest(err.body_text())
    }
}
