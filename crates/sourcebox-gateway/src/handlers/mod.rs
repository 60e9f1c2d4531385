//! HTTP request handlers.
//!
//! This module contains all the endpoint handlers for the gateway, plus the
//! request helpers they share.

pub mod account;
pub mod bucket;
pub mod files;
pub mod health;
pub mod packs;
pub mod pages;
pub mod preview;
pub mod repo;

use axum::extract::{FromRequest, Multipart, Request};
use axum::http::header::CONTENT_TYPE;
use axum::{Form, Json};
use serde::de::DeserializeOwned;
use serde::Serialize;
use sourcebox_ingest::UploadedFile;

use crate::error::ApiError;

/// A request body accepted either as JSON or as an HTML form.
#[derive(Debug)]
pub struct FormOrJson<T>(pub T);

impl<T, S> FromRequest<S> for FormOrJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let is_json = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|ct| ct.starts_with("application/json"));

        if is_json {
            let Json(value) = Json::<T>::from_request(req, state)
                .await
                .map_err(|e| ApiError::BadRequest(e.body_text()))?;
            Ok(Self(value))
        } else {
            let Form(value) = Form::<T>::from_request(req, state)
                .await
                .map_err(|e| ApiError::BadRequest(e.body_text()))?;
            Ok(Self(value))
        }
    }
}

/// A `{"message", ...}` reply; `data` carries the payload when there is one.
#[derive(Debug, Serialize)]
pub struct MessageResponse<T: Serialize> {
    /// Human-readable outcome.
    pub message: String,
    /// Payload.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl MessageResponse<()> {
    /// A reply with only a message.
    #[must_use]
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            data: None,
        }
    }
}

/// Read every file part of a multipart body. Parts without a file name
/// (plain form fields, or a file input left empty) are ignored.
pub(crate) async fn collect_files(mut multipart: Multipart) -> Result<Vec<UploadedFile>, ApiError> {
    let mut files = Vec::new();

    while let Some(field) = multipart.next_field().await? {
        let Some(filename) = field.file_name().map(ToString::to_string) else {
            continue;
        };
        if filename.is_empty() {
            continue;
        }
        let bytes = field.bytes().await?;
        files.push(UploadedFile::new(filename, bytes.to_vec()));
    }

    if files.is_empty() {
        return Err(ApiError::BadRequest("File is required".to_string()));
    }
    Ok(files)
}
