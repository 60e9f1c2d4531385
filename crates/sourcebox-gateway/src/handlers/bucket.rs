//! Premium S3 endpoints.
//!
//! All three routes take [`PremiumUser`], so non-premium users get a 403
//! before any S3 traffic happens.

use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};

use sourcebox_auth::AuthApi;
use sourcebox_core::ContentBlock;
use sourcebox_ingest::{s3, S3Location};
use sourcebox_packs::PackApi;

use crate::auth::PremiumUser;
use crate::error::ApiError;
use crate::handlers::FormOrJson;
use crate::state::GatewayState;

/// An S3 object or bucket URL.
#[derive(Debug, Deserialize)]
pub struct S3Body {
    /// `s3://`, virtual-hosted or path-style URL.
    #[serde(default, alias = "s3_url", alias = "bucket_url")]
    pub url: String,
}

impl S3Body {
    fn location(&self) -> Result<S3Location, ApiError> {
        if self.url.trim().is_empty() {
            return Err(ApiError::BadRequest("S3 URL is required".to_string()));
        }
        Ok(S3Location::parse(&self.url)?)
    }
}

/// Reply to the download endpoints.
#[derive(Debug, Serialize)]
pub struct DownloadResponse {
    /// Outcome message.
    pub message: String,
    /// Object keys written to the dump directory.
    pub files: Vec<String>,
}

/// Reply to `read-bucket-dump`.
#[derive(Debug, Serialize)]
pub struct DumpContentsResponse {
    /// Outcome message.
    pub message: String,
    /// One block per dumped file, sorted by path.
    pub contents: Vec<ContentBlock>,
}

/// `POST /aws-single-file`
pub async fn aws_single_file<A, P>(
    State(state): State<Arc<GatewayState<A, P>>>,
    premium: PremiumUser,
    FormOrJson(body): FormOrJson<S3Body>,
) -> Result<Json<DownloadResponse>, ApiError>
where
    A: AuthApi + 'static,
    P: PackApi + 'static,
{
    let location = body.location()?;
    let key = premium.user.workspace_key();

    let _guard = state.workspaces.lock(key).await;
    let object = state
        .s3
        .download_single(&location, &state.workspaces.dump_dir(key))
        .await?;

    tracing::info!(
        workspace = %key,
        bucket = %location.bucket,
        key = %object,
        "Downloaded S3 object"
    );

    Ok(Json(DownloadResponse {
        message: "File downloaded successfully".to_string(),
        files: vec![object],
    }))
}

/// `POST /aws-bucket-dump`
///
/// # Example
///
/// ```text
/// POST /aws-bucket-dump
/// {"url": "s3://public-bucket/docs/"}
///
/// Response: 200 OK
/// {"message": "Bucket downloaded successfully", "files": ["docs/a.txt", "docs/b.pdf"]}
/// ```
pub async fn aws_bucket_dump<A, P>(
    State(state): State<Arc<GatewayState<A, P>>>,
    premium: PremiumUser,
    FormOrJson(body): FormOrJson<S3Body>,
) -> Result<Json<DownloadResponse>, ApiError>
where
    A: AuthApi + 'static,
    P: PackApi + 'static,
{
    let location = body.location()?;
    let key = premium.user.workspace_key();

    let _guard = state.workspaces.lock(key).await;
    let files = state
        .s3
        .dump_bucket(&location, &state.workspaces.dump_dir(key))
        .await?;

    Ok(Json(DownloadResponse {
        message: "Bucket downloaded successfully".to_string(),
        files,
    }))
}

/// `GET /read-bucket-dump`
pub async fn read_bucket_dump<A, P>(
    State(state): State<Arc<GatewayState<A, P>>>,
    premium: PremiumUser,
) -> Result<Json<DumpContentsResponse>, ApiError>
where
    A: AuthApi + 'static,
    P: PackApi + 'static,
{
    let key = premium.user.workspace_key();

    let _guard = state.workspaces.lock(key).await;
    let contents = s3::read_dump(&state.workspaces.dump_dir(key)).await?;

    Ok(Json(DumpContentsResponse {
        message: "Bucket dump read successfully".to_string(),
        contents,
    }))
}
