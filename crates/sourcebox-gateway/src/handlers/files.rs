//! Multi-file extraction and uploads into the repository checkout.

use std::sync::Arc;

use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;

use sourcebox_auth::AuthApi;
use sourcebox_core::ContentBlock;
use sourcebox_ingest::{git, read_uploads, SkippedFile};
use sourcebox_packs::PackApi;

use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::handlers::collect_files;
use crate::state::GatewayState;

/// Reply to `read-files`.
#[derive(Debug, Serialize)]
pub struct ReadFilesResponse {
    /// Outcome message.
    pub message: String,
    /// One block per extracted file, in upload order.
    pub contents: Vec<ContentBlock>,
    /// Files that produced nothing.
    pub skipped: Vec<SkippedFile>,
}

/// Reply to `upload-file`.
#[derive(Debug, Serialize)]
pub struct UploadFileResponse {
    /// Outcome message.
    pub message: String,
    /// Names stored in the checkout.
    pub files: Vec<String>,
}

/// `POST /read-files`
///
/// A file that fails to decode is listed in `skipped` with the reason; the
/// rest of the batch is still returned.
pub async fn read_files<A, P>(
    State(state): State<Arc<GatewayState<A, P>>>,
    _user: AuthUser,
    multipart: Multipart,
) -> Result<Json<ReadFilesResponse>, ApiError>
where
    A: AuthApi + 'static,
    P: PackApi + 'static,
{
    let files = collect_files(multipart).await?;
    let count = files.len();
    let report = read_uploads(files, state.config.unsupported_files).await;

    tracing::debug!(
        files = count,
        blocks = report.blocks.len(),
        skipped = report.skipped.len(),
        "Read uploaded files"
    );

    Ok(Json(ReadFilesResponse {
        message: "Files processed successfully".to_string(),
        contents: report.blocks,
        skipped: report.skipped,
    }))
}

/// `POST /upload-file`
pub async fn upload_file<A, P>(
    State(state): State<Arc<GatewayState<A, P>>>,
    user: AuthUser,
    multipart: Multipart,
) -> Result<(StatusCode, Json<UploadFileResponse>), ApiError>
where
    A: AuthApi + 'static,
    P: PackApi + 'static,
{
    let files = collect_files(multipart).await?;
    let key = user.workspace_key();

    let _guard = state.workspaces.lock(key).await;
    let stored = git::store_files(&state.workspaces.repo_dir(key), &files).await?;

    tracing::info!(workspace = %key, files = stored.len(), "Stored uploaded files");

    Ok((
        StatusCode::CREATED,
        Json(UploadFileResponse {
            message: "File uploaded successfully".to_string(),
            files: stored,
        }),
    ))
}
