//! Repository checkout endpoints.
//!
//! Each session owns one checkout directory. Cloning refuses to touch an
//! existing checkout; `clear-repo` removes it together with the S3 dump.
//! Only remote repositories are cloned unless `ALLOW_LOCAL_REPOS` is set.

use std::sync::Arc;

use axum::extract::{Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use sourcebox_auth::AuthApi;
use sourcebox_ingest::{git, RetryPolicy};
use sourcebox_packs::PackApi;

use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::handlers::{FormOrJson, MessageResponse};
use crate::state::GatewayState;

/// Request to clone a repository.
#[derive(Debug, Deserialize)]
pub struct FetchRepoBody {
    /// Remote repository URL.
    #[serde(default, alias = "url")]
    pub repo_url: String,
}

/// Reply to `fetch-repo`.
#[derive(Debug, Serialize)]
pub struct FetchRepoResponse {
    /// Outcome message.
    pub message: String,
    /// Top-level files of the checkout, sorted by name.
    pub files: Vec<String>,
}

/// Query of `get-repo-file-content`.
#[derive(Debug, Deserialize)]
pub struct FileQuery {
    /// Name of a top-level file in the checkout.
    #[serde(default)]
    pub filename: String,
}

/// Reply to `get-repo-file-content`.
#[derive(Debug, Serialize)]
pub struct FileContentResponse {
    /// The requested file.
    pub filename: String,
    /// Its text.
    pub content: String,
}

/// `POST /fetch-repo`
///
/// # Example
///
/// ```text
/// POST /fetch-repo
/// {"repo_url": "https://github.com/example/project.git"}
///
/// Response: 200 OK
/// {"message": "Repository cloned successfully", "files": ["Cargo.toml", "README.md"]}
/// ```
pub async fn fetch_repo<A, P>(
    State(state): State<Arc<GatewayState<A, P>>>,
    user: AuthUser,
    FormOrJson(body): FormOrJson<FetchRepoBody>,
) -> Result<Json<FetchRepoResponse>, ApiError>
where
    A: AuthApi + 'static,
    P: PackApi + 'static,
{
    let url = body.repo_url.trim();
    if url.is_empty() {
        return Err(ApiError::BadRequest("Repository URL is required".to_string()));
    }

    let key = user.workspace_key();
    let _guard = state.workspaces.lock(key).await;
    let files = git::clone_repo(
        url,
        &state.workspaces.repo_dir(key),
        state.config.repo_sources(),
    )
    .await?;

    tracing::info!(workspace = %key, url = %url, files = files.len(), "Cloned repository");

    Ok(Json(FetchRepoResponse {
        message: "Repository cloned successfully".to_string(),
        files,
    }))
}

/// `POST /clear-repo`
///
/// Clearing a workspace that holds nothing succeeds.
pub async fn clear_repo<A, P>(
    State(state): State<Arc<GatewayState<A, P>>>,
    user: AuthUser,
) -> Result<Json<MessageResponse<()>>, ApiError>
where
    A: AuthApi + 'static,
    P: PackApi + 'static,
{
    state
        .workspaces
        .clear(user.workspace_key(), RetryPolicy::CHECKOUT, RetryPolicy::ONCE)
        .await?;

    Ok(Json(MessageResponse::message(
        "Repository and bucket dump cleared",
    )))
}

/// `GET /get-repo-file-content?filename=...`
pub async fn get_repo_file_content<A, P>(
    State(state): State<Arc<GatewayState<A, P>>>,
    user: AuthUser,
    Query(query): Query<FileQuery>,
) -> Result<Json<FileContentResponse>, ApiError>
where
    A: AuthApi + 'static,
    P: PackApi + 'static,
{
    if query.filename.is_empty() {
        return Err(ApiError::BadRequest("Filename is required".to_string()));
    }

    let key = user.workspace_key();
    let _guard = state.workspaces.lock(key).await;
    let content = git::read_file(&state.workspaces.repo_dir(key), &query.filename).await?;

    Ok(Json(FileContentResponse {
        filename: query.filename,
        content,
    }))
}
