//! Stateless content extraction.
//!
//! Preview endpoints run an ingestion adapter and return the extracted text
//! without contacting the remote API.

use std::sync::Arc;

use axum::extract::{Multipart, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use sourcebox_auth::AuthApi;
use sourcebox_core::ContentBlock;
use sourcebox_ingest::{read_uploads, IngestError, SkippedFile};
use sourcebox_packs::PackApi;

use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::handlers::collect_files;
use crate::state::GatewayState;

/// Links to preview.
#[derive(Debug, Default, Deserialize)]
pub struct PreviewLinkBody {
    /// A single link.
    #[serde(default)]
    pub link: Option<String>,
    /// Several links.
    #[serde(default)]
    pub links: Vec<String>,
}

impl PreviewLinkBody {
    /// All non-blank links, single link first.
    fn into_links(self) -> Vec<String> {
        self.link
            .into_iter()
            .chain(self.links)
            .map(|l| l.trim().to_string())
            .filter(|l| !l.is_empty())
            .collect()
    }
}

/// One fetched document.
#[derive(Debug, Serialize)]
pub struct PreviewDoc {
    /// Source URL, with a `#page=N` suffix for PDF pages.
    pub url: String,
    /// Extracted text.
    pub content: String,
}

impl From<ContentBlock> for PreviewDoc {
    fn from(block: ContentBlock) -> Self {
        Self {
            url: block.filename,
            content: block.content,
        }
    }
}

/// Reply to `preview_link`.
#[derive(Debug, Serialize)]
pub struct PreviewLinkResponse {
    /// Outcome message.
    pub message: String,
    /// Documents in link order.
    pub docs: Vec<PreviewDoc>,
}

/// Reply to `preview_file`.
#[derive(Debug, Serialize)]
pub struct PreviewFileResponse {
    /// Outcome message.
    pub message: String,
    /// Text of every extracted file, separated by blank lines.
    pub content: String,
    /// The extracted blocks.
    pub blocks: Vec<ContentBlock>,
    /// Files that produced nothing.
    pub skipped: Vec<SkippedFile>,
}

/// `POST /packman/preview_link`
///
/// # Example
///
/// ```text
/// POST /packman/preview_link
/// {"link": "https://example.com"}
///
/// Response: 200 OK
/// {"message": "Link processed successfully", "docs": [{"url": "...", "content": "..."}]}
/// ```
pub async fn preview_link<A, P>(
    State(state): State<Arc<GatewayState<A, P>>>,
    _user: AuthUser,
    Json(body): Json<PreviewLinkBody>,
) -> Result<Json<PreviewLinkResponse>, ApiError>
where
    A: AuthApi + 'static,
    P: PackApi + 'static,
{
    let links = body.into_links();
    if links.is_empty() {
        return Err(ApiError::BadRequest("Link is required".to_string()));
    }

    let blocks = state.web.load_all(&links).await.map_err(|e| match e {
        IngestError::InvalidUrl(msg) => ApiError::BadRequest(msg),
        other => {
            tracing::warn!(error = %other, "Link preview failed");
            ApiError::BadGateway("Failed to process link".to_string())
        }
    })?;

    Ok(Json(PreviewLinkResponse {
        message: "Link processed successfully".to_string(),
        docs: blocks.into_iter().map(PreviewDoc::from).collect(),
    }))
}

/// `POST /packman/preview_file`
pub async fn preview_file<A, P>(
    State(state): State<Arc<GatewayState<A, P>>>,
    _user: AuthUser,
    multipart: Multipart,
) -> Result<Json<PreviewFileResponse>, ApiError>
where
    A: AuthApi + 'static,
    P: PackApi + 'static,
{
    let files = collect_files(multipart).await?;
    let report = read_uploads(files, state.config.unsupported_files).await;

    let content = report
        .blocks
        .iter()
        .filter(|b| !b.is_binary)
        .map(|b| b.content.as_str())
        .collect::<Vec<_>>()
        .join("\n\n");

    Ok(Json(PreviewFileResponse {
        message: "File processed successfully".to_string(),
        content,
        blocks: report.blocks,
        skipped: report.skipped,
    }))
}
