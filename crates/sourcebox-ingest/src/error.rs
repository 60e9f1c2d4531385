//! Ingestion error types.

use thiserror::Error;

/// A result type using `IngestError`.
pub type Result<T> = std::result::Result<T, IngestError>;

/// Errors raised by the ingestion adapters.
///
/// Problems with what the user supplied (bad URL, existing checkout, missing
/// file) map to 4xx statuses; failures of an upstream (web host, git remote,
/// S3) map to 502.
#[derive(Debug, Error)]
pub enum IngestError {
    /// The supplied URL could not be used.
    #[error("invalid url: {0}")]
    InvalidUrl(String),

    /// A path or object key would escape its scratch directory.
    #[error("invalid path: {0}")]
    InvalidPath(String),

    /// The session already has a repository checkout.
    #[error("workspace already exists")]
    WorkspaceExists,

    /// The requested file does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// Fetching a remote resource failed.
    #[error("failed to fetch {url}: {message}")]
    Fetch {
        /// The resource that was requested.
        url: String,
        /// What went wrong.
        message: String,
    },

    /// Text could not be extracted from a document.
    #[error("extraction failed: {0}")]
    Extract(String),

    /// The `git` client reported an error.
    #[error("git failed: {0}")]
    Git(String),

    /// Filesystem error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Internal error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl IngestError {
    pub(crate) fn fetch(url: impl Into<String>, message: impl ToString) -> Self {
        Self::Fetch {
            url: url.into(),
            message: message.to_string(),
        }
    }
}
