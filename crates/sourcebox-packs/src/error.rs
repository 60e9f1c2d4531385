//! Error types for the pack client.

use thiserror::Error;

/// A result type using `PackError`.
pub type Result<T> = std::result::Result<T, PackError>;

/// Errors that can occur while talking to the remote pack API.
#[derive(Debug, Error)]
pub enum PackError {
    /// The pack failed local validation before any request was sent.
    #[error(transparent)]
    Invalid(#[from] sourcebox_core::CoreError),

    /// The remote API could not be reached.
    #[error("pack service unreachable: {0}")]
    Network(String),

    /// The remote API refused the request.
    #[error("pack service rejected the request (HTTP {status}): {message}")]
    Rejected {
        /// HTTP status returned by the remote API.
        status: u16,
        /// Message taken from the remote error body.
        message: String,
    },

    /// Internal error.
    #[error("internal error: {0}")]
    Internal(String),
}
