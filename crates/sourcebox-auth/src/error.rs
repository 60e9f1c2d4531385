//! Authentication error types.

use thiserror::Error;

/// A result type using `AuthError`.
pub type Result<T> = std::result::Result<T, AuthError>;

/// Errors that can occur while talking to the remote auth API.
///
/// Failures fall into two buckets: the request never got an answer
/// (`Network`), or the remote answered with a rejection (`Rejected`).
#[derive(Debug, Error)]
pub enum AuthError {
    /// The remote API could not be reached.
    #[error("auth service unreachable: {0}")]
    Network(String),

    /// The remote API answered with a non-success status.
    #[error("{message}")]
    Rejected {
        /// HTTP status returned by the remote API.
        status: u16,
        /// Message taken from the remote error body.
        message: String,
    },

    /// The user is not entitled to premium features.
    #[error("premium subscription required")]
    NotPremium,

    /// The remote API answered with a body we could not interpret.
    #[error("invalid response from auth service: {0}")]
    InvalidResponse(String),

    /// An internal error occurred.
    #[error("internal error: {0}")]
    Internal(String),
}
