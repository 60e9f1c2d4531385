//! API error types and responses.
//!
//! Every error leaves the gateway as `{"message": "..."}` with a matching
//! status code. Internal details are logged and replaced by a generic
//! message.

use axum::extract::multipart::MultipartError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;

use sourcebox_auth::AuthError;
use sourcebox_core::CoreError;
use sourcebox_ingest::IngestError;
use sourcebox_packs::PackError;

/// API error type that implements `IntoResponse`.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The session holds no valid token.
    #[error("You need to login first")]
    Unauthorized,

    /// The user lacks a premium subscription.
    #[error("Premium subscription required")]
    Forbidden,

    /// The requested resource was not found.
    #[error("{0}")]
    NotFound(String),

    /// The request conflicts with the current state.
    #[error("{0}")]
    Conflict(String),

    /// Invalid request body or parameters.
    #[error("{0}")]
    BadRequest(String),

    /// Input was well-formed but its content could not be processed.
    #[error("{0}")]
    Unprocessable(String),

    /// An upstream service failed.
    #[error("{0}")]
    BadGateway(String),

    /// Internal server error.
    #[error("{0}")]
    Internal(String),
}

/// Error response body.
#[derive(Debug, Serialize)]
struct ErrorResponse {
    message: String,
}

impl ApiError {
    /// Get the HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::Forbidden => StatusCode::FORBIDDEN,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Unprocessable(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::BadGateway(_) => StatusCode::BAD_GATEWAY,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub(crate) fn internal(context: &str, err: &dyn std::fmt::Display) -> Self {
        tracing::error!(error = %err, "{context}");
        Self::Internal("Internal server error".to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = ErrorResponse {
            message: self.to_string(),
        };

        (status, Json(body)).into_response()
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::Rejected { .. } => Self::Unauthorized,
            AuthError::NotPremium => Self::Forbidden,
            AuthError::Network(_) | AuthError::InvalidResponse(_) => {
                tracing::warn!(error = %err, "Auth service error");
                Self::BadGateway("Authentication service unavailable".to_string())
            }
            AuthError::Internal(_) => Self::internal("Auth internal error", &err),
        }
    }
}

impl From<PackError> for ApiError {
    fn from(err: PackError) -> Self {
        match err {
            PackError::Invalid(core) => Self::from(core),
            PackError::Rejected { .. } => {
                tracing::warn!(error = %err, "Pack service rejected request");
                Self::Internal("Failed to create pack".to_string())
            }
            PackError::Network(_) => {
                tracing::warn!(error = %err, "Pack service unreachable");
                Self::BadGateway("Pack service unavailable".to_string())
            }
            PackError::Internal(_) => Self::internal("Pack client error", &err),
        }
    }
}

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::MissingPackName | CoreError::EmptyPack => {
                Self::BadRequest("Pack name and contents are required".to_string())
            }
            CoreError::InvalidId(e) => Self::BadRequest(e.to_string()),
        }
    }
}

impl From<IngestError> for ApiError {
    fn from(err: IngestError) -> Self {
        match err {
            IngestError::InvalidUrl(_) | IngestError::InvalidPath(_) => {
                Self::BadRequest(err.to_string())
            }
            IngestError::WorkspaceExists => Self::Conflict(
                "Repository workspace already exists, clear it first".to_string(),
            ),
            IngestError::NotFound(what) => Self::NotFound(format!("File not found: {what}")),
            IngestError::Extract(msg) => Self::Unprocessable(msg),
            IngestError::Fetch { .. } | IngestError::Git(_) => {
                tracing::warn!(error = %err, "Upstream fetch failed");
                Self::BadGateway(err.to_string())
            }
            IngestError::Io(_) | IngestError::Internal(_) => {
                Self::internal("Ingestion internal error", &err)
            }
        }
    }
}

impl From<MultipartError> for ApiError {
    fn from(err: MultipartError) -> Self {
        Self::BadRequest(format!("Invalid multipart body: {}", err.body_text()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_status_codes() {
        assert_eq!(
            ApiError::Unauthorized.status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(ApiError::Forbidden.status_code(), StatusCode::FORBIDDEN);
        assert_eq!(
            ApiError::NotFound("test".into()).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::Conflict("test".into()).status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            ApiError::BadGateway("test".into()).status_code(),
            StatusCode::BAD_GATEWAY
        );
    }

    #[test]
    fn pack_rejection_is_a_generic_500() {
        let err = ApiError::from(PackError::Rejected {
            status: 422,
            message: "name taken".into(),
        });
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.to_string(), "Failed to create pack");
    }

    #[test]
    fn ingest_errors_map_to_client_statuses() {
        assert_eq!(
            ApiError::from(IngestError::WorkspaceExists).status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            ApiError::from(IngestError::InvalidPath("../x".into())).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::from(IngestError::NotFound("a.txt".into())).status_code(),
            StatusCode::NOT_FOUND
        );
    }

    #[test]
    fn internal_details_are_hidden() {
        let err = ApiError::from(IngestError::Internal("secret path /srv/x".into()));
        assert_eq!(err.to_string(), "Internal server error");
    }
}
