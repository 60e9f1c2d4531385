//! Liveness endpoint for load balancers.
//!
//! `/health` skips the session gate and never creates a session.

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;

use sourcebox_auth::AuthApi;
use sourcebox_packs::PackApi;

use crate::state::GatewayState;

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// `healthy`, or `degraded` when clones and bucket dumps cannot run.
    pub status: &'static str,
    /// Gateway version.
    pub version: &'static str,
    /// Whether the scratch directory root exists.
    pub workspace_ready: bool,
}

/// `GET /health`
///
/// Answers 503 when the workspace root is missing.
///
/// ```text
/// GET /health
///
/// Response: 200 OK
/// {"status": "healthy", "version": "0.1.0", "workspace_ready": true}
/// ```
pub async fn health<A, P>(
    State(state): State<Arc<GatewayState<A, P>>>,
) -> (StatusCode, Json<HealthResponse>)
where
    A: AuthApi + 'static,
    P: PackApi + 'static,
{
    let workspace_ready = tokio::fs::metadata(&state.config.workspace_dir)
        .await
        .is_ok_and(|m| m.is_dir());

    let (code, status) = if workspace_ready {
        (StatusCode::OK, "healthy")
    } else {
        tracing::warn!(
            workspace_dir = %state.config.workspace_dir.display(),
            "Workspace root missing"
        );
        (StatusCode::SERVICE_UNAVAILABLE, "degraded")
    };

    let response = HealthResponse {
        status,
        version: env!("CARGO_PKG_VERSION"),
        workspace_ready,
    };
    (code, Json(response))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GatewayConfig;
    use sourcebox_auth::{AuthConfig, HttpAuthClient};
    use sourcebox_packs::HttpPackClient;

    fn state(workspace_dir: std::path::PathBuf) -> Arc<GatewayState<HttpAuthClient, HttpPackClient>> {
        let config = GatewayConfig {
            workspace_dir,
            ..GatewayConfig::default()
        };
        let auth = Arc::new(HttpAuthClient::new(AuthConfig::new("http://127.0.0.1:9")).unwrap());
        let packs = Arc::new(HttpPackClient::new("http://127.0.0.1:9", 5).unwrap());
        Arc::new(GatewayState::new(auth, packs, config).unwrap())
    }

    #[tokio::test]
    async fn healthy_with_workspace_root() {
        let dir = tempfile::tempdir().unwrap();
        let (code, Json(body)) = health(State(state(dir.path().to_path_buf()))).await;
        assert_eq!(code, StatusCode::OK);
        assert_eq!(body.status, "healthy");
        assert!(body.workspace_ready);
    }

    #[tokio::test]
    async fn degraded_without_workspace_root() {
        let dir = tempfile::tempdir().unwrap();
        let (code, Json(body)) = health(State(state(dir.path().join("gone")))).await;
        assert_eq!(code, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body.status, "degraded");
    }
}
