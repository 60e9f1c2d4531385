//! Gateway application state.
//!
//! This module defines the shared state that is available to all request handlers.

use std::sync::Arc;

use sourcebox_auth::AuthApi;
use sourcebox_ingest::{RetryPolicy, S3Client, WebLoader, Workspaces};
use sourcebox_packs::PackApi;

use crate::config::GatewayConfig;
use crate::session::SessionStore;

/// Shared application state for the gateway.
///
/// This struct holds references to all services needed by the HTTP handlers.
pub struct GatewayState<A, P>
where
    A: AuthApi,
    P: PackApi,
{
    /// Client for the remote auth API.
    pub auth: Arc<A>,
    /// Client for the remote pack API.
    pub packs: Arc<P>,
    /// Browser sessions.
    pub sessions: Arc<SessionStore>,
    /// Per-session scratch directories.
    pub workspaces: Arc<Workspaces>,
    /// Web-link loader.
    pub web: WebLoader,
    /// Public S3 client.
    pub s3: S3Client,
    /// Gateway configuration.
    pub config: GatewayConfig,
}

impl<A, P> GatewayState<A, P>
where
    A: AuthApi,
    P: PackApi,
{
    /// Create a new gateway state.
    ///
    /// # Errors
    ///
    /// Returns an error if an outbound HTTP client cannot be built.
    pub fn new(auth: Arc<A>, packs: Arc<P>, config: GatewayConfig) -> sourcebox_ingest::Result<Self> {
        let web = WebLoader::new(config.http_timeout_seconds)?;
        let s3 = S3Client::new(config.s3_endpoint.clone(), config.http_timeout_seconds)?;

        Ok(Self {
            auth,
            packs,
            sessions: Arc::new(SessionStore::new(config.session_idle())),
            workspaces: Arc::new(Workspaces::new(config.workspace_dir.clone())),
            web,
            s3,
            config,
        })
    }

    /// Drop idle sessions and delete their scratch directories.
    ///
    /// Returns the number of sessions removed.
    pub async fn reap_expired_sessions(&self) -> usize {
        let expired = self.sessions.purge_expired();

        for id in &expired {
            let key = sourcebox_core::WorkspaceKey::for_session(id);
            if let Err(e) = self
                .workspaces
                .clear(key, RetryPolicy::CHECKOUT, RetryPolicy::ONCE)
                .await
            {
                tracing::warn!(workspace = %key, error = %e, "Failed to clear expired workspace");
            }
            self.workspaces.release(key);
        }

        if !expired.is_empty() {
            tracing::info!(count = expired.len(), "Reaped expired sessions");
        }
        expired.len()
    }
}

impl<A, P> Clone for GatewayState<A, P>
where
    A: AuthApi,
    P: PackApi,
{
    fn clone(&self) -> Self {
        Self {
            auth: Arc::clone(&self.auth),
            packs: Arc::clone(&self.packs),
            sessions: Arc::clone(&self.sessions),
            workspaces: Arc::clone(&self.workspaces),
            web: self.web.clone(),
            s3: self.s3.clone(),
            config: self.config.clone(),
        }
    }
}
