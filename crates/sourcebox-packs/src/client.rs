//! HTTP client for the remote pack endpoints.
//!
//! Create calls are validated locally and must be answered with
//! `201 Created`. List and delete are passthroughs: whatever status and body
//! the remote returns is handed back as a [`RemoteReply`].

use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use sourcebox_core::{Pack, PackId, PackKind};

use crate::error::{PackError, Result};

/// A relayed remote answer.
#[derive(Debug, Clone, PartialEq)]
pub struct RemoteReply {
    /// HTTP status returned by the remote API.
    pub status: u16,
    /// Response body. Non-JSON bodies are carried as a JSON string; an
    /// empty body is `null`.
    pub body: serde_json::Value,
}

impl RemoteReply {
    /// Whether the remote answered with a 2xx status.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.status >= 200 && self.status < 300
    }
}

/// Trait for remote pack operations.
///
/// This trait abstracts the pack client interface, allowing for mock
/// implementations in tests.
#[async_trait]
pub trait PackApi: Send + Sync {
    /// Publish a pack. Returns the remote body of the `201` reply.
    ///
    /// # Errors
    ///
    /// Returns `Invalid` if the pack fails validation, `Rejected` for any
    /// non-201 answer, and `Network` if the remote is unreachable.
    async fn create_pack(
        &self,
        token: &str,
        kind: PackKind,
        pack: &Pack,
    ) -> Result<serde_json::Value>;

    /// List the caller's packs of one kind.
    ///
    /// # Errors
    ///
    /// Returns `Network` if the remote is unreachable.
    async fn list_packs(&self, token: &str, kind: PackKind) -> Result<RemoteReply>;

    /// Delete one pack.
    ///
    /// # Errors
    ///
    /// Returns `Network` if the remote is unreachable.
    async fn delete_pack(&self, token: &str, kind: PackKind, id: PackId) -> Result<RemoteReply>;
}

/// HTTP client for the remote pack API.
#[derive(Debug, Clone)]
pub struct HttpPackClient {
    client: reqwest::Client,
    base_url: String,
}

impl HttpPackClient {
    /// Create a new pack client.
    ///
    /// # Arguments
    ///
    /// * `base_url` - The base URL of the remote API (e.g., "https://api.example.com")
    /// * `timeout_seconds` - Per-request timeout
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(base_url: impl Into<String>, timeout_seconds: u64) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_seconds))
            .connect_timeout(Duration::from_secs(5))
            .build()
            .map_err(|e| PackError::Internal(format!("failed to create HTTP client: {e}")))?;

        Ok(Self::with_client(client, base_url))
    }

    /// Create a new pack client with a custom reqwest client.
    #[must_use]
    pub fn with_client(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/packman/{path}", self.base_url)
    }
}

/// Request body for pack creation.
#[derive(Debug, Serialize)]
struct CreatePackRequest<'a> {
    name: &'a str,
    contents: &'a [serde_json::Value],
}

/// Read a response into a [`RemoteReply`] without failing on odd bodies.
async fn relay(response: reqwest::Response) -> RemoteReply {
    let status = response.status().as_u16();
    let text = response.text().await.unwrap_or_default();

    let body = if text.trim().is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_str(&text).unwrap_or(serde_json::Value::String(text))
    };

    RemoteReply { status, body }
}

fn remote_message(body: &serde_json::Value) -> Option<String> {
    body.get("message")
        .and_then(serde_json::Value::as_str)
        .map(ToString::to_string)
}

#[async_trait]
impl PackApi for HttpPackClient {
    async fn create_pack(
        &self,
        token: &str,
        kind: PackKind,
        pack: &Pack,
    ) -> Result<serde_json::Value> {
        pack.validate()?;

        let request = CreatePackRequest {
            name: &pack.name,
            contents: &pack.contents,
        };

        let response = self
            .client
            .post(self.url(kind.resource()))
            .bearer_auth(token)
            .json(&request)
            .send()
            .await
            .map_err(|e| PackError::Network(e.to_string()))?;

        let reply = relay(response).await;
        if reply.status == 201 {
            tracing::info!(
                name = %pack.name,
                kind = ?kind,
                blocks = pack.contents.len(),
                "Published pack"
            );
            return Ok(reply.body);
        }

        let message = remote_message(&reply.body)
            .unwrap_or_else(|| format!("pack service returned status {}", reply.status));

        tracing::error!(
            name = %pack.name,
            kind = ?kind,
            status = reply.status,
            error = %message,
            "Failed to publish pack"
        );

        Err(PackError::Rejected {
            status: reply.status,
            message,
        })
    }

    async fn list_packs(&self, token: &str, kind: PackKind) -> Result<RemoteReply> {
        let response = self
            .client
            .get(self.url(kind.list_resource()))
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| PackError::Network(e.to_string()))?;

        let reply = relay(response).await;
        tracing::debug!(kind = ?kind, status = reply.status, "Listed packs");
        Ok(reply)
    }

    async fn delete_pack(&self, token: &str, kind: PackKind, id: PackId) -> Result<RemoteReply> {
        let response = self
            .client
            .delete(self.url(&format!("{}/{id}", kind.resource())))
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| PackError::Network(e.to_string()))?;

        let reply = relay(response).await;
        tracing::info!(kind = ?kind, pack_id = %id, status = reply.status, "Deleted pack");
        Ok(reply)
    }
}
