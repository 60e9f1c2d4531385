//! Remote authentication API client for SourceBox.
//!
//! SourceBox owns no accounts. Every credential check is forwarded to the
//! central auth API, which issues opaque bearer tokens:
//!
//! - Email/password login and registration
//! - Token validation (`/user_history`)
//! - The two-step premium lookup that gates the S3 features
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────┐     ┌──────────────────┐
//! │   Gateway        │────▶│   AuthApi        │
//! │   (session gate) │     │   (trait)        │
//! └──────────────────┘     └────────┬─────────┘
//!                                   │
//!                          ┌────────▼─────────┐
//!                          │  HttpAuthClient  │
//!                          └────────┬─────────┘
//!                                   │ HTTPS
//!                          ┌────────▼─────────┐
//!                          │  Central auth    │
//!                          │  API             │
//!                          └──────────────────┘
//! ```
//!
//! # Example
//!
//! ```no_run
//! use sourcebox_auth::{AuthApi, AuthConfig, HttpAuthClient, LoginRequest};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = HttpAuthClient::new(AuthConfig::default())?;
//!
//! let login = client
//!     .login(LoginRequest {
//!         email: "user@example.com".to_string(),
//!         password: "secret".to_string(),
//!     })
//!     .await?;
//!
//! client.whoami(&login.access_token).await?;
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod client;
pub mod entitlement;
pub mod error;

pub use client::{AuthApi, HttpAuthClient, LoginRequest, LoginResponse, RegisterRequest};
pub use entitlement::{resolve_entitlement, Entitlement};
pub use error::{AuthError, Result};

/// Default base URL of the central auth API.
pub const DEFAULT_API_URL: &str = "https://sourcebox-central-auth-8396932a641c.herokuapp.com";

/// Configuration for the remote auth API.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// Base URL of the remote API, without a trailing slash.
    pub base_url: String,
    /// Per-request timeout, in seconds.
    pub timeout_seconds: u64,
}

impl AuthConfig {
    /// Create a configuration for the given base URL.
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            ..Self::default()
        }
    }

    /// Get the login endpoint URL.
    #[must_use]
    pub fn login_url(&self) -> String {
        format!("{}/login", self.base_url)
    }

    /// Get the registration endpoint URL.
    #[must_use]
    pub fn register_url(&self) -> String {
        format!("{}/register", self.base_url)
    }

    /// Get the token validation endpoint URL.
    #[must_use]
    pub fn whoami_url(&self) -> String {
        format!("{}/user_history", self.base_url)
    }

    /// Get the user id lookup endpoint URL.
    #[must_use]
    pub fn user_id_url(&self) -> String {
        format!("{}/user/id", self.base_url)
    }

    /// Get the premium status endpoint URL for a user.
    #[must_use]
    pub fn premium_status_url(&self, user_id: &str) -> String {
        format!("{}/user/{user_id}/premium/status", self.base_url)
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_URL.to_string(),
            timeout_seconds: 30,
        }
    }
}
