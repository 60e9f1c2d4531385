//! HTTP gateway for SourceBox.
//!
//! This crate is the browser-facing application. It handles:
//!
//! - Server-side sessions keyed by a cookie, holding the bearer token
//! - Token validation before every non-public request
//! - Login and registration proxied to the remote auth API
//! - Content ingestion from links, uploads, git repositories and S3
//! - Pack publishing, listing and deletion against the remote API
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                         Browser                             │
//! │                  (cookie: sourcebox_session)                │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    sourcebox-gateway                        │
//! │  ┌─────────────┐ ┌─────────────┐ ┌─────────────────────┐    │
//! │  │  Session    │ │   Router    │ │   Per-session       │    │
//! │  │  Gate       │ │  + Handlers │ │   Workspaces        │    │
//! │  └─────────────┘ └─────────────┘ └─────────────────────┘    │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!               ┌──────────────┼──────────────┬──────────────┐
//!               ▼              ▼              ▼              ▼
//!        ┌──────────┐   ┌──────────┐   ┌──────────┐   ┌──────────┐
//!        │ Auth API │   │ Pack API │   │   git    │   │ S3 / Web │
//!        └──────────┘   └──────────┘   └──────────┘   └──────────┘
//! ```
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use sourcebox_auth::{AuthConfig, HttpAuthClient};
//! use sourcebox_gateway::{create_router, GatewayConfig, GatewayState};
//! use sourcebox_packs::HttpPackClient;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = GatewayConfig::default();
//!
//! let auth = Arc::new(HttpAuthClient::new(AuthConfig::new(config.api_url.clone()))?);
//! let packs = Arc::new(HttpPackClient::new(
//!     config.api_url.clone(),
//!     config.http_timeout_seconds,
//! )?);
//!
//! let state = GatewayState::new(auth, packs, config)?;
//! let app = create_router(state);
//!
//! let listener = tokio::net::TcpListener::bind("0.0.0.0:8080").await?;
//! axum::serve(listener, app).await?;
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod routes;
pub mod session;
pub mod state;

pub use config::{ConfigError, GatewayConfig};
pub use error::ApiError;
pub use routes::create_router;
pub use session::{Session, SessionStore};
pub use state::GatewayState;

// Re-export key types for convenience
pub use auth::{AuthUser, PremiumUser};
