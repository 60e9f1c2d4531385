//! Core types and utilities for SourceBox.
//!
//! This crate provides the foundational types shared by every SourceBox crate:
//!
//! - **Identifiers**: browser session IDs, remote pack IDs, and the
//!   workspace keys that scope scratch directories to a session
//! - **Content**: the `ContentBlock` produced by every ingestion adapter and
//!   the `Pack` that bundles client-supplied entries for the remote API
//! - **Error types**: common error definitions shared across crates
//!
//! # Example
//!
//! ```
//! use sourcebox_core::{Pack, SessionId, WorkspaceKey};
//!
//! let session_id = SessionId::generate();
//! let key = WorkspaceKey::for_session(&session_id);
//! assert_eq!(key.to_hex().len(), 32);
//!
//! let entry = serde_json::json!({"url": "https://example.com", "content": "hello"});
//! let pack = Pack::new("demo", vec![entry]);
//! assert!(pack.validate().is_ok());
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod content;
pub mod error;
pub mod ids;

pub use content::{ContentBlock, Pack, PackKind};
pub use error::{CoreError, Result};
pub use ids::{IdError, PackId, SessionId, WorkspaceKey};
