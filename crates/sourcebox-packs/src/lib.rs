//! Remote pack API client for SourceBox.
//!
//! Packs are owned entirely by the remote API: SourceBox only shapes the
//! request, attaches the user's bearer token, and relays the answer.
//!
//! ```text
//! ┌──────────────┐  POST /packman/pack         ┌──────────────┐
//! │   Gateway    │  POST /packman/code_pack    │  Remote API  │
//! │  (handlers)  │────────────────────────────▶│  (packs)     │
//! │              │  GET  /packman/list_packs   │              │
//! │              │  DELETE /packman/pack/{id}  │              │
//! └──────────────┘                             └──────────────┘
//! ```
//!
//! # Example
//!
//! ```no_run
//! use sourcebox_core::{Pack, PackKind};
//! use sourcebox_packs::{HttpPackClient, PackApi};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = HttpPackClient::new("https://api.example.com", 30)?;
//! let entry = serde_json::json!({"filename": "a.txt", "content": "hello"});
//! let pack = Pack::new("demo", vec![entry]);
//! let created = client.create_pack("token", PackKind::Standard, &pack).await?;
//! println!("{created}");
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod client;
pub mod error;

pub use client::{HttpPackClient, PackApi, RemoteReply};
pub use error::{PackError, Result};
