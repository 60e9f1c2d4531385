//! Content ingestion adapters for SourceBox.
//!
//! Each adapter turns one kind of input into [`ContentBlock`]s:
//!
//! - [`web`] - fetch a URL and extract its text (HTML, plain text, PDF)
//! - [`upload`] - read uploaded files against an extension allow-list
//! - [`git`] - clone a repository with the `git` client and list its files
//! - [`s3`] - download public S3 objects without request signing
//!
//! Scratch directories for the git and S3 adapters are scoped per session
//! by [`Workspaces`].
//!
//! [`ContentBlock`]: sourcebox_core::ContentBlock

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod error;
pub mod extract;
pub mod git;
pub mod retry;
pub mod s3;
pub mod upload;
pub mod web;
pub mod workspace;

pub use error::{IngestError, Result};
pub use retry::RetryPolicy;
pub use s3::{S3Client, S3Location};
pub use upload::{read_uploads, SkippedFile, UnsupportedPolicy, UploadReport, UploadedFile};
pub use web::WebLoader;
pub use workspace::Workspaces;
