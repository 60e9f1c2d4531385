//! Common error types for SourceBox.
//!
//! This module provides shared error types that are used across multiple crates.

use thiserror::Error;

/// A result type using `CoreError`.
pub type Result<T> = std::result::Result<T, CoreError>;

/// Core errors that can occur throughout SourceBox.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A pack was submitted without a name.
    #[error("pack name is required")]
    MissingPackName,

    /// A pack was submitted without any content blocks.
    #[error("pack contents are required")]
    EmptyPack,

    /// An invalid identifier was provided.
    #[error("invalid identifier: {0}")]
    InvalidId(#[from] crate::ids::IdError),
}
