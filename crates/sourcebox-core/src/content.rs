//! Content blocks and packs.
//!
//! Every ingestion adapter normalizes its input into [`ContentBlock`]s. A
//! [`Pack`] bundles content under a user-supplied name for the remote API.
//! Pack contents stay as the caller's JSON so the remote sees them verbatim.

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};

/// A unit of extracted content.
///
/// On the wire this is `{"filename", "content", "is_binary"}`, with
/// `is_binary` omitted when false.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentBlock {
    /// File name, object key, or URL the content came from.
    pub filename: String,
    /// Extracted plain text. Empty for binary placeholders.
    #[serde(default)]
    pub content: String,
    /// Whether this block stands in for a binary file with no text.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_binary: bool,
}

impl ContentBlock {
    /// Create a text block.
    #[must_use]
    pub fn text(filename: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            filename: filename.into(),
            content: content.into(),
            is_binary: false,
        }
    }

    /// Create a placeholder block for a binary file.
    #[must_use]
    pub fn binary_placeholder(filename: impl Into<String>) -> Self {
        Self {
            filename: filename.into(),
            content: String::new(),
            is_binary: true,
        }
    }
}

/// Which family of remote endpoints a pack belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PackKind {
    /// General content packs (`/packman/pack`).
    Standard,
    /// Source-code oriented packs (`/packman/code_pack`).
    Code,
}

impl PackKind {
    /// Remote path segment for create and delete.
    #[must_use]
    pub const fn resource(self) -> &'static str {
        match self {
            Self::Standard => "pack",
            Self::Code => "code_pack",
        }
    }

    /// Remote path segment for listing.
    #[must_use]
    pub const fn list_resource(self) -> &'static str {
        match self {
            Self::Standard => "list_packs",
            Self::Code => "list_code_packs",
        }
    }
}

/// A named bundle of content.
///
/// Each entry of `contents` is whatever the client sent: usually a
/// [`ContentBlock`] or a `{"url", "content"}` preview document, with any
/// extra fields kept.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pack {
    /// User-supplied pack name.
    pub name: String,
    /// The bundled entries, forwarded as-is.
    pub contents: Vec<serde_json::Value>,
}

impl Pack {
    /// Create a pack.
    #[must_use]
    pub fn new(name: impl Into<String>, contents: Vec<serde_json::Value>) -> Self {
        Self {
            name: name.into(),
            contents,
        }
    }

    /// Check required-field presence.
    ///
    /// # Errors
    ///
    /// Returns an error if the name is blank or there are no contents.
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(CoreError::MissingPackName);
        }
        if self.contents.is_empty() {
            return Err(CoreError::EmptyPack);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn text_block_omits_binary_flag() {
        let block = ContentBlock::text("a.txt", "hello");
        let json = serde_json::to_value(&block).unwrap();
        assert_eq!(
            json,
            json!({"filename": "a.txt", "content": "hello"})
        );
    }

    #[test]
    fn placeholder_block_is_flagged() {
        let block = ContentBlock::binary_placeholder("logo.png");
        let json = serde_json::to_value(&block).unwrap();
        assert_eq!(json["is_binary"], true);
        assert_eq!(json["content"], "");
    }

    #[test]
    fn pack_validation() {
        let entry = json!({"filename": "a", "content": "b"});
        assert!(Pack::new("demo", vec![entry.clone()]).validate().is_ok());
        assert!(matches!(
            Pack::new("  ", vec![entry]).validate(),
            Err(CoreError::MissingPackName)
        ));
        assert!(matches!(
            Pack::new("demo", Vec::new()).validate(),
            Err(CoreError::EmptyPack)
        ));
    }

    #[test]
    fn pack_kind_paths() {
        assert_eq!(PackKind::Standard.resource(), "pack");
        assert_eq!(PackKind::Code.resource(), "code_pack");
        assert_eq!(PackKind::Code.list_resource(), "list_code_packs");
    }
}
