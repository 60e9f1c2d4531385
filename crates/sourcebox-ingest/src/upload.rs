//! File upload adapter.
//!
//! Every uploaded file yields either a content block or an entry in the
//! report's `skipped` list. One bad file never aborts the batch.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use sourcebox_core::ContentBlock;

use crate::extract;

/// What to do with files outside the extension allow-list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnsupportedPolicy {
    /// Emit an `is_binary` block with empty content.
    #[default]
    Placeholder,
    /// Emit nothing and record the file as skipped.
    Skip,
}

impl FromStr for UnsupportedPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "placeholder" => Ok(Self::Placeholder),
            "skip" => Ok(Self::Skip),
            other => Err(format!("unknown unsupported-file policy: {other}")),
        }
    }
}

impl fmt::Display for UnsupportedPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Placeholder => f.write_str("placeholder"),
            Self::Skip => f.write_str("skip"),
        }
    }
}

/// One file received from a multipart upload.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    /// Client-supplied file name.
    pub filename: String,
    /// Raw file contents.
    pub bytes: Vec<u8>,
}

impl UploadedFile {
    /// Create an uploaded file.
    #[must_use]
    pub fn new(filename: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            filename: filename.into(),
            bytes: bytes.into(),
        }
    }
}

/// A file that produced no content block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedFile {
    /// The file's name.
    pub filename: String,
    /// Why it was skipped.
    pub reason: String,
}

/// Result of reading a batch of uploads.
#[derive(Debug, Clone, Default, Serialize)]
pub struct UploadReport {
    /// Blocks in upload order.
    pub blocks: Vec<ContentBlock>,
    /// Files that yielded nothing.
    pub skipped: Vec<SkippedFile>,
}

/// Read a batch of uploaded files into content blocks.
pub async fn read_uploads(files: Vec<UploadedFile>, policy: UnsupportedPolicy) -> UploadReport {
    let mut report = UploadReport::default();

    for file in files {
        let UploadedFile { filename, bytes } = file;

        if filename.trim().is_empty() {
            report.skipped.push(SkippedFile {
                filename,
                reason: "no file name".to_string(),
            });
            continue;
        }

        match extract::file_text(&filename, bytes).await {
            Ok(Some(content)) => report.blocks.push(ContentBlock::text(filename, content)),
            Ok(None) => match policy {
                UnsupportedPolicy::Placeholder => {
                    report.blocks.push(ContentBlock::binary_placeholder(filename));
                }
                UnsupportedPolicy::Skip => report.skipped.push(SkippedFile {
                    filename,
                    reason: "unsupported file type".to_string(),
                }),
            },
            Err(e) => {
                tracing::info!(filename = %filename, error = %e, "Skipping unreadable upload");
                report.skipped.push(SkippedFile {
                    filename,
                    reason: e.to_string(),
                });
            }
        }
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn text_file_yields_one_block() {
        let report = read_uploads(
            vec![UploadedFile::new("notes.txt", "hello world")],
            UnsupportedPolicy::default(),
        )
        .await;

        assert_eq!(report.blocks, vec![ContentBlock::text("notes.txt", "hello world")]);
        assert!(report.skipped.is_empty());
    }

    #[tokio::test]
    async fn unsupported_file_gets_placeholder() {
        let report = read_uploads(
            vec![UploadedFile::new("logo.png", vec![0x89, b'P', b'N', b'G'])],
            UnsupportedPolicy::Placeholder,
        )
        .await;

        assert_eq!(report.blocks, vec![ContentBlock::binary_placeholder("logo.png")]);
        assert!(report.skipped.is_empty());
    }

    #[tokio::test]
    async fn unsupported_file_skipped_under_skip_policy() {
        let report = read_uploads(
            vec![UploadedFile::new("logo.png", vec![0x89])],
            UnsupportedPolicy::Skip,
        )
        .await;

        assert!(report.blocks.is_empty());
        assert_eq!(report.skipped.len(), 1);
        assert_eq!(report.skipped[0].filename, "logo.png");
    }

    #[tokio::test]
    async fn bad_file_does_not_abort_batch() {
        let report = read_uploads(
            vec![
                UploadedFile::new("broken.txt", vec![0xff, 0xfe]),
                UploadedFile::new("fake.pdf", "not a pdf"),
                UploadedFile::new("ok.rs", "fn main() {}"),
            ],
            UnsupportedPolicy::Placeholder,
        )
        .await;

        assert_eq!(report.blocks, vec![ContentBlock::text("ok.rs", "fn main() {}")]);
        let skipped: Vec<_> = report.skipped.iter().map(|s| s.filename.as_str()).collect();
        assert_eq!(skipped, vec!["broken.txt", "fake.pdf"]);
    }

    #[test]
    fn policy_parses_from_env_values() {
        assert_eq!("skip".parse::<UnsupportedPolicy>(), Ok(UnsupportedPolicy::Skip));
        assert_eq!(
            " Placeholder ".parse::<UnsupportedPolicy>(),
            Ok(UnsupportedPolicy::Placeholder)
        );
        assert!("drop".parse::<UnsupportedPolicy>().is_err());
    }
}
