//! Text extraction helpers shared by the adapters.
//!
//! Files are classified by extension into plain text (source code, markup,
//! data files), PDF, or unsupported. PDF parsing is CPU-bound and runs on the
//! blocking thread pool.

use std::path::Path;

use crate::error::{IngestError, Result};

/// MIME type of PDF documents.
pub const MIME_PDF: &str = "application/pdf";

/// Extensions read as UTF-8 text.
const TEXT_EXTENSIONS: &[&str] = &[
    // prose and data
    "txt", "md", "markdown", "rst", "adoc", "csv", "tsv", "log", "json", "jsonl", "yaml", "yml",
    "toml", "ini", "cfg", "conf", "env", "xml", "svg", "tex",
    // markup and styles
    "html", "htm", "xhtml", "css", "scss", "sass", "less", "vue", "svelte",
    // code
    "rs", "py", "pyi", "js", "mjs", "cjs", "jsx", "ts", "tsx", "go", "java", "kt", "kts", "scala",
    "c", "h", "cc", "cpp", "cxx", "hpp", "hh", "cs", "fs", "swift", "m", "mm", "rb", "php", "pl",
    "pm", "lua", "r", "jl", "dart", "ex", "exs", "erl", "hs", "ml", "clj", "zig", "nim", "sh",
    "bash", "zsh", "fish", "ps1", "bat", "sql", "graphql", "proto", "gradle", "cmake", "ipynb",
];

/// File names without a useful extension that are still text.
const TEXT_FILE_NAMES: &[&str] = &[
    "Dockerfile",
    "Makefile",
    "LICENSE",
    "README",
    "Gemfile",
    "Procfile",
    ".gitignore",
    ".dockerignore",
    ".editorconfig",
];

/// How a file should be read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    /// UTF-8 text.
    Text,
    /// PDF document.
    Pdf,
    /// Not on the allow-list.
    Unsupported,
}

/// Classify a file by name.
#[must_use]
pub fn classify(filename: &str) -> FileKind {
    let path = Path::new(filename);

    if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
        if TEXT_FILE_NAMES.contains(&name) {
            return FileKind::Text;
        }
    }

    let Some(ext) = path.extension().and_then(|e| e.to_str()) else {
        return FileKind::Unsupported;
    };
    let ext = ext.to_ascii_lowercase();

    if ext == "pdf" {
        FileKind::Pdf
    } else if TEXT_EXTENSIONS.contains(&ext.as_str()) {
        FileKind::Text
    } else {
        FileKind::Unsupported
    }
}

/// Decode bytes as strict UTF-8.
///
/// # Errors
///
/// Returns `Extract` if the bytes are not valid UTF-8.
pub fn decode_text(bytes: Vec<u8>) -> Result<String> {
    String::from_utf8(bytes)
        .map_err(|e| IngestError::Extract(format!("not valid UTF-8: {}", e.utf8_error())))
}

/// Extract the text of each page of a PDF. Blocking.
///
/// # Errors
///
/// Returns `Extract` if the document cannot be parsed.
pub fn pdf_pages_blocking(bytes: &[u8]) -> Result<Vec<String>> {
    pdf_extract::extract_text_from_mem_by_pages(bytes)
        .map_err(|e| IngestError::Extract(format!("PDF extraction failed: {e}")))
}

/// Extract the text of each page of a PDF on the blocking pool.
///
/// # Errors
///
/// Returns `Extract` if the document cannot be parsed.
pub async fn pdf_pages(bytes: Vec<u8>) -> Result<Vec<String>> {
    tokio::task::spawn_blocking(move || pdf_pages_blocking(&bytes))
        .await
        .map_err(|e| IngestError::Internal(format!("PDF extraction task failed: {e}")))?
}

/// Read one file's text according to its kind. PDF pages are joined with
/// blank lines.
///
/// Returns `None` for files outside the allow-list.
///
/// # Errors
///
/// Returns `Extract` if the file is on the allow-list but cannot be read.
pub async fn file_text(filename: &str, bytes: Vec<u8>) -> Result<Option<String>> {
    match classify(filename) {
        FileKind::Text => decode_text(bytes).map(Some),
        FileKind::Pdf => Ok(Some(pdf_pages(bytes).await?.join("\n\n"))),
        FileKind::Unsupported => Ok(None),
    }
}

/// Blocking counterpart of [`file_text`] for callers already on the
/// blocking pool.
///
/// # Errors
///
/// Returns `Extract` if the file is on the allow-list but cannot be read.
pub fn file_text_blocking(filename: &str, bytes: Vec<u8>) -> Result<Option<String>> {
    match classify(filename) {
        FileKind::Text => decode_text(bytes).map(Some),
        FileKind::Pdf => Ok(Some(pdf_pages_blocking(&bytes)?.join("\n\n"))),
        FileKind::Unsupported => Ok(None),
    }
}

/// Convert an HTML document to plain text.
#[must_use]
pub fn html_to_text(html: &str) -> String {
    nanohtml2text::html2text(html)
}
