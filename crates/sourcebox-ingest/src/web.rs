//! Web-link adapter.
//!
//! Fetches a page and turns it into content blocks: HTML is flattened to
//! text, plain text passes through, and a PDF yields one block per page
//! named `<url>#page=N`.

use std::time::Duration;

use sourcebox_core::ContentBlock;

use crate::error::{IngestError, Result};
use crate::extract::{self, MIME_PDF};

/// Loads web pages as content blocks.
#[derive(Debug, Clone)]
pub struct WebLoader {
    client: reqwest::Client,
}

impl WebLoader {
    /// Create a loader whose requests time out after `timeout_seconds`.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(timeout_seconds: u64) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_seconds))
            .user_agent(concat!("sourcebox/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| IngestError::Internal(format!("failed to create HTTP client: {e}")))?;

        Ok(Self { client })
    }

    /// Create a loader with a custom reqwest client.
    #[must_use]
    pub const fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }

    /// Fetch one URL.
    ///
    /// # Errors
    ///
    /// Returns `InvalidUrl` for anything but an absolute http(s) URL,
    /// `Fetch` if the request fails or answers with a non-success status,
    /// and `Extract` if the body cannot be read as text.
    pub async fn load(&self, url: &str) -> Result<Vec<ContentBlock>> {
        let parsed = parse_http_url(url)?;

        let response = self
            .client
            .get(parsed.clone())
            .send()
            .await
            .map_err(|e| IngestError::fetch(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(IngestError::fetch(url, format!("HTTP {status}")));
        }

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();

        let bytes = response
            .bytes()
            .await
            .map_err(|e| IngestError::fetch(url, e))?;

        let blocks = if content_type.starts_with(MIME_PDF)
            || (content_type.is_empty() && parsed.path().to_ascii_lowercase().ends_with(".pdf"))
        {
            extract::pdf_pages(bytes.to_vec())
                .await?
                .into_iter()
                .enumerate()
                .map(|(i, page)| ContentBlock::text(format!("{url}#page={}", i + 1), page))
                .collect()
        } else {
            let text = String::from_utf8_lossy(&bytes);
            let content = if is_html(&content_type, &text) {
                extract::html_to_text(&text)
            } else {
                text.into_owned()
            };
            vec![ContentBlock::text(url, content)]
        };

        tracing::debug!(url = %url, blocks = blocks.len(), "Loaded web page");
        Ok(blocks)
    }

    /// Fetch several URLs in order. Stops at the first failure.
    ///
    /// # Errors
    ///
    /// Returns the first error encountered.
    pub async fn load_all(&self, urls: &[String]) -> Result<Vec<ContentBlock>> {
        let mut blocks = Vec::new();
        for url in urls {
            blocks.extend(self.load(url).await?);
        }
        Ok(blocks)
    }
}

fn parse_http_url(url: &str) -> Result<reqwest::Url> {
    let parsed =
        reqwest::Url::parse(url.trim()).map_err(|e| IngestError::InvalidUrl(format!("{url}: {e}")))?;

    match parsed.scheme() {
        "http" | "https" => Ok(parsed),
        other => Err(IngestError::InvalidUrl(format!(
            "{url}: unsupported scheme {other}"
        ))),
    }
}

fn is_html(content_type: &str, body: &str) -> bool {
    if content_type.contains("html") {
        return true;
    }
    content_type.is_empty() && body.trim_start().starts_with('<')
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn html_page_becomes_text() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/page"))
            .respond_with(ResponseTemplate::new(200).set_body_raw(
                "<html><body><h1>Hello</h1><p>Packed world</p></body></html>",
                "text/html; charset=utf-8",
            ))
            .mount(&server)
            .await;

        let url = format!("{}/page", server.uri());
        let blocks = WebLoader::new(5).unwrap().load(&url).await.unwrap();

        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].filename, url);
        assert!(blocks[0].content.contains("Hello"));
        assert!(blocks[0].content.contains("Packed world"));
        assert!(!blocks[0].content.contains("<h1>"));
    }

    #[tokio::test]
    async fn plain_text_passes_through() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/notes.txt"))
            .respond_with(ResponseTemplate::new(200).set_body_raw("<not html>", "text/plain"))
            .mount(&server)
            .await;

        let url = format!("{}/notes.txt", server.uri());
        let blocks = WebLoader::new(5).unwrap().load(&url).await.unwrap();
        assert_eq!(blocks, vec![ContentBlock::text(url, "<not html>")]);
    }

    #[tokio::test]
    async fn error_status_is_a_fetch_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let err = WebLoader::new(5)
            .unwrap()
            .load(&format!("{}/missing", server.uri()))
            .await
            .unwrap_err();
        assert!(matches!(err, IngestError::Fetch { .. }));
    }

    #[tokio::test]
    async fn non_http_urls_are_rejected() {
        let loader = WebLoader::new(5).unwrap();
        assert!(matches!(
            loader.load("file:///etc/passwd").await,
            Err(IngestError::InvalidUrl(_))
        ));
        assert!(matches!(
            loader.load("not a url").await,
            Err(IngestError::InvalidUrl(_))
        ));
    }

    #[tokio::test]
    async fn load_all_keeps_order() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/a"))
            .respond_with(ResponseTemplate::new(200).set_body_raw("first", "text/plain"))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/b"))
            .respond_with(ResponseTemplate::new(200).set_body_raw("second", "text/plain"))
            .mount(&server)
            .await;

        let urls = vec![format!("{}/a", server.uri()), format!("{}/b", server.uri())];
        let blocks = WebLoader::new(5).unwrap().load_all(&urls).await.unwrap();
        let contents: Vec<_> = blocks.iter().map(|b| b.content.as_str()).collect();
        assert_eq!(contents, vec!["first", "second"]);
    }
}
