//! Unsigned S3 adapter.
//!
//! Reads public buckets over plain HTTPS: objects are fetched with `GET`
//! and buckets are enumerated with paginated `ListObjectsV2` calls. No
//! credentials are sent. Downloads keep each key's relative path under the
//! session's dump directory.

use std::collections::HashSet;
use std::fmt::Write as _;
use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};
use std::time::Duration;

use futures::stream::{self, StreamExt, TryStreamExt};
use quick_xml::events::Event;
use sourcebox_core::ContentBlock;

use crate::error::{IngestError, Result};
use crate::extract;

/// Objects downloaded in parallel during a bucket dump.
const DOWNLOAD_CONCURRENCY: usize = 8;

/// A parsed bucket or object reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct S3Location {
    /// Bucket name.
    pub bucket: String,
    /// Object key, or key prefix when dumping a bucket.
    pub key: Option<String>,
    /// Region from the host name, if the URL named one.
    pub region: Option<String>,
}

impl S3Location {
    /// Parse an S3 URL.
    ///
    /// Accepted forms:
    ///
    /// - `s3://bucket/key`
    /// - `https://bucket.s3.amazonaws.com/key` (optionally `s3.<region>` or `s3-<region>`)
    /// - `https://s3.amazonaws.com/bucket/key` (optionally with a region)
    ///
    /// # Errors
    ///
    /// Returns `InvalidUrl` for anything else.
    pub fn parse(input: &str) -> Result<Self> {
        let input = input.trim();
        let invalid = || IngestError::InvalidUrl(input.to_string());

        if let Some(rest) = input.strip_prefix("s3://") {
            let (bucket, key) = split_once_or_all(rest);
            return Self::build(bucket, key, None).ok_or_else(invalid);
        }

        let url = reqwest::Url::parse(input).map_err(|_| invalid())?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(invalid());
        }
        let host = url.host_str().ok_or_else(invalid)?;
        let path = url.path().trim_start_matches('/');

        let Some(service) = host.strip_suffix(".amazonaws.com") else {
            return Err(invalid());
        };

        // Path-style: s3[.region|-region]/bucket/key
        if let Some(region) = region_of(service) {
            let (bucket, key) = split_once_or_all(path);
            return Self::build(bucket, key, region).ok_or_else(invalid);
        }

        // Virtual-hosted: bucket.s3[.region|-region]/key
        let (bucket, service) = service
            .split_once(".s3")
            .map(|(b, s)| (b, format!("s3{s}")))
            .ok_or_else(invalid)?;
        let region = region_of(&service).ok_or_else(invalid)?;
        Self::build(bucket, Some(path), region).ok_or_else(invalid)
    }

    fn build(bucket: &str, key: Option<&str>, region: Option<String>) -> Option<Self> {
        if bucket.is_empty() || bucket.contains('/') {
            return None;
        }
        Some(Self {
            bucket: bucket.to_string(),
            key: key.filter(|k| !k.is_empty()).map(ToString::to_string),
            region,
        })
    }
}

fn split_once_or_all(s: &str) -> (&str, Option<&str>) {
    match s.split_once('/') {
        Some((head, tail)) => (head, Some(tail)),
        None => (s, None),
    }
}

/// Region named by an `s3`, `s3.<region>` or `s3-<region>` host label.
///
/// The outer `Option` is `None` when the label is not an S3 endpoint.
#[allow(clippy::option_option)]
fn region_of(service: &str) -> Option<Option<String>> {
    if service == "s3" {
        return Some(None);
    }
    let region = service
        .strip_prefix("s3.")
        .or_else(|| service.strip_prefix("s3-"))?;
    let region = region.strip_prefix("dualstack.").unwrap_or(region);
    if region.is_empty() || region.contains('.') {
        return None;
    }
    Some(Some(region.to_string()))
}

/// Map an object key to a path relative to the dump directory.
///
/// # Errors
///
/// Returns `InvalidPath` for empty or absolute keys and keys containing
/// `.` or `..` segments.
pub fn safe_relative_path(key: &str) -> Result<PathBuf> {
    let path = Path::new(key);
    let valid = !key.is_empty()
        && !key.contains('\\')
        && path.components().all(|c| matches!(c, Component::Normal(_)));

    if valid {
        Ok(path.to_path_buf())
    } else {
        Err(IngestError::InvalidPath(key.to_string()))
    }
}

/// One page of a `ListObjectsV2` response.
#[derive(Debug, Default, PartialEq, Eq)]
struct ListPage {
    keys: Vec<String>,
    next_token: Option<String>,
}

fn parse_list_page(xml: &str) -> Result<ListPage> {
    // Keys may begin or end with spaces, so text is read untrimmed and only
    // kept inside the elements of interest.
    let mut reader = quick_xml::Reader::from_str(xml);

    let mut page = ListPage::default();
    let mut truncated = false;
    let mut in_contents = false;
    let mut text = String::new();

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                if e.local_name().as_ref() == b"Contents" {
                    in_contents = true;
                }
                text.clear();
            }
            Ok(Event::Text(t)) => {
                let unescaped = t
                    .unescape()
                    .map_err(|e| IngestError::Extract(format!("bad listing XML: {e}")))?;
                text.push_str(&unescaped);
            }
            Ok(Event::End(e)) => {
                match e.local_name().as_ref() {
                    b"Contents" => in_contents = false,
                    // Zero-byte "folder" markers carry no content.
                    b"Key" if in_contents && !text.is_empty() && !text.ends_with('/') => {
                        page.keys.push(std::mem::take(&mut text));
                    }
                    b"IsTruncated" => truncated = text.trim() == "true",
                    b"NextContinuationToken" => page.next_token = Some(text.clone()),
                    _ => {}
                }
                text.clear();
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => return Err(IngestError::Extract(format!("bad listing XML: {e}"))),
        }
    }

    if !truncated {
        page.next_token = None;
    }
    Ok(page)
}

/// Reject listings where one key is a parent directory of another, since
/// both cannot exist on disk.
fn check_key_collisions(keys: &[String]) -> Result<()> {
    let all: HashSet<&str> = keys.iter().map(String::as_str).collect();
    for key in keys {
        let mut parent = key.as_str();
        while let Some((head, _)) = parent.rsplit_once('/') {
            if all.contains(head) {
                return Err(IngestError::InvalidPath(format!(
                    "{head} is both an object and a prefix of {key}"
                )));
            }
            parent = head;
        }
    }
    Ok(())
}

/// Check that `relative` can be written under `dump_dir` without a file
/// standing where a directory is needed, or the reverse.
async fn check_dump_target(dump_dir: &Path, key: &str, relative: &Path) -> Result<()> {
    let mut current = dump_dir.to_path_buf();
    let mut components = relative.components().peekable();

    while let Some(component) = components.next() {
        current.push(component);
        let is_last = components.peek().is_none();
        match tokio::fs::metadata(&current).await {
            Ok(meta) if meta.is_dir() == is_last => {
                return Err(IngestError::InvalidPath(format!(
                    "{key} conflicts with an existing dump entry"
                )));
            }
            Ok(_) => {}
            Err(e) if e.kind() == ErrorKind::NotFound => break,
            Err(e) => return Err(e.into()),
        }
    }
    Ok(())
}

/// Client for public S3 buckets.
#[derive(Debug, Clone)]
pub struct S3Client {
    client: reqwest::Client,
    endpoint: Option<String>,
}

impl S3Client {
    /// Create a client for the public AWS endpoints, or for a path-style
    /// `endpoint` such as a local S3-compatible server.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(endpoint: Option<String>, timeout_seconds: u64) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_seconds))
            .build()
            .map_err(|e| IngestError::Internal(format!("failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            endpoint: endpoint.map(|e| e.trim_end_matches('/').to_string()),
        })
    }

    fn bucket_url(&self, location: &S3Location) -> String {
        match (&self.endpoint, &location.region) {
            (Some(endpoint), _) => format!("{endpoint}/{}", location.bucket),
            (None, Some(region)) => {
                format!("https://{}.s3.{region}.amazonaws.com", location.bucket)
            }
            (None, None) => format!("https://{}.s3.amazonaws.com", location.bucket),
        }
    }

    fn object_url(&self, location: &S3Location, key: &str) -> String {
        let encoded: Vec<String> = key.split('/').map(encode_segment).collect();
        format!("{}/{}", self.bucket_url(location), encoded.join("/"))
    }

    /// List every object key under the location's prefix, following
    /// continuation tokens across pages.
    ///
    /// # Errors
    ///
    /// Returns `Fetch` if a listing request fails.
    pub async fn list_keys(&self, location: &S3Location) -> Result<Vec<String>> {
        let url = self.bucket_url(location);
        let mut keys = Vec::new();
        let mut token: Option<String> = None;

        loop {
            let mut query = vec![("list-type", "2".to_string())];
            if let Some(prefix) = &location.key {
                query.push(("prefix", prefix.clone()));
            }
            if let Some(token) = &token {
                query.push(("continuation-token", token.clone()));
            }

            let response = self
                .client
                .get(&url)
                .query(&query)
                .send()
                .await
                .map_err(|e| IngestError::fetch(&url, e))?;

            let status = response.status();
            if !status.is_success() {
                return Err(IngestError::fetch(
                    &url,
                    format!("ListObjectsV2 returned HTTP {status}"),
                ));
            }

            let body = response
                .text()
                .await
                .map_err(|e| IngestError::fetch(&url, e))?;
            let page = parse_list_page(&body)?;
            keys.extend(page.keys);

            match page.next_token {
                Some(next) => token = Some(next),
                None => break,
            }
        }

        tracing::debug!(bucket = %location.bucket, count = keys.len(), "Listed bucket");
        Ok(keys)
    }

    /// Download one object to `dump_dir/<key>`.
    ///
    /// # Errors
    ///
    /// Returns `InvalidPath` for unsafe keys and `Fetch` if the download
    /// fails.
    pub async fn download_object(
        &self,
        location: &S3Location,
        key: &str,
        dump_dir: &Path,
    ) -> Result<String> {
        let relative = safe_relative_path(key)?;
        check_dump_target(dump_dir, key, &relative).await?;
        let url = self.object_url(location, key);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| IngestError::fetch(&url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(IngestError::fetch(&url, format!("HTTP {status}")));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| IngestError::fetch(&url, e))?;

        let target = dump_dir.join(&relative);
        if let Some(parent) = target.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&target, &bytes).await?;

        tracing::debug!(bucket = %location.bucket, key = %key, bytes = bytes.len(), "Downloaded object");
        Ok(key.to_string())
    }

    /// Download the single object a location names.
    ///
    /// # Errors
    ///
    /// Returns `InvalidUrl` if the location has no key, otherwise as
    /// [`Self::download_object`].
    pub async fn download_single(&self, location: &S3Location, dump_dir: &Path) -> Result<String> {
        let key = location
            .key
            .as_deref()
            .ok_or_else(|| IngestError::InvalidUrl("an object key is required".to_string()))?;
        self.download_object(location, key, dump_dir).await
    }

    /// Download every object under the location's prefix. Returns the keys
    /// in listing order.
    ///
    /// All keys are checked before anything is written, so a listing with
    /// an unsafe key, or with a key that is also a prefix of another key,
    /// downloads nothing.
    ///
    /// # Errors
    ///
    /// Returns `InvalidPath` for unsafe or colliding keys and `Fetch` if
    /// listing or any download fails.
    pub async fn dump_bucket(&self, location: &S3Location, dump_dir: &Path) -> Result<Vec<String>> {
        let keys = self.list_keys(location).await?;
        for key in &keys {
            safe_relative_path(key)?;
        }
        check_key_collisions(&keys)?;

        stream::iter(keys.iter().cloned())
            .map(|key| async move { self.download_object(location, &key, dump_dir).await })
            .buffer_unordered(DOWNLOAD_CONCURRENCY)
            .try_collect::<Vec<_>>()
            .await?;

        tracing::info!(bucket = %location.bucket, objects = keys.len(), "Dumped bucket");
        Ok(keys)
    }
}

/// Percent-encode one path segment of an object key.
fn encode_segment(segment: &str) -> String {
    let mut out = String::with_capacity(segment.len());
    for byte in segment.bytes() {
        if byte.is_ascii_alphanumeric() || matches!(byte, b'-' | b'_' | b'.' | b'~') {
            out.push(char::from(byte));
        } else {
            let _ = write!(out, "%{byte:02X}");
        }
    }
    out
}

/// Read a dump directory back as content blocks, sorted by relative path.
///
/// Text and PDF files become text blocks; other files become binary
/// placeholders. A missing directory yields no blocks.
///
/// # Errors
///
/// Returns an I/O error if the directory cannot be walked.
pub async fn read_dump(dump_dir: &Path) -> Result<Vec<ContentBlock>> {
    let root = dump_dir.to_path_buf();
    tokio::task::spawn_blocking(move || read_dump_blocking(&root))
        .await
        .map_err(|e| IngestError::Internal(format!("dump reader failed: {e}")))?
}

fn read_dump_blocking(root: &Path) -> Result<Vec<ContentBlock>> {
    if !root.exists() {
        return Ok(Vec::new());
    }

    let mut blocks = Vec::new();
    for entry in walkdir::WalkDir::new(root).sort_by_file_name() {
        let entry = entry.map_err(|e| {
            e.into_io_error()
                .map_or_else(|| IngestError::Internal("dump walk failed".to_string()), IngestError::Io)
        })?;
        if !entry.file_type().is_file() {
            continue;
        }

        let relative = entry
            .path()
            .strip_prefix(root)
            .map_err(|e| IngestError::Internal(e.to_string()))?;
        let name = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");

        let bytes = match std::fs::read(entry.path()) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => continue,
            Err(e) => return Err(e.into()),
        };

        let block = match extract::file_text_blocking(&name, bytes) {
            Ok(Some(text)) => ContentBlock::text(name, text),
            Ok(None) => ContentBlock::binary_placeholder(name),
            Err(e) => {
                tracing::info!(file = %name, error = %e, "Unreadable dump file");
                ContentBlock::binary_placeholder(name)
            }
        };
        blocks.push(block);
    }

    blocks.sort_by(|a, b| a.filename.cmp(&b.filename));
    Ok(blocks)
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path, query_param, query_param_is_missing};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn listing(keys: &[&str], next: Option<&str>) -> String {
        let contents: String = keys
            .iter()
            .map(|k| format!("<Contents><Key>{k}</Key><Size>1</Size></Contents>"))
            .collect();
        let tail = next.map_or_else(
            || "<IsTruncated>false</IsTruncated>".to_string(),
            |t| format!("<IsTruncated>true</IsTruncated><NextContinuationToken>{t}</NextContinuationToken>"),
        );
        format!(
            r#"<?xml version="1.0" encoding="UTF-8"?><ListBucketResult xmlns="http://s3.amazonaws.com/doc/2006-03-01/"><Name>b</Name>{contents}{tail}</ListBucketResult>"#
        )
    }

    #[test]
    fn parses_s3_scheme() {
        let loc = S3Location::parse("s3://my-bucket/dir/file.txt").unwrap();
        assert_eq!(loc.bucket, "my-bucket");
        assert_eq!(loc.key.as_deref(), Some("dir/file.txt"));
        assert_eq!(loc.region, None);

        let bucket_only = S3Location::parse("s3://my-bucket").unwrap();
        assert_eq!(bucket_only.key, None);
    }

    #[test]
    fn parses_virtual_hosted_urls() {
        let loc = S3Location::parse("https://my-bucket.s3.amazonaws.com/a/b.txt").unwrap();
        assert_eq!(loc.bucket, "my-bucket");
        assert_eq!(loc.key.as_deref(), Some("a/b.txt"));

        let regional = S3Location::parse("https://my-bucket.s3.eu-west-1.amazonaws.com/").unwrap();
        assert_eq!(regional.region.as_deref(), Some("eu-west-1"));
        assert_eq!(regional.key, None);

        let dashed = S3Location::parse("https://my-bucket.s3-us-west-2.amazonaws.com/k").unwrap();
        assert_eq!(dashed.region.as_deref(), Some("us-west-2"));
    }

    #[test]
    fn parses_path_style_urls() {
        let loc = S3Location::parse("https://s3.us-east-2.amazonaws.com/my-bucket/x.csv").unwrap();
        assert_eq!(loc.bucket, "my-bucket");
        assert_eq!(loc.key.as_deref(), Some("x.csv"));
        assert_eq!(loc.region.as_deref(), Some("us-east-2"));
    }

    #[test]
    fn rejects_other_urls() {
        assert!(S3Location::parse("https://example.com/bucket/key").is_err());
        assert!(S3Location::parse("ftp://bucket.s3.amazonaws.com/key").is_err());
        assert!(S3Location::parse("s3://").is_err());
        assert!(S3Location::parse("").is_err());
    }

    #[test]
    fn unsafe_keys_are_rejected() {
        assert!(safe_relative_path("a/b/c.txt").is_ok());
        assert!(safe_relative_path("../etc/passwd").is_err());
        assert!(safe_relative_path("a/../../b").is_err());
        assert!(safe_relative_path("/abs").is_err());
        assert!(safe_relative_path("").is_err());
        assert!(safe_relative_path("a\\..\\b").is_err());
    }

    #[test]
    fn listing_page_parsing() {
        let page = parse_list_page(&listing(&["a.txt", "dir/", "dir/b.txt"], Some("t1"))).unwrap();
        assert_eq!(page.keys, vec!["a.txt", "dir/b.txt"]);
        assert_eq!(page.next_token.as_deref(), Some("t1"));

        let last = parse_list_page(&listing(&["c.txt"], None)).unwrap();
        assert_eq!(last.next_token, None);
    }

    #[test]
    fn listing_keeps_surrounding_spaces_in_keys() {
        let page = parse_list_page(&listing(&[" padded name.txt ", "a &amp; b.txt"], None)).unwrap();
        assert_eq!(page.keys, vec![" padded name.txt ", "a & b.txt"]);
    }

    #[test]
    fn object_urls_encode_spaces() {
        let client = S3Client::new(Some("http://s3.local".to_string()), 5).unwrap();
        let location = S3Location::parse("s3://bucket").unwrap();
        assert_eq!(
            client.object_url(&location, " dir/my file.txt"),
            "http://s3.local/bucket/%20dir/my%20file.txt"
        );
    }

    #[test]
    fn key_that_is_also_a_prefix_collides() {
        let keys = vec!["a".to_string(), "a/b".to_string()];
        assert!(matches!(
            check_key_collisions(&keys),
            Err(IngestError::InvalidPath(_))
        ));

        let fine = vec!["a/b".to_string(), "a/c/d".to_string(), "ab".to_string()];
        assert!(check_key_collisions(&fine).is_ok());
    }

    #[tokio::test]
    async fn colliding_listing_downloads_nothing() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/bucket"))
            .respond_with(ResponseTemplate::new(200).set_body_string(listing(&["a", "a/b"], None)))
            .mount(&server)
            .await;

        let dump = tempfile::tempdir().unwrap();
        let client = S3Client::new(Some(server.uri()), 5).unwrap();
        let location = S3Location::parse("s3://bucket").unwrap();

        let err = client.dump_bucket(&location, dump.path()).await.unwrap_err();
        assert!(matches!(err, IngestError::InvalidPath(_)));
        assert_eq!(std::fs::read_dir(dump.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn single_download_over_existing_file_is_rejected() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("x"))
            .mount(&server)
            .await;

        let dump = tempfile::tempdir().unwrap();
        std::fs::write(dump.path().join("a"), "existing").unwrap();
        let client = S3Client::new(Some(server.uri()), 5).unwrap();
        let location = S3Location::parse("s3://bucket/a/b").unwrap();

        assert!(matches!(
            client.download_single(&location, dump.path()).await,
            Err(IngestError::InvalidPath(_))
        ));
        assert_eq!(std::fs::read_to_string(dump.path().join("a")).unwrap(), "existing");
    }

    #[tokio::test]
    async fn bucket_dump_follows_pages() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/bucket"))
            .and(query_param("list-type", "2"))
            .and(query_param_is_missing("continuation-token"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string(listing(&["one.txt", "docs/two.md"], Some("page-2"))),
            )
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/bucket"))
            .and(query_param("continuation-token", "page-2"))
            .respond_with(
                ResponseTemplate::new(200).set_body_string(listing(&["docs/deep/three.rs"], None)),
            )
            .expect(1)
            .mount(&server)
            .await;
        for key in ["one.txt", "docs/two.md", "docs/deep/three.rs"] {
            Mock::given(method("GET"))
                .and(path(format!("/bucket/{key}")))
                .respond_with(ResponseTemplate::new(200).set_body_string(format!("body of {key}")))
                .mount(&server)
                .await;
        }

        let dump = tempfile::tempdir().unwrap();
        let client = S3Client::new(Some(server.uri()), 5).unwrap();
        let location = S3Location::parse("s3://bucket").unwrap();

        let keys = client.dump_bucket(&location, dump.path()).await.unwrap();
        assert_eq!(keys, vec!["one.txt", "docs/two.md", "docs/deep/three.rs"]);

        let blocks = read_dump(dump.path()).await.unwrap();
        let names: Vec<_> = blocks.iter().map(|b| b.filename.as_str()).collect();
        assert_eq!(names, vec!["docs/deep/three.rs", "docs/two.md", "one.txt"]);
        assert_eq!(blocks[2].content, "body of one.txt");
    }

    #[tokio::test]
    async fn dump_with_escaping_key_writes_nothing() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/bucket"))
            .respond_with(
                ResponseTemplate::new(200).set_body_string(listing(&["ok.txt", "../evil.txt"], None)),
            )
            .mount(&server)
            .await;

        let dump = tempfile::tempdir().unwrap();
        let client = S3Client::new(Some(server.uri()), 5).unwrap();
        let location = S3Location::parse("s3://bucket").unwrap();

        let err = client.dump_bucket(&location, dump.path()).await.unwrap_err();
        assert!(matches!(err, IngestError::InvalidPath(_)));
        assert_eq!(std::fs::read_dir(dump.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn single_object_download() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/bucket/reports/q1.csv"))
            .respond_with(ResponseTemplate::new(200).set_body_string("a,b\n1,2\n"))
            .mount(&server)
            .await;

        let dump = tempfile::tempdir().unwrap();
        let client = S3Client::new(Some(server.uri()), 5).unwrap();
        let location = S3Location::parse("s3://bucket/reports/q1.csv").unwrap();

        let key = client.download_single(&location, dump.path()).await.unwrap();
        assert_eq!(key, "reports/q1.csv");
        assert_eq!(
            std::fs::read_to_string(dump.path().join("reports/q1.csv")).unwrap(),
            "a,b\n1,2\n"
        );
    }

    #[tokio::test]
    async fn single_download_needs_a_key() {
        let dump = tempfile::tempdir().unwrap();
        let client = S3Client::new(Some("http://127.0.0.1:9".to_string()), 5).unwrap();
        let location = S3Location::parse("s3://bucket").unwrap();

        assert!(matches!(
            client.download_single(&location, dump.path()).await,
            Err(IngestError::InvalidUrl(_))
        ));
    }

    #[tokio::test]
    async fn missing_object_is_a_fetch_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(403))
            .mount(&server)
            .await;

        let dump = tempfile::tempdir().unwrap();
        let client = S3Client::new(Some(server.uri()), 5).unwrap();
        let location = S3Location::parse("s3://bucket/private.txt").unwrap();

        assert!(matches!(
            client.download_single(&location, dump.path()).await,
            Err(IngestError::Fetch { .. })
        ));
    }

    #[tokio::test]
    async fn missing_dump_reads_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        assert!(read_dump(&dir.path().join("none")).await.unwrap().is_empty());
    }
}
