//! Git repository adapter.
//!
//! Repositories are cloned by shelling out to the `git` client. A clone
//! lands in a sibling staging directory first and is renamed into place
//! only once it succeeded, so a failed or concurrent clone never leaves a
//! half-written checkout behind.
//!
//! Only network transports are accepted unless [`RepoSources::AllowLocal`]
//! is passed, so a user cannot clone repositories from the gateway host.

use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};

use tokio::process::Command;

use crate::error::{IngestError, Result};
use crate::extract;
use crate::upload::UploadedFile;

/// URL schemes `git clone` may use for remote repositories.
const REMOTE_SCHEMES: [&str; 4] = ["https", "http", "ssh", "git"];

/// Which repository locations [`clone_repo`] accepts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RepoSources {
    /// `https://`, `http://`, `ssh://`, `git://` and scp-style
    /// `user@host:path` URLs.
    #[default]
    RemoteOnly,
    /// Remote URLs plus `file://` URLs and local paths.
    AllowLocal,
}

/// Check a clone URL against the accepted sources.
///
/// # Errors
///
/// Returns `InvalidUrl` for empty, option-like or disallowed URLs.
pub fn check_repo_url(url: &str, sources: RepoSources) -> Result<()> {
    let invalid = || IngestError::InvalidUrl(url.to_string());

    if url.is_empty() {
        return Err(IngestError::InvalidUrl("repository url is required".to_string()));
    }
    if url.starts_with('-') || url.chars().any(char::is_control) {
        return Err(invalid());
    }

    if let Some((scheme, rest)) = url.split_once("://") {
        let scheme = scheme.to_ascii_lowercase();
        let remote = REMOTE_SCHEMES.contains(&scheme.as_str()) && !rest.starts_with('/');
        let local = scheme == "file" && sources == RepoSources::AllowLocal;
        return if remote || local { Ok(()) } else { Err(invalid()) };
    }

    // scp-style user@host:path; `::` would select a transport helper.
    if let Some((authority, path)) = url.split_once(':') {
        let scp = authority
            .split_once('@')
            .is_some_and(|(user, host)| !user.is_empty() && !host.is_empty())
            && !authority.contains('/')
            && !path.is_empty()
            && !path.starts_with(':');
        if scp {
            return Ok(());
        }
    }

    match sources {
        RepoSources::AllowLocal if !url.contains("::") => Ok(()),
        _ => Err(invalid()),
    }
}

/// Clone `url` into `dest` and list the checkout's top-level files.
///
/// Refuses with `WorkspaceExists` when `dest` is already present and leaves
/// it untouched.
///
/// # Errors
///
/// Returns `InvalidUrl` for a URL outside `sources`, `WorkspaceExists` if
/// `dest` exists, and `Git` if the clone fails.
pub async fn clone_repo(url: &str, dest: &Path, sources: RepoSources) -> Result<Vec<String>> {
    let url = url.trim();
    check_repo_url(url, sources)?;

    if tokio::fs::try_exists(dest).await? {
        return Err(IngestError::WorkspaceExists);
    }

    let parent = dest
        .parent()
        .ok_or_else(|| IngestError::Internal(format!("no parent for {}", dest.display())))?;
    tokio::fs::create_dir_all(parent).await?;

    let staging = staging_path(dest);
    if let Err(e) = git_clone(url, &staging, sources).await {
        discard(&staging).await;
        return Err(e);
    }

    // rename(2) refuses to replace a non-empty directory, so a checkout that
    // appeared meanwhile wins and ours is discarded.
    if let Err(e) = tokio::fs::rename(&staging, dest).await {
        discard(&staging).await;
        return Err(match e.kind() {
            ErrorKind::AlreadyExists | ErrorKind::DirectoryNotEmpty => IngestError::WorkspaceExists,
            _ if dest.exists() => IngestError::WorkspaceExists,
            _ => e.into(),
        });
    }

    tracing::info!(url = %url, dest = %dest.display(), "Cloned repository");
    list_top_level_files(dest).await
}

fn staging_path(dest: &Path) -> PathBuf {
    let name = dest
        .file_name()
        .map_or_else(|| "checkout".into(), |n| n.to_string_lossy().into_owned());
    dest.with_file_name(format!(".{name}.staging-{}", uuid::Uuid::new_v4().simple()))
}

async fn discard(path: &Path) {
    if let Err(e) = tokio::fs::remove_dir_all(path).await {
        if e.kind() != ErrorKind::NotFound {
            tracing::warn!(path = %path.display(), error = %e, "Failed to remove staging directory");
        }
    }
}

async fn git_clone(url: &str, dest: &Path, sources: RepoSources) -> Result<()> {
    let mut command = Command::new("git");
    if sources == RepoSources::RemoteOnly {
        // Also covers submodules and redirects to local paths.
        command.args(["-c", "protocol.file.allow=never"]);
    }

    let output = command
        .args(["clone", "--depth", "1", "--quiet", "--"])
        .arg(url)
        .arg(dest)
        .env("GIT_TERMINAL_PROMPT", "0")
        .kill_on_drop(true)
        .output()
        .await
        .map_err(|e| IngestError::Git(format!("failed to execute 'git clone': {e}")))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        tracing::info!(url = %url, error = %stderr.trim(), "git clone failed");
        return Err(IngestError::Git(stderr.trim().to_string()));
    }

    Ok(())
}

/// List the regular files directly inside `dir`, sorted by name.
///
/// # Errors
///
/// Returns `NotFound` if `dir` does not exist.
pub async fn list_top_level_files(dir: &Path) -> Result<Vec<String>> {
    let mut entries = match tokio::fs::read_dir(dir).await {
        Ok(entries) => entries,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            return Err(IngestError::NotFound("no repository checkout".to_string()));
        }
        Err(e) => return Err(e.into()),
    };

    let mut files = Vec::new();
    while let Some(entry) = entries.next_entry().await? {
        if entry.file_type().await?.is_file() {
            files.push(entry.file_name().to_string_lossy().into_owned());
        }
    }
    files.sort();
    Ok(files)
}

/// Validate a client-supplied name of a top-level file.
fn top_level_name(filename: &str) -> Result<&str> {
    let mut components = Path::new(filename).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(_)), None) => Ok(filename),
        _ => Err(IngestError::InvalidPath(filename.to_string())),
    }
}

/// Read the text of one top-level file of a checkout.
///
/// # Errors
///
/// Returns `InvalidPath` for names that are not a single path component,
/// `NotFound` if there is no such file, and `Extract` if its content is not
/// readable text.
pub async fn read_file(dir: &Path, filename: &str) -> Result<String> {
    let name = top_level_name(filename)?;
    let path = dir.join(name);

    let bytes = match tokio::fs::read(&path).await {
        Ok(bytes) => bytes,
        Err(e) if matches!(e.kind(), ErrorKind::NotFound | ErrorKind::IsADirectory) => {
            return Err(IngestError::NotFound(filename.to_string()));
        }
        Err(e) => return Err(e.into()),
    };

    match extract::file_text(name, bytes.clone()).await? {
        Some(text) => Ok(text),
        None => extract::decode_text(bytes),
    }
}

/// Store uploaded files at the top level of `dir`, creating it if needed.
/// Returns the stored names.
///
/// # Errors
///
/// Returns `InvalidPath` if any name is not a single path component; no
/// file is written in that case.
pub async fn store_files(dir: &Path, files: &[UploadedFile]) -> Result<Vec<String>> {
    for file in files {
        top_level_name(&file.filename)?;
    }

    tokio::fs::create_dir_all(dir).await?;

    let mut stored = Vec::with_capacity(files.len());
    for file in files {
        tokio::fs::write(dir.join(&file.filename), &file.bytes).await?;
        stored.push(file.filename.clone());
    }

    tracing::debug!(dir = %dir.display(), count = stored.len(), "Stored uploaded files");
    Ok(stored)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn git_available() -> bool {
        std::process::Command::new("git")
            .arg("--version")
            .output()
            .is_ok_and(|o| o.status.success())
    }

    fn git(dir: &Path, args: &[&str]) {
        let status = std::process::Command::new("git")
            .args(["-c", "user.name=test", "-c", "user.email=test@example.com"])
            .args(args)
            .current_dir(dir)
            .output()
            .unwrap()
            .status;
        assert!(status.success(), "git {args:?} failed");
    }

    /// Create a local repository with two files and a subdirectory.
    fn fixture_repo(root: &Path) -> String {
        let repo = root.join("origin");
        std::fs::create_dir_all(repo.join("src")).unwrap();
        std::fs::write(repo.join("README.md"), "# demo\n").unwrap();
        std::fs::write(repo.join("Cargo.toml"), "[package]\n").unwrap();
        std::fs::write(repo.join("src/lib.rs"), "pub fn f() {}\n").unwrap();
        git(&repo, &["init", "--quiet"]);
        git(&repo, &["add", "."]);
        git(&repo, &["commit", "--quiet", "-m", "init"]);
        format!("file://{}", repo.display())
    }

    #[tokio::test]
    async fn clone_lists_sorted_top_level_files() {
        if !git_available() {
            return;
        }
        let root = tempfile::tempdir().unwrap();
        let url = fixture_repo(root.path());
        let dest = root.path().join("ws/repo");

        let files = clone_repo(&url, &dest, RepoSources::AllowLocal)
            .await
            .unwrap();
        assert_eq!(files, vec!["Cargo.toml", "README.md"]);
        assert_eq!(read_file(&dest, "README.md").await.unwrap(), "# demo\n");
    }

    #[tokio::test]
    async fn clone_refuses_existing_checkout() {
        let root = tempfile::tempdir().unwrap();
        let dest = root.path().join("repo");
        std::fs::create_dir_all(&dest).unwrap();
        std::fs::write(dest.join("keep.txt"), "mine").unwrap();

        let err = clone_repo("https://example.com/r.git", &dest, RepoSources::RemoteOnly)
            .await
            .unwrap_err();
        assert!(matches!(err, IngestError::WorkspaceExists));
        assert_eq!(std::fs::read_to_string(dest.join("keep.txt")).unwrap(), "mine");
    }

    #[tokio::test]
    async fn failed_clone_leaves_nothing_behind() {
        if !git_available() {
            return;
        }
        let root = tempfile::tempdir().unwrap();
        let dest = root.path().join("repo");
        let missing = format!("file://{}", root.path().join("nope").display());

        let err = clone_repo(&missing, &dest, RepoSources::AllowLocal)
            .await
            .unwrap_err();
        assert!(matches!(err, IngestError::Git(_)));
        assert!(!dest.exists());
        assert_eq!(std::fs::read_dir(root.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn option_like_urls_are_rejected() {
        let root = tempfile::tempdir().unwrap();
        let err = clone_repo("--upload-pack=touch", &root.path().join("repo"), RepoSources::AllowLocal)
            .await
            .unwrap_err();
        assert!(matches!(err, IngestError::InvalidUrl(_)));
    }

    #[test]
    fn remote_urls_are_accepted() {
        for url in [
            "https://github.com/example/project.git",
            "http://git.example.com/repo",
            "ssh://git@example.com/repo.git",
            "git://example.com/repo.git",
            "git@github.com:example/project.git",
        ] {
            assert!(check_repo_url(url, RepoSources::RemoteOnly).is_ok(), "{url}");
        }
    }

    #[test]
    fn local_sources_need_opting_in() {
        for url in ["/srv/secret", "./repo", "file:///srv/secret", "FILE:///srv/secret", "../x:y"] {
            assert!(
                matches!(
                    check_repo_url(url, RepoSources::RemoteOnly),
                    Err(IngestError::InvalidUrl(_))
                ),
                "{url}"
            );
            assert!(check_repo_url(url, RepoSources::AllowLocal).is_ok(), "{url}");
        }
    }

    #[test]
    fn transport_helpers_are_never_accepted() {
        for url in ["ext::sh -c touch% /tmp/pwned", "fd::17", "https:///etc/passwd"] {
            assert!(check_repo_url(url, RepoSources::AllowLocal).is_err(), "{url}");
        }
    }

    #[tokio::test]
    async fn local_checkout_is_refused_without_opt_in() {
        let root = tempfile::tempdir().unwrap();
        let secret = root.path().join("secret");
        std::fs::create_dir_all(&secret).unwrap();
        let dest = root.path().join("ws/repo");

        let err = clone_repo(&secret.display().to_string(), &dest, RepoSources::RemoteOnly)
            .await
            .unwrap_err();
        assert!(matches!(err, IngestError::InvalidUrl(_)));
        assert!(!dest.exists());
    }

    #[tokio::test]
    async fn read_file_rejects_traversal() {
        let root = tempfile::tempdir().unwrap();
        assert!(matches!(
            read_file(root.path(), "../secret").await,
            Err(IngestError::InvalidPath(_))
        ));
        assert!(matches!(
            read_file(root.path(), "sub/file.txt").await,
            Err(IngestError::InvalidPath(_))
        ));
        assert!(matches!(
            read_file(root.path(), "missing.txt").await,
            Err(IngestError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn stored_files_are_listed_and_readable() {
        let root = tempfile::tempdir().unwrap();
        let dir = root.path().join("repo");

        let stored = store_files(
            &dir,
            &[
                UploadedFile::new("b.txt", "bee"),
                UploadedFile::new("a.py", "print(1)"),
            ],
        )
        .await
        .unwrap();
        assert_eq!(stored, vec!["b.txt", "a.py"]);
        assert_eq!(list_top_level_files(&dir).await.unwrap(), vec!["a.py", "b.txt"]);
        assert_eq!(read_file(&dir, "b.txt").await.unwrap(), "bee");
    }

    #[tokio::test]
    async fn store_rejects_nested_names_before_writing() {
        let root = tempfile::tempdir().unwrap();
        let dir = root.path().join("repo");

        let err = store_files(
            &dir,
            &[
                UploadedFile::new("ok.txt", "x"),
                UploadedFile::new("../evil.txt", "x"),
            ],
        )
        .await
        .unwrap_err();
        assert!(matches!(err, IngestError::InvalidPath(_)));
        assert!(!dir.exists());
    }
}
