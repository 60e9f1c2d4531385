//! Explicit retry policy for scratch directory removal.

use std::io::ErrorKind;
use std::path::Path;
use std::time::Duration;

use crate::error::Result;

/// How many times to attempt an operation and how long to wait in between.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first. Zero is treated as one.
    pub max_attempts: u32,
    /// Pause between attempts.
    pub delay: Duration,
}

impl RetryPolicy {
    /// A single attempt, no retry.
    pub const ONCE: Self = Self {
        max_attempts: 1,
        delay: Duration::ZERO,
    };

    /// Policy for removing a repository checkout. Git can leave short-lived
    /// handles on pack files, so removal is retried.
    pub const CHECKOUT: Self = Self {
        max_attempts: 3,
        delay: Duration::from_secs(1),
    };

    /// Create a policy.
    #[must_use]
    pub const fn new(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts,
            delay,
        }
    }

    /// Remove a directory tree. A missing directory counts as success.
    ///
    /// # Errors
    ///
    /// Returns the last I/O error once all attempts are used up.
    pub async fn remove_dir_all(&self, path: &Path) -> Result<()> {
        let attempts = self.max_attempts.max(1);
        let mut attempt = 1;

        loop {
            match tokio::fs::remove_dir_all(path).await {
                Ok(()) => {
                    tracing::debug!(path = %path.display(), attempt, "Removed directory");
                    return Ok(());
                }
                Err(e) if e.kind() == ErrorKind::NotFound => return Ok(()),
                Err(e) if attempt < attempts => {
                    tracing::warn!(
                        path = %path.display(),
                        attempt,
                        error = %e,
                        "Directory removal failed, retrying"
                    );
                    tokio::time::sleep(self.delay).await;
                    attempt += 1;
                }
                Err(e) => return Err(e.into()),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn missing_directory_is_success() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope");

        RetryPolicy::ONCE.remove_dir_all(&missing).await.unwrap();
        RetryPolicy::CHECKOUT.remove_dir_all(&missing).await.unwrap();
    }

    #[tokio::test]
    async fn removes_nested_tree() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("repo");
        std::fs::create_dir_all(target.join("a/b")).unwrap();
        std::fs::write(target.join("a/b/file.txt"), "x").unwrap();

        RetryPolicy::new(2, Duration::from_millis(1))
            .remove_dir_all(&target)
            .await
            .unwrap();
        assert!(!target.exists());
    }

    #[tokio::test]
    async fn gives_up_after_max_attempts() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("plain-file");
        std::fs::write(&file, "not a directory").unwrap();

        let result = RetryPolicy::new(2, Duration::from_millis(1))
            .remove_dir_all(&file)
            .await;
        assert!(result.is_err());
        assert!(file.exists());
    }
}
