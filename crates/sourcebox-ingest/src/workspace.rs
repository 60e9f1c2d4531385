//! Per-session scratch directories.
//!
//! Each session gets its own directory under the workspace root, named by
//! its [`WorkspaceKey`], holding a `repo` checkout and an S3 `dump`. Work
//! on one session's directories is serialized by a per-key async lock;
//! different sessions never contend.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use parking_lot::Mutex;
use sourcebox_core::WorkspaceKey;
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

use crate::error::Result;
use crate::retry::RetryPolicy;

/// Registry of per-session scratch directories.
#[derive(Debug)]
pub struct Workspaces {
    root: PathBuf,
    locks: Mutex<HashMap<WorkspaceKey, Arc<AsyncMutex<()>>>>,
}

impl Workspaces {
    /// Create a registry rooted at `root`. Nothing is created on disk until
    /// an adapter writes.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            locks: Mutex::new(HashMap::new()),
        }
    }

    /// The session's directory.
    #[must_use]
    pub fn session_dir(&self, key: WorkspaceKey) -> PathBuf {
        self.root.join(key.to_hex())
    }

    /// The session's repository checkout.
    #[must_use]
    pub fn repo_dir(&self, key: WorkspaceKey) -> PathBuf {
        self.session_dir(key).join("repo")
    }

    /// The session's S3 dump directory.
    #[must_use]
    pub fn dump_dir(&self, key: WorkspaceKey) -> PathBuf {
        self.session_dir(key).join("dump")
    }

    /// Take the session's workspace lock. Held for the duration of any
    /// operation that reads or writes the session's directories.
    pub async fn lock(&self, key: WorkspaceKey) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self.locks.lock();
            Arc::clone(locks.entry(key).or_default())
        };
        lock.lock_owned().await
    }

    /// Delete the session's checkout and dump.
    ///
    /// The checkout removal follows `repo_policy` and the dump removal
    /// follows `dump_policy`. Missing directories count as removed, so
    /// clearing twice is a no-op.
    ///
    /// # Errors
    ///
    /// Returns the I/O error of a removal whose attempts ran out.
    pub async fn clear(
        &self,
        key: WorkspaceKey,
        repo_policy: RetryPolicy,
        dump_policy: RetryPolicy,
    ) -> Result<()> {
        let _guard = self.lock(key).await;

        repo_policy.remove_dir_all(&self.repo_dir(key)).await?;
        dump_policy.remove_dir_all(&self.dump_dir(key)).await?;

        // Only succeeds once the session directory is empty.
        let _ = tokio::fs::remove_dir(self.session_dir(key)).await;

        tracing::info!(workspace = %key, "Cleared workspace");
        Ok(())
    }

    /// Forget the lock of a session that has ended.
    pub fn release(&self, key: WorkspaceKey) {
        let mut locks = self.locks.lock();
        if locks
            .get(&key)
            .is_some_and(|lock| Arc::strong_count(lock) == 1)
        {
            locks.remove(&key);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn key(byte: u8) -> WorkspaceKey {
        WorkspaceKey::from_bytes([byte; 16])
    }

    #[test]
    fn directories_are_scoped_by_key() {
        let ws = Workspaces::new("/tmp/sb");
        assert_ne!(ws.repo_dir(key(1)), ws.repo_dir(key(2)));
        assert!(ws.repo_dir(key(1)).starts_with(ws.session_dir(key(1))));
        assert!(ws.dump_dir(key(1)).ends_with("dump"));
    }

    #[tokio::test]
    async fn clear_twice_is_a_no_op() {
        let root = tempfile::tempdir().unwrap();
        let ws = Workspaces::new(root.path());
        let k = key(7);

        std::fs::create_dir_all(ws.repo_dir(k).join("src")).unwrap();
        std::fs::create_dir_all(ws.dump_dir(k)).unwrap();
        std::fs::write(ws.dump_dir(k).join("obj.txt"), "x").unwrap();

        ws.clear(k, RetryPolicy::CHECKOUT, RetryPolicy::ONCE)
            .await
            .unwrap();
        assert!(!ws.session_dir(k).exists());

        ws.clear(k, RetryPolicy::CHECKOUT, RetryPolicy::ONCE)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn clear_leaves_other_sessions_alone() {
        let root = tempfile::tempdir().unwrap();
        let ws = Workspaces::new(root.path());

        std::fs::create_dir_all(ws.repo_dir(key(1))).unwrap();
        std::fs::create_dir_all(ws.repo_dir(key(2))).unwrap();

        ws.clear(key(1), RetryPolicy::ONCE, RetryPolicy::ONCE)
            .await
            .unwrap();
        assert!(!ws.repo_dir(key(1)).exists());
        assert!(ws.repo_dir(key(2)).exists());
    }

    #[tokio::test]
    async fn lock_serializes_same_key() {
        let ws = Arc::new(Workspaces::new("/tmp/unused"));
        let guard = ws.lock(key(3)).await;

        let contender = {
            let ws = Arc::clone(&ws);
            tokio::spawn(async move {
                let _g = ws.lock(key(3)).await;
            })
        };

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!contender.is_finished());

        // A different key is not blocked.
        let _other = ws.lock(key(4)).await;

        drop(guard);
        contender.await.unwrap();
    }

    #[tokio::test]
    async fn release_drops_idle_locks() {
        let ws = Workspaces::new("/tmp/unused");
        drop(ws.lock(key(5)).await);
        ws.release(key(5));
        assert!(ws.locks.lock().is_empty());
    }
}
