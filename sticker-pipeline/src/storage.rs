//! Transient storage: the working directory, identity-keyed file paths, and run-owned files that are
//! removed when released or dropped.
//!
//! Paths are `{root}/{group_key}_{unique_id}.{ext}`. Distinct assets never share a path; two runs for
//! the identical asset are serialized through [`TransientStore::claim`].

use relay_core::Attachment;
use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, Weak};
use tokio::sync::OwnedMutexGuard;
use tracing::{debug, info, warn};

/// Extensions the pipeline writes; only these are swept by [`TransientStore::prepare`].
const TRANSIENT_EXTENSIONS: &[&str] = &["tgs", "webp", "webm", "mp4", "gif", "png", "part"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceRole {
    Source,
    Output,
}

/// A local file owned by exactly one pipeline run.
#[derive(Debug)]
pub struct TransientResource {
    path: PathBuf,
    role: ResourceRole,
    released: bool,
}

impl TransientResource {
    pub fn new(path: PathBuf, role: ResourceRole) -> Self {
        Self {
            path,
            role,
            released: false,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn role(&self) -> ResourceRole {
        self.role
    }

    /// Gives up ownership without deleting the file.
    pub(crate) fn persist(mut self) -> PathBuf {
        self.released = true;
        std::mem::take(&mut self.path)
    }

    /// Deletes the file. A file that is already gone counts as released.
    pub async fn release(mut self) -> io::Result<()> {
        self.released = true;
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => {
                debug!(path = %self.path.display(), role = ?self.role, "Released transient file");
                Ok(())
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e),
        }
    }
}

impl Drop for TransientResource {
    fn drop(&mut self) {
        if !self.released {
            let _ = std::fs::remove_file(&self.path);
        }
    }
}

/// Exclusive hold on one storage key for the duration of a run.
pub struct KeyClaim {
    key: String,
    _guard: OwnedMutexGuard<()>,
}

impl KeyClaim {
    pub fn key(&self) -> &str {
        &self.key
    }
}

/// Working directory plus the registry of storage keys currently in use.
pub struct TransientStore {
    root: PathBuf,
    in_flight: Mutex<HashMap<String, Weak<tokio::sync::Mutex<()>>>>,
}

impl TransientStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            in_flight: Mutex::new(HashMap::new()),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Creates the working directory and removes transient files left by a previous process.
    pub async fn prepare(&self) -> io::Result<usize> {
        tokio::fs::create_dir_all(&self.root).await?;
        let mut removed = 0;
        let mut entries = tokio::fs::read_dir(&self.root).await?;
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if !entry.file_type().await?.is_file() || !is_transient(&path) {
                continue;
            }
            match tokio::fs::remove_file(&path).await {
                Ok(()) => removed += 1,
                Err(e) => warn!(path = %path.display(), error = %e, "Could not remove stale file"),
            }
        }
        info!(root = %self.root.display(), removed, "Transient storage ready");
        Ok(removed)
    }

    /// Where the downloaded source of `attachment` lives.
    pub fn source_path(&self, attachment: &Attachment) -> PathBuf {
        self.root.join(format!(
            "{}.{}",
            attachment.storage_key(),
            attachment.kind().source_extension()
        ))
    }

    /// Where the converted output of `attachment` lives.
    pub fn output_path(&self, attachment: &Attachment) -> PathBuf {
        self.root.join(format!(
            "{}.{}",
            attachment.storage_key(),
            attachment.kind().output_extension()
        ))
    }

    /// Waits until no other run holds `key`, then holds it until the claim is dropped.
    pub async fn claim(&self, key: &str) -> KeyClaim {
        let lock = {
            let mut map = self.in_flight.lock().unwrap_or_else(|e| e.into_inner());
            map.retain(|_, w| w.strong_count() > 0);
            match map.get(key).and_then(Weak::upgrade) {
                Some(lock) => lock,
                None => {
                    let lock = Arc::new(tokio::sync::Mutex::new(()));
                    map.insert(key.to_string(), Arc::downgrade(&lock));
                    lock
                }
            }
        };
        let guard = lock.lock_owned().await;
        KeyClaim {
            key: key.to_string(),
            _guard: guard,
        }
    }
}

fn is_transient(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| TRANSIENT_EXTENSIONS.contains(&e))
        .unwrap_or(false)
}
