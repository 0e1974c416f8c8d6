//! Write-once JSON audit log.
//!
//! Each entry is its own file, `audit-<YYYYMMDD>-<HHMMSS>-<micros>.json`,
//! holding `{"timestamp": ..., "entry": ...}`. Files are created with
//! create-new semantics, so an entry is never overwritten.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::io::AsyncWriteExt;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::StoreError;

const STAMP_FORMAT: &str = "%Y%m%d-%H%M%S-%6f";

#[derive(Serialize)]
struct AuditRecord<'a, T: Serialize + ?Sized> {
    timestamp: String,
    entry: &'a T,
}

/// Directory-backed audit sink. The directory is created on first write.
#[derive(Debug, Clone)]
pub struct AuditLog {
    dir: PathBuf,
}

impl AuditLog {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Persist one entry stamped with the current UTC time.
    pub async fn write<T: Serialize + ?Sized>(&self, entry: &T) -> Result<PathBuf, StoreError> {
        self.write_at(entry, Utc::now()).await
    }

    /// Persist one entry stamped with `at`.
    ///
    /// Fails with [`StoreError::AlreadyExists`] if an entry with the same
    /// stamp is already on disk.
    pub async fn write_at<T: Serialize + ?Sized>(
        &self,
        entry: &T,
        at: DateTime<Utc>,
    ) -> Result<PathBuf, StoreError> {
        let stamp = at.format(STAMP_FORMAT).to_string();
        let path = self.dir.join(format!("audit-{stamp}.json"));
        let body = serde_json::to_vec_pretty(&AuditRecord {
            timestamp: stamp,
            entry,
        })?;

        tokio::fs::create_dir_all(&self.dir).await?;
        let mut file = match tokio::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .await
        {
            Ok(f) => f,
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                return Err(StoreError::AlreadyExists(path));
            }
            Err(e) => return Err(e.into()),
        };
        file.write_all(&body).await?;
        file.flush().await?;

        info!(path = %path.display(), "audit entry written");
        Ok(path)
    }

    /// Write an entry on a background task without waiting for it.
    ///
    /// Failures are logged, never propagated. The handle resolves to the
    /// written path, or `None` if the write failed.
    pub fn spawn_write<T>(&self, entry: T) -> JoinHandle<Option<PathBuf>>
    where
        T: Serialize + Send + Sync + 'static,
    {
        let log = self.clone();
        tokio::spawn(async move {
            match log.write(&entry).await {
                Ok(path) => Some(path),
                Err(e) => {
                    warn!(error = %e, dir = %log.dir.display(), "audit write failed");
                    None
                }
            }
        })
    }
}
