//! Resume checkpoints for in-flight uploads.
//!
//! After every acknowledged chunk the session records how far it got and
//! the SHA-1 of the bytes sent so far. The record is one JSON file per
//! upload, named `<upload_id>.json`, replaced atomically through a
//! temporary file.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::TransferError;

/// Persisted progress of one upload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadCheckpoint {
    pub upload_id: String,
    pub document_id: String,
    pub field: String,
    pub file_name: String,
    /// Offset of the next chunk to send (bytes acknowledged so far).
    pub next_offset: u64,
    /// SHA-1 hex of the first `next_offset` bytes.
    pub prefix_sha1: String,
    pub chunk_size: usize,
}

/// Directory of upload checkpoints.
#[derive(Debug, Clone)]
pub struct CheckpointStore {
    dir: PathBuf,
}

impl CheckpointStore {
    /// Creates a store rooted at `dir`. The directory is created on first save.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path_for(&self, upload_id: &str) -> PathBuf {
        // Upload ids are server-issued; keep only filesystem-safe characters.
        let safe: String = upload_id
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        self.dir.join(format!("{safe}.json"))
    }

    /// Writes (or replaces) the checkpoint for its upload.
    pub async fn save(&self, checkpoint: &UploadCheckpoint) -> Result<(), TransferError> {
        tokio::fs::create_dir_all(&self.dir).await?;

        let path = self.path_for(&checkpoint.upload_id);
        let tmp = path.with_extension("json.tmp");
        let content = serde_json::to_vec_pretty(checkpoint)?;
        tokio::fs::write(&tmp, content).await?;
        tokio::fs::rename(&tmp, &path).await?;

        debug!(
            upload_id = %checkpoint.upload_id,
            next_offset = checkpoint.next_offset,
            "checkpoint saved"
        );
        Ok(())
    }

    /// Loads the checkpoint for `upload_id`, if one exists.
    pub async fn load(&self, upload_id: &str) -> Result<Option<UploadCheckpoint>, TransferError> {
        let path = self.path_for(upload_id);
        match tokio::fs::read(&path).await {
            Ok(content) => Ok(Some(serde_json::from_slice(&content)?)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Removes the checkpoint for `upload_id`. Missing files are not an error.
    pub async fn remove(&self, upload_id: &str) -> Result<(), TransferError> {
        match tokio::fs::remove_file(self.path_for(upload_id)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    /// Lists every readable checkpoint in the store.
    ///
    /// Unparseable files are skipped with a warning.
    pub async fn list(&self) -> Result<Vec<UploadCheckpoint>, TransferError> {
        let mut entries = match tokio::fs::read_dir(&self.dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut checkpoints = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            let content = tokio::fs::read(&path).await?;
            match serde_json::from_slice::<UploadCheckpoint>(&content) {
                Ok(cp) => checkpoints.push(cp),
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "skipping unreadable checkpoint");
                }
            }
        }
        checkpoints.sort_by(|a, b| a.upload_id.cmp(&b.upload_id));
        Ok(checkpoints)
    }
}
