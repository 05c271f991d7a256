//! Progress events for blob uploads.

use chino_protocol::CommitResult;

/// Event emitted while an upload runs.
#[derive(Debug, Clone)]
pub enum UploadEvent {
    /// The server opened the upload (or a checkpoint was resumed).
    Started { upload_id: String, offset: u64 },
    /// A chunk was acknowledged.
    Chunk {
        upload_id: String,
        offset: u64,
        len: usize,
        bytes_sent: u64,
        bytes_per_second: f64,
    },
    /// Commit succeeded and the digest matched.
    Committed {
        upload_id: String,
        result: CommitResult,
    },
    /// The upload was aborted by the caller.
    Aborted { upload_id: String },
    /// The upload failed; it must not be referenced further.
    Failed { upload_id: String, error: String },
}

impl UploadEvent {
    pub fn upload_id(&self) -> &str {
        match self {
            UploadEvent::Started { upload_id, .. }
            | UploadEvent::Chunk { upload_id, .. }
            | UploadEvent::Committed { upload_id, .. }
            | UploadEvent::Aborted { upload_id }
            | UploadEvent::Failed { upload_id, .. } => upload_id,
        }
    }
}
