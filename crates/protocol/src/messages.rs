//! Request and response payloads for the blob upload endpoints.

use serde::{Deserialize, Serialize};

use crate::types::{CommitResult, UploadHandle};

// ---------------------------------------------------------------------------
// Request payloads
// ---------------------------------------------------------------------------

/// `POST blobs`: opens an upload for a blob field of a document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StartUploadRequest {
    pub document_id: String,
    pub field: String,
    pub file_name: String,
}

/// `POST blobs/commit`: finalizes an upload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommitUploadRequest {
    pub upload_id: String,
}

// ---------------------------------------------------------------------------
// Response payloads (the `data` of the envelope)
// ---------------------------------------------------------------------------

/// Upload record returned by start and by every chunk write.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UploadInfo {
    pub upload_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expire_date: Option<String>,
}

/// Data of a start or chunk response: `{"blob": {...}}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UploadResponse {
    pub blob: UploadInfo,
}

/// Data of a commit response: `{"blob": {...}}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommitResponse {
    pub blob: CommitResult,
}

impl StartUploadRequest {
    /// Builds the handle for the upload the server opened for this request.
    pub fn into_handle(self, upload_id: String) -> UploadHandle {
        UploadHandle {
            upload_id,
            document_id: self.document_id,
            field: self.field,
            file_name: self.file_name,
        }
    }
}
