//! Blob upload error types.

use chino_protocol::ResultKind;
use chino_transfer::{TransferError, UploadState};

/// Errors produced while uploading, fetching or deleting blobs.
#[derive(Debug, thiserror::Error)]
pub enum BlobError {
    /// Non-2xx response carrying an error or fail envelope.
    #[error("remote rejected request ({status}, {kind}): {message}")]
    RemoteRejected {
        status: u16,
        kind: ResultKind,
        message: String,
    },

    /// The request did not complete at the network layer.
    #[error("transport failure during {operation}: {message}")]
    TransportUnreachable { operation: String, message: String },

    /// Local and server views of the uploaded bytes disagree.
    #[error("integrity check failed for upload {upload_id}: local {what} {local}, server {what} {server}")]
    IntegrityError {
        upload_id: String,
        what: &'static str,
        local: String,
        server: String,
    },

    #[error("upload {upload_id} is {state}, cannot {operation}")]
    InvalidState {
        upload_id: String,
        state: UploadState,
        operation: &'static str,
    },

    #[error("not found: {resource}")]
    NotFound { resource: String },

    /// The server answered with something that is not the expected payload.
    #[error("unexpected response: {0}")]
    Protocol(String),

    /// Local client misconfiguration (credentials, URL).
    #[error("client error: {0}")]
    Client(String),

    #[error("transfer error: {0}")]
    Transfer(#[from] TransferError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("cancelled")]
    Cancelled,
}

impl BlobError {
    /// Returns `true` for failures where retrying the same request may succeed.
    pub fn is_transport(&self) -> bool {
        matches!(self, BlobError::TransportUnreachable { .. })
    }

    /// HTTP status of a remote rejection, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            BlobError::RemoteRejected { status, .. } => Some(*status),
            BlobError::NotFound { .. } => Some(404),
            _ => None,
        }
    }
}
