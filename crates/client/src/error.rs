//! Client error types.

use chino_blobs::BlobError;
use chino_protocol::{EnvelopeError, ResultKind};

/// Errors from the HTTP client.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Network-level failure: connect, DNS, timeout, reset.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error {status} ({kind}): {message}")]
    Rejected {
        status: u16,
        kind: ResultKind,
        message: String,
    },

    #[error("not found: {0}")]
    NotFound(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("envelope error: {0}")]
    Envelope(#[from] EnvelopeError),

    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("config parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("config write error: {0}")]
    ConfigWrite(#[from] toml::ser::Error),
}

impl ApiError {
    /// Converts into the blob taxonomy, naming the operation for transport failures.
    pub fn into_blob_error(self, operation: &str) -> BlobError {
        match self {
            ApiError::Http(e) => BlobError::TransportUnreachable {
                operation: operation.to_string(),
                message: e.to_string(),
            },
            ApiError::Rejected {
                status,
                kind,
                message,
            } => BlobError::RemoteRejected {
                status,
                kind,
                message,
            },
            ApiError::NotFound(resource) => BlobError::NotFound { resource },
            ApiError::Json(e) => BlobError::Json(e),
            ApiError::Envelope(EnvelopeError::Json(e)) => BlobError::Json(e),
            ApiError::Envelope(e) => BlobError::Protocol(e.to_string()),
            ApiError::Io(e) => BlobError::Io(e),
            other => BlobError::Client(other.to_string()),
        }
    }

    /// Like [`into_blob_error`](Self::into_blob_error), for the upload
    /// requests (start, chunk, commit).
    ///
    /// A 404 there names an unknown document, field or upload id and is
    /// reported as [`BlobError::RemoteRejected`].
    pub fn into_upload_error(self, operation: &str) -> BlobError {
        match self {
            ApiError::NotFound(resource) => BlobError::RemoteRejected {
                status: 404,
                kind: ResultKind::Error,
                message: resource,
            },
            other => other.into_blob_error(operation),
        }
    }
}

impl From<ApiError> for BlobError {
    fn from(err: ApiError) -> Self {
        err.into_blob_error("request")
    }
}
