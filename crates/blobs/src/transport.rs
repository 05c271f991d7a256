//! Transport abstraction for the blob endpoints.
//!
//! The HTTP client implements this trait; tests use an in-memory store.
//! Keeping the upload protocol behind a trait means it never touches
//! request construction or authentication.

use std::future::Future;
use std::pin::Pin;

use chino_protocol::messages::{StartUploadRequest, UploadInfo};
use chino_protocol::{BlobDetail, CommitResult};
use chino_transfer::ChunkWrite;

use crate::error::BlobError;

/// Boxed future returned by every transport call.
pub type TransportFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, BlobError>> + Send + 'a>>;

/// The four blob requests plus delete and abort.
///
/// Implementations must map a missing blob on fetch or delete to
/// [`BlobError::NotFound`], every other error response (including a 404
/// from start, chunk or commit) to [`BlobError::RemoteRejected`], and
/// network failures to [`BlobError::TransportUnreachable`].
pub trait BlobTransport: Send + Sync {
    /// Opens an upload for a document's blob field.
    fn start_upload<'a>(&'a self, request: &'a StartUploadRequest) -> TransportFuture<'a, UploadInfo>;

    /// Writes one chunk at its offset.
    fn put_chunk<'a>(&'a self, chunk: ChunkWrite<'a>) -> TransportFuture<'a, ()>;

    /// Finalizes an upload and returns the server's record of the blob.
    fn commit_upload<'a>(&'a self, upload_id: &'a str) -> TransportFuture<'a, CommitResult>;

    /// Downloads a committed blob.
    fn fetch_blob<'a>(&'a self, blob_id: &'a str) -> TransportFuture<'a, BlobDetail>;

    /// Deletes a committed blob.
    fn delete_blob<'a>(&'a self, blob_id: &'a str) -> TransportFuture<'a, ()>;

    /// Releases an uncommitted upload.
    ///
    /// Returns `false` when the backend has no abort call; the upload is
    /// then left for the server to expire.
    fn abort_upload<'a>(&'a self, upload_id: &'a str) -> TransportFuture<'a, bool> {
        let _ = upload_id;
        Box::pin(async { Ok(false) })
    }
}
