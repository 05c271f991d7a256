//! In-memory blob store implementing [`BlobTransport`] for tests.

use std::collections::HashMap;
use std::sync::Mutex;

use chino_protocol::messages::{StartUploadRequest, UploadInfo};
use chino_protocol::{BlobDetail, CommitResult, ResultKind};
use chino_transfer::{ChunkWrite, checksum_bytes};

use crate::error::BlobError;
use crate::transport::{BlobTransport, TransportFuture};

#[derive(Default)]
struct Upload {
    document_id: String,
    file_name: String,
    data: Vec<u8>,
}

#[derive(Default)]
pub(crate) struct StoreInner {
    next_id: u32,
    uploads: HashMap<String, Upload>,
    blobs: HashMap<String, BlobDetail>,
    /// `(upload_id, offset, len)` of every chunk received, in order.
    chunks: Vec<(String, u64, usize)>,
    aborted: Vec<String>,
    deleted: Vec<String>,
}

/// Mock backend that places chunk bytes by offset and hashes on commit.
#[derive(Default)]
pub struct MemoryTransport {
    pub(crate) inner: Mutex<StoreInner>,
    /// Documents the caller may not write to.
    pub forbidden_documents: Vec<String>,
    /// Replaces the server digest on commit.
    pub corrupt_digest: Option<String>,
    /// Fails the chunk write with this zero-based index.
    pub fail_chunk_at: Option<usize>,
    /// Whether `abort_upload` is supported.
    pub supports_abort: bool,
}

impl MemoryTransport {
    pub fn new() -> Self {
        Self {
            supports_abort: true,
            ..Self::default()
        }
    }

    pub fn chunks(&self) -> Vec<(String, u64, usize)> {
        self.inner.lock().unwrap().chunks.clone()
    }

    pub fn start_count(&self) -> u32 {
        self.inner.lock().unwrap().next_id
    }

    pub fn aborted(&self) -> Vec<String> {
        self.inner.lock().unwrap().aborted.clone()
    }

    pub fn deleted(&self) -> Vec<String> {
        self.inner.lock().unwrap().deleted.clone()
    }

    pub fn open_uploads(&self) -> usize {
        self.inner.lock().unwrap().uploads.len()
    }
}

impl BlobTransport for MemoryTransport {
    fn start_upload<'a>(&'a self, request: &'a StartUploadRequest) -> TransportFuture<'a, UploadInfo> {
        Box::pin(async move {
            if self.forbidden_documents.contains(&request.document_id) {
                return Err(BlobError::RemoteRejected {
                    status: 403,
                    kind: ResultKind::Error,
                    message: "permission denied".into(),
                });
            }
            let mut inner = self.inner.lock().unwrap();
            inner.next_id += 1;
            let upload_id = format!("upload-{}", inner.next_id);
            inner.uploads.insert(
                upload_id.clone(),
                Upload {
                    document_id: request.document_id.clone(),
                    file_name: request.file_name.clone(),
                    data: Vec::new(),
                },
            );
            Ok(UploadInfo {
                upload_id,
                expire_date: None,
            })
        })
    }

    fn put_chunk<'a>(&'a self, chunk: ChunkWrite<'a>) -> TransportFuture<'a, ()> {
        Box::pin(async move {
            let mut inner = self.inner.lock().unwrap();
            if self.fail_chunk_at == Some(inner.chunks.len()) {
                return Err(BlobError::TransportUnreachable {
                    operation: format!("put chunk at offset {}", chunk.offset),
                    message: "connection reset".into(),
                });
            }
            inner
                .chunks
                .push((chunk.upload_id.to_string(), chunk.offset, chunk.length()));
            let upload = inner
                .uploads
                .get_mut(chunk.upload_id)
                .ok_or_else(|| BlobError::RemoteRejected {
                    status: 404,
                    kind: ResultKind::Error,
                    message: format!("unknown upload {}", chunk.upload_id),
                })?;
            let end = chunk.offset as usize + chunk.length();
            if upload.data.len() < end {
                upload.data.resize(end, 0);
            }
            upload.data[chunk.offset as usize..end].copy_from_slice(chunk.payload);
            Ok(())
        })
    }

    fn commit_upload<'a>(&'a self, upload_id: &'a str) -> TransportFuture<'a, CommitResult> {
        Box::pin(async move {
            let mut inner = self.inner.lock().unwrap();
            let upload = inner.uploads.remove(upload_id).ok_or_else(|| BlobError::RemoteRejected {
                status: 400,
                kind: ResultKind::Fail,
                message: "unknown upload".into(),
            })?;
            let blob_id = format!("blob-for-{upload_id}");
            let sha1 = self
                .corrupt_digest
                .clone()
                .unwrap_or_else(|| checksum_bytes(&upload.data));
            let result = CommitResult {
                blob_id: blob_id.clone(),
                byte_count: upload.data.len() as u64,
                sha1,
                md5: None,
                document_id: upload.document_id,
            };
            inner.blobs.insert(
                blob_id,
                BlobDetail {
                    filename: upload.file_name,
                    content: upload.data,
                },
            );
            Ok(result)
        })
    }

    fn fetch_blob<'a>(&'a self, blob_id: &'a str) -> TransportFuture<'a, BlobDetail> {
        Box::pin(async move {
            let inner = self.inner.lock().unwrap();
            inner.blobs.get(blob_id).cloned().ok_or_else(|| BlobError::NotFound {
                resource: format!("blob {blob_id}"),
            })
        })
    }

    fn delete_blob<'a>(&'a self, blob_id: &'a str) -> TransportFuture<'a, ()> {
        Box::pin(async move {
            let mut inner = self.inner.lock().unwrap();
            inner.deleted.push(blob_id.to_string());
            inner
                .blobs
                .remove(blob_id)
                .map(|_| ())
                .ok_or_else(|| BlobError::NotFound {
                    resource: format!("blob {blob_id}"),
                })
        })
    }

    fn abort_upload<'a>(&'a self, upload_id: &'a str) -> TransportFuture<'a, bool> {
        Box::pin(async move {
            if !self.supports_abort {
                return Ok(false);
            }
            let mut inner = self.inner.lock().unwrap();
            inner.uploads.remove(upload_id);
            inner.aborted.push(upload_id.to_string());
            Ok(true)
        })
    }
}
