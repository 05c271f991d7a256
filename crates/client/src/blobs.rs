//! Blob endpoints over HTTP.
//!
//! [`BlobsApi`] implements [`BlobTransport`], so a
//! [`ChunkedUploadSession`] can drive it directly:
//!
//! | step   | request                                                  |
//! |--------|----------------------------------------------------------|
//! | start  | `POST blobs` `{document_id, field, file_name}`           |
//! | chunk  | `PUT blobs/{upload_id}` raw body, `offset`/`length` hdrs |
//! | commit | `POST blobs/commit` `{upload_id}`                        |
//! | fetch  | `GET blobs/{blob_id}` raw body, name in `Content-Disposition` |
//! | delete | `DELETE blobs/{blob_id}`                                 |
//!
//! There is no abort request; an uncommitted upload expires server-side.

use std::path::{Path, PathBuf};

use chino_blobs::{BlobError, BlobTransport, ChunkedUploadSession, TransportFuture};
use chino_protocol::constants::{
    BLOBS_COMMIT_PATH, BLOBS_PATH, HEADER_LENGTH, HEADER_OFFSET, OCTET_STREAM, blob_path,
};
use chino_protocol::messages::{
    CommitResponse, CommitUploadRequest, StartUploadRequest, UploadInfo, UploadResponse,
};
use chino_protocol::{BlobDetail, CommitResult, DeleteOptions, parse_filename};
use chino_transfer::{
    CheckpointStore, ChunkWrite, TransferError, UploadCheckpoint, validate_chunk_size,
};
use reqwest::header::CONTENT_DISPOSITION;
use tracing::info;

use crate::config::ClientConfig;
use crate::http::{HttpClient, encode_segment};

/// Client for the blob endpoints.
#[derive(Debug, Clone)]
pub struct BlobsApi {
    http: HttpClient,
    chunk_size: usize,
    checkpoint_dir: Option<PathBuf>,
}

impl BlobsApi {
    pub fn new(http: HttpClient, config: &ClientConfig) -> Self {
        Self {
            http,
            chunk_size: config.chunk_size,
            checkpoint_dir: config.checkpoint_dir.clone(),
        }
    }

    /// Copy bound to the credentials current at call time.
    ///
    /// Later login/logout on the shared session does not affect it, so an
    /// upload started with it keeps one identity from start to commit.
    pub fn pinned(&self) -> Self {
        Self {
            http: self.http.with_session(self.http.session().snapshot()),
            ..self.clone()
        }
    }

    /// Default chunk size for [`upload_file`](Self::upload_file).
    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// Checkpoint store, when a checkpoint directory is configured.
    pub fn checkpoints(&self) -> Option<CheckpointStore> {
        self.checkpoint_dir.as_ref().map(CheckpointStore::new)
    }

    /// New upload session over this client, checkpointing if configured.
    pub fn session(&self) -> ChunkedUploadSession<'_> {
        let session = ChunkedUploadSession::new(self);
        match self.checkpoints() {
            Some(store) => session.with_checkpoints(store),
            None => session,
        }
    }

    /// Uploads the file at `path` into `field` of `document_id`.
    ///
    /// The blob's file name is the last component of `path`. Runs with
    /// the credentials current at call time. The chunk size is checked and
    /// the file opened before any request.
    pub async fn upload_file(
        &self,
        document_id: &str,
        field: &str,
        path: &Path,
        chunk_size: Option<usize>,
    ) -> Result<CommitResult, BlobError> {
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| TransferError::InvalidFileName(path.display().to_string()))?;
        let chunk_size = chunk_size.unwrap_or(self.chunk_size);
        validate_chunk_size(chunk_size)?;
        let file = tokio::fs::File::open(path).await?;

        let api = self.pinned();
        let mut session = api.session();
        session.begin(document_id, field, file_name).await?;
        let result = session.send_all(file, chunk_size).await?;

        info!(
            document_id,
            field,
            blob_id = %result.blob_id,
            path = %path.display(),
            "file uploaded"
        );
        Ok(result)
    }

    /// Continues an interrupted upload of the file at `path`.
    pub async fn resume_file(
        &self,
        checkpoint: UploadCheckpoint,
        path: &Path,
    ) -> Result<CommitResult, BlobError> {
        let file = tokio::fs::File::open(path).await?;
        let api = self.pinned();
        let mut session = api.session();
        session.resume(checkpoint, file).await
    }

    /// Uploads left unfinished by earlier runs.
    pub async fn pending_uploads(&self) -> Result<Vec<UploadCheckpoint>, BlobError> {
        match self.checkpoints() {
            Some(store) => Ok(store.list().await?),
            None => Ok(Vec::new()),
        }
    }

    /// Downloads a committed blob.
    pub async fn fetch(&self, blob_id: &str) -> Result<BlobDetail, BlobError> {
        self.fetch_blob(blob_id).await
    }

    /// Deletes a committed blob.
    pub async fn delete(&self, blob_id: &str) -> Result<(), BlobError> {
        self.delete_blob(blob_id).await
    }
}

impl BlobTransport for BlobsApi {
    fn start_upload<'a>(
        &'a self,
        request: &'a StartUploadRequest,
    ) -> TransportFuture<'a, UploadInfo> {
        Box::pin(async move {
            let resp: UploadResponse = self
                .http
                .post(BLOBS_PATH, request)
                .await
                .map_err(|e| e.into_upload_error("start upload"))?;
            Ok(resp.blob)
        })
    }

    fn put_chunk<'a>(&'a self, chunk: ChunkWrite<'a>) -> TransportFuture<'a, ()> {
        Box::pin(async move {
            let path = blob_path(&encode_segment(chunk.upload_id));
            let headers = [
                (HEADER_OFFSET, chunk.offset.to_string()),
                (HEADER_LENGTH, chunk.length().to_string()),
            ];
            self.http
                .put_bytes(&path, &headers, OCTET_STREAM, chunk.payload.to_vec())
                .await
                .map_err(|e| e.into_upload_error(&format!("put chunk at offset {}", chunk.offset)))
        })
    }

    fn commit_upload<'a>(&'a self, upload_id: &'a str) -> TransportFuture<'a, CommitResult> {
        Box::pin(async move {
            let request = CommitUploadRequest {
                upload_id: upload_id.to_string(),
            };
            let resp: CommitResponse = self
                .http
                .post(BLOBS_COMMIT_PATH, &request)
                .await
                .map_err(|e| e.into_upload_error("commit upload"))?;
            Ok(resp.blob)
        })
    }

    fn fetch_blob<'a>(&'a self, blob_id: &'a str) -> TransportFuture<'a, BlobDetail> {
        Box::pin(async move {
            let path = blob_path(&encode_segment(blob_id));
            let (headers, content) = self
                .http
                .get_raw(&path)
                .await
                .map_err(|e| e.into_blob_error("fetch blob"))?;

            let filename = headers
                .get(CONTENT_DISPOSITION)
                .and_then(|v| v.to_str().ok())
                .and_then(parse_filename)
                .ok_or_else(|| {
                    BlobError::Protocol(format!("blob {blob_id}: no file name in Content-Disposition"))
                })?;
            Ok(BlobDetail { filename, content })
        })
    }

    fn delete_blob<'a>(&'a self, blob_id: &'a str) -> TransportFuture<'a, ()> {
        Box::pin(async move {
            let path = blob_path(&encode_segment(blob_id));
            self.http
                .delete_resource(&path, DeleteOptions::default())
                .await
                .map_err(|e| e.into_blob_error("delete blob"))
        })
    }
}
