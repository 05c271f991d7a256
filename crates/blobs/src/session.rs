//! Per-upload session driving begin → chunks → commit → verify.
//!
//! A session owns exactly one upload and every state-changing call takes
//! `&mut self`, so chunks for one upload id are never in flight
//! concurrently. Independent sessions may share a transport.

use chino_protocol::messages::StartUploadRequest;
use chino_protocol::{BlobDetail, CommitResult, UploadHandle};
use chino_transfer::{
    CheckpointStore, ChunkSource, ChunkWrite, RunningDigest, SpeedCalculator, TransferError,
    UploadCheckpoint, UploadState, validate_file_name,
};
use tokio::io::AsyncRead;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::error::BlobError;
use crate::transport::BlobTransport;
use crate::types::UploadEvent;
use crate::verify::verify;

/// Drives one resumable, integrity-checked upload.
pub struct ChunkedUploadSession<'a> {
    transport: &'a dyn BlobTransport,
    state: UploadState,
    handle: Option<UploadHandle>,
    offset: u64,
    chunks_sent: u64,
    digest: RunningDigest,
    chunk_size: usize,
    checkpoints: Option<CheckpointStore>,
    events: Option<mpsc::Sender<UploadEvent>>,
    cancel: CancellationToken,
    speed: SpeedCalculator,
}

impl<'a> ChunkedUploadSession<'a> {
    /// Creates a session that has not started an upload yet.
    pub fn new(transport: &'a dyn BlobTransport) -> Self {
        Self {
            transport,
            state: UploadState::NotStarted,
            handle: None,
            offset: 0,
            chunks_sent: 0,
            digest: RunningDigest::new(),
            chunk_size: chino_transfer::DEFAULT_CHUNK_SIZE,
            checkpoints: None,
            events: None,
            cancel: CancellationToken::new(),
            speed: SpeedCalculator::default(),
        }
    }

    /// Persists progress to `store` after every acknowledged chunk.
    pub fn with_checkpoints(mut self, store: CheckpointStore) -> Self {
        self.checkpoints = Some(store);
        self
    }

    /// Sends progress events to `tx`.
    pub fn with_events(mut self, tx: mpsc::Sender<UploadEvent>) -> Self {
        self.events = Some(tx);
        self
    }

    /// Aborts the upload when `token` is cancelled (checked before each chunk).
    pub fn with_cancel(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    pub fn state(&self) -> UploadState {
        self.state
    }

    pub fn handle(&self) -> Option<&UploadHandle> {
        self.handle.as_ref()
    }

    /// Bytes acknowledged so far; also the offset of the next chunk.
    pub fn offset(&self) -> u64 {
        self.offset
    }

    pub fn chunks_sent(&self) -> u64 {
        self.chunks_sent
    }

    /// Lowercase SHA-1 hex of the bytes acknowledged so far.
    pub fn local_digest(&self) -> String {
        self.digest.hex()
    }

    fn upload_id(&self) -> &str {
        self.handle.as_ref().map(|h| h.upload_id.as_str()).unwrap_or("")
    }

    fn invalid_state(&self, operation: &'static str) -> BlobError {
        BlobError::InvalidState {
            upload_id: self.upload_id().to_string(),
            state: self.state,
            operation,
        }
    }

    fn require_fresh(&self, operation: &'static str) -> Result<(), BlobError> {
        if self.state == UploadState::NotStarted {
            Ok(())
        } else {
            Err(self.invalid_state(operation))
        }
    }

    fn require_open(&self, operation: &'static str) -> Result<(), BlobError> {
        if self.state.accepts_chunks() {
            Ok(())
        } else {
            Err(self.invalid_state(operation))
        }
    }

    // -----------------------------------------------------------------------
    // Upload lifecycle
    // -----------------------------------------------------------------------

    /// Opens an upload for `field` of `document_id`.
    pub async fn begin(
        &mut self,
        document_id: &str,
        field: &str,
        file_name: &str,
    ) -> Result<UploadHandle, BlobError> {
        self.require_fresh("begin")?;
        validate_file_name(file_name)?;

        let request = StartUploadRequest {
            document_id: document_id.to_string(),
            field: field.to_string(),
            file_name: file_name.to_string(),
        };
        let info = self.transport.start_upload(&request).await?;
        let handle = request.into_handle(info.upload_id);

        debug!(
            upload_id = %handle.upload_id,
            document_id = %handle.document_id,
            field = %handle.field,
            "upload started"
        );

        self.handle = Some(handle.clone());
        self.state = UploadState::InProgress;
        self.save_checkpoint().await;
        self.emit(UploadEvent::Started {
            upload_id: handle.upload_id.clone(),
            offset: 0,
        })
        .await;

        Ok(handle)
    }

    /// Sends `payload` as the next chunk, at the current offset.
    ///
    /// Returns the new offset. A failed write moves the session to
    /// `Failed`; the chunk is never resent automatically because the
    /// server may have partially applied it.
    pub async fn send_chunk(&mut self, payload: &[u8]) -> Result<u64, BlobError> {
        self.require_open("send chunk")?;
        if payload.is_empty() {
            return Ok(self.offset);
        }

        let upload_id = self.upload_id().to_string();
        let chunk_offset = self.offset;
        let write = ChunkWrite {
            upload_id: &upload_id,
            offset: chunk_offset,
            payload,
        };

        let sent = self.transport.put_chunk(write).await;
        if let Err(e) = sent {
            error!(
                upload_id = %upload_id,
                offset = self.offset,
                len = payload.len(),
                error = %e,
                "chunk write failed"
            );
            self.fail(&e).await;
            return Err(e);
        }

        self.digest.update(payload);
        self.offset += payload.len() as u64;
        self.chunks_sent += 1;
        self.speed.add_sample(payload.len() as u64);

        debug!(
            upload_id = %upload_id,
            offset = chunk_offset,
            len = payload.len(),
            "chunk acknowledged"
        );

        self.save_checkpoint().await;
        self.emit(UploadEvent::Chunk {
            upload_id,
            offset: chunk_offset,
            len: payload.len(),
            bytes_sent: self.offset,
            bytes_per_second: self.speed.bytes_per_second(),
        })
        .await;

        Ok(self.offset)
    }

    /// Streams `source` in chunks of `chunk_size`, then commits and verifies.
    ///
    /// The source yields the bytes that follow whatever this session has
    /// already sent. An empty source still commits (a zero-byte blob).
    /// An invalid `chunk_size` fails the session before any chunk is sent.
    pub async fn send_all<R: AsyncRead + Unpin>(
        &mut self,
        source: R,
        chunk_size: usize,
    ) -> Result<CommitResult, BlobError> {
        self.require_open("send chunks")?;
        let source = match ChunkSource::new(source, chunk_size) {
            Ok(source) => source,
            Err(e) => {
                let err = BlobError::from(e);
                self.fail(&err).await;
                return Err(err);
            }
        };
        self.chunk_size = chunk_size;
        self.drain(source).await?;
        self.commit().await
    }

    /// Continues an upload from a checkpoint, then commits and verifies.
    ///
    /// `source` must yield the whole blob from byte 0. The first
    /// `next_offset` bytes are re-hashed and must match the checkpoint's
    /// prefix digest, otherwise the source changed and nothing is sent.
    pub async fn resume<R: AsyncRead + Unpin>(
        &mut self,
        checkpoint: UploadCheckpoint,
        source: R,
    ) -> Result<CommitResult, BlobError> {
        self.require_fresh("resume")?;

        let mut source = ChunkSource::new(source, checkpoint.chunk_size)?;
        let mut digest = RunningDigest::new();
        source.skip_prefix(checkpoint.next_offset, &mut digest).await?;
        if !digest.matches(&checkpoint.prefix_sha1) {
            return Err(TransferError::PrefixMismatch {
                expected: checkpoint.prefix_sha1,
                actual: digest.hex(),
            }
            .into());
        }

        info!(
            upload_id = %checkpoint.upload_id,
            offset = checkpoint.next_offset,
            "resuming upload"
        );

        self.handle = Some(UploadHandle {
            upload_id: checkpoint.upload_id.clone(),
            document_id: checkpoint.document_id,
            field: checkpoint.field,
            file_name: checkpoint.file_name,
        });
        self.digest = digest;
        self.offset = checkpoint.next_offset;
        self.chunk_size = checkpoint.chunk_size;
        self.state = UploadState::InProgress;
        self.emit(UploadEvent::Started {
            upload_id: checkpoint.upload_id,
            offset: self.offset,
        })
        .await;

        self.drain(source).await?;
        self.commit().await
    }

    async fn drain<R: AsyncRead + Unpin>(
        &mut self,
        mut source: ChunkSource<R>,
    ) -> Result<(), BlobError> {
        loop {
            if self.cancel.is_cancelled() {
                self.abort_quietly().await;
                return Err(BlobError::Cancelled);
            }

            let chunk = match source.next_chunk().await {
                Ok(Some(chunk)) => chunk,
                Ok(None) => return Ok(()),
                Err(e) => {
                    let err = BlobError::from(e);
                    self.fail(&err).await;
                    return Err(err);
                }
            };
            self.send_chunk(&chunk.data).await?;
        }
    }

    /// Finalizes the upload and verifies the server digest.
    ///
    /// On a digest or size mismatch the session is `Failed` and the
    /// returned error carries both values; the committed blob should
    /// then be deleted by the caller.
    pub async fn commit(&mut self) -> Result<CommitResult, BlobError> {
        self.require_open("commit")?;
        let upload_id = self.upload_id().to_string();

        let committed = self.transport.commit_upload(&upload_id).await;
        let result = match committed {
            Ok(result) => result,
            Err(e) => {
                self.fail(&e).await;
                return Err(e);
            }
        };

        if let Err(e) = verify(&upload_id, &self.digest, &result) {
            error!(
                upload_id = %upload_id,
                blob_id = %result.blob_id,
                error = %e,
                "committed blob failed verification"
            );
            self.fail(&e).await;
            return Err(e);
        }

        self.state = UploadState::Committed;
        self.remove_checkpoint().await;
        info!(
            upload_id = %upload_id,
            blob_id = %result.blob_id,
            bytes = result.byte_count,
            chunks = self.chunks_sent,
            "blob committed"
        );
        self.emit(UploadEvent::Committed {
            upload_id,
            result: result.clone(),
        })
        .await;

        Ok(result)
    }

    /// Abandons the upload and asks the server to release it.
    ///
    /// The session is `Aborted` even if the abort request fails.
    pub async fn abort(&mut self) -> Result<(), BlobError> {
        if self.state.is_terminal() {
            return Err(self.invalid_state("abort"));
        }
        if self.state == UploadState::NotStarted {
            self.state = UploadState::Aborted;
            return Ok(());
        }

        let upload_id = self.upload_id().to_string();
        self.state = UploadState::Aborted;
        self.remove_checkpoint().await;
        self.emit(UploadEvent::Aborted {
            upload_id: upload_id.clone(),
        })
        .await;

        let released = self.transport.abort_upload(&upload_id).await?;
        if !released {
            debug!(upload_id = %upload_id, "no abort call; upload left to expire");
        }
        Ok(())
    }

    async fn abort_quietly(&mut self) {
        let upload_id = self.upload_id().to_string();
        if let Err(e) = self.abort().await {
            warn!(upload_id = %upload_id, error = %e, "abort after cancellation failed");
        }
    }

    async fn fail(&mut self, err: &BlobError) {
        self.state = UploadState::Failed;
        let upload_id = self.upload_id().to_string();
        // A broken source or corrupt commit cannot be resumed from this point.
        if matches!(
            err,
            BlobError::IntegrityError { .. } | BlobError::Transfer(_) | BlobError::Io(_)
        ) {
            self.remove_checkpoint().await;
        }
        self.emit(UploadEvent::Failed {
            upload_id,
            error: err.to_string(),
        })
        .await;
    }

    // -----------------------------------------------------------------------
    // Committed blobs
    // -----------------------------------------------------------------------

    /// Downloads a committed blob.
    pub async fn fetch(&self, blob_id: &str) -> Result<BlobDetail, BlobError> {
        let detail = self.transport.fetch_blob(blob_id).await?;
        debug!(blob_id = %blob_id, bytes = detail.content.len(), "blob fetched");
        Ok(detail)
    }

    /// Deletes a committed blob, reporting the server's failure verbatim.
    pub async fn delete(&self, blob_id: &str) -> Result<(), BlobError> {
        self.transport.delete_blob(blob_id).await?;
        debug!(blob_id = %blob_id, "blob deleted");
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Helpers
    // -----------------------------------------------------------------------

    async fn save_checkpoint(&self) {
        let (Some(store), Some(handle)) = (&self.checkpoints, &self.handle) else {
            return;
        };
        let checkpoint = UploadCheckpoint {
            upload_id: handle.upload_id.clone(),
            document_id: handle.document_id.clone(),
            field: handle.field.clone(),
            file_name: handle.file_name.clone(),
            next_offset: self.offset,
            prefix_sha1: self.digest.hex(),
            chunk_size: self.chunk_size,
        };
        if let Err(e) = store.save(&checkpoint).await {
            warn!(upload_id = %handle.upload_id, error = %e, "failed to save checkpoint");
        }
    }

    async fn remove_checkpoint(&self) {
        let (Some(store), Some(handle)) = (&self.checkpoints, &self.handle) else {
            return;
        };
        if let Err(e) = store.remove(&handle.upload_id).await {
            warn!(upload_id = %handle.upload_id, error = %e, "failed to remove checkpoint");
        }
    }

    async fn emit(&self, event: UploadEvent) {
        if let Some(tx) = &self.events {
            let _ = tx.send(event).await;
        }
    }
}
