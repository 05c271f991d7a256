//! Chunked blob transfer with running digests and resume checkpoints.
//!
//! This crate holds the transport-independent mechanics of a blob upload:
//! splitting a byte source into offset-tagged chunks, hashing them in send
//! order, tracking the per-upload state, and persisting enough state to
//! continue after a crash.

mod checkpoint;
mod chunked;
mod progress;
mod types;
mod validation;

pub use checkpoint::{CheckpointStore, UploadCheckpoint};
pub use chunked::{ChunkSource, RunningDigest, checksum_bytes};
pub use progress::SpeedCalculator;
pub use types::{Chunk, ChunkWrite, UploadState};
pub use validation::{validate_chunk_size, validate_file_name};

/// Default chunk size: 12 KiB.
pub const DEFAULT_CHUNK_SIZE: usize = 12 * 1024;

/// Errors produced by the transfer crate.
#[derive(Debug, thiserror::Error)]
pub enum TransferError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("checkpoint error: {0}")]
    Checkpoint(#[from] serde_json::Error),

    #[error("source prefix changed: expected sha1 {expected}, got {actual}")]
    PrefixMismatch { expected: String, actual: String },

    #[error("source ended at byte {actual}, checkpoint expects {expected}")]
    SourceTooShort { expected: u64, actual: u64 },

    #[error("invalid chunk size: {0}")]
    InvalidChunkSize(usize),

    #[error("invalid file name: {0}")]
    InvalidFileName(String),
}
