use serde::{Deserialize, Serialize};

/// A contiguous slice of the byte source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    /// Byte offset of `data[0]` within the final blob.
    pub offset: u64,
    /// Raw chunk bytes.
    pub data: Vec<u8>,
}

impl Chunk {
    /// Offset of the byte after this chunk.
    pub fn end(&self) -> u64 {
        self.offset + self.data.len() as u64
    }
}

/// One chunk write request for an open upload.
///
/// Borrows the payload; nothing is retained after the request is sent.
#[derive(Debug, Clone, Copy)]
pub struct ChunkWrite<'a> {
    pub upload_id: &'a str,
    pub offset: u64,
    pub payload: &'a [u8],
}

impl ChunkWrite<'_> {
    /// Value of the `length` header.
    pub fn length(&self) -> usize {
        self.payload.len()
    }
}

/// Lifecycle of a single upload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UploadState {
    NotStarted,
    InProgress,
    Committed,
    Aborted,
    Failed,
}

impl UploadState {
    /// Chunks may only be sent (and the upload committed) while in progress.
    pub fn accepts_chunks(self) -> bool {
        self == UploadState::InProgress
    }

    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            UploadState::Committed | UploadState::Aborted | UploadState::Failed
        )
    }
}

impl std::fmt::Display for UploadState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            UploadState::NotStarted => "not started",
            UploadState::InProgress => "in progress",
            UploadState::Committed => "committed",
            UploadState::Aborted => "aborted",
            UploadState::Failed => "failed",
        };
        f.write_str(s)
    }
}
