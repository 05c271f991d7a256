use sha1::{Digest, Sha1};
use tokio::io::{AsyncRead, AsyncReadExt};

use crate::types::Chunk;
use crate::{TransferError, validate_chunk_size};

// ---------------------------------------------------------------------------
// Checksum helpers
// ---------------------------------------------------------------------------

/// Computes SHA-1 of `data` and returns the lowercase hex digest.
pub fn checksum_bytes(data: &[u8]) -> String {
    let mut hasher = Sha1::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}

// ---------------------------------------------------------------------------
// RunningDigest
// ---------------------------------------------------------------------------

/// SHA-1 accumulated over every byte sent, in send order.
#[derive(Clone, Default)]
pub struct RunningDigest {
    hasher: Sha1,
    bytes: u64,
}

impl RunningDigest {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feeds the next bytes of the stream.
    pub fn update(&mut self, data: &[u8]) {
        self.hasher.update(data);
        self.bytes += data.len() as u64;
    }

    /// Lowercase hex digest of everything fed so far.
    ///
    /// Does not consume the state, so more bytes may follow.
    pub fn hex(&self) -> String {
        hex::encode(self.hasher.clone().finalize())
    }

    /// Number of bytes fed so far.
    pub fn bytes(&self) -> u64 {
        self.bytes
    }

    /// Case-insensitive comparison against a hex digest reported elsewhere.
    pub fn matches(&self, other_hex: &str) -> bool {
        self.hex().eq_ignore_ascii_case(other_hex.trim())
    }
}

impl std::fmt::Debug for RunningDigest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RunningDigest")
            .field("sha1", &self.hex())
            .field("bytes", &self.bytes)
            .finish()
    }
}

// ---------------------------------------------------------------------------
// ChunkSource
// ---------------------------------------------------------------------------

/// Reads a byte source in bounded chunks tagged with their byte offset.
///
/// Each chunk is filled up to `chunk_size` unless the source ends first;
/// a short chunk is therefore always the last one.
pub struct ChunkSource<R> {
    reader: R,
    chunk_size: usize,
    offset: u64,
    eof: bool,
}

impl<R: AsyncRead + Unpin> ChunkSource<R> {
    /// Wraps `reader`. `chunk_size` must be positive.
    pub fn new(reader: R, chunk_size: usize) -> Result<Self, TransferError> {
        validate_chunk_size(chunk_size)?;
        Ok(Self {
            reader,
            chunk_size,
            offset: 0,
            eof: false,
        })
    }

    /// Reads the next chunk. Returns `None` once the source is exhausted.
    pub async fn next_chunk(&mut self) -> Result<Option<Chunk>, TransferError> {
        if self.eof {
            return Ok(None);
        }

        let mut buf = vec![0u8; self.chunk_size];
        let filled = self.fill(&mut buf).await?;
        if filled == 0 {
            return Ok(None);
        }
        buf.truncate(filled);

        let chunk = Chunk {
            offset: self.offset,
            data: buf,
        };
        self.offset = chunk.end();
        Ok(Some(chunk))
    }

    /// Consumes the first `len` bytes of the source, feeding them to `digest`.
    ///
    /// Used when resuming: the bytes were already sent, but the digest
    /// state has to be rebuilt from them.
    pub async fn skip_prefix(
        &mut self,
        len: u64,
        digest: &mut RunningDigest,
    ) -> Result<(), TransferError> {
        let mut buf = vec![0u8; self.chunk_size];
        let mut remaining = len;
        while remaining > 0 {
            let want = remaining.min(self.chunk_size as u64) as usize;
            let n = self.fill(&mut buf[..want]).await?;
            digest.update(&buf[..n]);
            self.offset += n as u64;
            remaining -= n as u64;
            if n < want {
                return Err(TransferError::SourceTooShort {
                    expected: len,
                    actual: self.offset,
                });
            }
        }
        Ok(())
    }

    /// Reads until `buf` is full or the source ends.
    async fn fill(&mut self, buf: &mut [u8]) -> Result<usize, TransferError> {
        let mut filled = 0;
        while filled < buf.len() {
            let n = self.reader.read(&mut buf[filled..]).await?;
            if n == 0 {
                self.eof = true;
                break;
            }
            filled += n;
        }
        Ok(filled)
    }

    /// Byte offset of the next chunk.
    pub fn offset(&self) -> u64 {
        self.offset
    }
}
