//! Chunked blob uploads with end-to-end digest verification.
//!
//! The transport is abstracted behind [`BlobTransport`] so the upload
//! protocol can be driven against the HTTP client or a test double.
//!
//! # Protocol
//!
//! 1. **Begin**: open an upload for a document's blob field
//! 2. **Send**: write chunks at strictly increasing, contiguous offsets
//! 3. **Commit**: finalize the blob; the server reports its SHA-1
//! 4. **Verify**: compare the server digest with the running local one

pub mod error;
pub mod session;
pub mod transport;
pub mod types;
pub mod verify;

#[cfg(test)]
pub(crate) mod testing;

pub use error::BlobError;
pub use session::ChunkedUploadSession;
pub use transport::{BlobTransport, TransportFuture};
pub use types::UploadEvent;
pub use verify::verify;
