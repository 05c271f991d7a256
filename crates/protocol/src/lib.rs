//! Wire protocol types for the Chino.io REST API.
//!
//! Every non-binary response is wrapped in an [`Envelope`]. Blob uploads
//! use the records in [`messages`]; the binary endpoints (chunk write and
//! blob fetch) carry their metadata in headers named in [`constants`].

pub mod constants;
pub mod disposition;
pub mod envelope;
pub mod messages;
pub mod types;

// Re-export primary types for convenience.
pub use disposition::parse_filename;
pub use envelope::{Envelope, EnvelopeError, ResultKind};
pub use types::{BlobDetail, CommitResult, DeleteOptions, ListResult, Paging, UploadHandle};
