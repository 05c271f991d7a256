//! Endpoint paths, header names and defaults shared by the client crates.

/// Default API host. Version segment is appended separately.
pub const DEFAULT_BASE_URL: &str = "https://api.test.chino.io/";

/// Default API version segment.
pub const DEFAULT_API_VERSION: &str = "v1";

/// Collection endpoint for blobs: `POST` starts an upload.
pub const BLOBS_PATH: &str = "blobs";

/// Commit endpoint for blob uploads.
pub const BLOBS_COMMIT_PATH: &str = "blobs/commit";

/// Header carrying the byte offset of a chunk.
pub const HEADER_OFFSET: &str = "offset";

/// Header carrying the byte length of a chunk.
pub const HEADER_LENGTH: &str = "length";

/// Content type of a raw chunk body.
pub const OCTET_STREAM: &str = "application/octet-stream";

/// Basic-auth username used when authenticating with a user access token.
pub const ACCESS_TOKEN_USER: &str = "ACCESS_TOKEN";

/// Returns the path of a single blob (or of an in-flight upload).
pub fn blob_path(id: &str) -> String {
    format!("{BLOBS_PATH}/{id}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blob_path_joins_id() {
        assert_eq!(blob_path("abc-123"), "blobs/abc-123");
    }

    #[test]
    fn commit_path_is_under_blobs() {
        assert!(BLOBS_COMMIT_PATH.starts_with(BLOBS_PATH));
    }
}
