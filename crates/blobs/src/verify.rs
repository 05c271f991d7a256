use chino_protocol::CommitResult;
use chino_transfer::RunningDigest;

use crate::error::BlobError;

/// Checks a commit result against the locally computed digest.
///
/// Both the byte count and the SHA-1 must match; hex comparison is
/// case-insensitive. A mismatch means the committed blob is corrupt and
/// should be deleted rather than referenced.
pub fn verify(
    upload_id: &str,
    local: &RunningDigest,
    commit: &CommitResult,
) -> Result<(), BlobError> {
    if local.bytes() != commit.byte_count {
        return Err(BlobError::IntegrityError {
            upload_id: upload_id.to_string(),
            what: "byte count",
            local: local.bytes().to_string(),
            server: commit.byte_count.to_string(),
        });
    }

    if !local.matches(&commit.sha1) {
        return Err(BlobError::IntegrityError {
            upload_id: upload_id.to_string(),
            what: "sha1",
            local: local.hex(),
            server: commit.sha1.clone(),
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chino_transfer::checksum_bytes;

    fn commit_for(data: &[u8]) -> CommitResult {
        CommitResult {
            blob_id: "b1".into(),
            byte_count: data.len() as u64,
            sha1: checksum_bytes(data),
            md5: None,
            document_id: "d1".into(),
        }
    }

    #[test]
    fn matching_digest_passes() {
        let mut digest = RunningDigest::new();
        digest.update(b"hello");
        assert!(verify("u1", &digest, &commit_for(b"hello")).is_ok());
    }

    #[test]
    fn uppercase_server_digest_passes() {
        let mut digest = RunningDigest::new();
        digest.update(b"hello");
        let mut commit = commit_for(b"hello");
        commit.sha1 = commit.sha1.to_uppercase();
        assert!(verify("u1", &digest, &commit).is_ok());
    }

    #[test]
    fn digest_mismatch_is_integrity_error() {
        let mut digest = RunningDigest::new();
        digest.update(b"hellO");
        let err = verify("u1", &digest, &commit_for(b"hello")).unwrap_err();
        assert!(matches!(
            err,
            BlobError::IntegrityError { what: "sha1", .. }
        ));
    }

    #[test]
    fn byte_count_mismatch_is_integrity_error() {
        let mut digest = RunningDigest::new();
        digest.update(b"hello");
        let mut commit = commit_for(b"hello");
        commit.byte_count = 4;
        let err = verify("u1", &digest, &commit).unwrap_err();
        assert!(matches!(
            err,
            BlobError::IntegrityError {
                what: "byte count",
                ..
            }
        ));
    }

    #[test]
    fn empty_upload_verifies() {
        let digest = RunningDigest::new();
        assert!(verify("u1", &digest, &commit_for(b"")).is_ok());
    }
}
