use std::path::{Component, Path};

use crate::TransferError;

/// Rejects a zero chunk size.
pub fn validate_chunk_size(chunk_size: usize) -> Result<(), TransferError> {
    if chunk_size == 0 {
        return Err(TransferError::InvalidChunkSize(chunk_size));
    }
    Ok(())
}

/// Validates the file name declared when starting an upload.
///
/// The server stores it verbatim and echoes it back in the download
/// header, so it must be a single non-empty path component.
///
/// Rejects:
/// - Empty or whitespace-only names
/// - Names containing a directory separator
/// - `.` and `..`
/// - Names containing `;` or a line break (they would corrupt the header)
pub fn validate_file_name(name: &str) -> Result<(), TransferError> {
    if name.trim().is_empty() {
        return Err(TransferError::InvalidFileName("empty file name".into()));
    }

    if name.contains(['/', '\\']) {
        return Err(TransferError::InvalidFileName(format!(
            "directory separator not allowed: {name}"
        )));
    }

    if name.contains([';', '\r', '\n']) {
        return Err(TransferError::InvalidFileName(format!(
            "header delimiter not allowed: {name}"
        )));
    }

    let mut components = Path::new(name).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(_)), None) => Ok(()),
        _ => Err(TransferError::InvalidFileName(format!(
            "not a plain file name: {name}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_zero_chunk_size() {
        assert!(validate_chunk_size(0).is_err());
        assert!(validate_chunk_size(1).is_ok());
    }

    #[test]
    fn rejects_empty_name() {
        assert!(validate_file_name("").is_err());
        assert!(validate_file_name("   ").is_err());
    }

    #[test]
    fn rejects_separators() {
        assert!(validate_file_name("dir/file.txt").is_err());
        assert!(validate_file_name("dir\\file.txt").is_err());
        assert!(validate_file_name("/etc/passwd").is_err());
    }

    #[test]
    fn rejects_dot_names() {
        assert!(validate_file_name(".").is_err());
        assert!(validate_file_name("..").is_err());
    }

    #[test]
    fn rejects_header_delimiters() {
        assert!(validate_file_name("a;b.txt").is_err());
        assert!(validate_file_name("a\nb.txt").is_err());
    }

    #[test]
    fn accepts_plain_names() {
        assert!(validate_file_name("logo.png").is_ok());
        assert!(validate_file_name(".env").is_ok());
        assert!(validate_file_name("report final.pdf").is_ok());
    }
}
