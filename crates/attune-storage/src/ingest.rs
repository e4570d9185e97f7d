//! Filesystem document ingestion.
//!
//! Text-typed files are read as raw UTF-8; every other type is encoded as
//! a base64 data URI. The chat core treats the resulting content as opaque
//! either way.

use std::path::Path;

use base64::Engine as _;
use chrono::Utc;

use attune_core::error::{AttuneError, Result};
use attune_core::types::UploadedDocument;

/// Read a file into an `UploadedDocument`.
///
/// The document id is derived from the file name plus the ingestion
/// timestamp in milliseconds, which tolerates re-uploading the same file.
pub fn read_document(path: &Path) -> Result<UploadedDocument> {
    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| AttuneError::Storage(format!("Invalid file name: {}", path.display())))?
        .to_string();

    let mime_type = mime_guess::from_path(path)
        .first_or_octet_stream()
        .essence_str()
        .to_string();

    let content = if mime_type.starts_with("text/") {
        std::fs::read_to_string(path)?
    } else {
        let bytes = std::fs::read(path)?;
        let payload = base64::engine::general_purpose::STANDARD.encode(bytes);
        format!("data:{};base64,{}", mime_type, payload)
    };

    Ok(UploadedDocument {
        id: format!("{}-{}", name, Utc::now().timestamp_millis()),
        name,
        mime_type,
        content,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_text_file_read_as_raw_text() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.txt");
        std::fs::write(&path, "plain contents").unwrap();

        let doc = read_document(&path).unwrap();
        assert_eq!(doc.name, "notes.txt");
        assert_eq!(doc.mime_type, "text/plain");
        assert_eq!(doc.content, "plain contents");
    }

    #[test]
    fn test_binary_file_read_as_data_uri() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("image.png");
        let mut f = std::fs::File::create(&path).unwrap();
        f.write_all(&[0x89, 0x50, 0x4e, 0x47]).unwrap();

        let doc = read_document(&path).unwrap();
        assert_eq!(doc.mime_type, "image/png");
        assert!(doc.content.starts_with("data:image/png;base64,"));

        let payload = doc.content.rsplit(',').next().unwrap();
        let decoded = base64::engine::general_purpose::STANDARD
            .decode(payload)
            .unwrap();
        assert_eq!(decoded, vec![0x89, 0x50, 0x4e, 0x47]);
    }

    #[test]
    fn test_unknown_extension_is_octet_stream() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("blob.xyzzy");
        std::fs::write(&path, [1u8, 2, 3]).unwrap();

        let doc = read_document(&path).unwrap();
        assert_eq!(doc.mime_type, "application/octet-stream");
        assert!(doc.content.starts_with("data:application/octet-stream;base64,"));
    }

    #[test]
    fn test_id_derived_from_name() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.txt");
        std::fs::write(&path, "x").unwrap();

        let doc = read_document(&path).unwrap();
        assert!(doc.id.starts_with("report.txt-"));
        assert_ne!(doc.id, "report.txt-");
    }

    #[test]
    fn test_missing_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.txt");
        assert!(read_document(&path).is_err());
    }
}
