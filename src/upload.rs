use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use uuid::Uuid;

use crate::error::ApiError;

/// Accepted upload categories with their MIME allow-lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadKind {
    /// PDF, DOC, DOCX
    Resume,
    /// PNG, JPEG, GIF, WebP
    Image,
}

#[derive(Debug, Error)]
pub enum UploadError {
    #[error("file exceeds the {max} byte limit")]
    TooLarge { size: usize, max: usize },

    #[error("unsupported file type")]
    UnsupportedType,

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<UploadError> for ApiError {
    fn from(err: UploadError) -> Self {
        match err {
            UploadError::TooLarge { size, max } => ApiError::bad_request(format!(
                "file is too large ({} bytes, limit {} bytes)",
                size, max
            )),
            UploadError::UnsupportedType => ApiError::bad_request("unsupported file type"),
            UploadError::Io(e) => e.into(),
        }
    }
}

/// Sniff the content type from magic bytes. The client-supplied header is
/// ignored; only the bytes decide.
pub fn sniff_mime(bytes: &[u8]) -> Option<&'static str> {
    if bytes.starts_with(b"%PDF-") {
        return Some("application/pdf");
    }
    // OLE compound document (legacy .doc)
    if bytes.starts_with(&[0xD0, 0xCF, 0x11, 0xE0, 0xA1, 0xB1, 0x1A, 0xE1]) {
        return Some("application/msword");
    }
    // ZIP container; only OOXML word documents are accepted, recognized by
    // the word/ entry names in the archive. Other zips (xlsx, plain archives)
    // carry no such entries and fall through.
    if bytes.starts_with(b"PK\x03\x04") {
        if contains(bytes, b"word/") {
            return Some(
                "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
            );
        }
        return None;
    }
    if bytes.starts_with(&[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A]) {
        return Some("image/png");
    }
    if bytes.starts_with(&[0xFF, 0xD8, 0xFF]) {
        return Some("image/jpeg");
    }
    if bytes.starts_with(b"GIF87a") || bytes.starts_with(b"GIF89a") {
        return Some("image/gif");
    }
    if bytes.len() >= 12 && bytes.starts_with(b"RIFF") && &bytes[8..12] == b"WEBP" {
        return Some("image/webp");
    }
    None
}

fn contains(haystack: &[u8], needle: &[u8]) -> bool {
    haystack.windows(needle.len()).any(|window| window == needle)
}

fn allowed(kind: UploadKind, mime: &str) -> bool {
    match kind {
        UploadKind::Resume => matches!(
            mime,
            "application/pdf"
                | "application/msword"
                | "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
        ),
        UploadKind::Image => {
            matches!(mime, "image/png" | "image/jpeg" | "image/gif" | "image/webp")
        }
    }
}

/// Validate size and sniffed type, returning the MIME type on acceptance.
/// Rejection happens before anything touches disk or the database.
pub fn validate(kind: UploadKind, bytes: &[u8], max_bytes: usize) -> Result<&'static str, UploadError> {
    if bytes.len() > max_bytes {
        return Err(UploadError::TooLarge {
            size: bytes.len(),
            max: max_bytes,
        });
    }
    match sniff_mime(bytes) {
        Some(mime) if allowed(kind, mime) => Ok(mime),
        _ => Err(UploadError::UnsupportedType),
    }
}

/// Canonical file extension for an accepted MIME type.
pub fn extension_for(mime: &str) -> &'static str {
    match mime {
        "application/pdf" => "pdf",
        "application/msword" => "doc",
        "application/vnd.openxmlformats-officedocument.wordprocessingml.document" => "docx",
        "image/png" => "png",
        "image/jpeg" => "jpg",
        "image/gif" => "gif",
        "image/webp" => "webp",
        _ => "bin",
    }
}

/// A file persisted to the upload directory under a collision-resistant name.
#[derive(Debug)]
pub struct StoredFile {
    pub path: PathBuf,
    pub file_name: String,
}

/// Write validated bytes under `dir` with a random name. Callers must remove
/// the file again if their follow-up database insert fails.
pub async fn store(dir: &Path, mime: &str, bytes: &[u8]) -> Result<StoredFile, UploadError> {
    fs::create_dir_all(dir).await?;
    let file_name = format!("{}.{}", Uuid::new_v4().simple(), extension_for(mime));
    let path = dir.join(&file_name);

    let mut file = fs::File::create(&path).await?;
    file.write_all(bytes).await?;
    file.flush().await?;

    Ok(StoredFile { path, file_name })
}

/// Remove a stored file, tolerating the case where it is already absent.
pub async fn remove_quietly(path: &Path) {
    match fs::remove_file(path).await {
        Ok(()) => {}
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => tracing::warn!("failed to remove stored file {}: {}", path.display(), e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PNG: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0, 0];
    const JPEG: &[u8] = &[0xFF, 0xD8, 0xFF, 0xE0, 0, 0];

    #[test]
    fn sniffs_known_signatures() {
        assert_eq!(sniff_mime(b"%PDF-1.7 rest"), Some("application/pdf"));
        assert_eq!(sniff_mime(PNG), Some("image/png"));
        assert_eq!(sniff_mime(JPEG), Some("image/jpeg"));
        assert_eq!(sniff_mime(b"GIF89a...."), Some("image/gif"));
        assert_eq!(sniff_mime(b"RIFF\x00\x00\x00\x00WEBPVP8 "), Some("image/webp"));
        assert_eq!(
            sniff_mime(b"PK\x03\x04\x14\x00word/document.xml"),
            Some("application/vnd.openxmlformats-officedocument.wordprocessingml.document")
        );
        assert_eq!(sniff_mime(b"plain text"), None);
        assert_eq!(sniff_mime(b""), None);
    }

    #[test]
    fn non_word_zip_containers_are_rejected() {
        // spreadsheet-shaped OOXML: zip magic, [Content_Types].xml, no word/ entry
        let xlsx = b"PK\x03\x04\x14\x00[Content_Types].xml xl/workbook.xml";
        assert_eq!(sniff_mime(xlsx), None);
        assert!(matches!(
            validate(UploadKind::Resume, xlsx, 1024),
            Err(UploadError::UnsupportedType)
        ));
        // plain zip archive
        assert_eq!(sniff_mime(b"PK\x03\x04\x14\x00notes.txt"), None);
    }

    #[test]
    fn resume_allow_list() {
        assert!(validate(UploadKind::Resume, b"%PDF-1.4", 1024).is_ok());
        assert!(matches!(
            validate(UploadKind::Resume, PNG, 1024),
            Err(UploadError::UnsupportedType)
        ));
    }

    #[test]
    fn image_allow_list() {
        assert!(validate(UploadKind::Image, PNG, 1024).is_ok());
        assert!(validate(UploadKind::Image, JPEG, 1024).is_ok());
        assert!(matches!(
            validate(UploadKind::Image, b"%PDF-1.4", 1024),
            Err(UploadError::UnsupportedType)
        ));
    }

    #[test]
    fn size_cap_is_enforced() {
        let oversized = vec![0u8; 32];
        assert!(matches!(
            validate(UploadKind::Image, &oversized, 16),
            Err(UploadError::TooLarge { size: 32, max: 16 })
        ));
    }

    #[test]
    fn sniffed_type_beats_extension_thinking() {
        // bytes that claim nothing: rejected regardless of what a client says
        assert!(validate(UploadKind::Resume, b"<html>not a pdf</html>", 1024).is_err());
    }

    #[tokio::test]
    async fn store_and_remove_roundtrip() {
        let dir = std::env::temp_dir().join(format!("atrium-upload-{}", Uuid::new_v4().simple()));
        let stored = store(&dir, "application/pdf", b"%PDF-1.4 test").await.unwrap();
        assert!(stored.path.exists());
        assert!(stored.file_name.ends_with(".pdf"));

        remove_quietly(&stored.path).await;
        assert!(!stored.path.exists());
        // second removal is a no-op
        remove_quietly(&stored.path).await;

        let _ = tokio::fs::remove_dir(&dir).await;
    }

    #[tokio::test]
    async fn stored_names_do_not_collide() {
        let dir = std::env::temp_dir().join(format!("atrium-upload-{}", Uuid::new_v4().simple()));
        let a = store(&dir, "image/png", PNG).await.unwrap();
        let b = store(&dir, "image/png", PNG).await.unwrap();
        assert_ne!(a.file_name, b.file_name);
        remove_quietly(&a.path).await;
        remove_quietly(&b.path).await;
        let _ = tokio::fs::remove_dir(&dir).await;
    }
}
