//! Size and type allowlists applied before any network call.
use thiserror::Error;

use crate::Artifact;

/// Upper bound for documents and videos (200 MiB).
pub const MAX_UPLOAD_BYTES: u64 = 200 * 1024 * 1024;

pub const DOCUMENT_EXTENSIONS: &[&str] = &[
    "pdf", "doc", "docx", "ppt", "pptx", "xls", "xlsx", "csv", "txt", "md",
];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Rejection {
    #[error("{}", oversize_message(*.size))]
    TooLarge { size: u64 },
    #[error("Unsupported file type: {}", .extension.as_deref().unwrap_or("unknown"))]
    UnsupportedExtension { extension: Option<String> },
    #[error("Please choose a video file")]
    NotVideo,
    #[error("Please choose an image file")]
    NotImage,
}

/// Non-blocking hint produced by a successful document check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentCheck {
    Accepted,
    /// Slide decks parse better once converted to PDF.
    PreferPdf,
}

impl DocumentCheck {
    pub fn advisory(self) -> Option<&'static str> {
        match self {
            DocumentCheck::Accepted => None,
            DocumentCheck::PreferPdf => Some(
                "Tip: converting PPT files to PDF before uploading gives better parsing results",
            ),
        }
    }
}

/// Shared by the client-side pre-check and the server's "payload too large" answer.
pub fn oversize_message(size: u64) -> String {
    format!(
        "File too large: {:.1}MB, the maximum supported size is 200MB",
        size as f64 / 1024.0 / 1024.0
    )
}

pub fn is_document_extension(extension: &str) -> bool {
    DOCUMENT_EXTENSIONS.contains(&extension)
}

pub fn validate_document(file: &Artifact) -> Result<DocumentCheck, Rejection> {
    if file.size > MAX_UPLOAD_BYTES {
        return Err(Rejection::TooLarge { size: file.size });
    }
    let extension = file.extension();
    match extension.as_deref() {
        Some("ppt" | "pptx") => Ok(DocumentCheck::PreferPdf),
        Some(ext) if is_document_extension(ext) => Ok(DocumentCheck::Accepted),
        _ => Err(Rejection::UnsupportedExtension { extension }),
    }
}

pub fn validate_video(file: &Artifact) -> Result<(), Rejection> {
    if !file.is_video() {
        return Err(Rejection::NotVideo);
    }
    if file.size > MAX_UPLOAD_BYTES {
        return Err(Rejection::TooLarge { size: file.size });
    }
    Ok(())
}

pub fn validate_image(file: &Artifact) -> Result<(), Rejection> {
    if file.is_image() {
        Ok(())
    } else {
        Err(Rejection::NotImage)
    }
}
