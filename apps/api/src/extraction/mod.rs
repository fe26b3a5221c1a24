//! Text extraction: turns uploaded résumé bytes into plain text.
//!
//! Dispatch is by sniffed content first and filename extension second. Every
//! parse goes through a uniquely named scratch file that is removed on all exit
//! paths (the guard is dropped on success, parse error and caught panic alike).

pub mod docx;
pub mod pdf;
pub mod sniff;

use std::fs::File;
use std::io::Write;
use std::path::PathBuf;

use bytes::Bytes;
use tempfile::NamedTempFile;
use thiserror::Error;
use tracing::{debug, warn};

use crate::extraction::sniff::{sniff, DocumentKind};

/// An uploaded document. Owned by the caller for the duration of one extraction.
#[derive(Debug, Clone)]
pub struct RawDocument {
    pub filename: String,
    pub bytes: Bytes,
}

impl RawDocument {
    pub fn new(filename: impl Into<String>, bytes: impl Into<Bytes>) -> Self {
        Self {
            filename: filename.into(),
            bytes: bytes.into(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("File type not allowed: {0}. Please upload PDF or DOCX files")]
    DisallowedExtension(String),

    #[error("Unsupported file type: {0}")]
    UnsupportedFormat(String),

    #[error("Failed to extract text from {filename}: {cause}")]
    ExtractionFailed { filename: String, cause: String },

    #[error("Extraction of {filename} timed out after {secs}s")]
    TimedOut { filename: String, secs: u64 },

    #[error("Scratch file error: {0}")]
    Scratch(#[from] std::io::Error),
}

impl ExtractionError {
    /// Stable machine-readable code for per-document error annotations.
    pub fn code(&self) -> &'static str {
        match self {
            Self::DisallowedExtension(_) => "DISALLOWED_EXTENSION",
            Self::UnsupportedFormat(_) => "UNSUPPORTED_FORMAT",
            Self::ExtractionFailed { .. } => "EXTRACTION_FAILED",
            Self::TimedOut { .. } => "EXTRACTION_TIMEOUT",
            Self::Scratch(_) => "SCRATCH_IO_ERROR",
        }
    }
}

/// Accepted upload extensions are exactly `pdf` and `docx`, case-insensitive.
pub fn is_allowed_extension(filename: &str) -> bool {
    DocumentKind::from_extension(filename).is_some()
}

/// Reduces an uploaded filename to a safe display identifier.
///
/// Directory components are dropped, spaces become `_`, and anything outside
/// `[A-Za-z0-9._-]` is removed. Leading dots are stripped so the result is never hidden.
pub fn sanitize_filename(filename: &str) -> String {
    let base = filename.rsplit(['/', '\\']).next().unwrap_or_default();
    let cleaned: String = base
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("_")
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
        .collect();
    cleaned.trim_start_matches(['.', '_']).to_string()
}

/// Synchronous extractor. Cheap to clone; holds only the scratch location.
#[derive(Debug, Clone)]
pub struct TextExtractor {
    scratch_dir: PathBuf,
}

impl TextExtractor {
    pub fn new(scratch_dir: impl Into<PathBuf>) -> Self {
        Self {
            scratch_dir: scratch_dir.into(),
        }
    }

    /// Checks the extension, then extracts. Used for uploads from the HTTP boundary.
    pub fn extract_upload(&self, document: &RawDocument) -> Result<String, ExtractionError> {
        if !is_allowed_extension(&document.filename) {
            return Err(ExtractionError::DisallowedExtension(
                document.filename.clone(),
            ));
        }
        self.extract(&document.bytes, &document.filename)
    }

    /// Extracts plain text from `bytes`, using `filename` only as a fallback hint.
    pub fn extract(&self, bytes: &[u8], filename: &str) -> Result<String, ExtractionError> {
        let sniffed = sniff(bytes);

        if let Some(kind) = sniffed.kind {
            debug!(filename, mime = %sniffed.mime, "Sniffed document type");
            return self
                .run(kind, bytes)?
                .map_err(|cause| ExtractionError::ExtractionFailed {
                    filename: filename.to_string(),
                    cause,
                });
        }

        match DocumentKind::from_extension(filename) {
            Some(kind) => self.run(kind, bytes)?.map_err(|cause| {
                debug!(
                    filename,
                    mime = %sniffed.mime,
                    fallback = kind.as_str(),
                    %cause,
                    "Extension fallback failed"
                );
                ExtractionError::UnsupportedFormat(sniffed.mime.clone())
            }),
            None => Err(ExtractionError::UnsupportedFormat(sniffed.mime)),
        }
    }

    /// Runs one parser over a scratch copy of the bytes.
    ///
    /// The outer error is a scratch I/O failure; the inner one is the parser's cause.
    fn run(
        &self,
        kind: DocumentKind,
        bytes: &[u8],
    ) -> Result<Result<String, String>, ExtractionError> {
        let scratch = self.write_scratch(kind, bytes)?;

        let result = match kind {
            DocumentKind::Pdf => pdf::extract_pdf_text(scratch.path()),
            DocumentKind::Docx => File::open(scratch.path())
                .map_err(|e| e.to_string())
                .and_then(|file| docx::extract_paragraphs(file).map_err(|e| e.to_string())),
        };

        if let Err(e) = scratch.close() {
            warn!("Failed to remove scratch file: {e}");
        }
        Ok(result)
    }

    fn write_scratch(&self, kind: DocumentKind, bytes: &[u8]) -> std::io::Result<NamedTempFile> {
        let suffix = format!(".{}", kind.as_str());
        let mut file = tempfile::Builder::new()
            .prefix("upload-")
            .suffix(&suffix)
            .tempfile_in(&self.scratch_dir)?;
        file.write_all(bytes)?;
        file.flush()?;
        Ok(file)
    }
}
