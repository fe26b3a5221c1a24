use std::io::Cursor;

use zip::ZipArchive;

pub const PDF_MIME: &str = "application/pdf";
pub const DOCX_MIME: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";
const ZIP_MIME: &str = "application/zip";

/// Path of the main document part inside a word-processing package.
pub const DOCX_DOCUMENT_PART: &str = "word/document.xml";

/// Document formats the extractor knows how to read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Pdf,
    Docx,
}

impl DocumentKind {
    /// Resolves a kind from a filename extension (case-insensitive).
    pub fn from_extension(filename: &str) -> Option<Self> {
        let (_, ext) = filename.rsplit_once('.')?;
        match ext.to_ascii_lowercase().as_str() {
            "pdf" => Some(Self::Pdf),
            "docx" => Some(Self::Docx),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pdf => "pdf",
            Self::Docx => "docx",
        }
    }
}

/// Outcome of inspecting the leading bytes of an upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sniffed {
    pub mime: String,
    pub kind: Option<DocumentKind>,
}

/// Determines the content type from magic numbers, never from the filename.
///
/// Generic zip archives are opened and checked for a word-processing main part,
/// since some producers write packages the signature matcher does not recognise.
pub fn sniff(bytes: &[u8]) -> Sniffed {
    let mime = match infer::get(bytes) {
        Some(kind) => kind.mime_type().to_string(),
        None if std::str::from_utf8(bytes).is_ok() => "text/plain".to_string(),
        None => "application/octet-stream".to_string(),
    };

    let kind = match mime.as_str() {
        PDF_MIME => Some(DocumentKind::Pdf),
        DOCX_MIME => Some(DocumentKind::Docx),
        ZIP_MIME if has_docx_main_part(bytes) => Some(DocumentKind::Docx),
        _ => None,
    };

    Sniffed { mime, kind }
}

fn has_docx_main_part(bytes: &[u8]) -> bool {
    ZipArchive::new(Cursor::new(bytes))
        .map(|mut archive| archive.by_name(DOCX_DOCUMENT_PART).is_ok())
        .unwrap_or(false)
}
