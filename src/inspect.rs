//! Document Inspector - Best-Effort Page Counting
//!
//! Only PDFs carry a page tree that can be counted without rendering.
//! Everything else comes back [`PageCount::Unknown`] and the customer sets
//! the count by hand. Inspection never fails: a document the parser chokes
//! on is just another unknown.

use lopdf::Document;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::num::NonZeroU32;
use std::ops::Add;
use thiserror::Error;

/// Detected page count of one or more uploads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "status", content = "pages", rename_all = "lowercase")]
pub enum PageCount {
    Known(NonZeroU32),
    Unknown,
}

impl PageCount {
    /// `Known(n)` for positive `n`, `Unknown` for zero.
    pub fn from_count(n: u32) -> Self {
        NonZeroU32::new(n).map_or(Self::Unknown, Self::Known)
    }

    pub fn get(self) -> Option<u32> {
        match self {
            Self::Known(n) => Some(n.get()),
            Self::Unknown => None,
        }
    }

    pub fn is_known(self) -> bool {
        matches!(self, Self::Known(_))
    }

    /// Final page count to price with. A manual override always wins over
    /// detection, including an override the pricing engine will reject.
    pub fn resolve(self, manual_override: Option<i64>) -> Option<i64> {
        manual_override.or_else(|| self.get().map(i64::from))
    }
}

/// Unknown is absorbing: one uncountable file makes the whole order unknown.
impl Add for PageCount {
    type Output = PageCount;

    fn add(self, rhs: PageCount) -> PageCount {
        match (self, rhs) {
            (Self::Known(a), Self::Known(b)) => a.checked_add(b.get()).map_or(Self::Unknown, Self::Known),
            _ => Self::Unknown,
        }
    }
}

impl fmt::Display for PageCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Known(n) if n.get() == 1 => f.write_str("1 page"),
            Self::Known(n) => write!(f, "{} pages", n),
            Self::Unknown => f.write_str("page count unknown"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentKind {
    Pdf,
    WordProcessor,
    Image,
    Unsupported,
}

impl DocumentKind {
    /// Classifies an upload by its declared MIME type. A missing or generic
    /// type falls back to the file extension, then to magic bytes.
    pub fn classify(mime_type: &str, file_name: &str, bytes: &[u8]) -> Self {
        let essence = mime_type
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();

        match essence.as_str() {
            "application/pdf" => Self::Pdf,
            "application/msword"
            | "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
            | "application/vnd.oasis.opendocument.text"
            | "application/rtf"
            | "text/rtf" => Self::WordProcessor,
            m if m.starts_with("image/") => Self::Image,
            "" | "application/octet-stream" => Self::sniff(file_name, bytes),
            _ => Self::Unsupported,
        }
    }

    fn sniff(file_name: &str, bytes: &[u8]) -> Self {
        let extension = file_name
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_ascii_lowercase())
            .unwrap_or_default();

        match extension.as_str() {
            "pdf" => return Self::Pdf,
            "doc" | "docx" | "odt" | "rtf" => return Self::WordProcessor,
            "jpg" | "jpeg" | "png" | "gif" | "webp" | "bmp" | "tif" | "tiff" => return Self::Image,
            _ => {}
        }

        if bytes.starts_with(b"%PDF") {
            Self::Pdf
        } else if bytes.starts_with(b"\x89PNG") || bytes.starts_with(&[0xFF, 0xD8, 0xFF]) {
            Self::Image
        } else {
            Self::Unsupported
        }
    }
}

impl fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Pdf => "PDF",
            Self::WordProcessor => "document",
            Self::Image => "image",
            Self::Unsupported => "unsupported type",
        };
        f.write_str(name)
    }
}

/// Why a PDF could not be counted. Never leaves this module as an error;
/// it becomes the note on an unknown [`Inspection`].
#[derive(Debug, Error)]
enum PdfCountError {
    #[error("unreadable PDF: {0}")]
    Parse(#[from] lopdf::Error),

    #[error("PDF is password protected")]
    Encrypted,

    #[error("PDF has an empty page tree")]
    NoPages,

    #[error("PDF parser aborted")]
    Aborted,
}

/// A file as received from the upload form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedFile {
    pub file_name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

impl UploadedFile {
    pub fn new(file_name: impl Into<String>, mime_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            mime_type: mime_type.into(),
            bytes,
        }
    }
}

/// Inspection result for one upload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Inspection {
    pub file_name: String,
    pub kind: DocumentKind,
    pub page_count: PageCount,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl Inspection {
    /// One-line summary, e.g. `report.pdf: 12 pages`.
    pub fn summary(&self) -> String {
        match &self.note {
            Some(note) => format!("{}: {} ({})", self.file_name, self.page_count, note),
            None => format!("{}: {}", self.file_name, self.page_count),
        }
    }
}

/// Combined inspection of every file in an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InspectionReport {
    pub files: Vec<Inspection>,
    pub total: PageCount,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct DocumentInspector;

impl DocumentInspector {
    pub fn new() -> Self {
        Self
    }

    /// Page count of a document, `Unknown` when it cannot be determined.
    pub fn inspect(&self, bytes: &[u8], mime_type: &str) -> PageCount {
        match DocumentKind::classify(mime_type, "", bytes) {
            DocumentKind::Pdf => count_pdf_pages(bytes).map_or(PageCount::Unknown, PageCount::from_count),
            _ => PageCount::Unknown,
        }
    }

    pub fn inspect_upload(&self, file: &UploadedFile) -> Inspection {
        let kind = DocumentKind::classify(&file.mime_type, &file.file_name, &file.bytes);

        let (page_count, note) = match kind {
            DocumentKind::Pdf => match count_pdf_pages(&file.bytes) {
                Ok(n) => (PageCount::from_count(n), None),
                Err(err) => {
                    tracing::warn!(file = %file.file_name, error = %err, "page count detection failed");
                    (PageCount::Unknown, Some(err.to_string()))
                }
            },
            other => (PageCount::Unknown, Some(other.to_string())),
        };

        tracing::debug!(file = %file.file_name, ?kind, ?page_count, "inspected upload");

        Inspection {
            file_name: file.file_name.clone(),
            kind,
            page_count,
            note,
        }
    }

    pub fn inspect_all(&self, files: &[UploadedFile]) -> InspectionReport {
        let files: Vec<Inspection> = files.iter().map(|f| self.inspect_upload(f)).collect();
        let total = files
            .iter()
            .map(|i| i.page_count)
            .reduce(|a, b| a + b)
            .unwrap_or(PageCount::Unknown);

        InspectionReport { files, total }
    }
}

fn count_pdf_pages(bytes: &[u8]) -> Result<u32, PdfCountError> {
    // lopdf can panic on hostile input; that is still just an unknown count.
    let document = std::panic::catch_unwind(|| Document::load_mem(bytes))
        .map_err(|_| PdfCountError::Aborted)??;

    if document.is_encrypted() {
        return Err(PdfCountError::Encrypted);
    }

    let pages = u32::try_from(document.get_pages().len()).map_err(|_| PdfCountError::Aborted)?;
    if pages == 0 {
        return Err(PdfCountError::NoPages);
    }
    Ok(pages)
}
