//! Text extraction for uploaded resume documents.
//!
//! Extraction is CPU-bound (PDF parsing in particular) and must be called from
//! `tokio::task::spawn_blocking`, never directly on the async runtime.

use std::io::{Cursor, Read};
use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;

use crate::forms::UploadedFile;

const DOCX_BODY: &str = "word/document.xml";
const MIN_LEGACY_RUN: usize = 4;

static XML_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<[^>]*>").expect("tag pattern is valid"));
static PARAGRAPH_END: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"</w:p>|<w:br\s*/>").expect("paragraph pattern is valid"));
static TAB: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<w:tab\s*/>").expect("tab pattern is valid"));

#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("unsupported document type '{0}'")]
    Unsupported(String),

    #[error("PDF extraction failed: {0}")]
    Pdf(String),

    #[error("DOCX archive is unreadable: {0}")]
    Docx(#[from] zip::result::ZipError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Pdf,
    Doc,
    Docx,
    Text,
}

impl DocumentKind {
    pub fn from_mime(mime: &str) -> Option<Self> {
        match mime {
            "application/pdf" => Some(DocumentKind::Pdf),
            "application/msword" => Some(DocumentKind::Doc),
            "application/vnd.openxmlformats-officedocument.wordprocessingml.document" => {
                Some(DocumentKind::Docx)
            }
            "text/plain" => Some(DocumentKind::Text),
            _ => None,
        }
    }

    pub fn from_extension(file_name: &str) -> Option<Self> {
        let (_, ext) = file_name.rsplit_once('.')?;
        match ext.to_ascii_lowercase().as_str() {
            "pdf" => Some(DocumentKind::Pdf),
            "doc" => Some(DocumentKind::Doc),
            "docx" => Some(DocumentKind::Docx),
            "txt" => Some(DocumentKind::Text),
            _ => None,
        }
    }

    /// MIME type first; the extension only decides when the browser sent
    /// something generic.
    pub fn detect(file: &UploadedFile) -> Option<Self> {
        Self::from_mime(&file.content_type).or_else(|| Self::from_extension(&file.name))
    }
}

/// Turns an uploaded document into plain text.
pub trait TextExtractor: Send + Sync {
    fn extract(&self, file: &UploadedFile) -> Result<String, ExtractionError>;
}

/// Default extractor covering PDF, DOCX, legacy DOC and plain text.
pub struct DocumentExtractor;

impl TextExtractor for DocumentExtractor {
    fn extract(&self, file: &UploadedFile) -> Result<String, ExtractionError> {
        let kind = DocumentKind::detect(file)
            .ok_or_else(|| ExtractionError::Unsupported(file.content_type.clone()))?;

        match kind {
            DocumentKind::Pdf => pdf_extract::extract_text_from_mem(&file.data)
                .map_err(|e| ExtractionError::Pdf(e.to_string())),
            DocumentKind::Docx => extract_docx(&file.data),
            DocumentKind::Doc => Ok(extract_legacy_doc(&file.data)),
            DocumentKind::Text => Ok(String::from_utf8_lossy(&file.data).into_owned()),
        }
    }
}

/// Reads `word/document.xml` out of the DOCX zip and flattens it to text.
fn extract_docx(bytes: &[u8]) -> Result<String, ExtractionError> {
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes))?;
    let mut xml = String::new();
    archive.by_name(DOCX_BODY)?.read_to_string(&mut xml)?;
    Ok(docx_xml_to_text(&xml))
}

fn docx_xml_to_text(xml: &str) -> String {
    let with_breaks = PARAGRAPH_END.replace_all(xml, "\n");
    let with_tabs = TAB.replace_all(&with_breaks, "\t");
    let stripped = XML_TAG.replace_all(&with_tabs, "");

    let decoded = stripped
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&amp;", "&");

    decoded
        .lines()
        .map(str::trim_end)
        .filter(|line| !line.trim().is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Best-effort recovery of readable text from a binary Word 97-2003 file.
///
/// Word stores body text either as 8-bit characters or as UTF-16LE; both
/// encodings are scanned and the one yielding more letters wins.
fn extract_legacy_doc(bytes: &[u8]) -> String {
    let narrow = printable_runs(bytes.iter().map(|&b| b as u16));
    let wide = printable_runs(
        bytes
            .chunks_exact(2)
            .map(|pair| u16::from_le_bytes([pair[0], pair[1]])),
    );

    let letters = |s: &str| s.chars().filter(|c| c.is_alphabetic()).count();
    if letters(&wide) > letters(&narrow) {
        wide
    } else {
        narrow
    }
}

fn printable_runs(units: impl Iterator<Item = u16>) -> String {
    let mut runs: Vec<String> = Vec::new();
    let mut current = String::new();

    for unit in units {
        match char::from_u32(unit as u32) {
            Some(c) if c == ' ' || c == '\t' || c.is_ascii_graphic() => current.push(c),
            _ => flush_run(&mut current, &mut runs),
        }
    }
    flush_run(&mut current, &mut runs);

    runs.join("\n")
}

fn flush_run(current: &mut String, runs: &mut Vec<String>) {
    let trimmed = current.trim();
    if trimmed.chars().count() >= MIN_LEGACY_RUN && trimmed.chars().any(|c| c.is_alphabetic()) {
        runs.push(trimmed.to_string());
    }
    current.clear();
}
