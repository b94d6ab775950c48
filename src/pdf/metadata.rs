//! PDF metadata: reading page counts and titles, writing the Info dictionary

use std::path::Path;

use chrono::{DateTime, Utc};
use lopdf::{dictionary, Document, Object, StringFormat};

use crate::error::{Error, Result};

/// Producer string written into merged documents
pub const PRODUCER: &str = concat!("pdf-master ", env!("CARGO_PKG_VERSION"));

/// PDF metadata
#[derive(Debug, Clone)]
pub struct PdfMetadata {
    /// Number of pages in the PDF
    pub page_count: usize,
    /// Document title (if present)
    pub title: Option<String>,
    /// Document author (if present)
    pub author: Option<String>,
}

/// Extract metadata from a PDF file
pub fn extract_metadata(path: &Path) -> Result<PdfMetadata> {
    let bytes = std::fs::read(path)?;
    extract_metadata_from_bytes(&bytes)
}

/// Extract metadata from PDF bytes
pub fn extract_metadata_from_bytes(bytes: &[u8]) -> Result<PdfMetadata> {
    let doc = Document::load_mem(bytes)?;

    let page_count = doc.get_pages().len();
    if page_count == 0 {
        return Err(Error::EmptyDocument);
    }

    Ok(PdfMetadata {
        page_count,
        title: info_string(&doc, b"Title"),
        author: info_string(&doc, b"Author"),
    })
}

/// Count the number of pages in a PDF file
pub fn count_pages(path: &Path) -> Result<usize> {
    Ok(extract_metadata(path)?.page_count)
}

fn info_string(doc: &Document, key: &[u8]) -> Option<String> {
    let info_id = doc.trailer.get(b"Info").and_then(Object::as_reference).ok()?;
    let info = doc.get_dictionary(info_id).ok()?;
    let bytes = info.get(key).and_then(Object::as_str).ok()?;
    String::from_utf8(bytes.to_vec()).ok()
}

/// Format a timestamp as a PDF date string (`D:YYYYMMDDHHmmSS+00'00'`)
pub fn pdf_date(timestamp: DateTime<Utc>) -> String {
    timestamp.format("D:%Y%m%d%H%M%S+00'00'").to_string()
}

/// Replace the document's Info dictionary with our producer and dates
pub fn stamp_document_info(doc: &mut Document, timestamp: DateTime<Utc>) {
    let date = pdf_date(timestamp);
    let literal = |text: &str| Object::String(text.as_bytes().to_vec(), StringFormat::Literal);

    let info_id = doc.add_object(dictionary! {
        "Producer" => literal(PRODUCER),
        "Creator" => literal(PRODUCER),
        "CreationDate" => literal(date.as_str()),
        "ModDate" => literal(date.as_str()),
    });
    doc.trailer.set("Info", Object::Reference(info_id));
}
