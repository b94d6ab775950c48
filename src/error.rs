//! Error types for the PDF master library

use thiserror::Error;

use crate::manifest::SourceId;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the PDF master library
#[derive(Error, Debug)]
pub enum Error {
    /// Merge was requested with no source documents
    #[error("No PDF files to merge. Please add some files first!")]
    EmptyInput,

    /// One source document could not be read or decoded
    ///
    /// Also raised for a source that decodes but has no pages, so every
    /// index row covers at least one page.
    #[error("Could not read \"{source_name}\": {reason}")]
    DecodeFailure {
        source_id: SourceId,
        source_name: String,
        reason: String,
    },

    /// A reorder request was not a permutation of the current manifest
    #[error("Invariant violation: {0}")]
    InvariantViolation(String),

    /// Export was requested before any merge succeeded
    #[error("Nothing to export: no successful merge yet")]
    NoResult,

    /// Document is encrypted and permissive decoding was not requested
    #[error("PDF is encrypted")]
    Protected,

    /// Document decoded but contains no pages; the merge reports it as
    /// [`Error::DecodeFailure`]
    #[error("PDF has no pages")]
    EmptyDocument,

    /// Page index outside the document
    #[error("Page {index} is out of range for a {count}-page document")]
    PageOutOfRange { index: usize, count: usize },

    /// PDF processing error
    #[error("PDF error: {0}")]
    Pdf(#[from] lopdf::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid glob pattern
    #[error("Invalid glob pattern: {0}")]
    InvalidGlob(String),

    /// No files matched pattern
    #[error("No PDF files found matching pattern: {0}")]
    NoFilesMatched(String),
}

impl Error {
    /// Name of the source that failed to decode, if this is a decode failure
    pub fn failed_source(&self) -> Option<&str> {
        match self {
            Error::DecodeFailure { source_name, .. } => Some(source_name),
            _ => None,
        }
    }
}
