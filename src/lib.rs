//! PDF Master Library
//!
//! Merge PDFs in a user-chosen order, optionally stamp page numbers and a
//! diagonal watermark on every page, and export a CSV index telling which
//! pages came from which file.
//!
//! - [`manifest`]: the ordered, reorderable list of source files
//! - [`pipeline`]: the sequential merge producing a [`MergeResult`]
//! - [`annotate`]: page numbers and watermarks
//! - [`export`]: `Merged_Document.pdf` and `PDF_Index.csv` artifacts
//! - [`session`]: ties the above together for a front-end
//! - [`pdf`]: the codec capability and its lopdf implementation
//!
//! # Example
//!
//! ```no_run
//! use pdf_master::pdf::LopdfCodec;
//! use pdf_master::export::DirectorySink;
//! use pdf_master::session::Session;
//! use std::path::PathBuf;
//!
//! let mut session = Session::new();
//! session.manifest.add([
//!     ("1. intro.pdf", PathBuf::from("1. intro.pdf")),
//!     ("2. advanced.pdf", PathBuf::from("2. advanced.pdf")),
//! ]);
//! session.settings.watermark = true;
//!
//! session.merge(&LopdfCodec).expect("Failed to merge PDFs");
//!
//! let mut sink = DirectorySink::new("out");
//! session.save_document(&mut sink).expect("Failed to save PDF");
//! session.save_index(&mut sink).expect("Failed to save index");
//! ```

pub mod acquire;
pub mod annotate;
pub mod error;
pub mod export;
pub mod layout;
pub mod manifest;
pub mod pdf;
pub mod pipeline;
pub mod session;

// Re-export commonly used items
pub use annotate::AnnotationConfig;
pub use error::{Error, Result};
pub use manifest::{Manifest, SourceContent, SourceEntry, SourceId};
pub use pipeline::{merge, IndexRow, MergeResult};
pub use session::{Session, Status};
