//! Capability interface between the merge pipeline and a PDF backend
//!
//! The pipeline only needs a handful of primitives: decode a blob, count and
//! copy pages, embed a standard font, draw a line of text and serialize. Any
//! backend providing them can drive a merge; [`LopdfCodec`](super::LopdfCodec)
//! is the bundled one.

use crate::error::Result;
use crate::layout::{PageBox, Point};

/// Options passed to [`PdfCodec::decode`]
#[derive(Debug, Clone, Copy)]
pub struct DecodeOptions {
    /// Open documents whose protection does not block content extraction
    /// (owner-password-only encryption) instead of rejecting them
    pub tolerate_protection: bool,
}

impl Default for DecodeOptions {
    fn default() -> Self {
        Self {
            tolerate_protection: true,
        }
    }
}

/// The standard PDF fonts the annotation pass can use without embedding
/// font programs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StandardFont {
    Helvetica,
}

impl StandardFont {
    /// PostScript name written to the font dictionary's BaseFont
    pub fn base_font(&self) -> &'static str {
        match self {
            StandardFont::Helvetica => "Helvetica",
        }
    }
}

/// RGB color with components in 0.0..=1.0
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgb {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Rgb {
    pub const BLACK: Rgb = Rgb::gray(0.0);

    pub const fn gray(level: f32) -> Self {
        Self {
            r: level,
            g: level,
            b: level,
        }
    }
}

/// How a line of text is drawn
#[derive(Debug, Clone, Copy)]
pub struct TextStyle<F> {
    /// Baseline start, relative to the page box origin
    pub position: Point,
    /// Font size in points
    pub size: f32,
    pub font: F,
    pub color: Rgb,
    /// Fill opacity, 1.0 is opaque
    pub opacity: f32,
    /// Counter-clockwise rotation around `position`
    pub rotation_degrees: f32,
}

/// PDF backend used by the merge pipeline
///
/// Pages are addressed by 0-based index in document order.
pub trait PdfCodec {
    /// A decoded or under-construction document
    type Document;
    /// Handle to a font embedded in a document
    type Font: Copy;

    /// Start an empty output document
    fn create(&self) -> Result<Self::Document>;

    /// Decode a PDF from bytes
    fn decode(&self, bytes: &[u8], options: &DecodeOptions) -> Result<Self::Document>;

    fn page_count(&self, doc: &Self::Document) -> usize;

    /// Append every page of `source`, in order, to the end of `target`.
    /// Returns the number of pages appended.
    fn copy_pages(&self, source: Self::Document, target: &mut Self::Document) -> Result<usize>;

    /// Visible area of one page
    fn page_box(&self, doc: &Self::Document, page_index: usize) -> Result<PageBox>;

    fn embed_standard_font(
        &self,
        doc: &mut Self::Document,
        font: StandardFont,
    ) -> Result<Self::Font>;

    /// Advance width of `text` at `size` points
    fn text_width(&self, font: Self::Font, text: &str, size: f32) -> f32;

    fn draw_text(
        &self,
        doc: &mut Self::Document,
        page_index: usize,
        text: &str,
        style: &TextStyle<Self::Font>,
    ) -> Result<()>;

    /// Encode the document to PDF bytes
    fn serialize(&self, doc: Self::Document) -> Result<Vec<u8>>;
}
