//! PDF backend: the codec capability and its lopdf implementation

pub mod codec;
pub mod merge;
pub mod metadata;
pub mod metrics;
pub mod text;

// Re-export commonly used items
pub use codec::{DecodeOptions, PdfCodec, Rgb, StandardFont, TextStyle};
pub use merge::PdfDocument;
pub use metadata::{count_pages, extract_metadata, extract_metadata_from_bytes, PdfMetadata};
pub use text::LopdfFont;

use crate::error::Result;
use crate::layout::PageBox;

/// [`PdfCodec`] backed by lopdf
#[derive(Debug, Clone, Copy, Default)]
pub struct LopdfCodec;

impl PdfCodec for LopdfCodec {
    type Document = PdfDocument;
    type Font = LopdfFont;

    fn create(&self) -> Result<PdfDocument> {
        Ok(PdfDocument::new())
    }

    fn decode(&self, bytes: &[u8], options: &DecodeOptions) -> Result<PdfDocument> {
        PdfDocument::load(bytes, options)
    }

    fn page_count(&self, doc: &PdfDocument) -> usize {
        doc.page_count()
    }

    fn copy_pages(&self, source: PdfDocument, target: &mut PdfDocument) -> Result<usize> {
        target.append_pages(source)
    }

    fn page_box(&self, doc: &PdfDocument, page_index: usize) -> Result<PageBox> {
        doc.page_box(page_index)
    }

    fn embed_standard_font(&self, doc: &mut PdfDocument, font: StandardFont) -> Result<LopdfFont> {
        Ok(text::embed_standard_font(doc, font))
    }

    fn text_width(&self, font: LopdfFont, text: &str, size: f32) -> f32 {
        font.face().text_width(text, size)
    }

    fn draw_text(
        &self,
        doc: &mut PdfDocument,
        page_index: usize,
        text: &str,
        style: &TextStyle<LopdfFont>,
    ) -> Result<()> {
        text::draw_text(doc, page_index, text, style)
    }

    fn serialize(&self, doc: PdfDocument) -> Result<Vec<u8>> {
        doc.save_to_bytes()
    }
}
