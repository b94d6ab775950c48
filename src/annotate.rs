//! Page numbers and watermarks applied after page assembly

use tracing::debug;

use crate::error::Result;
use crate::layout::{centered, watermark_anchor};
use crate::pdf::{PdfCodec, Rgb, StandardFont, TextStyle};

/// Watermark text used when none is configured
pub const DEFAULT_WATERMARK_TEXT: &str = "CONFIDENTIAL";

/// Which annotations to draw, captured when a merge starts
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnnotationConfig {
    /// Draw "Page n of total" at the bottom of every page
    pub page_numbers: bool,
    /// Draw a diagonal watermark on every page
    pub watermark: bool,
    /// Watermark text; empty means [`DEFAULT_WATERMARK_TEXT`]
    pub watermark_text: String,
}

impl Default for AnnotationConfig {
    fn default() -> Self {
        Self {
            page_numbers: true,
            watermark: false,
            watermark_text: String::new(),
        }
    }
}

impl AnnotationConfig {
    /// The watermark text that will actually be drawn
    pub fn effective_watermark_text(&self) -> &str {
        if self.watermark_text.is_empty() {
            DEFAULT_WATERMARK_TEXT
        } else {
            &self.watermark_text
        }
    }

    /// Whether the annotation pass has anything to draw
    pub fn is_enabled(&self) -> bool {
        self.page_numbers || self.watermark
    }
}

/// Rendering constants for the two annotations
#[derive(Debug, Clone)]
pub struct AnnotationStyle {
    pub font: StandardFont,
    pub watermark_size: f32,
    pub watermark_color: Rgb,
    pub watermark_opacity: f32,
    pub watermark_rotation_degrees: f32,
    pub page_number_size: f32,
    pub page_number_color: Rgb,
    /// Baseline of the page number, measured from the bottom of the page
    pub page_number_baseline: f32,
}

impl Default for AnnotationStyle {
    fn default() -> Self {
        Self {
            font: StandardFont::Helvetica,
            watermark_size: 55.0,
            watermark_color: Rgb::gray(0.8),
            watermark_opacity: 0.35,
            watermark_rotation_degrees: 45.0,
            page_number_size: 10.0,
            page_number_color: Rgb::BLACK,
            page_number_baseline: 20.0,
        }
    }
}

/// Text of the page number label for 1-based `page` out of `total`
pub fn page_label(page: usize, total: usize) -> String {
    format!("Page {} of {}", page, total)
}

/// Draw the configured annotations on every page of `doc`, in page order
///
/// The watermark is drawn before the page number so the number stays on top.
pub fn apply<C: PdfCodec>(
    codec: &C,
    doc: &mut C::Document,
    config: &AnnotationConfig,
    style: &AnnotationStyle,
) -> Result<()> {
    if !config.is_enabled() {
        return Ok(());
    }

    let font = codec.embed_standard_font(doc, style.font)?;
    let total = codec.page_count(doc);
    let watermark_text = config.effective_watermark_text();

    for index in 0..total {
        let page = codec.page_box(doc, index)?;

        if config.watermark {
            let text_style = TextStyle {
                position: watermark_anchor(&page),
                size: style.watermark_size,
                font,
                color: style.watermark_color,
                opacity: style.watermark_opacity,
                rotation_degrees: style.watermark_rotation_degrees,
            };
            codec.draw_text(doc, index, watermark_text, &text_style)?;
        }

        if config.page_numbers {
            let label = page_label(index + 1, total);
            let width = codec.text_width(font, &label, style.page_number_size);
            let text_style = TextStyle {
                position: centered(&page, width, style.page_number_baseline),
                size: style.page_number_size,
                font,
                color: style.page_number_color,
                opacity: 1.0,
                rotation_degrees: 0.0,
            };
            codec.draw_text(doc, index, &label, &text_style)?;
        }
    }

    debug!(
        pages = total,
        page_numbers = config.page_numbers,
        watermark = config.watermark,
        "annotated document"
    );
    Ok(())
}
