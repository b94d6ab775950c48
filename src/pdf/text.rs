//! Drawing text directly into page content streams
//!
//! Each draw appends a self-contained content stream (wrapped in q/Q) to the
//! page. The first draw on a page also wraps the page's original content in
//! q/Q so transformations it leaves behind cannot move our text.

use lopdf::{dictionary, Dictionary, Document, Object, ObjectId, Stream};
use tracing::warn;

use super::codec::{StandardFont, TextStyle};
use super::merge::PdfDocument;
use super::metrics::encode_win_ansi;
use crate::error::Result;
use crate::layout::Point;

/// Handle to a standard font added to a [`PdfDocument`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LopdfFont {
    pub(crate) id: ObjectId,
    pub(crate) face: StandardFont,
}

impl LopdfFont {
    pub fn face(&self) -> StandardFont {
        self.face
    }

    /// Name under which the font is registered in page resources
    fn resource_name(&self) -> String {
        format!("PM{}", self.face.base_font())
    }
}

/// Add a standard font to the document, once per face
pub fn embed_standard_font(pdf: &mut PdfDocument, face: StandardFont) -> LopdfFont {
    if let Some(&id) = pdf.fonts.get(&face) {
        return LopdfFont { id, face };
    }

    // Standard 14 font: no font program, WinAnsiEncoding for single-byte text
    let id = pdf.doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => face.base_font(),
        "Encoding" => "WinAnsiEncoding",
    });
    pdf.fonts.insert(face, id);
    LopdfFont { id, face }
}

/// Draw one line of text on a page
pub fn draw_text(
    pdf: &mut PdfDocument,
    page_index: usize,
    text: &str,
    style: &TextStyle<LopdfFont>,
) -> Result<()> {
    let page_id = pdf.page_id(page_index)?;
    let page_box = pdf.page_box(page_index)?;

    let (encoded, replaced) = encode_win_ansi(text);
    if replaced {
        warn!(text, "text has characters outside WinAnsiEncoding, drawn as '?'");
    }

    isolate_page_content(pdf, page_id)?;

    let font_name = style.font.resource_name();
    add_page_resource(&mut pdf.doc, page_id, b"Font", &font_name, style.font.id)?;

    let graphics_state = if style.opacity < 1.0 {
        let (name, id) = graphics_state_for(pdf, style.opacity);
        add_page_resource(&mut pdf.doc, page_id, b"ExtGState", &name, id)?;
        Some(name)
    } else {
        None
    };

    let origin = page_box.to_page_space(style.position);
    let content = text_operations(&encoded, &font_name, graphics_state.as_deref(), origin, style);
    let content_id = pdf.doc.add_object(Stream::new(Dictionary::new(), content));
    append_content_to_page(&mut pdf.doc, page_id, content_id)
}

/// Generate the content stream operators for one line of text
fn text_operations(
    encoded: &[u8],
    font_name: &str,
    graphics_state: Option<&str>,
    origin: Point,
    style: &TextStyle<LopdfFont>,
) -> Vec<u8> {
    let mut content = Vec::new();

    content.extend_from_slice(b"q\n");
    if let Some(name) = graphics_state {
        content.extend_from_slice(format!("/{} gs\n", name).as_bytes());
    }
    content.extend_from_slice(
        format!("{} {} {} rg\n", style.color.r, style.color.g, style.color.b).as_bytes(),
    );
    content.extend_from_slice(b"BT\n");
    content.extend_from_slice(format!("/{} {} Tf\n", font_name, style.size).as_bytes());

    let matrix = if style.rotation_degrees == 0.0 {
        format!("1 0 0 1 {} {} Tm\n", origin.x, origin.y)
    } else {
        let (sin, cos) = style.rotation_degrees.to_radians().sin_cos();
        format!("{} {} {} {} {} {} Tm\n", cos, sin, -sin, cos, origin.x, origin.y)
    };
    content.extend_from_slice(matrix.as_bytes());

    content.push(b'(');
    content.extend_from_slice(&escape_pdf_string(encoded));
    content.extend_from_slice(b") Tj\n");
    content.extend_from_slice(b"ET\n");
    content.extend_from_slice(b"Q\n");
    content
}

/// Escape special characters in a PDF literal string
fn escape_pdf_string(bytes: &[u8]) -> Vec<u8> {
    let mut escaped = Vec::with_capacity(bytes.len());
    for &b in bytes {
        match b {
            b'\\' | b'(' | b')' => {
                escaped.push(b'\\');
                escaped.push(b);
            }
            b'\r' => escaped.extend_from_slice(b"\\r"),
            b'\n' => escaped.extend_from_slice(b"\\n"),
            _ => escaped.push(b),
        }
    }
    escaped
}

/// ExtGState setting fill and stroke opacity, shared by all pages
fn graphics_state_for(pdf: &mut PdfDocument, opacity: f32) -> (String, ObjectId) {
    let key = (opacity.clamp(0.0, 1.0) * 1000.0).round() as u32;
    let name = format!("PMGs{}", key);

    if let Some(&id) = pdf.graphics_states.get(&key) {
        return (name, id);
    }

    let alpha = key as f32 / 1000.0;
    let id = pdf.doc.add_object(dictionary! {
        "Type" => "ExtGState",
        "ca" => Object::Real(alpha),
        "CA" => Object::Real(alpha),
    });
    pdf.graphics_states.insert(key, id);
    (name, id)
}

/// Wrap the page's existing content in q/Q the first time we draw on it
fn isolate_page_content(pdf: &mut PdfDocument, page_id: ObjectId) -> Result<()> {
    if !pdf.isolated_pages.insert(page_id) {
        return Ok(());
    }

    let has_content = pdf.doc.get_dictionary(page_id)?.has(b"Contents");
    if !has_content {
        return Ok(());
    }

    let save_id = pdf.doc.add_object(Stream::new(Dictionary::new(), b"q\n".to_vec()));
    let restore_id = pdf.doc.add_object(Stream::new(Dictionary::new(), b"Q\n".to_vec()));
    prepend_content_to_page(&mut pdf.doc, page_id, save_id)?;
    append_content_to_page(&mut pdf.doc, page_id, restore_id)
}

/// Resolve an optional dictionary-or-reference into an owned dictionary
fn owned_dictionary(doc: &Document, object: Option<&Object>) -> Dictionary {
    match object {
        Some(Object::Dictionary(dict)) => dict.clone(),
        Some(Object::Reference(id)) => doc
            .get_dictionary(*id)
            .map(Clone::clone)
            .unwrap_or_else(|_| Dictionary::new()),
        _ => Dictionary::new(),
    }
}

/// Register `target` under `/category /name` in the page's Resources
///
/// The page gets its own copy of the Resources dictionary, so resources
/// shared with other pages through a reference are left untouched.
fn add_page_resource(
    doc: &mut Document,
    page_id: ObjectId,
    category: &[u8],
    name: &str,
    target: ObjectId,
) -> Result<()> {
    let mut resources = {
        let page = doc.get_dictionary(page_id)?;
        owned_dictionary(doc, page.get(b"Resources").ok())
    };

    let mut entries = owned_dictionary(doc, resources.get(category).ok());
    entries.set(name, Object::Reference(target));
    resources.set(category, Object::Dictionary(entries));

    doc.get_dictionary_mut(page_id)?
        .set("Resources", Object::Dictionary(resources));
    Ok(())
}

/// Page Contents as a list of stream references
///
/// Contents may be one stream, an array of streams, or a reference to such
/// an array.
fn content_references(doc: &Document, contents: Option<&Object>) -> Vec<Object> {
    match contents {
        Some(Object::Reference(id)) => match doc.get_object(*id) {
            Ok(Object::Array(refs)) => refs.clone(),
            _ => vec![Object::Reference(*id)],
        },
        Some(Object::Array(refs)) => refs.clone(),
        _ => Vec::new(),
    }
}

/// Prepend a content stream to a page's Contents
fn prepend_content_to_page(
    doc: &mut Document,
    page_id: ObjectId,
    new_content_id: ObjectId,
) -> Result<()> {
    let mut contents = {
        let page = doc.get_dictionary(page_id)?;
        content_references(doc, page.get(b"Contents").ok())
    };
    contents.insert(0, Object::Reference(new_content_id));
    doc.get_dictionary_mut(page_id)?
        .set("Contents", Object::Array(contents));
    Ok(())
}

/// Append a content stream to a page's Contents
///
/// Appended content is drawn on top of the original page content.
fn append_content_to_page(
    doc: &mut Document,
    page_id: ObjectId,
    new_content_id: ObjectId,
) -> Result<()> {
    let mut contents = {
        let page = doc.get_dictionary(page_id)?;
        content_references(doc, page.get(b"Contents").ok())
    };
    contents.push(Object::Reference(new_content_id));
    doc.get_dictionary_mut(page_id)?
        .set("Contents", Object::Array(contents));
    Ok(())
}
