//! Page assembly on top of lopdf
//!
//! Pages are copied the same way the lopdf merge example does it: renumber
//! the incoming document past the target's highest object id, move all of its
//! objects over, then hang its pages under the target's page tree.

use std::collections::{HashMap, HashSet};

use chrono::Utc;
use lopdf::{dictionary, Document, Object, ObjectId};
use tracing::{debug, warn};

use super::codec::{DecodeOptions, StandardFont};
use super::metadata::stamp_document_info;
use crate::error::{Error, Result};
use crate::layout::PageBox;

/// Page attributes a page may inherit from its ancestors in the page tree
const INHERITABLE_KEYS: [&[u8]; 4] = [b"Resources", b"MediaBox", b"CropBox", b"Rotate"];

/// Guards against cyclic Parent chains in malformed files
const MAX_TREE_DEPTH: usize = 64;

/// A PDF being read from or assembled into
#[derive(Debug)]
pub struct PdfDocument {
    pub(crate) doc: Document,
    /// Root node of the page tree
    pages_id: ObjectId,
    /// Leaf page objects in document order
    page_ids: Vec<ObjectId>,
    /// Pages whose original content is already wrapped in q/Q
    pub(crate) isolated_pages: HashSet<ObjectId>,
    pub(crate) fonts: HashMap<StandardFont, ObjectId>,
    /// ExtGState objects keyed by opacity in thousandths
    pub(crate) graphics_states: HashMap<u32, ObjectId>,
}

impl PdfDocument {
    /// An empty document with a catalog and a flat page tree
    pub fn new() -> Self {
        let mut doc = Document::with_version("1.7");

        let pages_id = doc.new_object_id();
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => Vec::<Object>::new(),
                "Count" => 0,
            }),
        );

        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => Object::Reference(pages_id),
        });
        doc.trailer.set("Root", Object::Reference(catalog_id));

        Self::from_parts(doc, pages_id, Vec::new())
    }

    /// Decode a PDF from memory
    ///
    /// lopdf decrypts documents whose user password is empty while loading.
    /// With `tolerate_protection` set those are accepted, which covers files
    /// that only restrict permissions. Documents that need a real user
    /// password fail with [`Error::Protected`].
    ///
    /// A document without pages fails with [`Error::EmptyDocument`].
    pub fn load(bytes: &[u8], options: &DecodeOptions) -> Result<Self> {
        let mut doc = Document::load_mem(bytes)?;

        if doc.is_encrypted() {
            if !options.tolerate_protection || doc.encryption_state.is_none() {
                return Err(Error::Protected);
            }
            strip_encryption(&mut doc);
            warn!("opened encrypted document with the empty user password");
        }

        let page_ids: Vec<ObjectId> = doc.get_pages().into_values().collect();
        if page_ids.is_empty() {
            return Err(Error::EmptyDocument);
        }

        // Pages are re-parented when copied, so anything they inherit from
        // their current ancestors has to live on the page itself.
        for &page_id in &page_ids {
            materialize_inherited_attributes(&mut doc, page_id)?;
        }

        let pages_id = doc.catalog()?.get(b"Pages")?.as_reference()?;
        debug!(pages = page_ids.len(), "decoded document");

        Ok(Self::from_parts(doc, pages_id, page_ids))
    }

    fn from_parts(doc: Document, pages_id: ObjectId, page_ids: Vec<ObjectId>) -> Self {
        Self {
            doc,
            pages_id,
            page_ids,
            isolated_pages: HashSet::new(),
            fonts: HashMap::new(),
            graphics_states: HashMap::new(),
        }
    }

    pub fn page_count(&self) -> usize {
        self.page_ids.len()
    }

    pub fn page_id(&self, index: usize) -> Result<ObjectId> {
        self.page_ids.get(index).copied().ok_or(Error::PageOutOfRange {
            index,
            count: self.page_ids.len(),
        })
    }

    /// Append every page of `source` after the current last page
    pub fn append_pages(&mut self, mut source: PdfDocument) -> Result<usize> {
        // Renumber objects in the source to avoid conflicts
        source.doc.renumber_objects_with(self.doc.max_id + 1);

        // Renumbering invalidates the ids we held, so ask the tree again
        let page_ids: Vec<ObjectId> = source.doc.get_pages().into_values().collect();

        self.doc.max_id = self.doc.max_id.max(source.doc.max_id);
        self.doc.objects.extend(source.doc.objects);

        for &page_id in &page_ids {
            self.doc
                .get_dictionary_mut(page_id)?
                .set("Parent", Object::Reference(self.pages_id));
        }

        let pages = self.doc.get_dictionary_mut(self.pages_id)?;
        let mut kids = pages
            .get(b"Kids")
            .and_then(Object::as_array)
            .cloned()
            .unwrap_or_default();
        kids.extend(page_ids.iter().map(|&id| Object::Reference(id)));
        let count = pages.get(b"Count").and_then(Object::as_i64).unwrap_or(0);
        pages.set("Kids", Object::Array(kids));
        pages.set("Count", Object::Integer(count + page_ids.len() as i64));

        let appended = page_ids.len();
        self.page_ids.extend(page_ids);
        Ok(appended)
    }

    /// MediaBox of a page, US Letter when the page has none
    pub fn page_box(&self, index: usize) -> Result<PageBox> {
        let page = self.doc.get_dictionary(self.page_id(index)?)?;

        let rect = page
            .get(b"MediaBox")
            .ok()
            .and_then(|obj| self.doc.dereference(obj).ok())
            .and_then(|(_, obj)| obj.as_array().ok())
            .and_then(|values| rect_from_array(values));

        Ok(rect.map(PageBox::from_rect).unwrap_or_else(PageBox::letter))
    }

    /// Encode the document, dropping objects no longer reachable
    pub fn save_to_bytes(mut self) -> Result<Vec<u8>> {
        stamp_document_info(&mut self.doc, Utc::now());

        // Catalogs and page-tree nodes of the source documents are orphaned
        self.doc.prune_objects();
        self.doc.compress();

        let mut buffer = Vec::new();
        self.doc.save_to(&mut buffer)?;
        Ok(buffer)
    }
}

impl Default for PdfDocument {
    fn default() -> Self {
        Self::new()
    }
}

/// Forget the security handler of an already decrypted document
///
/// Objects are plaintext at this point, so the merged output must not
/// claim to be encrypted.
fn strip_encryption(doc: &mut Document) {
    if let Ok(encrypt_id) = doc.trailer.get(b"Encrypt").and_then(Object::as_reference) {
        doc.objects.remove(&encrypt_id);
    }
    doc.trailer.remove(b"Encrypt");
    doc.encryption_state = None;
}

fn rect_from_array(values: &[Object]) -> Option<[f32; 4]> {
    if values.len() != 4 {
        return None;
    }
    let mut rect = [0.0; 4];
    for (slot, value) in rect.iter_mut().zip(values) {
        *slot = value.as_float().ok()?;
    }
    Some(rect)
}

/// Copy inheritable attributes from the page's ancestors onto the page
fn materialize_inherited_attributes(doc: &mut Document, page_id: ObjectId) -> Result<()> {
    let inherited: Vec<(&[u8], Object)> = {
        let page = doc.get_dictionary(page_id)?;
        INHERITABLE_KEYS
            .iter()
            .filter(|key| !page.has(key))
            .filter_map(|key| find_inherited(doc, page, key).map(|value| (*key, value)))
            .collect()
    };

    if inherited.is_empty() {
        return Ok(());
    }

    let page = doc.get_dictionary_mut(page_id)?;
    for (key, value) in inherited {
        page.set(key, value);
    }
    Ok(())
}

fn find_inherited(doc: &Document, page: &lopdf::Dictionary, key: &[u8]) -> Option<Object> {
    let mut parent = page.get(b"Parent").and_then(Object::as_reference).ok();

    for _ in 0..MAX_TREE_DEPTH {
        let node = doc.get_dictionary(parent?).ok()?;
        if let Ok(value) = node.get(key) {
            return Some(value.clone());
        }
        parent = node.get(b"Parent").and_then(Object::as_reference).ok();
    }

    None
}
