//! Ordered merge of the manifest into one annotated document
//!
//! Sources are processed strictly one after another, in manifest order: the
//! running page offset and the index rows are only correct that way. Any
//! source that fails to load aborts the whole merge.

use tracing::{debug, info};

use crate::annotate::{self, AnnotationConfig, AnnotationStyle};
use crate::error::{Error, Result};
use crate::manifest::{ManifestSnapshot, SourceEntry};
use crate::pdf::{DecodeOptions, PdfCodec};

/// Where one source landed in the merged document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexRow {
    /// 1-based position in the manifest
    pub serial: usize,
    pub source_name: String,
    /// First global page, 1-based
    pub start_page: usize,
    /// Last global page, inclusive
    pub end_page: usize,
    pub page_count: usize,
}

/// Output of one successful merge
#[derive(Debug, Clone)]
pub struct MergeResult {
    pub combined_document: Vec<u8>,
    pub index: Vec<IndexRow>,
}

impl MergeResult {
    /// Pages in the combined document, per the index
    pub fn total_pages(&self) -> usize {
        self.index.iter().map(|row| row.page_count).sum()
    }
}

/// Merge with the default annotation style
pub fn merge<C: PdfCodec>(
    codec: &C,
    manifest: &ManifestSnapshot,
    config: &AnnotationConfig,
) -> Result<MergeResult> {
    merge_with_style(codec, manifest, config, &AnnotationStyle::default())
}

/// Merge every source in `manifest`, annotate, and serialize
pub fn merge_with_style<C: PdfCodec>(
    codec: &C,
    manifest: &ManifestSnapshot,
    config: &AnnotationConfig,
    style: &AnnotationStyle,
) -> Result<MergeResult> {
    if manifest.is_empty() {
        return Err(Error::EmptyInput);
    }

    info!(sources = manifest.len(), "merging documents");

    let options = DecodeOptions {
        tolerate_protection: true,
    };
    let mut output = codec.create()?;
    let mut index = Vec::with_capacity(manifest.len());
    let mut global_page = 1;

    for (position, entry) in manifest.entries().iter().enumerate() {
        let source = decode_entry(codec, entry, &options)?;
        let page_count = codec.page_count(&source);

        codec.copy_pages(source, &mut output)?;

        index.push(IndexRow {
            serial: position + 1,
            source_name: entry.display_name.clone(),
            start_page: global_page,
            end_page: global_page + page_count - 1,
            page_count,
        });
        debug!(
            source = %entry.display_name,
            start = global_page,
            pages = page_count,
            "copied pages"
        );

        global_page += page_count;
    }

    annotate::apply(codec, &mut output, config, style)?;

    let combined_document = codec.serialize(output)?;
    info!(
        pages = global_page - 1,
        bytes = combined_document.len(),
        "merge complete"
    );

    Ok(MergeResult {
        combined_document,
        index,
    })
}

/// Load and decode one source, tagging any failure with the source
fn decode_entry<C: PdfCodec>(
    codec: &C,
    entry: &SourceEntry,
    options: &DecodeOptions,
) -> Result<C::Document> {
    let failure = |reason: String| Error::DecodeFailure {
        source_id: entry.id,
        source_name: entry.display_name.clone(),
        reason,
    };

    let bytes = entry.content.load().map_err(|e| failure(e.to_string()))?;
    codec
        .decode(&bytes, options)
        .map_err(|e| failure(e.to_string()))
}
