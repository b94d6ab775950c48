//! Picking source files from the filesystem
//!
//! Literal paths and glob patterns become `(display name, content)` pairs
//! ready for [`Manifest::add`](crate::manifest::Manifest::add). Only PDF
//! inputs are kept.

use std::path::{Path, PathBuf};

use glob::glob;
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::manifest::SourceContent;

/// Whether a path looks like a PDF by its extension
pub fn is_pdf_path(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case("pdf"))
        .unwrap_or(false)
}

/// Name shown for a source: its file name, or the whole path if it has none
pub fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn has_glob_characters(pattern: &str) -> bool {
    pattern.contains('*') || pattern.contains('?') || pattern.contains('[')
}

/// Expand glob patterns in input paths
///
/// Inputs keep their command-line order; matches of one pattern are sorted
/// so numbered files come out in sequence.
pub fn expand_inputs(patterns: &[String]) -> Result<Vec<PathBuf>> {
    let mut paths = Vec::new();

    for pattern in patterns {
        if !has_glob_characters(pattern) {
            paths.push(PathBuf::from(pattern));
            continue;
        }

        let entries = glob(pattern).map_err(|e| Error::InvalidGlob(format!("{}: {}", pattern, e)))?;
        let mut matched = Vec::new();
        for entry in entries {
            match entry {
                Ok(path) => matched.push(path),
                Err(e) => warn!(pattern = %pattern, error = %e, "glob error"),
            }
        }
        matched.retain(|path| is_pdf_path(path));

        if matched.is_empty() {
            return Err(Error::NoFilesMatched(pattern.clone()));
        }
        matched.sort();
        paths.extend(matched);
    }

    Ok(paths)
}

/// Turn patterns into manifest sources, skipping anything that is not a PDF
pub fn acquire(patterns: &[String]) -> Result<Vec<(String, SourceContent)>> {
    let sources = expand_inputs(patterns)?
        .into_iter()
        .filter(|path| {
            let keep = is_pdf_path(path);
            if !keep {
                warn!(path = %path.display(), "skipping non-PDF input");
            }
            keep
        })
        .map(|path| (display_name(&path), SourceContent::File(path)))
        .collect::<Vec<_>>();

    debug!(count = sources.len(), "acquired source files");
    Ok(sources)
}
