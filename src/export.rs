//! Turning a merge result into files the user can keep

use std::fs;
use std::path::PathBuf;

use tracing::info;

use crate::error::Result;
use crate::pipeline::{IndexRow, MergeResult};

/// File name of the merged document artifact
pub const DOCUMENT_FILE_NAME: &str = "Merged_Document.pdf";

/// File name of the page index artifact
pub const INDEX_FILE_NAME: &str = "PDF_Index.csv";

/// Header row of the page index
pub const INDEX_HEADER: &str = "S.No,File Name,Start Page,End Page,Total Pages";

/// A named blob ready to be saved
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    /// Suggested file name
    pub file_name: String,
    pub media_type: &'static str,
    pub bytes: Vec<u8>,
}

/// The merged PDF as an artifact
pub fn export_document(result: &MergeResult) -> Artifact {
    Artifact {
        file_name: DOCUMENT_FILE_NAME.to_string(),
        media_type: "application/pdf",
        bytes: result.combined_document.clone(),
    }
}

/// The page index as a CSV artifact
pub fn export_index(result: &MergeResult) -> Artifact {
    Artifact {
        file_name: INDEX_FILE_NAME.to_string(),
        media_type: "text/csv",
        bytes: index_csv(&result.index).into_bytes(),
    }
}

/// Render index rows as CSV
///
/// The file name is always quoted; numbers never are.
pub fn index_csv(rows: &[IndexRow]) -> String {
    let mut csv = String::from(INDEX_HEADER);
    csv.push('\n');
    for row in rows {
        csv.push_str(&format!(
            "{},{},{},{},{}\n",
            row.serial,
            quote_field(&row.source_name),
            row.start_page,
            row.end_page,
            row.page_count
        ));
    }
    csv
}

fn quote_field(field: &str) -> String {
    format!("\"{}\"", field.replace('"', "\"\""))
}

/// Platform capability that stores artifacts somewhere the user can reach
pub trait ArtifactSink {
    /// Store the artifact, returning where it ended up
    fn save(&mut self, artifact: &Artifact) -> Result<PathBuf>;
}

/// Saves artifacts as files in one directory
#[derive(Debug, Clone)]
pub struct DirectorySink {
    dir: PathBuf,
}

impl DirectorySink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

impl ArtifactSink for DirectorySink {
    fn save(&mut self, artifact: &Artifact) -> Result<PathBuf> {
        fs::create_dir_all(&self.dir)?;
        let path = self.dir.join(&artifact.file_name);
        fs::write(&path, &artifact.bytes)?;
        info!(path = %path.display(), bytes = artifact.bytes.len(), "saved artifact");
        Ok(path)
    }
}
