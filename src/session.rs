//! One user's working state: queued files, settings, and the last result
//!
//! A front-end owns a [`Session`] and drives everything through it. Merges
//! take `&mut self`, so one session never runs two merges at once.

use std::path::PathBuf;

use tracing::warn;

use crate::annotate::AnnotationConfig;
use crate::error::{Error, Result};
use crate::export::{export_document, export_index, ArtifactSink};
use crate::manifest::Manifest;
use crate::pdf::PdfCodec;
use crate::pipeline::{self, MergeResult};

/// Status indicator shown to the user
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Status {
    #[default]
    Idle,
    Processing,
    Success,
    Error(String),
}

impl Status {
    /// Message displayed next to the indicator
    pub fn message(&self) -> &str {
        match self {
            Status::Idle => "",
            Status::Processing => "Processing... please wait.",
            Status::Success => "Merge Successful!",
            Status::Error(message) => message.as_str(),
        }
    }
}

/// Manifest, settings and merge output for one user
#[derive(Debug, Default)]
pub struct Session {
    pub manifest: Manifest,
    pub settings: AnnotationConfig,
    result: Option<MergeResult>,
    status: Status,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn status(&self) -> &Status {
        &self.status
    }

    /// Output of the last successful merge
    pub fn result(&self) -> Option<&MergeResult> {
        self.result.as_ref()
    }

    /// Merge the current manifest with the current settings
    ///
    /// The manifest and settings are captured before any work starts. On
    /// failure the previous result is kept and the status carries the error.
    pub fn merge<C: PdfCodec>(&mut self, codec: &C) -> Result<&MergeResult> {
        if self.manifest.is_empty() {
            return Err(Error::EmptyInput);
        }

        let snapshot = self.manifest.snapshot();
        let config = self.settings.clone();
        self.status = Status::Processing;

        match pipeline::merge(codec, &snapshot, &config) {
            Ok(result) => {
                self.status = Status::Success;
                Ok(self.result.insert(result))
            }
            Err(err) => {
                warn!(error = %err, "merge failed");
                self.status = Status::Error(format!("Error: {}", err));
                Err(err)
            }
        }
    }

    /// Forget the last result and status, keeping the queued files
    pub fn reset_merge(&mut self) {
        self.result = None;
        self.status = Status::Idle;
    }

    /// Remove every queued file and forget the last result
    pub fn clear_all(&mut self) {
        self.manifest.clear();
        self.reset_merge();
    }

    /// Save the merged PDF through `sink`
    pub fn save_document(&self, sink: &mut dyn ArtifactSink) -> Result<PathBuf> {
        let result = self.result.as_ref().ok_or(Error::NoResult)?;
        sink.save(&export_document(result))
    }

    /// Save the page index through `sink`
    pub fn save_index(&self, sink: &mut dyn ArtifactSink) -> Result<PathBuf> {
        let result = self.result.as_ref().ok_or(Error::NoResult)?;
        sink.save(&export_index(result))
    }
}
