//! Ordered list of source documents queued for merging
//!
//! The manifest is the user-visible, user-reorderable list of PDFs. Insertion
//! order is merge order. It performs no I/O: file contents are only read when
//! the merge pipeline loads an entry.

use std::borrow::Cow;
use std::collections::HashSet;
use std::fmt;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::error::{Error, Result};

/// Opaque identity of a source entry, stable across reordering and removal
///
/// Ids are unique within the process, so an id from one manifest never
/// names an entry of another.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SourceId(u64);

impl SourceId {
    fn next() -> Self {
        static NEXT_ID: AtomicU64 = AtomicU64::new(0);
        SourceId(NEXT_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for SourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "src-{}", self.0)
    }
}

/// Binary content of a source document
#[derive(Debug, Clone)]
pub enum SourceContent {
    /// Bytes already held in memory
    Bytes(Arc<[u8]>),
    /// A file that is read when the entry is merged
    File(PathBuf),
}

impl SourceContent {
    /// Load the document bytes, reading the file if needed
    pub fn load(&self) -> std::io::Result<Cow<'_, [u8]>> {
        match self {
            SourceContent::Bytes(bytes) => Ok(Cow::Borrowed(&bytes[..])),
            SourceContent::File(path) => std::fs::read(path).map(Cow::Owned),
        }
    }
}

impl From<Vec<u8>> for SourceContent {
    fn from(bytes: Vec<u8>) -> Self {
        SourceContent::Bytes(bytes.into())
    }
}

impl From<PathBuf> for SourceContent {
    fn from(path: PathBuf) -> Self {
        SourceContent::File(path)
    }
}

/// One queued source document
#[derive(Debug, Clone)]
pub struct SourceEntry {
    pub id: SourceId,
    pub display_name: String,
    pub content: SourceContent,
}

/// The ordered, reorderable list of source documents
#[derive(Debug, Default)]
pub struct Manifest {
    entries: Vec<SourceEntry>,
}

impl Manifest {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append sources at the end, returning the fresh id of each one
    ///
    /// Every incoming source gets its own id, even when two share a name.
    pub fn add<I, N, C>(&mut self, sources: I) -> Vec<SourceId>
    where
        I: IntoIterator<Item = (N, C)>,
        N: Into<String>,
        C: Into<SourceContent>,
    {
        sources
            .into_iter()
            .map(|(name, content)| {
                let id = SourceId::next();
                self.entries.push(SourceEntry {
                    id,
                    display_name: name.into(),
                    content: content.into(),
                });
                id
            })
            .collect()
    }

    /// Remove the entry with this id. Absent ids are ignored.
    pub fn remove(&mut self, id: SourceId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|entry| entry.id != id);
        self.entries.len() != before
    }

    /// Replace the order with `new_sequence`, which must be a permutation of
    /// the current ids
    pub fn reorder(&mut self, new_sequence: &[SourceId]) -> Result<()> {
        if new_sequence.len() != self.entries.len() {
            return Err(Error::InvariantViolation(format!(
                "reorder expected {} ids, got {}",
                self.entries.len(),
                new_sequence.len()
            )));
        }

        let mut seen = HashSet::with_capacity(new_sequence.len());
        let mut reordered = Vec::with_capacity(new_sequence.len());
        for id in new_sequence {
            if !seen.insert(*id) {
                return Err(Error::InvariantViolation(format!(
                    "{} appears more than once in reorder request",
                    id
                )));
            }
            let entry = self.get(*id).ok_or_else(|| {
                Error::InvariantViolation(format!("{} is not in the manifest", id))
            })?;
            reordered.push(entry.clone());
        }

        self.entries = reordered;
        Ok(())
    }

    /// Move the entry at index `from` so that it ends up at index `to`
    ///
    /// Same splice semantics as a drag-and-drop list: remove, then insert.
    pub fn move_entry(&mut self, from: usize, to: usize) -> Result<()> {
        let len = self.entries.len();
        if from >= len || to >= len {
            return Err(Error::InvariantViolation(format!(
                "move {} -> {} is out of range for {} entries",
                from, to, len
            )));
        }

        let mut order = self.ids();
        let moved = order.remove(from);
        order.insert(to, moved);
        self.reorder(&order)
    }

    /// Drop every entry
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Immutable copy of the current order for a merge run
    pub fn snapshot(&self) -> ManifestSnapshot {
        ManifestSnapshot {
            entries: self.entries.clone().into(),
        }
    }

    pub fn get(&self, id: SourceId) -> Option<&SourceEntry> {
        self.entries.iter().find(|entry| entry.id == id)
    }

    pub fn entries(&self) -> &[SourceEntry] {
        &self.entries
    }

    pub fn ids(&self) -> Vec<SourceId> {
        self.entries.iter().map(|entry| entry.id).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Frozen manifest order taken at merge start
///
/// Later changes to the [`Manifest`] do not affect a snapshot.
#[derive(Debug, Clone)]
pub struct ManifestSnapshot {
    entries: Arc<[SourceEntry]>,
}

impl ManifestSnapshot {
    pub fn entries(&self) -> &[SourceEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
