//! Document access seam: where classification gets its line text from.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Supplies single lines of document text to the classifier.
///
/// The host editor owns the documents; this trait is the boundary. The
/// filesystem implementation below serves the CLI; a host with live
/// buffers supplies its own.
pub trait LineSource {
    /// Drop any cached document content. Called when the reference set
    /// is replaced, since the underlying files may have changed.
    fn clear(&mut self) {}

    /// Return the zero-based `line` of `path`, or `None` if the file or
    /// line doesn't exist.
    fn line(&mut self, path: &Path, line: u32) -> Option<String>;
}

/// Reads documents from disk, caching split lines per file so a file
/// with many references is read once per reference set.
#[derive(Default)]
pub struct FsLineSource {
    /// Split lines per file; `None` records a failed read so it isn't retried.
    cache: HashMap<PathBuf, Option<Vec<String>>>,
}

impl FsLineSource {
    pub fn new() -> Self {
        return Self::default();
    }
}

impl LineSource for FsLineSource {
    fn clear(&mut self) {
        self.cache.clear();
    }

    fn line(&mut self, path: &Path, line: u32) -> Option<String> {
        let lines = self
            .cache
            .entry(path.to_path_buf())
            .or_insert_with(|| {
                return std::fs::read_to_string(path)
                    .ok()
                    .map(|content| content.lines().map(String::from).collect());
            })
            .as_ref()?;
        let idx = usize::try_from(line).unwrap_or(usize::MAX);
        return lines.get(idx).cloned();
    }
}

/// In-memory documents, standing in for live editor buffers in tests.
#[cfg(test)]
#[derive(Default)]
pub struct MemoryLineSource {
    documents: HashMap<PathBuf, Vec<String>>,
}

#[cfg(test)]
impl MemoryLineSource {
    pub fn new() -> Self {
        return Self::default();
    }

    /// Insert or replace a document's full content.
    pub fn insert(&mut self, path: impl Into<PathBuf>, content: &str) {
        self.documents
            .insert(path.into(), content.lines().map(String::from).collect());
    }
}

#[cfg(test)]
impl LineSource for MemoryLineSource {
    fn line(&mut self, path: &Path, line: u32) -> Option<String> {
        let idx = usize::try_from(line).unwrap_or(usize::MAX);
        return self.documents.get(path)?.get(idx).cloned();
    }
}
