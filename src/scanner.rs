//! Recursive directory scan grouping files by category.

use crate::classifier::Classifier;
use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Errors that abort a scan.
#[derive(Debug, thiserror::Error)]
pub enum ScanError {
    /// The root directory does not exist.
    #[error("directory does not exist: {}", .0.display())]
    RootNotFound(PathBuf),
    /// The root exists but is not a directory.
    #[error("not a directory: {}", .0.display())]
    NotADirectory(PathBuf),
    /// The root could not be inspected.
    #[error("cannot access {}: {source}", path.display())]
    Io {
        /// The root path.
        path: PathBuf,
        /// Underlying I/O error.
        source: io::Error,
    },
}

/// Files found by a scan, grouped by category name.
///
/// Categories iterate in name order; paths within a category keep walk order.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CategorizedFiles {
    categories: BTreeMap<String, Vec<PathBuf>>,
}

impl CategorizedFiles {
    /// Appends `path` to `category`.
    pub fn push(&mut self, category: &str, path: PathBuf) {
        self.categories
            .entry(category.to_string())
            .or_default()
            .push(path);
    }

    /// Paths in `category`, in walk order.
    pub fn get(&self, category: &str) -> Option<&[PathBuf]> {
        self.categories.get(category).map(Vec::as_slice)
    }

    /// Iterates over `(category, paths)` in category name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[PathBuf])> {
        self.categories
            .iter()
            .map(|(name, paths)| (name.as_str(), paths.as_slice()))
    }

    /// Category names, sorted.
    pub fn category_names(&self) -> Vec<&str> {
        self.categories.keys().map(String::as_str).collect()
    }

    /// Total number of files across all categories.
    pub fn total_files(&self) -> usize {
        self.categories.values().map(Vec::len).sum()
    }

    /// Returns true if no file was found.
    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }
}

/// Walks `root` recursively and classifies every file.
///
/// Excluded directories are pruned without being descended into; excluded
/// files are dropped. Entries that cannot be read are logged and skipped.
///
/// # Errors
///
/// Returns `ScanError::RootNotFound` if `root` does not exist.
pub fn scan(root: &Path, classifier: &Classifier) -> Result<CategorizedFiles, ScanError> {
    let metadata = fs::metadata(root).map_err(|source| {
        if source.kind() == io::ErrorKind::NotFound {
            ScanError::RootNotFound(root.to_path_buf())
        } else {
            ScanError::Io {
                path: root.to_path_buf(),
                source,
            }
        }
    })?;
    if !metadata.is_dir() {
        return Err(ScanError::NotADirectory(root.to_path_buf()));
    }

    let mut files = CategorizedFiles::default();

    let walker = WalkDir::new(root).into_iter().filter_entry(|entry| {
        entry.depth() == 0 || !entry.file_type().is_dir() || !classifier.is_excluded(entry.path())
    });

    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                let path = e.path().map(|p| p.display().to_string()).unwrap_or_default();
                tracing::warn!(path = %path, error = %e, "could not access entry, skipping");
                continue;
            }
        };

        if entry.file_type().is_dir() {
            continue;
        }

        let classification = classifier.classify(entry.path());
        if let Some(category) = classification.category() {
            files.push(category, entry.into_path());
        }
    }

    tracing::debug!(root = %root.display(), files = files.total_files(), "scan complete");
    Ok(files)
}
