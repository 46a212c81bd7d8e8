//! Selection of paths to package.

use std::path::{Path, PathBuf};

use walkdir::WalkDir;

/// Ordered, path-deduplicated set of files and directories chosen for
/// packaging.
///
/// Paths are accepted as given; existence and readability are checked when
/// the container is built, not here.
#[derive(Debug, Clone, Default)]
pub struct Selection {
    paths: Vec<PathBuf>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_paths<I>(paths: I) -> Self
    where
        I: IntoIterator<Item = PathBuf>,
    {
        let mut selection = Self::new();
        for path in paths {
            selection.add(path);
        }
        selection
    }

    /// Add a path, keeping insertion order. Returns false for an exact
    /// duplicate, which is ignored.
    pub fn add(&mut self, path: impl Into<PathBuf>) -> bool {
        let path = path.into();
        if self.paths.contains(&path) {
            return false;
        }
        self.paths.push(path);
        true
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn paths(&self) -> &[PathBuf] {
        &self.paths
    }

    /// Total number of files that packaging will write: 1 per plain file,
    /// plus every file transitively contained in a selected directory.
    /// Directories themselves are not counted. Drives progress reporting.
    pub fn total_items(&self) -> usize {
        self.paths.iter().map(|path| count_files(path)).sum()
    }
}

fn count_files(path: &Path) -> usize {
    if path.is_file() {
        1
    } else if path.is_dir() {
        WalkDir::new(path)
            .into_iter()
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_type().is_file())
            .count()
    } else {
        // Nonexistent paths count as nothing; the builder reports them.
        0
    }
}
