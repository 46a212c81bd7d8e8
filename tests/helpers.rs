//! Shared test utilities for sfxpack tests.

#![allow(dead_code)]

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

use sfxpack::collect::Selection;
use sfxpack::container;
use sfxpack::session::{Phase, Progress};

/// Test environment with a source tree, a branding image, and an output
/// directory, all inside one temporary directory.
pub struct TestEnv {
    /// Temporary directory (kept alive for the lifetime of TestEnv)
    pub _temp_dir: TempDir,
    /// Source tree the selection is built from
    pub src: PathBuf,
    /// Extraction destination
    pub out: PathBuf,
    /// Branding image handed to the container builder
    pub image: PathBuf,
}

impl TestEnv {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let base = temp_dir.path();

        let src = base.join("src");
        let out = base.join("out");
        fs::create_dir_all(&src).expect("Failed to create src dir");

        let image = base.join("logo.png");
        fs::write(&image, b"\x89PNG\r\n\x1a\nnot-a-real-png").expect("Failed to write image");

        Self {
            _temp_dir: temp_dir,
            src,
            out,
            image,
        }
    }

    /// Write a file under the source tree, creating parents as needed.
    pub fn write_src(&self, rel: &str, contents: &str) -> PathBuf {
        let path = self.src.join(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("Failed to create parent dirs");
        }
        fs::write(&path, contents).expect("Failed to write source file");
        path
    }

    /// Build a container from the given paths, returning its location.
    pub fn build_container(&self, paths: &[PathBuf]) -> PathBuf {
        let container_path = self._temp_dir.path().join("container.zip");
        let selection = Selection::from_paths(paths.to_vec());
        let progress = Progress::default();
        let phase = Phase::new(&progress, 0.0, 1.0);
        container::build_container(&container_path, &selection, &self.image, &phase)
            .expect("Failed to build container");
        container_path
    }

    /// Write an executable shell script next to everything else.
    pub fn write_script(&self, name: &str, body: &str) -> PathBuf {
        let path = self._temp_dir.path().join(name);
        fs::write(&path, body).expect("Failed to write script");
        let mut perms = fs::metadata(&path)
            .expect("Failed to stat script")
            .permissions();
        perms.set_mode(0o755);
        fs::set_permissions(&path, perms).expect("Failed to chmod script");
        path
    }
}

/// Collect `(relative-path, contents)` pairs for every file under `root`,
/// sorted, for whole-tree assertions.
pub fn read_tree(root: &Path) -> Vec<(String, String)> {
    let mut files = Vec::new();
    for entry in walk(root) {
        let rel = entry
            .strip_prefix(root)
            .expect("walked path escapes root")
            .to_string_lossy()
            .replace('\\', "/");
        let contents = fs::read_to_string(&entry).expect("Failed to read extracted file");
        files.push((rel, contents));
    }
    files.sort();
    files
}

fn walk(root: &Path) -> Vec<PathBuf> {
    let mut out = Vec::new();
    if !root.exists() {
        return out;
    }
    let mut stack = vec![root.to_path_buf()];
    while let Some(dir) = stack.pop() {
        for entry in fs::read_dir(&dir).expect("Failed to read dir") {
            let path = entry.expect("Failed to read dir entry").path();
            if path.is_dir() {
                stack.push(path);
            } else {
                out.push(path);
            }
        }
    }
    out
}

pub fn assert_file_contains(path: &Path, expected: &str) {
    let contents = fs::read_to_string(path)
        .unwrap_or_else(|_| panic!("Failed to read {}", path.display()));
    assert_eq!(contents, expected, "unexpected contents in {}", path.display());
}
