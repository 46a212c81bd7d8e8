//! Installing payload entries into the destination tree.

use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};

use tempfile::TempDir;
use zip::ZipArchive;

use crate::error::{Error, Result};
use crate::payload::PayloadEntry;
use crate::process::Cmd;
use crate::session::Session;

/// Result of a completed installation.
#[derive(Debug)]
pub struct InstallReport {
    pub installed: usize,
    pub destination: PathBuf,
}

/// Materialize `entries` from `archive` under `destination`.
///
/// Each entry is decoded to a staging file first, then moved over whatever
/// occupies its final path (pre-existing files and directories are replaced,
/// not merged). Cancellation is observed at entry boundaries only; a
/// cancelled run rolls back what this session wrote, removing the destination
/// root entirely when this session created it.
pub fn install_payload(
    archive: &mut ZipArchive<File>,
    entries: &[PayloadEntry],
    destination: &Path,
    session: &Session,
) -> Result<InstallReport> {
    let created_root = !destination.exists();
    fs::create_dir_all(destination)?;
    let staging = TempDir::new()?;

    let mut rollback = RollbackLog::new(destination.to_path_buf(), created_root);
    let total = entries.len();

    for (index, entry) in entries.iter().enumerate() {
        if session.is_cancelled() {
            rollback.undo();
            return Err(Error::Cancelled);
        }

        session
            .progress
            .set_label(entry.relative.display().to_string());

        let staged = staging.path().join(format!("entry-{index}"));
        decode_entry(archive, &entry.name, &staged)?;

        let target = destination.join(&entry.relative);
        if let Some(parent) = target.parent() {
            rollback.track_missing_dirs(parent);
            fs::create_dir_all(parent)?;
        }
        replace(&staged, &target)?;
        rollback.record_installed(target);

        session
            .progress
            .set_fraction((index + 1) as f64 / total as f64);
    }

    Ok(InstallReport {
        installed: total,
        destination: destination.to_path_buf(),
    })
}

/// Best-effort open of the destination in the platform file browser.
/// Failures are swallowed; extraction already succeeded.
pub fn reveal_destination(destination: &Path) {
    let program = if cfg!(target_os = "macos") {
        "open"
    } else if cfg!(target_os = "windows") {
        "explorer"
    } else {
        "xdg-open"
    };
    let _ = Cmd::new(program).arg_path(destination).allow_fail().run();
}

fn decode_entry(archive: &mut ZipArchive<File>, name: &str, staged: &Path) -> Result<()> {
    let mut entry = archive.by_name(name)?;
    let mut out = File::create(staged)?;
    io::copy(&mut entry, &mut out)?;
    Ok(())
}

/// Move staged content to the final path, clearing whatever was there.
fn replace(staged: &Path, target: &Path) -> Result<()> {
    match fs::symlink_metadata(target) {
        Ok(meta) => {
            if meta.is_dir() {
                fs::remove_dir_all(target)?;
            } else {
                fs::remove_file(target)?;
            }
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => return Err(e.into()),
    }

    // Staging may live on another filesystem; rename fails across devices.
    if fs::rename(staged, target).is_err() {
        fs::copy(staged, target)?;
        fs::remove_file(staged)?;
    }
    Ok(())
}

/// Tracks what this session wrote so cancellation can undo exactly that.
struct RollbackLog {
    root: PathBuf,
    created_root: bool,
    files: Vec<PathBuf>,
    dirs: Vec<PathBuf>,
}

impl RollbackLog {
    fn new(root: PathBuf, created_root: bool) -> Self {
        Self {
            root,
            created_root,
            files: Vec::new(),
            dirs: Vec::new(),
        }
    }

    fn record_installed(&mut self, path: PathBuf) {
        self.files.push(path);
    }

    /// Record the not-yet-existing directories between the root and `parent`;
    /// they are about to be created for the next entry.
    fn track_missing_dirs(&mut self, parent: &Path) {
        let mut missing = Vec::new();
        let mut cursor = parent;
        while cursor != self.root && cursor.starts_with(&self.root) && !cursor.exists() {
            missing.push(cursor.to_path_buf());
            match cursor.parent() {
                Some(next) => cursor = next,
                None => break,
            }
        }
        for dir in missing.into_iter().rev() {
            if !self.dirs.contains(&dir) {
                self.dirs.push(dir);
            }
        }
    }

    /// Best-effort removal of everything this session wrote. Errors ignored.
    fn undo(&self) {
        if self.created_root {
            let _ = fs::remove_dir_all(&self.root);
            return;
        }
        for file in &self.files {
            match fs::symlink_metadata(file) {
                Ok(meta) if meta.is_dir() => {
                    let _ = fs::remove_dir_all(file);
                }
                Ok(_) => {
                    let _ = fs::remove_file(file);
                }
                Err(_) => {}
            }
        }
        // Deepest-first; remove_dir only succeeds on now-empty directories,
        // so pre-existing content keeps its parents alive.
        for dir in self.dirs.iter().rev() {
            let _ = fs::remove_dir(dir);
        }
    }
}
