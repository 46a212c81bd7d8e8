//! Locating and validating the archive container.
//!
//! The extractor reads either the container carried by the running artifact
//! (embedded mode) or an externally supplied artifact file. Before any handle
//! is trusted, the leading bytes are scanned for an archive signature.

use std::env;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use zip::ZipArchive;

use crate::container::CONTAINER_RESOURCE;
use crate::error::{Error, Result};

/// Set by the embedder runtime to the directory its data attachments were
/// unpacked into.
pub const BUNDLE_DIR_ENV: &str = "SFXPACK_BUNDLE_DIR";

/// How far into the file the signature scan looks.
const SIGNATURE_WINDOW: u64 = 10 * 1024;

/// The three canonical ZIP signatures: local file header, end of central
/// directory, data descriptor.
const SIGNATURES: [&[u8]; 3] = [b"PK\x03\x04", b"PK\x05\x06", b"PK\x07\x08"];

/// Where a container was found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContainerSource {
    /// Attachment carried by the running artifact.
    Embedded(PathBuf),
    /// Externally supplied executable/container file.
    External(PathBuf),
}

impl ContainerSource {
    pub fn path(&self) -> &Path {
        match self {
            Self::Embedded(path) | Self::External(path) => path,
        }
    }

    /// Container carried by the currently running artifact, if any.
    ///
    /// Preference order: the fixed resource name inside the embedder's bundle
    /// directory, then the running executable itself when it is
    /// archive-readable (the embedder keeps the payload region intact).
    pub fn embedded() -> Option<Self> {
        if let Ok(dir) = env::var(BUNDLE_DIR_ENV) {
            let candidate = PathBuf::from(dir).join(CONTAINER_RESOURCE);
            if candidate.is_file() {
                return Some(Self::Embedded(candidate));
            }
        }
        let exe = env::current_exe().ok()?;
        if validate(&exe).is_ok() {
            return Some(Self::Embedded(exe));
        }
        None
    }

    pub fn external(path: impl Into<PathBuf>) -> Self {
        Self::External(path.into())
    }

    /// Validate the signature and open the container for reading.
    pub fn open(&self) -> Result<ZipArchive<File>> {
        let path = self.path();
        validate(path)?;
        let file = File::open(path).map_err(|_| Error::InvalidContainer(path.to_path_buf()))?;
        ZipArchive::new(file).map_err(|_| Error::InvalidContainer(path.to_path_buf()))
    }
}

/// Scan the first 10 KiB of `path` for one of the archive signatures.
///
/// An unreadable file fails the same way a signature-less one does.
pub fn validate(path: &Path) -> Result<()> {
    let invalid = || Error::InvalidContainer(path.to_path_buf());

    let file = File::open(path).map_err(|_| invalid())?;
    let mut window = Vec::with_capacity(SIGNATURE_WINDOW as usize);
    file.take(SIGNATURE_WINDOW)
        .read_to_end(&mut window)
        .map_err(|_| invalid())?;

    if SIGNATURES.iter().any(|sig| contains(&window, sig)) {
        Ok(())
    } else {
        Err(invalid())
    }
}

fn contains(haystack: &[u8], needle: &[u8]) -> bool {
    haystack.windows(needle.len()).any(|w| w == needle)
}
