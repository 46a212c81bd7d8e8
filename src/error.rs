//! Error kinds shared by the packaging and extraction pipelines.

use std::io;
use std::path::PathBuf;

/// Errors produced by the container and extraction pipelines.
///
/// Command handlers convert these to human-readable messages at the worker
/// boundary; `Cancelled` is a user-requested abort, not a failure.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The first 10 KiB carry no archive signature, or the file is unreadable.
    #[error("'{}' is not a valid self-extracting archive", .0.display())]
    InvalidContainer(PathBuf),

    /// No entries under the payload namespace.
    #[error("no payload entries found in container")]
    EmptyPayload,

    /// Image or container path missing at packaging time.
    #[error("required asset not found: {}", .0.display())]
    MissingAsset(PathBuf),

    /// Output directory exists but is not writable.
    #[error("no write permission for directory: {}", .0.display())]
    PermissionDenied(PathBuf),

    /// The external compiler failed or produced no artifact.
    #[error("executable build failed: {0}")]
    BuildFailure(String),

    /// Two selections would occupy the same top-level name in the payload.
    #[error("duplicate top-level name in selection: '{0}'")]
    DuplicateRoot(String),

    /// A payload entry would resolve outside the destination root.
    #[error("payload entry escapes destination root: '{0}'")]
    UnsafeEntry(String),

    /// User-requested abort.
    #[error("operation cancelled")]
    Cancelled,

    #[error(transparent)]
    Io(#[from] io::Error),

    #[error(transparent)]
    Archive(#[from] zip::result::ZipError),
}

pub type Result<T> = std::result::Result<T, Error>;
