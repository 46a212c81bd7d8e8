//! Walking the container's payload and rewriting entry paths.

use std::fs::File;
use std::path::{Component, Path, PathBuf};

use zip::ZipArchive;

use crate::container::NAMESPACE;
use crate::error::{Error, Result};

/// One payload entry scheduled for installation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PayloadEntry {
    /// Full entry name inside the container.
    pub name: String,
    /// Destination-relative path after namespace stripping.
    pub relative: PathBuf,
}

/// List the payload entries in container directory order.
///
/// Entries outside the namespace (the branding asset) are ignored, as are
/// directory placeholders. An empty target set is an error.
pub fn payload_entries(archive: &mut ZipArchive<File>) -> Result<Vec<PayloadEntry>> {
    let prefix = format!("{NAMESPACE}/");
    let mut entries = Vec::new();

    for index in 0..archive.len() {
        let file = archive.by_index(index)?;
        let name = file.name().to_owned();
        if !name.starts_with(&prefix) || name.ends_with('/') {
            continue;
        }
        let relative = rewrite(&name, &prefix)?;
        entries.push(PayloadEntry { name, relative });
    }

    if entries.is_empty() {
        return Err(Error::EmptyPayload);
    }
    Ok(entries)
}

/// Strip the namespace prefix and normalize the remainder.
///
/// The builder's naming scheme never emits `..` or rooted components, but a
/// crafted container could; anything that would resolve outside the
/// destination root is rejected here, before any filesystem write.
fn rewrite(name: &str, prefix: &str) -> Result<PathBuf> {
    let stripped = &name[prefix.len()..];
    let mut relative = PathBuf::new();

    for component in Path::new(stripped).components() {
        match component {
            Component::Normal(part) => relative.push(part),
            Component::CurDir => {}
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => {
                return Err(Error::UnsafeEntry(name.to_owned()));
            }
        }
    }

    if relative.as_os_str().is_empty() {
        return Err(Error::UnsafeEntry(name.to_owned()));
    }
    Ok(relative)
}
