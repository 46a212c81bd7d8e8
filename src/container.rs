//! Container building.
//!
//! The container is a single deflate-compressed ZIP holding the user payload
//! under the `packed_files/` namespace plus the branding image at the root.
//! The namespace token is a build-time constant shared with the extractor.

use std::collections::HashSet;
use std::fs::File;
use std::io;
use std::path::Path;

use walkdir::WalkDir;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::collect::Selection;
use crate::error::{Error, Result};
use crate::session::Phase;

/// Fixed path segment marking a container entry as payload.
pub const NAMESPACE: &str = "packed_files";

/// Name the container is mounted under at the artifact's resource root.
pub const CONTAINER_RESOURCE: &str = "packed_files.zip";

/// Build the container at `container_path` from `selection` plus the image.
///
/// Entry naming:
/// - plain file `f` → `packed_files/<basename(f)>`
/// - directory `d` → one entry per contained file, named relative to `d`'s
///   parent, so the directory's own name stays the top path segment
/// - the image lands at the container root under its own basename, outside
///   the namespace
///
/// Entry names always use forward slashes. Progress is reported into `phase`
/// after every written entry. Any read error aborts the whole build; the
/// caller is responsible for discarding the partial container.
pub fn build_container(
    container_path: &Path,
    selection: &Selection,
    image_path: &Path,
    phase: &Phase<'_>,
) -> Result<()> {
    if selection.is_empty() {
        return Err(Error::EmptyPayload);
    }
    check_collisions(selection)?;
    if !image_path.is_file() {
        return Err(Error::MissingAsset(image_path.to_path_buf()));
    }

    let file = File::create(container_path)?;
    let mut zip = ZipWriter::new(file);
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    let total = selection.total_items().max(1);
    let mut written = 0usize;

    for item in selection.paths() {
        if item.is_file() {
            let name = root_name(item)?;
            phase.set_label(name.clone());
            add_entry(&mut zip, item, &format!("{NAMESPACE}/{name}"), options)?;
            written += 1;
            phase.update(written as f64 / total as f64);
        } else if item.is_dir() {
            let dir_name = root_name(item)?;
            for entry in WalkDir::new(item).sort_by_file_name() {
                let entry = entry.map_err(io::Error::from)?;
                if !entry.file_type().is_file() {
                    continue;
                }
                let Ok(rel) = entry.path().strip_prefix(item) else {
                    continue;
                };
                let name = format!("{NAMESPACE}/{dir_name}/{}", slash_join(rel));
                phase.set_label(slash_join(rel));
                add_entry(&mut zip, entry.path(), &name, options)?;
                written += 1;
                phase.update(written as f64 / total as f64);
            }
        } else {
            return Err(Error::Io(io::Error::new(
                io::ErrorKind::NotFound,
                format!("selected path does not exist: {}", item.display()),
            )));
        }
    }

    let image_name = root_name(image_path)?;
    add_entry(&mut zip, image_path, &image_name, options)?;

    zip.finish()?;
    Ok(())
}

/// Two selections sharing a top-level name would produce colliding payload
/// entries (a file `d` next to a directory `d`, or two files named alike);
/// refuse instead of letting the later one win.
fn check_collisions(selection: &Selection) -> Result<()> {
    let mut seen = HashSet::new();
    for path in selection.paths() {
        let name = root_name(path)?;
        if !seen.insert(name.clone()) {
            return Err(Error::DuplicateRoot(name));
        }
    }
    Ok(())
}

fn add_entry(
    zip: &mut ZipWriter<File>,
    source: &Path,
    name: &str,
    options: SimpleFileOptions,
) -> Result<()> {
    let mut file = File::open(source)?;
    zip.start_file(name, options)?;
    io::copy(&mut file, zip)?;
    Ok(())
}

fn root_name(path: &Path) -> Result<String> {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .ok_or_else(|| {
            Error::Io(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("path has no file name: {}", path.display()),
            ))
        })
}

/// Join path components with forward slashes for the entry name.
fn slash_join(rel: &Path) -> String {
    rel.components()
        .map(|component| component.as_os_str().to_string_lossy().into_owned())
        .collect::<Vec<_>>()
        .join("/")
}
