//! Pack command - builds a self-extracting executable from a selection.

use anyhow::{bail, Result};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread;

use crate::collect::Selection;
use crate::config::Config;
use crate::container::{self, CONTAINER_RESOURCE};
use crate::embed::{self, Attachment, EmbedRequest};
use crate::error::Error;
use crate::logbuf::LogBuffer;
use crate::session::{Phase, Progress};

/// Arguments for the pack command.
pub struct PackArgs {
    pub inputs: Vec<PathBuf>,
    pub image: PathBuf,
    pub output_dir: PathBuf,
    pub name: String,
    pub debug: bool,
    pub force: bool,
}

/// Execute the pack command.
pub fn cmd_pack(config: &Config, args: PackArgs, log: &LogBuffer) -> Result<()> {
    if args.inputs.is_empty() {
        bail!("Nothing to package. Add at least one file or directory.");
    }
    if !args.image.is_file() {
        bail!(Error::MissingAsset(args.image.clone()));
    }
    if !args.output_dir.is_dir() {
        bail!(
            "Output directory does not exist: {}",
            args.output_dir.display()
        );
    }
    ensure_writable(&args.output_dir)?;

    let output_name = format!("{}{}", args.name, std::env::consts::EXE_SUFFIX);
    let artifact = args.output_dir.join(&output_name);
    if artifact.exists() && !args.force {
        bail!(
            "{} already exists. Pass --force to overwrite.",
            artifact.display()
        );
    }

    embed::preflight(&config.embed_tool)?;

    let mut selection = Selection::new();
    for input in &args.inputs {
        if !selection.add(input.clone()) {
            println!("[SKIP] duplicate selection: {}", input.display());
        }
    }

    let total = selection.total_items();
    println!("Packaging {} files into {}...", total, artifact.display());
    log.append(format!("packaging {} files into {}", total, artifact.display()));

    let progress = Arc::new(Progress::default());
    let worker = {
        let tool = config.embed_tool.clone();
        let image = args.image.clone();
        let output_dir = args.output_dir.clone();
        let output_name = output_name.clone();
        let debug = args.debug;
        let progress = Arc::clone(&progress);
        let log = log.clone();
        thread::spawn(move || {
            pack_job(
                tool,
                selection,
                image,
                output_dir,
                output_name,
                debug,
                progress,
                log,
            )
        })
    };

    match super::watch_progress(worker, &progress)? {
        Ok(artifact) => {
            println!("\n=== Packaging Complete ===");
            println!("  Artifact: {}", artifact.display());
            println!("\nDouble-click it (or run it with --extract) to unpack.");
            log.append(format!("artifact created: {}", artifact.display()));
            Ok(())
        }
        Err(e) => {
            let message = format!("packaging failed: {e}");
            log.append(message.clone());
            if args.debug {
                eprintln!("--- session log ---");
                for line in log.snapshot() {
                    eprintln!("  {line}");
                }
            }
            bail!(message);
        }
    }
}

/// Worker flow: build the container in a staging directory, then hand it to
/// the embedder. The staging directory (and any partial container in it) is
/// discarded when this returns.
#[allow(clippy::too_many_arguments)]
fn pack_job(
    tool: String,
    selection: Selection,
    image: PathBuf,
    output_dir: PathBuf,
    output_name: String,
    debug: bool,
    progress: Arc<Progress>,
    log: LogBuffer,
) -> crate::error::Result<PathBuf> {
    let staging = tempfile::tempdir()?;
    let container_path = staging.path().join(CONTAINER_RESOURCE);

    // Packaging occupies the first 40% of overall progress.
    let pack_phase = Phase::new(&progress, 0.0, 0.4);
    container::build_container(&container_path, &selection, &image, &pack_phase)?;
    log.append(format!("container written: {}", container_path.display()));

    let image_mount = image
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "image".to_string());

    let request = EmbedRequest {
        attachments: vec![
            Attachment::new(&container_path, CONTAINER_RESOURCE),
            Attachment::new(&image, image_mount),
        ],
        output_dir,
        output_name,
        debug,
    };

    let embed_phase = Phase::new(&progress, 0.4, 0.95);
    embed_phase.set_label("compiling executable");
    let artifact = embed::run_embedder(&tool, &request, &embed_phase, |line| log.append(line))?;

    progress.set_label("");
    progress.set_fraction(1.0);
    Ok(artifact)
}

/// Writability probe. Creating a file is the only check that holds across
/// platforms and mount options.
fn ensure_writable(dir: &Path) -> Result<()> {
    match tempfile::tempfile_in(dir) {
        Ok(_) => Ok(()),
        Err(_) => Err(Error::PermissionDenied(dir.to_path_buf()).into()),
    }
}
