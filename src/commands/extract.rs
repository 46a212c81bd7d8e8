//! Extract command - unpacks a self-extracting artifact's payload.

use anyhow::{bail, Context, Result};
use std::path::PathBuf;
use std::sync::Arc;
use std::thread;

use crate::config::Config;
use crate::error::Error;
use crate::install::{self, InstallReport};
use crate::locate::ContainerSource;
use crate::logbuf::LogBuffer;
use crate::payload;
use crate::session::Session;

/// Arguments for the extract command.
pub struct ExtractArgs {
    /// Artifact to read; the embedded container when absent.
    pub input: Option<PathBuf>,
    /// Destination; the configured default when absent.
    pub output: Option<PathBuf>,
    /// Open the destination in the file browser on success.
    pub open_when_done: bool,
}

/// Execute the extract command.
pub fn cmd_extract(config: &Config, args: ExtractArgs, log: &LogBuffer) -> Result<()> {
    let source = match args.input {
        Some(path) => {
            if !path.is_file() {
                bail!(Error::MissingAsset(path));
            }
            ContainerSource::external(path)
        }
        None => ContainerSource::embedded()
            .context("No embedded container found. Pass --input <artifact> to choose a file.")?,
    };

    let destination = args
        .output
        .unwrap_or_else(|| config.default_destination.clone());

    println!(
        "Extracting {} to {}...",
        source.path().display(),
        destination.display()
    );
    log.append(format!(
        "extracting {} to {}",
        source.path().display(),
        destination.display()
    ));

    let session = Arc::new(Session::new());
    let worker = {
        let session = Arc::clone(&session);
        let destination = destination.clone();
        thread::spawn(move || extract_job(source, destination, &session))
    };

    match super::watch_progress(worker, &session.progress)? {
        Ok(report) => {
            println!("\n=== Extraction Complete ===");
            println!(
                "  {} files -> {}",
                report.installed,
                report.destination.display()
            );
            log.append(format!("extracted {} files", report.installed));
            if args.open_when_done {
                install::reveal_destination(&report.destination);
            }
            Ok(())
        }
        Err(Error::Cancelled) => {
            println!("Extraction cancelled.");
            log.append("extraction cancelled");
            Ok(())
        }
        Err(e) => {
            let message = format!("extraction failed: {e}");
            log.append(message.clone());
            bail!(message);
        }
    }
}

/// Artifact launch contract: extract the embedded container to the default
/// destination without further arguments, then reveal it.
pub fn cmd_selfextract(config: &Config, log: &LogBuffer) -> Result<()> {
    cmd_extract(
        config,
        ExtractArgs {
            input: None,
            output: None,
            open_when_done: true,
        },
        log,
    )
}

/// Worker flow driving the session state machine.
fn extract_job(
    source: ContainerSource,
    destination: PathBuf,
    session: &Session,
) -> crate::error::Result<InstallReport> {
    session.run(|session| {
        let mut archive = source.open()?;
        let entries = payload::payload_entries(&mut archive)?;
        install::install_payload(&mut archive, &entries, &destination, session)
    })
}
