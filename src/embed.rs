//! Boundary to the external executable compiler.
//!
//! The compiler is an external collaborator: given the extraction stub plus
//! data attachments, it produces a single windowless executable. Sfxpack only
//! depends on its CLI shape, its streamed log output, and the artifact
//! appearing at the requested path.

use std::path::PathBuf;

use crate::error::{Error, Result};
use crate::process::Cmd;
use crate::session::Phase;

/// One data attachment: source file plus the name it is mounted under at the
/// artifact's resource root.
#[derive(Debug, Clone)]
pub struct Attachment {
    pub path: PathBuf,
    pub mount: String,
}

impl Attachment {
    pub fn new(path: impl Into<PathBuf>, mount: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            mount: mount.into(),
        }
    }
}

/// A request to compile the extraction stub and attachments into a single
/// windowless executable.
#[derive(Debug, Clone)]
pub struct EmbedRequest {
    pub attachments: Vec<Attachment>,
    pub output_dir: PathBuf,
    pub output_name: String,
    pub debug: bool,
}

impl EmbedRequest {
    pub fn artifact_path(&self) -> PathBuf {
        self.output_dir.join(&self.output_name)
    }
}

/// Check that the embedder tool is reachable before any packaging work.
pub fn preflight(tool: &str) -> Result<()> {
    which::which(tool).map(|_| ()).map_err(|_| {
        Error::BuildFailure(format!(
            "'{tool}' not found in PATH; install it or set SFXPACK_EMBED_TOOL"
        ))
    })
}

/// Invoke the embedder, streaming its log lines into `sink` as they arrive.
///
/// No timeout is enforced on the compiler invocation. A zero exit code
/// without an artifact at the output path is still a failure.
pub fn run_embedder(
    tool: &str,
    request: &EmbedRequest,
    phase: &Phase<'_>,
    mut sink: impl FnMut(String),
) -> Result<PathBuf> {
    let mut cmd = Cmd::new(tool).arg("--onefile");
    for attachment in &request.attachments {
        cmd = cmd
            .arg("--add-data")
            .arg(format!("{}:{}", attachment.path.display(), attachment.mount));
    }
    cmd = cmd
        .arg("--distpath")
        .arg_path(&request.output_dir)
        .arg("--name")
        .arg(&request.output_name)
        .arg("--windowless");
    if request.debug {
        cmd = cmd.arg("--debug");
    }

    let status = cmd
        .allow_fail()
        .run_streaming(|line| {
            // The compiler reports no deterministic progress; creep toward
            // the top of the embed sub-range per log line instead.
            phase.nudge(0.002);
            sink(line);
        })
        .map_err(|e| Error::BuildFailure(format!("{e:#}")))?;

    if !status.success() {
        return Err(Error::BuildFailure(format!(
            "embedder exited with code {}",
            status.code().unwrap_or(-1)
        )));
    }

    let artifact = request.artifact_path();
    if !artifact.is_file() {
        return Err(Error::BuildFailure(format!(
            "embedder reported success but produced no artifact at {}",
            artifact.display()
        )));
    }
    phase.update(1.0);
    Ok(artifact)
}
