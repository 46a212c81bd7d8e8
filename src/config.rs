//! Configuration management for sfxpack.
//!
//! Reads configuration from environment variables (a `.env` file, if present,
//! is loaded into the environment at startup). There is no other persisted
//! configuration.

use std::env;
use std::path::PathBuf;

/// Default program name of the external executable compiler.
pub const DEFAULT_EMBED_TOOL: &str = "sfx-embed";

/// Directory created under the user's documents directory for default-launch
/// extraction.
const DEST_DIR_NAME: &str = "extracted_files";

/// Sfxpack configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// External compiler invoked to produce the artifact (SFXPACK_EMBED_TOOL).
    pub embed_tool: String,
    /// Destination for default-launch extraction (SFXPACK_DEST).
    pub default_destination: PathBuf,
}

impl Config {
    /// Load configuration from the environment.
    pub fn load() -> Self {
        let embed_tool = env::var("SFXPACK_EMBED_TOOL")
            .unwrap_or_else(|_| DEFAULT_EMBED_TOOL.to_string());

        let default_destination = env::var("SFXPACK_DEST")
            .map(PathBuf::from)
            .unwrap_or_else(|_| default_destination());

        Self {
            embed_tool,
            default_destination,
        }
    }

    /// Print configuration for debugging.
    pub fn print(&self) {
        println!("Configuration:");
        println!("  SFXPACK_EMBED_TOOL: {}", self.embed_tool);
        println!("  SFXPACK_DEST: {}", self.default_destination.display());
    }
}

/// `<documents>/extracted_files`, falling back to `~/Documents` on platforms
/// that report no documents directory.
fn default_destination() -> PathBuf {
    dirs::document_dir()
        .or_else(|| dirs::home_dir().map(|home| home.join("Documents")))
        .unwrap_or_else(|| PathBuf::from("."))
        .join(DEST_DIR_NAME)
}
