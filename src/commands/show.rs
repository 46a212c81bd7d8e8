//! Show command - displays configuration or an artifact's payload listing.

use anyhow::Result;
use std::path::PathBuf;

use crate::config::Config;
use crate::locate::ContainerSource;
use crate::payload;

/// Show target for the show command.
pub enum ShowTarget {
    /// Show current configuration
    Config,
    /// List the payload entries of an artifact
    Payload { input: PathBuf },
}

/// Execute the show command.
pub fn cmd_show(config: &Config, target: ShowTarget) -> Result<()> {
    match target {
        ShowTarget::Config => {
            config.print();
        }
        ShowTarget::Payload { input } => {
            let source = ContainerSource::external(input);
            let mut archive = source.open()?;
            let entries = payload::payload_entries(&mut archive)?;
            println!(
                "Payload of {} ({} files):",
                source.path().display(),
                entries.len()
            );
            for entry in &entries {
                println!("  {}", entry.relative.display());
            }
        }
    }
    Ok(())
}
