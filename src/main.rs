//! Sfxpack - self-extracting archive packager.
//!
//! Two pipelines share one container format:
//! - pack: collect files, build the container, embed it into an executable
//! - extract: locate the container, walk its payload, install it

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use sfxpack::commands;
use sfxpack::config::Config;
use sfxpack::locate::ContainerSource;
use sfxpack::logbuf::LogBuffer;

#[derive(Parser)]
#[command(name = "sfxpack")]
#[command(about = "Self-extracting archive packager")]
#[command(
    after_help = "QUICK START:\n  sfxpack pack -i logo.png bundle/   Build a self-extracting executable\n  sfxpack extract -i artifact        Re-extract an artifact's payload\n  sfxpack show payload artifact      Preview an artifact's contents"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Package files/directories into a self-extracting executable
    Pack {
        /// Files and directories to package
        #[arg(required = true)]
        inputs: Vec<PathBuf>,

        /// Branding image shown while the artifact extracts
        #[arg(short, long)]
        image: PathBuf,

        /// Output directory for the artifact
        #[arg(short, long, default_value = ".")]
        output_dir: PathBuf,

        /// Base name of the produced executable
        #[arg(short, long, default_value = "archive")]
        name: String,

        /// Keep verbose embedder output in the session log
        #[arg(long)]
        debug: bool,

        /// Overwrite an existing artifact
        #[arg(long)]
        force: bool,
    },

    /// Extract a self-extracting artifact's payload
    Extract {
        /// Artifact to read (default: the container embedded in this binary)
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Destination directory (default: <Documents>/extracted_files)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Open the destination in the file browser when done
        #[arg(long)]
        open: bool,
    },

    /// Show information
    Show {
        #[command(subcommand)]
        what: ShowTarget,
    },
}

#[derive(Subcommand)]
enum ShowTarget {
    /// Show current configuration
    Config,
    /// List the payload entries of an artifact
    Payload { input: PathBuf },
}

fn main() -> Result<()> {
    // Load .env if present
    dotenvy::dotenv().ok();
    let config = Config::load();
    let log = LogBuffer::new();

    // Artifact launch contract: a bare `--extract` (double-click or scripted
    // invocation) or an argumentless launch while the embedder bundle is
    // present extracts to the default destination, no prompts.
    let argv: Vec<String> = std::env::args().skip(1).collect();
    let flagged = argv.first().map(|arg| arg == "--extract").unwrap_or(false);
    if flagged || (argv.is_empty() && ContainerSource::embedded().is_some()) {
        return commands::cmd_selfextract(&config, &log);
    }

    let cli = Cli::parse();
    match cli.command {
        Commands::Pack {
            inputs,
            image,
            output_dir,
            name,
            debug,
            force,
        } => commands::cmd_pack(
            &config,
            commands::pack::PackArgs {
                inputs,
                image,
                output_dir,
                name,
                debug,
                force,
            },
            &log,
        ),

        Commands::Extract { input, output, open } => commands::cmd_extract(
            &config,
            commands::extract::ExtractArgs {
                input,
                output,
                open_when_done: open,
            },
            &log,
        ),

        Commands::Show { what } => {
            let target = match what {
                ShowTarget::Config => commands::show::ShowTarget::Config,
                ShowTarget::Payload { input } => commands::show::ShowTarget::Payload { input },
            };
            commands::cmd_show(&config, target)
        }
    }
}
