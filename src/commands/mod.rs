//! CLI command handlers.
//!
//! Each submodule handles a specific CLI command:
//! - `pack` - Build a self-extracting executable from a selection
//! - `extract` - Extract an artifact's payload (also the artifact launch path)
//! - `show` - Display configuration or an artifact's payload listing

pub mod extract;
pub mod pack;
pub mod show;

pub use extract::{cmd_extract, cmd_selfextract};
pub use pack::cmd_pack;
pub use show::cmd_show;

use anyhow::{anyhow, Result};
use std::thread::JoinHandle;
use std::time::Duration;

use crate::session::Progress;

/// Poll a worker's progress and render status lines until it finishes.
///
/// The worker writes through the shared [`Progress`] handle; this loop stays
/// responsive and redraws on its own cadence.
pub(crate) fn watch_progress<T: Send + 'static>(
    worker: JoinHandle<T>,
    progress: &Progress,
) -> Result<T> {
    let mut last_percent = u32::MAX;
    let mut last_label = String::new();

    loop {
        let finished = worker.is_finished();
        let percent = progress.percent();
        let label = progress.label();
        if percent != last_percent || label != last_label {
            if label.is_empty() {
                println!("[{percent:3}%]");
            } else {
                println!("[{percent:3}%] {label}");
            }
            last_percent = percent;
            last_label = label;
        }
        if finished {
            break;
        }
        std::thread::sleep(Duration::from_millis(100));
    }

    worker.join().map_err(|_| anyhow!("worker thread panicked"))
}
