//! Ctrl-C handling for interactive sessions.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::{Context as _, Result};

/// Exit status after a second Ctrl-C, following the 128 + SIGINT convention.
const FORCED_EXIT_CODE: i32 = 130;

/// Install the process-wide Ctrl-C handler.
///
/// The first signal sets the returned flag so the running session can stop
/// and save its summary. A second signal exits immediately.
pub fn install() -> Result<Arc<AtomicBool>> {
    let interrupted = Arc::new(AtomicBool::new(false));
    let flag = Arc::clone(&interrupted);
    ctrlc::set_handler(move || {
        if flag.swap(true, Ordering::SeqCst) {
            std::process::exit(FORCED_EXIT_CODE);
        }
    })
    .context("failed to install the Ctrl-C handler")?;
    Ok(interrupted)
}
