//! Command: apply macOS `defaults`.
use anyhow::Result;
use std::sync::Arc;

use super::{CommandSetup, header_lines, run_tasks};
use crate::cli::GlobalOpts;
use crate::logging::Logger;
use crate::tasks;

/// Run the prefs command.
///
/// # Errors
///
/// Returns an error if the configuration cannot be loaded.
pub fn run(global: &GlobalOpts, log: &Arc<Logger>) -> Result<()> {
    let setup = CommandSetup::init(global, log)?;
    let ctx = setup.context(global, log)?;
    if ctx.config.preferences.is_empty() {
        log.info("no [[preferences]] configured");
    }
    let report = run_tasks(&tasks::prefs_tasks(), &ctx);
    log.print_summary(&header_lines(&report));
    Ok(())
}
