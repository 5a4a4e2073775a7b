//! Command: apply the Dock layout.
use anyhow::Result;
use std::sync::Arc;

use super::{CommandSetup, header_lines, run_tasks};
use crate::cli::GlobalOpts;
use crate::logging::Logger;
use crate::tasks::{self, Context};
use crate::tools::download::{Downloader, HttpDownloader};
use crate::tools::{Bootstrap, Tools, ensure_tools};

/// Formula providing the `dockutil` binary.
const DOCKUTIL: &str = "dockutil";

/// Run the dock command.
///
/// # Errors
///
/// Returns an error if the configuration cannot be loaded or `dockutil`
/// cannot be installed.
pub fn run(global: &GlobalOpts, log: &Arc<Logger>) -> Result<()> {
    let setup = CommandSetup::init(global, log)?;
    let ctx = setup.context(global, log)?;
    let tools = ensure_dockutil(&ctx, &HttpDownloader)?;
    let ctx = ctx.with_tools(tools);
    let report = run_tasks(&tasks::dock_tasks(), &ctx);
    log.print_summary(&header_lines(&report));
    Ok(())
}

/// Bootstrap Homebrew and `dockutil` only; the install-time tool list does
/// not apply here.
///
/// # Errors
///
/// Returns [`ProvisionError`](crate::error::ProvisionError) on a failed
/// install.
pub fn ensure_dockutil(ctx: &Context, downloader: &dyn Downloader) -> Result<Tools> {
    let mut config = (*ctx.config).clone();
    config.tools.required = vec![DOCKUTIL.to_string()];
    let tools = ensure_tools(&Bootstrap {
        config: &config,
        platform: &ctx.platform,
        executor: &*ctx.executor,
        downloader,
        log: &*ctx.log,
        home: &ctx.home,
        dry_run: ctx.dry_run,
    })?;
    Ok(tools)
}
