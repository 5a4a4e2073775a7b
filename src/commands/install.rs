//! Command: the provisioning run.
use anyhow::Result;
use std::sync::Arc;

use super::{CommandSetup, run_tasks};
use crate::cli::GlobalOpts;
use crate::logging::Logger;
use crate::packages;
use crate::report::RunReport;
use crate::tasks::{self, Context};
use crate::tools::download::{Downloader, HttpDownloader};
use crate::tools::{Bootstrap, ensure_tools};

/// Run the install command.
///
/// # Errors
///
/// Returns an error on the fatal cases only: unreadable configuration, a
/// failed tool bootstrap, or no packages. Degraded steps are reported in the
/// summary and still succeed.
pub fn run(global: &GlobalOpts, log: &Arc<Logger>) -> Result<()> {
    log.info(&format!("provision {}", super::version::VERSION));
    let setup = CommandSetup::init(global, log)?;
    let ctx = setup.context(global, log)?;
    let report = provision(ctx, &HttpDownloader)?;
    log.print_summary(&report.summary_lines());
    Ok(())
}

/// Bootstrap the tools, discover packages and run every install task.
///
/// # Errors
///
/// Returns [`ProvisionError`](crate::error::ProvisionError) if the tools
/// cannot be installed or no package is found.
pub fn provision(ctx: Context, downloader: &dyn Downloader) -> Result<RunReport> {
    let tools = ensure_tools(&Bootstrap {
        config: &ctx.config,
        platform: &ctx.platform,
        executor: &*ctx.executor,
        downloader,
        log: &*ctx.log,
        home: &ctx.home,
        dry_run: ctx.dry_run,
    })?;

    ctx.log.stage("Discovering packages");
    let found = packages::discover(
        &*ctx.fs_ops,
        &ctx.package_root(),
        &ctx.config.packages.ignore,
    )?;
    let names: Vec<&str> = found.iter().map(|p| p.name.as_str()).collect();
    ctx.log
        .info(&format!("{} package(s): {}", found.len(), names.join(", ")));

    let ctx = ctx.with_tools(tools).with_packages(found);
    Ok(run_tasks(&tasks::all_install_tasks(), &ctx))
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::error::ProvisionError;
    use crate::platform::{Arch, Os, Platform};
    use crate::resources::test_helpers::MockExecutor;
    use crate::tasks::test_helpers::{config_at, make_logged_context};
    use crate::tools::download::MockDownloader;
    use std::fs;

    #[test]
    fn no_packages_is_fatal() {
        let tmp = tempfile::tempdir().unwrap();
        fs::create_dir_all(tmp.path().join("packages/.git")).unwrap();
        let (ctx, _log, _logtmp, _guard) = make_logged_context(config_at(tmp.path()));
        let mut ctx = ctx.with_home(tmp.path().join("home"));
        ctx.platform = Arc::new(Platform::new(Os::MacOs, Arch::X86_64));
        ctx.executor = Arc::new(MockExecutor::default().with_program("brew").with_program("stow"));
        let mut downloader = MockDownloader::new();
        downloader.expect_fetch_text().never();

        let err = provision(ctx, &downloader).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ProvisionError>(),
            Some(ProvisionError::NoPackages { .. })
        ));
    }

    #[test]
    fn missing_package_root_is_fatal() {
        let tmp = tempfile::tempdir().unwrap();
        let (ctx, _log, _logtmp, _guard) = make_logged_context(config_at(tmp.path()));
        let mut ctx = ctx.with_home(tmp.path().join("home"));
        ctx.platform = Arc::new(Platform::new(Os::MacOs, Arch::X86_64));
        ctx.executor = Arc::new(MockExecutor::default().with_program("brew").with_program("stow"));

        let err = provision(ctx, &MockDownloader::new()).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ProvisionError>(),
            Some(ProvisionError::PackageRoot { .. })
        ));
    }
}
