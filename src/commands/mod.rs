//! Subcommand entry points and shared command setup.
pub mod completions;
pub mod dock;
pub mod install;
pub mod prefs;
pub mod version;
pub mod vm;

use anyhow::Result;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::cli::GlobalOpts;
use crate::config::{CONFIG_FILE, Config};
use crate::error::ProvisionError;
use crate::exec::{Executor, SystemExecutor};
use crate::logging::{Log, Logger};
use crate::mode::Mode;
use crate::platform::Platform;
use crate::report::RunReport;
use crate::tasks::{self, Context, Task};

/// Environment variable naming the repository root.
pub const ROOT_ENV: &str = "PROVISION_ROOT";

/// Shared state produced by the common command setup sequence.
///
/// Encapsulates platform detection, root resolution and configuration
/// loading so that each command does not have to repeat the boilerplate.
#[derive(Debug)]
pub struct CommandSetup {
    /// Detected host platform.
    pub platform: Platform,
    /// Loaded (possibly default) configuration.
    pub config: Config,
}

impl CommandSetup {
    /// Detect the platform, resolve the repository root and load
    /// `provision.toml`.
    ///
    /// # Errors
    ///
    /// Returns an error if the root directory cannot be determined or the
    /// configuration file fails to parse.
    pub fn init(global: &GlobalOpts, log: &Logger) -> Result<Self> {
        let platform = Platform::detect();
        let root = resolve_root(global)?;
        log.debug(&format!("platform: {} {}", platform.os, platform.arch));
        log.debug(&format!("root: {}", root.display()));

        log.stage("Loading configuration");
        let config = Config::load(&root)?;
        log.info(&format!(
            "{} variant file(s), {} preference(s)",
            config.variants.0.len(),
            config.preferences.len()
        ));

        let warnings = config.validate();
        if !warnings.is_empty() {
            log.warn(&format!(
                "found {} configuration warning(s):",
                warnings.len()
            ));
            for warning in &warnings {
                log.warn(&format!(
                    "  {} [{}]: {}",
                    warning.source, warning.item, warning.message
                ));
            }
        }

        Ok(Self { platform, config })
    }

    /// Build the task context for this run with the real executor.
    ///
    /// # Errors
    ///
    /// Returns [`ProvisionError::HomeNotSet`] if `HOME` is unset.
    pub fn context(self, global: &GlobalOpts, log: &Arc<Logger>) -> Result<Context> {
        let executor: Arc<dyn Executor> = Arc::new(SystemExecutor);
        let ctx = Context::new(
            Arc::new(self.config),
            Arc::new(self.platform),
            Arc::clone(log) as Arc<dyn Log>,
            executor,
            Mode::from_work_flag(global.work),
            global.dry_run,
        )?;
        log.info(&format!("mode: {}", ctx.mode));
        if ctx.dry_run {
            log.info("dry run: no changes will be made");
        }
        Ok(ctx)
    }
}

/// Execute `tasks` in order and fold their report deltas into one report.
///
/// Task failures are recorded in the logger and never stop the sequence.
#[must_use]
pub fn run_tasks(tasks: &[Box<dyn Task>], ctx: &Context) -> RunReport {
    tasks
        .iter()
        .map(|task| tasks::execute(task.as_ref(), ctx))
        .fold(RunReport::new(ctx.mode, ctx.dry_run), RunReport::merge)
}

/// Summary lines for commands that only touch preferences or the Dock.
#[must_use]
pub fn header_lines(report: &RunReport) -> Vec<String> {
    let mut lines = vec![format!("mode: {}", report.mode)];
    if report.dry_run {
        lines.push("dry run: no changes were made".to_string());
    }
    lines
}

/// Resolve the repository root from CLI arguments or auto-detection.
///
/// Order: `--root`, then `PROVISION_ROOT`, then the binary's location, then
/// the current directory.
///
/// # Errors
///
/// Returns [`ProvisionError::RootNotFound`] if no candidate looks like a
/// provisioning repository.
pub fn resolve_root(global: &GlobalOpts) -> Result<PathBuf, ProvisionError> {
    resolve_root_from(
        global.root.as_deref(),
        std::env::var_os(ROOT_ENV).map(PathBuf::from),
        std::env::current_exe().ok(),
        std::env::current_dir().ok(),
    )
}

fn resolve_root_from(
    explicit: Option<&Path>,
    from_env: Option<PathBuf>,
    exe: Option<PathBuf>,
    cwd: Option<PathBuf>,
) -> Result<PathBuf, ProvisionError> {
    if let Some(root) = explicit {
        return Ok(canonical(root));
    }
    if let Some(root) = from_env.filter(|r| !r.as_os_str().is_empty()) {
        return Ok(canonical(&root));
    }

    if let Some(parent) = exe.as_deref().and_then(Path::parent) {
        // target/release/ → repo root, bin/ → repo root
        let candidates = [parent.join("../.."), parent.join("..")];
        if let Some(root) = candidates.iter().find(|c| is_repo_root(c)) {
            return Ok(canonical(root));
        }
    }

    if let Some(cwd) = cwd
        && is_repo_root(&cwd)
    {
        return Ok(canonical(&cwd));
    }

    Err(ProvisionError::RootNotFound)
}

/// A repository root has a `provision.toml` or a `packages/` directory.
fn is_repo_root(dir: &Path) -> bool {
    dir.join(CONFIG_FILE).is_file() || dir.join("packages").is_dir()
}

fn canonical(path: &Path) -> PathBuf {
    dunce::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
}
