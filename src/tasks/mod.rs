//! Named, ordered tasks that orchestrate resource changes.
pub mod conflicts;
mod context;
pub mod customizers;
pub mod dependencies;
pub mod dock;
pub mod preferences;
mod processing;
pub mod restart;
pub mod shell_env;
pub mod symlinks;
pub mod variants;

pub use context::Context;
pub use processing::{
    ProcessOpts, TaskResult, TaskStats, process_resource, process_resource_state,
};

use std::sync::Arc;
use std::sync::atomic::AtomicBool;

use anyhow::Result;

use crate::logging::TaskStatus;
use crate::report::RunReport;

/// What a task did: its status plus the part of the run report it produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    /// Task status for the summary.
    pub result: TaskResult,
    /// Report fields touched by the task; everything else is left default.
    pub report: RunReport,
}

impl Outcome {
    /// Outcome carrying report data.
    #[must_use]
    pub const fn with_report(result: TaskResult, report: RunReport) -> Self {
        Self { result, report }
    }
}

impl From<TaskResult> for Outcome {
    fn from(result: TaskResult) -> Self {
        Self {
            result,
            report: RunReport::default(),
        }
    }
}

/// A named, executable task.
pub trait Task: Send + Sync {
    /// Human-readable task name.
    fn name(&self) -> &str;

    /// Whether this task should run on the current platform and config.
    fn should_run(&self, ctx: &Context) -> bool;

    /// Execute the task.
    ///
    /// # Errors
    ///
    /// Returns an error if the task cannot complete, such as when a system
    /// command cannot be spawned or a file operation is not permitted.
    fn run(&self, ctx: &Context) -> Result<Outcome>;
}

/// The tasks of a provisioning run, in execution order.
#[must_use]
pub fn all_install_tasks() -> Vec<Box<dyn Task>> {
    vec![
        Box::new(variants::ResolveVariants),
        Box::new(conflicts::DetectConflicts),
        Box::new(symlinks::InstallSymlinks),
        Box::new(shell_env::ConfigureShellEnv),
        Box::new(dependencies::InstallDependencies),
        Box::new(customizers::RunCustomizer::os()),
        Box::new(customizers::RunCustomizer::dock()),
    ]
}

/// The tasks run by the `prefs` command.
#[must_use]
pub fn prefs_tasks() -> Vec<Box<dyn Task>> {
    let changed = Arc::new(AtomicBool::new(false));
    vec![
        Box::new(preferences::ApplyPreferences::new(Arc::clone(&changed))),
        Box::new(restart::RestartApps::preferences(changed)),
    ]
}

/// The tasks run by the `dock` command.
#[must_use]
pub fn dock_tasks() -> Vec<Box<dyn Task>> {
    let changed = Arc::new(AtomicBool::new(false));
    vec![
        Box::new(dock::ApplyDockLayout::new(Arc::clone(&changed))),
        Box::new(restart::RestartApps::dock(changed)),
    ]
}

/// Execute a task, recording the result in the logger.
///
/// Returns the task's report delta. A task error is logged and recorded as
/// failed; it never stops the run.
pub fn execute(task: &dyn Task, ctx: &Context) -> RunReport {
    if !task.should_run(ctx) {
        ctx.log
            .debug(&format!("skipping task: {} (not applicable)", task.name()));
        ctx.log
            .record_task(task.name(), TaskStatus::NotApplicable, None);
        return RunReport::default();
    }

    ctx.log.stage(task.name());

    match task.run(ctx) {
        Ok(Outcome { result, report }) => {
            match result {
                TaskResult::Ok => ctx.log.record_task(task.name(), TaskStatus::Ok, None),
                TaskResult::Skipped(reason) => {
                    ctx.log.info(&format!("skipped: {reason}"));
                    ctx.log
                        .record_task(task.name(), TaskStatus::Skipped, Some(&reason));
                }
                TaskResult::DryRun => ctx.log.record_task(task.name(), TaskStatus::DryRun, None),
                TaskResult::Degraded(reason) => {
                    ctx.log.warn(&format!("{}: {reason}", task.name()));
                    ctx.log
                        .record_task(task.name(), TaskStatus::Degraded, Some(&reason));
                }
            }
            report
        }
        Err(e) => {
            ctx.log.error(&format!("{}: {e:#}", task.name()));
            ctx.log
                .record_task(task.name(), TaskStatus::Failed, Some(&format!("{e:#}")));
            RunReport::default()
        }
    }
}

/// Shared helpers for task unit tests.
#[cfg(test)]
#[allow(clippy::expect_used)]
pub mod test_helpers {
    use std::path::PathBuf;
    use std::sync::Arc;

    use crate::config::Config;
    use crate::logging::{Log, Logger, isolated_logger};
    use crate::platform::{Arch, Os, Platform};
    use crate::resources::test_helpers::MockExecutor;

    use super::Context;

    /// Build a default [`Config`] rooted at `root`.
    #[must_use]
    pub fn config_at(root: impl Into<PathBuf>) -> Config {
        Config {
            root: root.into(),
            ..Config::default()
        }
    }

    /// Build a [`Context`] for an Apple Silicon Mac with a silent logger and
    /// an executor that fails every command.
    #[must_use]
    pub fn make_context(config: Config) -> Context {
        Context {
            config: Arc::new(config),
            platform: Arc::new(Platform::new(Os::MacOs, Arch::Arm64)),
            log: Arc::new(Logger::with_log_file(None)),
            dry_run: false,
            mode: crate::mode::Mode::Personal,
            home: PathBuf::from("/Users/test"),
            packages: Vec::new(),
            tools: crate::tools::Tools::default(),
            executor: Arc::new(MockExecutor::default()),
            prompt: Arc::new(crate::prompt::MockPrompt::new()),
            fs_ops: Arc::new(crate::operations::SystemFileSystemOps),
        }
    }

    /// Like [`make_context`], but logging into an inspectable temporary file.
    ///
    /// Keep the returned guard alive for the duration of the test.
    #[must_use]
    pub fn make_logged_context(
        config: Config,
    ) -> (
        Context,
        Arc<Logger>,
        tempfile::TempDir,
        tracing::dispatcher::DefaultGuard,
    ) {
        let (log, tmp, guard) = isolated_logger();
        let log = Arc::new(log);
        let ctx = make_context(config).with_log(Arc::clone(&log) as Arc<dyn Log>);
        (ctx, log, tmp, guard)
    }

    /// Read everything written to `log`'s file so far.
    #[must_use]
    pub fn log_contents(log: &Logger) -> String {
        let path = log.log_path().expect("isolated logger has a file");
        std::fs::read_to_string(path).expect("log file readable")
    }
}
