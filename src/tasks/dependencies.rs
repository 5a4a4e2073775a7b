//! `brew bundle` for the shared and mode-specific manifests.
use anyhow::Result;
use std::path::PathBuf;

use super::{Context, Outcome, Task, TaskResult};
use crate::mode::resolve_variant;
use crate::report::RunReport;
use crate::resources::brew::Brew;

/// Run `brew bundle` for the shared manifest, then the mode-specific one.
#[derive(Debug)]
pub struct InstallDependencies;

impl Task for InstallDependencies {
    fn name(&self) -> &'static str {
        "Install dependencies"
    }

    fn should_run(&self, ctx: &Context) -> bool {
        ctx.platform.is_macos() || ctx.tools.brew().is_some()
    }

    fn run(&self, ctx: &Context) -> Result<Outcome> {
        let manifests = manifests(ctx);
        if manifests.is_empty() {
            return Ok(TaskResult::Skipped(format!(
                "no {} found",
                ctx.config.manifests.name
            ))
            .into());
        }
        let Some(program) = ctx.tools.brew() else {
            if ctx.dry_run {
                for manifest in &manifests {
                    ctx.log.dry_run(&format!(
                        "would run brew bundle --file {} once Homebrew is installed",
                        manifest.display()
                    ));
                }
                return Ok(TaskResult::DryRun.into());
            }
            return Ok(TaskResult::Skipped("Homebrew not installed".to_string()).into());
        };

        let brew = Brew::new(program, &*ctx.executor);
        let mut report = RunReport::default();
        let mut failed = 0u32;

        for manifest in manifests {
            let applied = if ctx.dry_run {
                check(ctx, &brew, &manifest)
            } else {
                ctx.log
                    .info(&format!("brew bundle --file {}", manifest.display()));
                brew.bundle(&manifest)
            };
            match applied {
                Ok(()) => report.manifests_applied.push(manifest),
                Err(e) => {
                    ctx.log
                        .warn(&format!("{}: {e:#}", manifest.display()));
                    report.dependencies_degraded = true;
                    failed += 1;
                }
            }
        }

        let result = if failed > 0 {
            TaskResult::Degraded(format!("brew bundle failed for {failed} manifest(s)"))
        } else if ctx.dry_run {
            TaskResult::DryRun
        } else {
            TaskResult::Ok
        };
        Ok(Outcome::with_report(result, report))
    }
}

/// Report what `brew bundle` would install from `manifest`.
fn check(ctx: &Context, brew: &Brew<'_>, manifest: &std::path::Path) -> Result<()> {
    let check = brew.bundle_check(manifest)?;
    if check.satisfied {
        ctx.log
            .debug(&format!("{}: dependencies satisfied", manifest.display()));
    }
    for entry in &check.missing {
        ctx.log.dry_run(&format!(
            "would install {entry} from {}",
            manifest.display()
        ));
    }
    Ok(())
}

/// Manifests to apply, in order: the shared one, then the mode-specific one
/// from `$HOME`, or from the first package that has one.
fn manifests(ctx: &Context) -> Vec<PathBuf> {
    let mut found = Vec::new();
    let shared = ctx.config.shared_manifest();
    if ctx.fs_ops.exists(&shared) {
        found.push(shared);
    } else {
        ctx.log
            .debug(&format!("no shared manifest at {}", shared.display()));
    }

    let name = &ctx.config.manifests.name;
    let specific = resolve_variant(&*ctx.fs_ops, ctx.mode, &ctx.home, name)
        .path()
        .map(std::path::Path::to_path_buf)
        .or_else(|| {
            ctx.packages.iter().find_map(|package| {
                resolve_variant(&*ctx.fs_ops, ctx.mode, &package.dir, name)
                    .path()
                    .map(std::path::Path::to_path_buf)
            })
        });
    match specific {
        Some(path) if !found.contains(&path) => found.push(path),
        Some(_) => {}
        None => ctx.log.debug(&format!("no {} for {} mode", name, ctx.mode)),
    }
    found
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::mode::Mode;
    use crate::operations::MockFileSystemOps;
    use crate::packages::Package;
    use crate::resources::test_helpers::{MockExecutor, Reply};
    use crate::tasks::test_helpers::{config_at, log_contents, make_logged_context};
    use crate::tools::Tools;
    use std::sync::Arc;

    const BREW: &str = "/opt/homebrew/bin/brew";

    fn homebrew_package() -> Package {
        Package {
            name: "homebrew".to_string(),
            dir: PathBuf::from("/repo/packages/homebrew"),
        }
    }

    fn context(
        fs: MockFileSystemOps,
        replies: Vec<Reply>,
    ) -> (
        Context,
        Arc<MockExecutor>,
        Arc<crate::logging::Logger>,
        tempfile::TempDir,
        tracing::dispatcher::DefaultGuard,
    ) {
        let (ctx, log, tmp, guard) = make_logged_context(config_at("/repo"));
        let exec = Arc::new(MockExecutor::with_replies(replies));
        let mut ctx = ctx
            .with_home(PathBuf::from("/Users/me"))
            .with_packages(vec![homebrew_package()])
            .with_tools(Tools::default().with_brew(BREW))
            .with_fs_ops(Arc::new(fs));
        ctx.executor = exec.clone();
        (ctx, exec, log, tmp, guard)
    }

    #[test]
    fn shared_then_mode_specific() {
        let fs = MockFileSystemOps::new()
            .with_file("/repo/Brewfile")
            .with_file("/repo/packages/homebrew/Brewfile.work");
        let (mut ctx, exec, _log, _tmp, _guard) = context(fs, vec![Reply::ok(""), Reply::ok("")]);
        ctx.mode = Mode::Work;

        let outcome = InstallDependencies.run(&ctx).unwrap();
        assert_eq!(outcome.result, TaskResult::Ok);
        assert_eq!(
            exec.calls(),
            vec![
                format!("{BREW} bundle --file /repo/Brewfile"),
                format!("{BREW} bundle --file /repo/packages/homebrew/Brewfile.work"),
            ]
        );
        assert_eq!(outcome.report.manifests_applied.len(), 2);
    }

    #[test]
    fn home_manifest_wins_over_package() {
        let fs = MockFileSystemOps::new()
            .with_file("/Users/me/Brewfile.personal")
            .with_file("/repo/packages/homebrew/Brewfile.personal");
        let (ctx, exec, _log, _tmp, _guard) = context(fs, vec![Reply::ok("")]);

        InstallDependencies.run(&ctx).unwrap();
        assert_eq!(
            exec.calls(),
            vec![format!("{BREW} bundle --file /Users/me/Brewfile.personal")]
        );
    }

    #[test]
    fn failed_shared_bundle_still_runs_specific() {
        let fs = MockFileSystemOps::new()
            .with_file("/repo/Brewfile")
            .with_file("/repo/packages/homebrew/Brewfile");
        let (ctx, exec, _log, _tmp, _guard) = context(
            fs,
            vec![Reply::stderr(false, "Error: tap failed"), Reply::ok("")],
        );

        let outcome = InstallDependencies.run(&ctx).unwrap();
        assert!(matches!(outcome.result, TaskResult::Degraded(_)));
        assert!(outcome.report.dependencies_degraded);
        assert_eq!(exec.call_count(), 2);
        assert_eq!(
            outcome.report.manifests_applied,
            vec![PathBuf::from("/repo/packages/homebrew/Brewfile")]
        );
    }

    #[test]
    fn dry_run_uses_bundle_check() {
        let fs = MockFileSystemOps::new().with_file("/repo/Brewfile");
        let (mut ctx, exec, log, _tmp, _guard) = context(
            fs,
            vec![Reply {
                success: false,
                stdout: "→ Formula jq needs to be installed or updated.\n".to_string(),
                stderr: String::new(),
            }],
        );
        ctx.dry_run = true;

        let outcome = InstallDependencies.run(&ctx).unwrap();
        assert_eq!(outcome.result, TaskResult::DryRun);
        assert_eq!(
            exec.calls(),
            vec![format!(
                "{BREW} bundle check --verbose --no-upgrade --file /repo/Brewfile"
            )]
        );
        assert!(log_contents(&log).contains("would install Formula jq from /repo/Brewfile"));
    }

    #[test]
    fn no_manifest_skips() {
        let (ctx, exec, _log, _tmp, _guard) = context(MockFileSystemOps::new(), vec![]);
        let outcome = InstallDependencies.run(&ctx).unwrap();
        assert!(matches!(outcome.result, TaskResult::Skipped(_)));
        assert_eq!(exec.call_count(), 0);
    }

    #[test]
    fn missing_brew_reports_bundle_intent_in_dry_run() {
        let (ctx, log, _tmp, _guard) = make_logged_context(config_at("/repo"));
        let mut ctx = ctx.with_fs_ops(Arc::new(MockFileSystemOps::new().with_file("/repo/Brewfile")));
        ctx.dry_run = true;
        let outcome = InstallDependencies.run(&ctx).unwrap();
        assert_eq!(outcome.result, TaskResult::DryRun);
        assert!(outcome.report.manifests_applied.is_empty());
        assert!(log_contents(&log).contains("would run brew bundle --file /repo/Brewfile"));
    }

    #[test]
    fn missing_brew_skips_outside_dry_run() {
        let (ctx, _log, _tmp, _guard) = make_logged_context(config_at("/repo"));
        let ctx = ctx.with_fs_ops(Arc::new(MockFileSystemOps::new().with_file("/repo/Brewfile")));
        let outcome = InstallDependencies.run(&ctx).unwrap();
        assert!(matches!(outcome.result, TaskResult::Skipped(_)));
    }
}
