//! Link packages into `$HOME` with Stow.
use anyhow::Result;

use super::{Context, Outcome, ProcessOpts, Task, TaskResult, TaskStats, process_resource_state};
use crate::report::RunReport;
use crate::resources::ResourceState;
use crate::resources::stow::{Stow, StowPackageResource};

/// Link every package into `$HOME` with `stow --dotfiles`.
#[derive(Debug)]
pub struct InstallSymlinks;

impl Task for InstallSymlinks {
    fn name(&self) -> &'static str {
        "Install symlinks"
    }

    fn should_run(&self, ctx: &Context) -> bool {
        !ctx.packages.is_empty()
    }

    fn run(&self, ctx: &Context) -> Result<Outcome> {
        let Some(program) = ctx.tools.stow() else {
            return Ok(without_stow(ctx));
        };
        let package_root = ctx.package_root();
        let stow = Stow::new(program, &package_root, &ctx.home, &*ctx.executor);
        let opts = ProcessOpts::apply_all("stow").no_bail();

        let mut stats = TaskStats::new();
        let mut report = RunReport::default();

        for package in &ctx.packages {
            let resource = StowPackageResource::new(stow, package);
            let simulation = match stow.simulate(&package.name) {
                Ok(simulation) => simulation,
                Err(e) => {
                    ctx.log
                        .warn(&format!("cannot simulate {}: {e:#}", package.name));
                    stats.failed += 1;
                    report.stow_failed.push(package.name.clone());
                    continue;
                }
            };

            // Unmanaged conflicts still present in a dry run are the ones the
            // backup step would have moved.
            let state = match simulation.state() {
                ResourceState::Invalid { reason }
                    if ctx.dry_run && simulation.managed.is_empty() =>
                {
                    ctx.log.dry_run(&format!(
                        "would stow {} after backing up {reason}",
                        package.name
                    ));
                    stats.changed += 1;
                    report.stowed.push(package.name.clone());
                    continue;
                }
                ResourceState::Invalid { reason } => {
                    ctx.log
                        .warn(&format!("cannot stow {}: {reason}", package.name));
                    stats.failed += 1;
                    report.stow_failed.push(package.name.clone());
                    continue;
                }
                state => state,
            };

            let delta = process_resource_state(ctx, &resource, state, &opts)?;
            if delta.failed > 0 {
                report.stow_failed.push(package.name.clone());
            } else {
                report.stowed.push(package.name.clone());
            }
            stats += delta;
        }

        Ok(Outcome::with_report(stats.finish(ctx), report))
    }
}

/// Outcome when `stow` is not available: a dry run on a fresh machine
/// reports what would be linked once the bootstrap installs it.
fn without_stow(ctx: &Context) -> Outcome {
    if !ctx.dry_run {
        return TaskResult::Skipped("stow not installed".to_string()).into();
    }
    let mut report = RunReport::default();
    for package in &ctx.packages {
        ctx.log.dry_run(&format!("would stow {}", package.name));
        report.stowed.push(package.name.clone());
    }
    Outcome::with_report(TaskResult::DryRun, report)
}
