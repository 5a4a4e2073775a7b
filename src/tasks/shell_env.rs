//! Shell profile exports.
use anyhow::Result;

use super::{Context, Outcome, ProcessOpts, Task, TaskResult, TaskStats, process_resource};
use crate::report::RunReport;
use crate::resources::profile_line::ProfileLineResource;

/// Append mode-specific `export` lines to the shell startup file.
#[derive(Debug)]
pub struct ConfigureShellEnv;

impl Task for ConfigureShellEnv {
    fn name(&self) -> &'static str {
        "Configure shell environment"
    }

    fn should_run(&self, ctx: &Context) -> bool {
        !ctx.config.shell.env.is_empty()
    }

    fn run(&self, ctx: &Context) -> Result<Outcome> {
        let profile = ctx.home.join(&ctx.config.shell.profile);
        let vars: Vec<_> = ctx
            .config
            .shell
            .env
            .iter()
            .filter(|var| var.applies_to(ctx.mode))
            .collect();
        if vars.is_empty() {
            return Ok(TaskResult::Skipped(format!("no variables for {} mode", ctx.mode)).into());
        }

        let opts = ProcessOpts::install_missing("append");
        let mut stats = TaskStats::new();
        let mut report = RunReport::default();
        for var in vars {
            if !var.has_valid_name() {
                ctx.log
                    .warn(&format!("skipping invalid variable name: {}", var.name));
                stats.skipped += 1;
                continue;
            }
            let resource = ProfileLineResource::export(profile.clone(), &var.name, &var.value);
            let delta = process_resource(ctx, &resource, &opts)?;
            if delta.changed > 0 {
                report.env_changes.push(var.export_line());
            }
            stats += delta;
        }
        Ok(Outcome::with_report(stats.finish(ctx), report))
    }
}
