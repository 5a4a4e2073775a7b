//! Optional, prompt-gated customizer scripts.
use anyhow::Result;
use std::path::PathBuf;

use super::{Context, Outcome, Task, TaskResult};
use crate::config::Config;
use crate::report::{CustomizerOutcome, CustomizerStatus, RunReport};

/// Run an optional customizer script after the operator confirms.
#[derive(Debug)]
pub struct RunCustomizer {
    name: &'static str,
    label: &'static str,
    task_name: &'static str,
    script: fn(&Config) -> PathBuf,
}

impl RunCustomizer {
    /// The macOS preferences script.
    #[must_use]
    pub fn os() -> Self {
        Self {
            name: "os",
            label: "macOS preferences",
            task_name: "Customize macOS",
            script: Config::os_customizer,
        }
    }

    /// The Dock layout script.
    #[must_use]
    pub fn dock() -> Self {
        Self {
            name: "dock",
            label: "Dock layout",
            task_name: "Customize Dock",
            script: Config::dock_customizer,
        }
    }

    fn outcome(&self, result: TaskResult, status: CustomizerStatus) -> Outcome {
        let mut report = RunReport::default();
        report.customizers.push(CustomizerOutcome {
            name: self.name.to_string(),
            status,
        });
        Outcome::with_report(result, report)
    }
}

impl Task for RunCustomizer {
    fn name(&self) -> &str {
        self.task_name
    }

    fn should_run(&self, ctx: &Context) -> bool {
        ctx.platform.is_macos()
    }

    fn run(&self, ctx: &Context) -> Result<Outcome> {
        let script = (self.script)(&ctx.config);
        if !ctx.fs_ops.exists(&script) {
            ctx.log
                .warn(&format!("{} script not found: {}", self.label, script.display()));
            return Ok(self.outcome(
                TaskResult::Skipped("script not found".to_string()),
                CustomizerStatus::Missing,
            ));
        }

        if ctx.dry_run {
            ctx.log.dry_run(&format!(
                "would ask to apply {} ({})",
                self.label,
                script.display()
            ));
            return Ok(self.outcome(TaskResult::DryRun, CustomizerStatus::WouldPrompt));
        }

        if !ctx.prompt.confirm(&format!("Apply {}?", self.label)) {
            return Ok(self.outcome(
                TaskResult::Skipped("declined".to_string()),
                CustomizerStatus::Declined,
            ));
        }

        let script_arg = script.to_string_lossy();
        match ctx.executor.run_interactive("/bin/bash", &[&script_arg]) {
            Ok(result) if result.success => {
                ctx.log.success(&format!("applied {}", self.label));
                Ok(self.outcome(TaskResult::Ok, CustomizerStatus::Ran))
            }
            Ok(result) => {
                let reason = format!("script exited with {}", result.code.unwrap_or(-1));
                Ok(self.outcome(TaskResult::Degraded(reason), CustomizerStatus::Failed))
            }
            Err(e) => Ok(self.outcome(
                TaskResult::Degraded(format!("{e:#}")),
                CustomizerStatus::Failed,
            )),
        }
    }
}
