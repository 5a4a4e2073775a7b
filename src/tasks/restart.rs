//! Restart applications after their settings changed.
use anyhow::Result;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use super::{Context, Outcome, Task, TaskResult};
use crate::config::Config;

/// Restart applications with `killall` so they pick up changed settings.
///
/// Runs only when the preceding task reported a change.
#[derive(Debug)]
pub struct RestartApps {
    task_name: &'static str,
    apps: fn(&Config) -> Vec<String>,
    changed: Arc<AtomicBool>,
}

impl RestartApps {
    /// Restart the apps listed in `[prefs] restart`.
    #[must_use]
    pub fn preferences(changed: Arc<AtomicBool>) -> Self {
        Self {
            task_name: "Restart apps",
            apps: |config| config.prefs.restart.clone(),
            changed,
        }
    }

    /// Restart the Dock.
    #[must_use]
    pub fn dock(changed: Arc<AtomicBool>) -> Self {
        Self {
            task_name: "Restart Dock",
            apps: |_| vec!["Dock".to_string()],
            changed,
        }
    }
}

impl Task for RestartApps {
    fn name(&self) -> &str {
        self.task_name
    }

    fn should_run(&self, ctx: &Context) -> bool {
        ctx.platform.is_macos() && self.changed.load(Ordering::Acquire)
    }

    fn run(&self, ctx: &Context) -> Result<Outcome> {
        let apps = (self.apps)(&ctx.config);
        if apps.is_empty() {
            return Ok(TaskResult::Skipped("nothing to restart".to_string()).into());
        }
        for app in &apps {
            if ctx.dry_run {
                ctx.log.dry_run(&format!("would restart {app}"));
                continue;
            }
            let result = ctx.executor.run_unchecked("killall", &[app.as_str()])?;
            if result.success {
                ctx.log.info(&format!("restarted {app}"));
            } else {
                ctx.log.debug(&format!("{app} was not running"));
            }
        }
        Ok(if ctx.dry_run {
            TaskResult::DryRun
        } else {
            TaskResult::Ok
        }
        .into())
    }
}
