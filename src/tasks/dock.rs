//! Apply the `[dock]` layout with `dockutil`.
use anyhow::Result;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use super::{Context, Outcome, ProcessOpts, Task, TaskResult, TaskStats, process_resource};
use crate::resources::dock_item::DockItemResource;

/// Remove and add Dock items with `dockutil`.
#[derive(Debug)]
pub struct ApplyDockLayout {
    changed: Arc<AtomicBool>,
}

impl ApplyDockLayout {
    /// Create the task; `changed` is set when any item is (or would be) changed.
    #[must_use]
    pub const fn new(changed: Arc<AtomicBool>) -> Self {
        Self { changed }
    }
}

impl Task for ApplyDockLayout {
    fn name(&self) -> &'static str {
        "Apply Dock layout"
    }

    fn should_run(&self, ctx: &Context) -> bool {
        let dock = &ctx.config.dock;
        ctx.platform.is_macos() && !(dock.remove.is_empty() && dock.add.is_empty())
    }

    fn run(&self, ctx: &Context) -> Result<Outcome> {
        let dockutil = ctx
            .tools
            .get("dockutil")
            .map(std::path::Path::to_path_buf)
            .or_else(|| ctx.executor.locate("dockutil"));
        let Some(dockutil) = dockutil else {
            return Ok(TaskResult::Skipped("dockutil not installed".to_string()).into());
        };

        let executor = &*ctx.executor;
        let removals = ctx
            .config
            .dock
            .remove
            .iter()
            .map(|label| DockItemResource::remove(label, &dockutil, executor));
        let additions = ctx
            .config
            .dock
            .add
            .iter()
            .map(|item| DockItemResource::add(item, &dockutil, executor));

        let opts = ProcessOpts::apply_all("update").no_bail();
        let mut stats = TaskStats::new();
        for resource in removals.chain(additions) {
            match process_resource(ctx, &resource, &opts) {
                Ok(delta) => stats += delta,
                Err(e) => {
                    ctx.log.warn(&format!("{}: {e:#}", resource.label));
                    stats.failed += 1;
                }
            }
        }
        if stats.changed > 0 {
            self.changed.store(true, Ordering::Release);
        }
        Ok(stats.finish(ctx).into())
    }
}
