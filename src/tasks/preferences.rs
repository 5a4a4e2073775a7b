//! Apply `[[preferences]]` through `defaults`.
use anyhow::Result;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use super::{Context, Outcome, ProcessOpts, Task, TaskStats, process_resource};
use crate::resources::preference::PreferenceResource;

/// Write (or delete) the configured `defaults` keys.
#[derive(Debug)]
pub struct ApplyPreferences {
    changed: Arc<AtomicBool>,
}

impl ApplyPreferences {
    /// Create the task; `changed` is set when any key is (or would be) changed.
    #[must_use]
    pub const fn new(changed: Arc<AtomicBool>) -> Self {
        Self { changed }
    }
}

impl Task for ApplyPreferences {
    fn name(&self) -> &'static str {
        "Apply preferences"
    }

    fn should_run(&self, ctx: &Context) -> bool {
        ctx.platform.is_macos() && !ctx.config.preferences.is_empty()
    }

    fn run(&self, ctx: &Context) -> Result<Outcome> {
        let opts = ProcessOpts::apply_all("write").no_bail();
        let mut stats = TaskStats::new();
        for pref in &ctx.config.preferences {
            if pref.value.is_none() && !pref.delete {
                ctx.log.warn(&format!(
                    "{} {}: neither value nor delete set, skipping",
                    pref.domain, pref.key
                ));
                stats.skipped += 1;
                continue;
            }
            let resource = PreferenceResource::new(pref, &*ctx.executor);
            match process_resource(ctx, &resource, &opts) {
                Ok(delta) => stats += delta,
                Err(e) => {
                    ctx.log
                        .warn(&format!("{} {}: {e:#}", pref.domain, pref.key));
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
