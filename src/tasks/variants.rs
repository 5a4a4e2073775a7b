//! Mode variant resolution and alias links.
use anyhow::Result;

use super::{Context, Outcome, ProcessOpts, Task, TaskStats, process_resource};
use crate::mode::{Variant, resolve_variant};
use crate::report::{Alias, RunReport};
use crate::resources::alias::AliasResource;

/// Select the active mode's variant files and point their aliases at them.
#[derive(Debug)]
pub struct ResolveVariants;

impl Task for ResolveVariants {
    fn name(&self) -> &'static str {
        "Resolve variants"
    }

    fn should_run(&self, ctx: &Context) -> bool {
        !ctx.config.variants.is_empty() && !ctx.packages.is_empty()
    }

    fn run(&self, ctx: &Context) -> Result<Outcome> {
        let mut stats = TaskStats::new();
        let mut report = RunReport::default();
        let opts = ProcessOpts::apply_all("point").no_bail();

        for file in ctx.config.variants.iter() {
            let mut found = false;
            for package in &ctx.packages {
                let variant = resolve_variant(&*ctx.fs_ops, ctx.mode, &package.dir, &file.file);
                match variant {
                    Variant::Missing => continue,
                    Variant::Canonical(path) => {
                        found = true;
                        warn_if_foreign_alias(ctx, &path, &file.file);
                        ctx.log.debug(&format!(
                            "{}: no {} variant, using {}",
                            package.name,
                            ctx.mode,
                            path.display()
                        ));
                    }
                    Variant::Suffixed(path) if file.alias => {
                        found = true;
                        let resource = AliasResource::for_variant(&path, &file.file);
                        let delta = process_resource(ctx, &resource, &opts)?;
                        if delta.changed > 0 {
                            report.aliases.push(Alias {
                                link: resource.link.clone(),
                                target: resource.target.clone(),
                            });
                        }
                        stats += delta;
                    }
                    Variant::Suffixed(path) => {
                        found = true;
                        ctx.log.debug(&format!(
                            "{}: selected {}",
                            package.name,
                            path.display()
                        ));
                    }
                }
            }
            if !found {
                ctx.log.warn(&format!(
                    "no {} variant of {} in any package",
                    ctx.mode, file.file
                ));
            }
        }

        Ok(Outcome::with_report(stats.finish(ctx), report))
    }
}

/// Warn when the canonical file is an alias left pointing at another mode's
/// variant, since the active mode has none to replace it with.
fn warn_if_foreign_alias(ctx: &Context, path: &std::path::Path, base_name: &str) {
    let Ok(target) = ctx.fs_ops.read_link(path) else {
        return;
    };
    let target = target.to_string_lossy();
    let own = ctx.mode.variant_name(base_name);
    if target.starts_with(&format!("{base_name}.")) && target != own {
        ctx.log.warn(&format!(
            "{} still points to {target}; add {own} to switch it",
            path.display()
        ));
    }
}
