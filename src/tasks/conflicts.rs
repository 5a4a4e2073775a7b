//! Stow conflict detection and the per-run backup directory.
use anyhow::{Context as _, Result};
use std::path::{Path, PathBuf};

use super::{Context, Outcome, Task, TaskResult};
use crate::report::{Conflict, RunReport};
use crate::resources::fs::{is_real_dir, links_into, move_into, occupied};
use crate::resources::stow::Stow;

/// Timestamp format of backup directory names.
const STAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

/// Simulate Stow for every package and move conflicting files out of the way.
#[derive(Debug)]
pub struct DetectConflicts;

impl Task for DetectConflicts {
    fn name(&self) -> &'static str {
        "Detect conflicts"
    }

    fn should_run(&self, ctx: &Context) -> bool {
        !ctx.packages.is_empty()
    }

    fn run(&self, ctx: &Context) -> Result<Outcome> {
        let Some(program) = ctx.tools.stow() else {
            if ctx.dry_run {
                for package in &ctx.packages {
                    ctx.log.dry_run(&format!(
                        "would check {} for conflicts once stow is installed",
                        package.name
                    ));
                }
                return Ok(TaskResult::DryRun.into());
            }
            return Ok(TaskResult::Skipped("stow not installed".to_string()).into());
        };
        let package_root = ctx.package_root();
        let stow = Stow::new(program, &package_root, &ctx.home, &*ctx.executor);

        let mut report = RunReport::default();
        let mut backup = BackupDir::new(
            &ctx.home,
            &ctx.config.backup.prefix,
            chrono::Local::now().format(STAMP_FORMAT).to_string(),
        );
        let mut problems = 0u32;

        for package in &ctx.packages {
            let simulation = match stow.simulate(&package.name) {
                Ok(simulation) => simulation,
                Err(e) => {
                    ctx.log
                        .warn(&format!("cannot simulate {}: {e:#}", package.name));
                    problems += 1;
                    continue;
                }
            };
            if simulation.conflicts.is_empty() {
                ctx.log.debug(&format!("{}: no conflicts", package.name));
                continue;
            }
            ctx.log.info(&format!(
                "{}: {} conflicting target(s)",
                package.name,
                simulation.conflicts.len()
            ));

            for target in simulation.conflicts {
                let source = ctx.home.join(&target);
                report.conflicts.push(Conflict {
                    package: package.name.clone(),
                    target: target.clone(),
                });

                if simulation.managed.contains(&target)
                    || links_into(&source, &package_root)
                {
                    ctx.log.warn(&format!(
                        "{} is stowed by another package; left in place",
                        source.display()
                    ));
                    problems += 1;
                    continue;
                }

                if is_real_dir(&source) {
                    ctx.log.warn(&format!(
                        "{} is a directory; resolve it by hand",
                        source.display()
                    ));
                    problems += 1;
                    continue;
                }
                if !occupied(&source) {
                    ctx.log
                        .debug(&format!("{} no longer exists", source.display()));
                    continue;
                }

                if ctx.dry_run {
                    let dir = backup.planned_path();
                    ctx.log.dry_run(&format!(
                        "would move {} to {}",
                        source.display(),
                        dir.join(&target).display()
                    ));
                    report.backed_up.push(target);
                    continue;
                }

                let moved = backup
                    .ensure()
                    .and_then(|dir| move_into(&source, &dir.join(&target)));
                match moved {
                    Ok(()) => {
                        ctx.log
                            .info(&format!("backed up {}", source.display()));
                        report.backed_up.push(target);
                    }
                    Err(e) => {
                        ctx.log.warn(&format!("{e:#}"));
                        problems += 1;
                    }
                }
            }
        }

        report.backup_dir = backup.into_reported(ctx.dry_run && !report.backed_up.is_empty());
        if let Some(dir) = &report.backup_dir {
            ctx.log.info(&format!("backup directory: {}", dir.display()));
        }

        let result = if problems > 0 {
            TaskResult::Degraded(format!("{problems} conflict(s) left unresolved"))
        } else if ctx.dry_run {
            TaskResult::DryRun
        } else {
            TaskResult::Ok
        };
        Ok(Outcome::with_report(result, report))
    }
}

/// The run's single backup directory, created on first use.
#[derive(Debug)]
pub struct BackupDir {
    base: PathBuf,
    created: Option<PathBuf>,
}

impl BackupDir {
    /// A backup directory named `<prefix><stamp>` under `home`.
    #[must_use]
    pub fn new(home: &Path, prefix: &str, stamp: String) -> Self {
        Self {
            base: home.join(format!("{prefix}{stamp}")),
            created: None,
        }
    }

    /// The path [`ensure`](Self::ensure) would create right now.
    #[must_use]
    pub fn planned_path(&self) -> PathBuf {
        if let Some(dir) = &self.created {
            return dir.clone();
        }
        let mut candidate = self.base.clone();
        let mut n = 1u32;
        while occupied(&candidate) {
            candidate = PathBuf::from(format!("{}-{n}", self.base.display()));
            n += 1;
        }
        candidate
    }

    /// Create the directory if this is the first call and return it.
    ///
    /// A name already taken (two runs in the same second) gets a numeric
    /// suffix; an existing directory is never reused.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created.
    pub fn ensure(&mut self) -> Result<PathBuf> {
        if let Some(dir) = &self.created {
            return Ok(dir.clone());
        }
        let dir = self.planned_path();
        std::fs::create_dir_all(&dir)
            .with_context(|| format!("create backup directory: {}", dir.display()))?;
        self.created = Some(dir.clone());
        Ok(dir)
    }

    /// The directory to report: the created one, or the planned one when
    /// `planned` is set.
    #[must_use]
    pub fn into_reported(self, planned: bool) -> Option<PathBuf> {
        match self.created {
            Some(dir) => Some(dir),
            None if planned => Some(self.planned_path()),
            None => None,
        }
    }
}
