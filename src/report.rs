//! Per-run report assembled from the deltas returned by each task.
use std::fmt;
use std::path::PathBuf;

use crate::mode::Mode;

/// A conflicting target reported by the Stow simulation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conflict {
    /// Package whose installation would clash.
    pub package: String,
    /// Target path relative to `$HOME`.
    pub target: PathBuf,
}

/// A materialised variant alias.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alias {
    /// The fixed-name symlink inside the package.
    pub link: PathBuf,
    /// The variant it points to (file name only).
    pub target: PathBuf,
}

/// How a post-install customizer ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CustomizerStatus {
    /// Script ran and exited successfully.
    Ran,
    /// Operator answered no (or gave no answer).
    Declined,
    /// Script file does not exist.
    Missing,
    /// Script exited with an error.
    Failed,
    /// Dry run; neither prompted nor run.
    WouldPrompt,
}

impl fmt::Display for CustomizerStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Ran => "ran",
            Self::Declined => "declined",
            Self::Missing => "missing",
            Self::Failed => "failed",
            Self::WouldPrompt => "would prompt",
        })
    }
}

/// Outcome of one customizer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomizerOutcome {
    /// Customizer label (`os` or `dock`).
    pub name: String,
    /// What happened.
    pub status: CustomizerStatus,
}

/// Everything a provisioning run did or would do.
///
/// Tasks return a delta containing only the fields they touch; the command
/// folds the deltas together with [`RunReport::merge`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunReport {
    /// Active mode.
    pub mode: Mode,
    /// Whether mutations were replaced by reported intents.
    pub dry_run: bool,
    /// Conflicts found by the Stow simulation.
    pub conflicts: Vec<Conflict>,
    /// The single backup directory, when one was (or would be) created.
    pub backup_dir: Option<PathBuf>,
    /// Targets moved into the backup directory, relative to `$HOME`.
    pub backed_up: Vec<PathBuf>,
    /// Packages installed by Stow.
    pub stowed: Vec<String>,
    /// Packages Stow failed to install.
    pub stow_failed: Vec<String>,
    /// Dependency manifests handed to `brew bundle`.
    pub manifests_applied: Vec<PathBuf>,
    /// At least one `brew bundle` invocation failed.
    pub dependencies_degraded: bool,
    /// `export` lines appended (or that would be) to the shell startup file.
    pub env_changes: Vec<String>,
    /// Variant aliases (re)pointed during this run.
    pub aliases: Vec<Alias>,
    /// Customizer outcomes in execution order.
    pub customizers: Vec<CustomizerOutcome>,
}

impl RunReport {
    /// Base report for a run.
    #[must_use]
    pub fn new(mode: Mode, dry_run: bool) -> Self {
        Self {
            mode,
            dry_run,
            ..Self::default()
        }
    }

    /// Fold `other` into `self`. Run-wide fields (`mode`, `dry_run`) keep the
    /// values of `self`; lists are concatenated in order.
    #[must_use]
    pub fn merge(mut self, other: Self) -> Self {
        self.conflicts.extend(other.conflicts);
        self.backup_dir = self.backup_dir.or(other.backup_dir);
        self.backed_up.extend(other.backed_up);
        self.stowed.extend(other.stowed);
        self.stow_failed.extend(other.stow_failed);
        self.manifests_applied.extend(other.manifests_applied);
        self.dependencies_degraded |= other.dependencies_degraded;
        self.env_changes.extend(other.env_changes);
        self.aliases.extend(other.aliases);
        self.customizers.extend(other.customizers);
        self
    }

    /// Number of distinct packages with at least one conflict.
    #[must_use]
    pub fn conflicting_packages(&self) -> usize {
        let mut names: Vec<&str> = self.conflicts.iter().map(|c| c.package.as_str()).collect();
        names.sort_unstable();
        names.dedup();
        names.len()
    }

    /// Detail lines printed under the task list in the summary.
    #[must_use]
    pub fn summary_lines(&self) -> Vec<String> {
        let mut lines = vec![format!("mode: {}", self.mode)];
        if self.dry_run {
            lines.push("dry run: no changes were made".to_string());
        }

        lines.push(format!("stowed: {}", join_or_none(&self.stowed)));
        if !self.stow_failed.is_empty() {
            lines.push(format!("stow failed: {}", self.stow_failed.join(", ")));
        }

        if self.conflicts.is_empty() {
            lines.push("conflicts: none".to_string());
        } else {
            lines.push(format!(
                "conflicts: {} in {} package(s)",
                self.conflicts.len(),
                self.conflicting_packages()
            ));
            for conflict in &self.conflicts {
                lines.push(format!(
                    "  {}: ~/{}",
                    conflict.package,
                    conflict.target.display()
                ));
            }
        }

        if let Some(dir) = &self.backup_dir {
            let verb = if self.dry_run { "would move" } else { "moved" };
            lines.push(format!(
                "backup: {} ({verb} {} file(s))",
                dir.display(),
                self.backed_up.len()
            ));
        }

        let manifests: Vec<String> = self
            .manifests_applied
            .iter()
            .map(|p| p.display().to_string())
            .collect();
        lines.push(format!("manifests: {}", join_or_none(&manifests)));
        if self.dependencies_degraded {
            lines.push("dependencies: degraded (see log)".to_string());
        }

        lines.push(format!("shell env: {}", join_or_none(&self.env_changes)));

        for alias in &self.aliases {
            lines.push(format!(
                "alias: {} -> {}",
                alias.link.display(),
                alias.target.display()
            ));
        }

        for customizer in &self.customizers {
            lines.push(format!("customizer {}: {}", customizer.name, customizer.status));
        }

        lines
    }
}

fn join_or_none(items: &[String]) -> String {
    if items.is_empty() {
        "none".to_string()
    } else {
        items.join(", ")
    }
}
