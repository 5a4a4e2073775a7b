//! GNU Stow package resource and simulation parsing.
use anyhow::Result;
use std::path::{Path, PathBuf};

use super::error::ResourceError;
use super::{Applicable, Resource, ResourceChange, ResourceState};
use crate::exec::Executor;
use crate::packages::Package;

/// Operation prefixes Stow prints in verbose mode for pending changes.
const OPERATIONS: &[&str] = &["LINK:", "MKDIR:", "UNLINK:", "RMDIR:"];

/// Parsed result of `stow --no --verbose`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Simulation {
    /// Number of filesystem operations Stow would perform.
    pub pending: usize,
    /// Conflicting targets, relative to the target directory.
    pub conflicts: Vec<PathBuf>,
    /// The subset of `conflicts` Stow already manages for another package.
    pub managed: Vec<PathBuf>,
}

impl Simulation {
    /// Parse Stow's stderr report.
    #[must_use]
    pub fn parse(stderr: &str) -> Self {
        let mut simulation = Self::default();
        for line in stderr.lines() {
            let trimmed = line.trim();
            if OPERATIONS.iter().any(|op| trimmed.starts_with(op)) {
                simulation.pending += 1;
            } else if let Some((target, managed)) = parse_conflict(trimmed) {
                if managed {
                    simulation.managed.push(target.clone());
                }
                simulation.conflicts.push(target);
            }
        }
        simulation
    }

    /// Package state implied by this simulation.
    #[must_use]
    pub fn state(&self) -> ResourceState {
        if !self.managed.is_empty() {
            ResourceState::Invalid {
                reason: format!(
                    "{} target(s) stowed by another package",
                    self.managed.len()
                ),
            }
        } else if !self.conflicts.is_empty() {
            ResourceState::Invalid {
                reason: format!("{} conflicting target(s)", self.conflicts.len()),
            }
        } else if self.pending == 0 {
            ResourceState::Correct
        } else {
            ResourceState::Missing
        }
    }
}

/// Extract the target path from one conflict line of Stow's report, and
/// whether Stow owns that target for a different package.
///
/// Handles both the older `existing target is ...: <path>` form and the
/// `cannot stow <src> over existing target <path> since ...` form.
fn parse_conflict(line: &str) -> Option<(PathBuf, bool)> {
    let line = line.strip_prefix("* ")?;
    if let Some((_, rest)) = line.split_once("over existing target ") {
        let (target, why) = rest.split_once(" since ").unwrap_or((rest, ""));
        let target = target.trim();
        return (!target.is_empty())
            .then(|| (PathBuf::from(target), why.contains("different package")));
    }
    let rest = line.strip_prefix("existing target ")?;
    let (kind, target) = rest.split_once(": ")?;
    let target = target.split(" => ").next()?.trim();
    (!target.is_empty()).then(|| {
        (
            PathBuf::from(target),
            kind.contains("stowed to a different package"),
        )
    })
}

/// Invokes Stow for one package root and target directory.
#[derive(Debug, Clone, Copy)]
pub struct Stow<'a> {
    program: &'a Path,
    package_root: &'a Path,
    target: &'a Path,
    executor: &'a dyn Executor,
}

impl<'a> Stow<'a> {
    /// Create a Stow invoker.
    #[must_use]
    pub const fn new(
        program: &'a Path,
        package_root: &'a Path,
        target: &'a Path,
        executor: &'a dyn Executor,
    ) -> Self {
        Self {
            program,
            package_root,
            target,
            executor,
        }
    }

    fn args(&self, extra: &[&str], package: &str) -> Vec<String> {
        let mut args: Vec<String> = extra.iter().map(ToString::to_string).collect();
        args.extend([
            "--dotfiles".to_string(),
            "--dir".to_string(),
            self.package_root.to_string_lossy().into_owned(),
            "--target".to_string(),
            self.target.to_string_lossy().into_owned(),
            package.to_string(),
        ]);
        args
    }

    /// Run Stow in simulation mode for `package`. Never mutates anything.
    ///
    /// Stow exits non-zero when it reports conflicts; any other failure is
    /// an error.
    ///
    /// # Errors
    ///
    /// Returns an error if Stow cannot be spawned, or
    /// [`ResourceError::ExecutionFailed`] if it fails without reporting
    /// conflicts.
    pub fn simulate(&self, package: &str) -> Result<Simulation> {
        let args = self.args(&["--no", "--verbose"], package);
        let args: Vec<&str> = args.iter().map(String::as_str).collect();
        let program = self.program.to_string_lossy();
        let result = self.executor.run_unchecked(&program, &args)?;
        let simulation = Simulation::parse(&result.stderr);
        if !result.success && simulation.conflicts.is_empty() {
            return Err(ResourceError::from_exec(&program, &result).into());
        }
        Ok(simulation)
    }

    /// Install `package` into the target directory.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::ExecutionFailed`] if Stow exits non-zero.
    pub fn install(&self, package: &str) -> Result<()> {
        let args = self.args(&[], package);
        let args: Vec<&str> = args.iter().map(String::as_str).collect();
        let program = self.program.to_string_lossy();
        let result = self.executor.run_unchecked(&program, &args)?;
        if !result.success {
            return Err(ResourceError::from_exec(&program, &result).into());
        }
        Ok(())
    }
}

/// A package that should be fully linked into the target directory.
#[derive(Debug)]
pub struct StowPackageResource<'a> {
    stow: Stow<'a>,
    /// Package to install.
    pub package: &'a Package,
}

impl<'a> StowPackageResource<'a> {
    /// Create a resource for `package`.
    #[must_use]
    pub const fn new(stow: Stow<'a>, package: &'a Package) -> Self {
        Self { stow, package }
    }
}

impl Applicable for StowPackageResource<'_> {
    fn description(&self) -> String {
        format!("package {}", self.package.name)
    }

    fn apply(&self) -> Result<ResourceChange> {
        self.stow.install(&self.package.name)?;
        Ok(ResourceChange::Applied)
    }
}

impl Resource for StowPackageResource<'_> {
    fn current_state(&self) -> Result<ResourceState> {
        Ok(self.stow.simulate(&self.package.name)?.state())
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::resources::test_helpers::{MockExecutor, Reply};

    const CLEAN: &str = "LINK: .zshrc => dotfiles/packages/zsh/dot-zshrc\n\
                         MKDIR: .config/nvim\n\
                         WARNING: in simulation mode so not modifying filesystem.\n";

    const CONFLICT_OLD: &str = "WARNING! stowing zsh would cause conflicts:\n  \
                                * existing target is neither a link nor a directory: .zshrc\n  \
                                * existing target is stowed to a different package: .zprofile => ../other/dot-zprofile\n\
                                All operations aborted.\n";

    const CONFLICT_NEW: &str = "WARNING! stowing git would cause conflicts:\n  \
                                * cannot stow dotfiles/packages/git/dot-gitconfig over existing target .gitconfig since neither a link nor a directory and --adopt not specified\n\
                                All operations aborted.\n";

    fn package(name: &str) -> Package {
        Package {
            name: name.to_string(),
            dir: PathBuf::from("/repo/packages").join(name),
        }
    }

    #[test]
    fn parse_counts_pending_operations() {
        let sim = Simulation::parse(CLEAN);
        assert_eq!(sim.pending, 2);
        assert!(sim.conflicts.is_empty());
    }

    #[test]
    fn parse_older_conflict_format() {
        let sim = Simulation::parse(CONFLICT_OLD);
        assert_eq!(
            sim.conflicts,
            vec![PathBuf::from(".zshrc"), PathBuf::from(".zprofile")]
        );
        assert_eq!(sim.managed, vec![PathBuf::from(".zprofile")]);
    }

    #[test]
    fn parse_newer_conflict_format() {
        let sim = Simulation::parse(CONFLICT_NEW);
        assert_eq!(sim.conflicts, vec![PathBuf::from(".gitconfig")]);
        assert!(sim.managed.is_empty());
    }

    #[test]
    fn target_owned_by_another_package_is_reported_as_such() {
        let sim = Simulation::parse(CONFLICT_OLD);
        assert!(matches!(
            sim.state(),
            ResourceState::Invalid { reason } if reason.contains("stowed by another package")
        ));
    }

    #[test]
    fn parse_empty_report_is_clean() {
        assert_eq!(Simulation::parse(""), Simulation::default());
    }

    #[test]
    fn simulate_passes_no_and_dotfiles() {
        let mock = MockExecutor::with_replies(vec![Reply::stderr(true, CLEAN)]);
        let stow = Stow::new(
            Path::new("/opt/homebrew/bin/stow"),
            Path::new("/repo/packages"),
            Path::new("/Users/me"),
            &mock,
        );
        stow.simulate("zsh").unwrap();
        assert_eq!(
            mock.calls(),
            vec![
                "/opt/homebrew/bin/stow --no --verbose --dotfiles --dir /repo/packages --target /Users/me zsh"
            ]
        );
    }

    #[test]
    fn failed_simulation_without_conflicts_is_an_error() {
        let mock = MockExecutor::with_replies(vec![Reply::stderr(
            false,
            "stow: ERROR: The stow directory /repo/packages does not contain package zsh",
        )]);
        let stow = Stow::new(
            Path::new("stow"),
            Path::new("/repo/packages"),
            Path::new("/h"),
            &mock,
        );
        let err = stow.simulate("zsh").unwrap_err();
        assert!(err.to_string().contains("does not contain package zsh"));
    }

    #[test]
    fn conflicts_are_not_a_simulation_error() {
        let mock = MockExecutor::with_replies(vec![Reply::stderr(false, CONFLICT_NEW)]);
        let stow = Stow::new(
            Path::new("stow"),
            Path::new("/repo/packages"),
            Path::new("/h"),
            &mock,
        );
        assert_eq!(stow.simulate("git").unwrap().conflicts.len(), 1);
    }

    #[test]
    fn resource_state_from_simulation() {
        let pkg = package("zsh");
        let mock = MockExecutor::with_replies(vec![
            Reply::stderr(true, CLEAN),
            Reply::stderr(true, "WARNING: in simulation mode so not modifying filesystem.\n"),
            Reply::stderr(false, CONFLICT_OLD),
        ]);
        let stow = Stow::new(
            Path::new("stow"),
            Path::new("/repo/packages"),
            Path::new("/h"),
            &mock,
        );
        let resource = StowPackageResource::new(stow, &pkg);
        assert_eq!(resource.current_state().unwrap(), ResourceState::Missing);
        assert_eq!(resource.current_state().unwrap(), ResourceState::Correct);
        assert!(matches!(
            resource.current_state().unwrap(),
            ResourceState::Invalid { .. }
        ));
    }

    #[test]
    fn apply_failure_carries_stderr() {
        let pkg = package("zsh");
        let mock = MockExecutor::with_replies(vec![Reply::stderr(false, "stow: ERROR: boom")]);
        let stow = Stow::new(
            Path::new("stow"),
            Path::new("/repo/packages"),
            Path::new("/h"),
            &mock,
        );
        let err = StowPackageResource::new(stow, &pkg).apply().unwrap_err();
        assert!(err.to_string().contains("boom"));
        assert_eq!(
            mock.calls(),
            vec!["stow --dotfiles --dir /repo/packages --target /h zsh"]
        );
    }
}
