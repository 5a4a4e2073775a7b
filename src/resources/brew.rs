//! Homebrew invocations: `brew bundle` manifests and single formulae.
use anyhow::Result;
use std::path::{Path, PathBuf};

use super::error::ResourceError;
use super::{Applicable, Resource, ResourceChange, ResourceState};
use crate::exec::Executor;

/// Result of `brew bundle check`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BundleCheck {
    /// Every dependency in the manifest is installed.
    pub satisfied: bool,
    /// Entries reported as needing installation (e.g. `Formula jq`).
    pub missing: Vec<String>,
}

impl BundleCheck {
    /// Parse the output of `brew bundle check --verbose`.
    #[must_use]
    pub fn parse(success: bool, output: &str) -> Self {
        let missing = output
            .lines()
            .filter_map(|line| line.trim().strip_prefix("→ "))
            .map(|entry| {
                entry
                    .trim_end_matches(" needs to be installed or updated.")
                    .to_string()
            })
            .collect();
        Self {
            satisfied: success,
            missing,
        }
    }
}

/// Runs `brew` through an [`Executor`].
#[derive(Debug, Clone, Copy)]
pub struct Brew<'a> {
    program: &'a Path,
    executor: &'a dyn Executor,
}

impl<'a> Brew<'a> {
    /// Create a runner for the `brew` binary at `program`.
    #[must_use]
    pub const fn new(program: &'a Path, executor: &'a dyn Executor) -> Self {
        Self { program, executor }
    }

    fn program(&self) -> String {
        self.program.to_string_lossy().into_owned()
    }

    /// Install everything listed in `manifest`.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::ExecutionFailed`] if `brew bundle` fails.
    pub fn bundle(&self, manifest: &Path) -> Result<()> {
        let program = self.program();
        let file = manifest.to_string_lossy();
        let result = self
            .executor
            .run_unchecked(&program, &["bundle", "--file", &file])?;
        if !result.success {
            return Err(ResourceError::from_exec(&program, &result).into());
        }
        Ok(())
    }

    /// Report what `manifest` would install without installing it.
    ///
    /// # Errors
    ///
    /// Returns an error only if `brew` cannot be spawned.
    pub fn bundle_check(&self, manifest: &Path) -> Result<BundleCheck> {
        let file = manifest.to_string_lossy();
        let result = self.executor.run_unchecked(
            &self.program(),
            &["bundle", "check", "--verbose", "--no-upgrade", "--file", &file],
        )?;
        Ok(BundleCheck::parse(
            result.success,
            &format!("{}{}", result.stdout, result.stderr),
        ))
    }

    /// Install a single formula.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::ExecutionFailed`] if `brew install` fails.
    pub fn install(&self, formula: &str) -> Result<()> {
        let program = self.program();
        let result = self
            .executor
            .run_unchecked(&program, &["install", formula])?;
        if !result.success {
            return Err(ResourceError::from_exec(&program, &result).into());
        }
        Ok(())
    }
}

/// A command-line tool that must be installed through Homebrew.
#[derive(Debug)]
pub struct FormulaResource<'a> {
    /// Formula (and binary) name.
    pub name: String,
    /// Homebrew's `bin` directory, searched when the tool is not on `PATH`.
    pub brew_bin: PathBuf,
    brew: Brew<'a>,
    executor: &'a dyn Executor,
}

impl<'a> FormulaResource<'a> {
    /// Create a resource for `name`.
    #[must_use]
    pub const fn new(
        name: String,
        brew_bin: PathBuf,
        brew: Brew<'a>,
        executor: &'a dyn Executor,
    ) -> Self {
        Self {
            name,
            brew_bin,
            brew,
            executor,
        }
    }

    /// Where the tool is installed, if anywhere.
    #[must_use]
    pub fn location(&self) -> Option<PathBuf> {
        self.executor.locate(&self.name).or_else(|| {
            let candidate = self.brew_bin.join(&self.name);
            candidate.exists().then_some(candidate)
        })
    }
}

impl Applicable for FormulaResource<'_> {
    fn description(&self) -> String {
        format!("formula {}", self.name)
    }

    fn apply(&self) -> Result<ResourceChange> {
        self.brew.install(&self.name)?;
        Ok(ResourceChange::Applied)
    }
}

impl Resource for FormulaResource<'_> {
    fn current_state(&self) -> Result<ResourceState> {
        Ok(if self.location().is_some() {
            ResourceState::Correct
        } else {
            ResourceState::Missing
        })
    }
}
