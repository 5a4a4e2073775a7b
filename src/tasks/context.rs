//! Shared state handed to every task.
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::config::Config;
use crate::error::ProvisionError;
use crate::exec::Executor;
use crate::logging::Log;
use crate::mode::Mode;
use crate::operations::{FileSystemOps, SystemFileSystemOps};
use crate::packages::Package;
use crate::platform::Platform;
use crate::prompt::{Prompt, StdinPrompt};
use crate::tools::Tools;

/// Shared context for task execution.
pub struct Context {
    /// Configuration loaded from `provision.toml`.
    pub config: Arc<Config>,
    /// Detected platform information.
    pub platform: Arc<Platform>,
    /// Logger for output and task recording.
    pub log: Arc<dyn Log>,
    /// Whether to perform a dry run (preview changes without applying).
    pub dry_run: bool,
    /// Personal or work mode for this run.
    pub mode: Mode,
    /// User's home directory path; the Stow target.
    pub home: PathBuf,
    /// Packages found by discovery, sorted by name.
    pub packages: Vec<Package>,
    /// Tools located (or installed) by the bootstrap.
    pub tools: Tools,
    /// Command executor (for testing or real system calls).
    pub executor: Arc<dyn Executor>,
    /// Confirmation prompt for the customizers.
    pub prompt: Arc<dyn Prompt>,
    /// Filesystem operation abstraction (injectable for testing).
    pub fs_ops: Arc<dyn FileSystemOps>,
}

impl std::fmt::Debug for Context {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Context")
            .field("config", &"<Config>")
            .field("platform", &self.platform)
            .field("log", &"<dyn Log>")
            .field("dry_run", &self.dry_run)
            .field("mode", &self.mode)
            .field("home", &self.home)
            .field("packages", &self.packages.len())
            .field("tools", &self.tools)
            .field("executor", &"<dyn Executor>")
            .field("prompt", &"<dyn Prompt>")
            .field("fs_ops", &"<dyn FileSystemOps>")
            .finish()
    }
}

impl Context {
    /// Creates a new context for task execution.
    ///
    /// Packages and tools start empty; the install command fills them in
    /// after the bootstrap and discovery steps.
    ///
    /// # Errors
    ///
    /// Returns [`ProvisionError::HomeNotSet`] if `HOME` is not set.
    pub fn new(
        config: Arc<Config>,
        platform: Arc<Platform>,
        log: Arc<dyn Log>,
        executor: Arc<dyn Executor>,
        mode: Mode,
        dry_run: bool,
    ) -> Result<Self, ProvisionError> {
        let home = std::env::var_os("HOME")
            .filter(|h| !h.is_empty())
            .ok_or(ProvisionError::HomeNotSet)?;
        Ok(Self {
            config,
            platform,
            log,
            dry_run,
            mode,
            home: PathBuf::from(home),
            packages: Vec::new(),
            tools: Tools::default(),
            executor,
            prompt: Arc::new(StdinPrompt),
            fs_ops: Arc::new(SystemFileSystemOps),
        })
    }

    /// Root directory of the provisioning repository.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.config.root
    }

    /// Directory holding the Stow packages.
    #[must_use]
    pub fn package_root(&self) -> PathBuf {
        self.config.package_root()
    }

    /// Replace the discovered packages.
    #[must_use]
    pub fn with_packages(mut self, packages: Vec<Package>) -> Self {
        self.packages = packages;
        self
    }

    /// Replace the located tools.
    #[must_use]
    pub fn with_tools(mut self, tools: Tools) -> Self {
        self.tools = tools;
        self
    }

    /// Replace the home directory.
    #[must_use]
    pub fn with_home(mut self, home: PathBuf) -> Self {
        self.home = home;
        self
    }

    /// Replace the confirmation prompt.
    #[must_use]
    pub fn with_prompt(mut self, prompt: Arc<dyn Prompt>) -> Self {
        self.prompt = prompt;
        self
    }

    /// Replace the logger.
    #[must_use]
    pub fn with_log(mut self, log: Arc<dyn Log>) -> Self {
        self.log = log;
        self
    }

    /// Create a copy of this context with a different [`FileSystemOps`] implementation.
    ///
    /// Used in tests to inject a [`MockFileSystemOps`](crate::operations::MockFileSystemOps)
    /// so that tasks can be exercised without touching the real filesystem.
    #[cfg(test)]
    #[must_use]
    pub fn with_fs_ops(mut self, fs_ops: Arc<dyn FileSystemOps>) -> Self {
        self.fs_ops = fs_ops;
        self
    }
}
