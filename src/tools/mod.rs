//! Environment probe and tool installer.
//!
//! Runs before any task: finds Homebrew (installing it when absent), makes
//! the Homebrew prefix reachable from login shells on Apple Silicon, and
//! installs the required command-line tools. Every failure here is fatal.
pub mod download;

use std::collections::BTreeMap;
use std::io::Write as _;
use std::path::{Path, PathBuf};

use crate::config::Config;
use crate::error::ProvisionError;
use crate::exec::Executor;
use crate::logging::Log;
use crate::platform::Platform;
use crate::resources::brew::{Brew, FormulaResource};
use crate::resources::profile_line::ProfileLineResource;
use crate::resources::{Applicable as _, Resource as _, ResourceState};

use download::Downloader;

/// Name prefix of the temporary installer script.
const INSTALLER_PREFIX: &str = "provision-homebrew-";

/// Absolute locations of the external tools available to this run.
///
/// In a dry run, tools that would have been installed are absent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Tools {
    brew: Option<PathBuf>,
    found: BTreeMap<String, PathBuf>,
}

impl Tools {
    /// Record the `brew` binary.
    #[must_use]
    pub fn with_brew(mut self, path: impl Into<PathBuf>) -> Self {
        self.brew = Some(path.into());
        self
    }

    /// Record a tool location.
    #[must_use]
    pub fn with(mut self, name: &str, path: impl Into<PathBuf>) -> Self {
        self.found.insert(name.to_string(), path.into());
        self
    }

    /// The `brew` binary, if present.
    #[must_use]
    pub fn brew(&self) -> Option<&Path> {
        self.brew.as_deref()
    }

    /// A required tool, if present.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Path> {
        self.found.get(name).map(PathBuf::as_path)
    }

    /// The `stow` binary, if present.
    #[must_use]
    pub fn stow(&self) -> Option<&Path> {
        self.get("stow")
    }
}

/// Inputs of [`ensure_tools`].
#[derive(Clone, Copy)]
pub struct Bootstrap<'a> {
    /// Loaded configuration.
    pub config: &'a Config,
    /// Host platform.
    pub platform: &'a Platform,
    /// Command runner.
    pub executor: &'a dyn Executor,
    /// Installer download.
    pub downloader: &'a dyn Downloader,
    /// Output.
    pub log: &'a dyn Log,
    /// Home directory, for `~/.zprofile`.
    pub home: &'a Path,
    /// Report instead of installing.
    pub dry_run: bool,
}

impl std::fmt::Debug for Bootstrap<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Bootstrap")
            .field("platform", &self.platform)
            .field("home", &self.home)
            .field("dry_run", &self.dry_run)
            .finish_non_exhaustive()
    }
}

/// Probe for Homebrew and the required tools, installing what is missing.
///
/// # Errors
///
/// Returns [`ProvisionError::Bootstrap`] if Homebrew cannot be installed and
/// [`ProvisionError::ToolInstall`] if a required tool cannot be installed.
pub fn ensure_tools(b: &Bootstrap<'_>) -> Result<Tools, ProvisionError> {
    b.log.stage("Checking tools");
    let mut tools = Tools::default();

    let brew = match locate_brew(b) {
        Some(path) => {
            b.log.debug(&format!("brew: {}", path.display()));
            Some(path)
        }
        None if b.dry_run => {
            b.log.dry_run(&format!(
                "would install Homebrew from {}",
                b.config.tools.installer_url
            ));
            None
        }
        None => Some(install_homebrew(b)?),
    };

    if let Some(brew) = &brew {
        ensure_shellenv(b, brew)?;
    }

    let brew_bin = b.platform.brew_prefix().join("bin");
    for name in &b.config.tools.required {
        let runner = Brew::new(brew.as_deref().unwrap_or_else(|| Path::new("brew")), b.executor);
        let formula = FormulaResource::new(name.clone(), brew_bin.clone(), runner, b.executor);
        if let Some(path) = formula.location() {
            b.log.debug(&format!("{name}: {}", path.display()));
            tools = tools.with(name, path);
            continue;
        }
        if b.dry_run || brew.is_none() {
            b.log.dry_run(&format!("would install {name} with brew"));
            continue;
        }
        b.log.info(&format!("installing {name}"));
        formula.apply().map_err(|e| ProvisionError::ToolInstall {
            tool: name.clone(),
            reason: format!("{e:#}"),
        })?;
        let path = formula
            .location()
            .ok_or_else(|| ProvisionError::ToolInstall {
                tool: name.clone(),
                reason: "installed but not found on PATH or in the Homebrew prefix".to_string(),
            })?;
        b.log.success(&format!("installed {name}"));
        tools = tools.with(name, path);
    }

    if let Some(brew) = brew {
        tools = tools.with_brew(brew);
    }
    Ok(tools)
}

/// Find `brew` on `PATH`, then in the platform's Homebrew prefix.
fn locate_brew(b: &Bootstrap<'_>) -> Option<PathBuf> {
    b.executor.locate("brew").or_else(|| {
        let candidate = b.platform.brew_prefix().join("bin/brew");
        candidate.exists().then_some(candidate)
    })
}

/// Download and run the official installer non-interactively.
fn install_homebrew(b: &Bootstrap<'_>) -> Result<PathBuf, ProvisionError> {
    let url = &b.config.tools.installer_url;
    b.log.info(&format!("installing Homebrew from {url}"));

    let script = b
        .downloader
        .fetch_text(url)
        .map_err(|e| ProvisionError::Bootstrap {
            reason: e.to_string(),
        })?;
    // Removed when dropped, whichever way this function returns.
    let mut file = tempfile::Builder::new()
        .prefix(INSTALLER_PREFIX)
        .suffix(".sh")
        .tempfile()
        .map_err(|e| ProvisionError::Bootstrap {
            reason: format!("cannot create installer file: {e}"),
        })?;
    file.write_all(script.as_bytes())
        .and_then(|()| file.flush())
        .map_err(|e| ProvisionError::Bootstrap {
            reason: format!("cannot write {}: {e}", file.path().display()),
        })?;

    let script_arg = file.path().to_string_lossy();
    let result = b
        .executor
        .run_interactive("/usr/bin/env", &["NONINTERACTIVE=1", "/bin/bash", &script_arg])
        .map_err(|e| ProvisionError::Bootstrap {
            reason: format!("{e:#}"),
        })?;
    if !result.success {
        return Err(ProvisionError::Bootstrap {
            reason: format!("installer exited with {}", result.code.unwrap_or(-1)),
        });
    }

    let brew = b.platform.brew_prefix().join("bin/brew");
    if !brew.exists() {
        return Err(ProvisionError::Bootstrap {
            reason: format!("installer finished but {} is missing", brew.display()),
        });
    }
    b.log.success("installed Homebrew");
    Ok(brew)
}

/// Append `eval "$(<brew> shellenv)"` to `~/.zprofile` where the prefix is
/// not on the default `PATH`.
fn ensure_shellenv(b: &Bootstrap<'_>, brew: &Path) -> Result<(), ProvisionError> {
    if !b.platform.needs_shellenv() {
        return Ok(());
    }
    let line = format!("eval \"$({} shellenv)\"", brew.display());
    let resource = ProfileLineResource::exact(b.home.join(".zprofile"), line);
    let state = resource
        .current_state()
        .map_err(|e| ProvisionError::Bootstrap {
            reason: format!("{e:#}"),
        })?;
    if state == ResourceState::Correct {
        return Ok(());
    }
    if b.dry_run {
        b.log
            .dry_run(&format!("would add {}", resource.description()));
        return Ok(());
    }
    resource.apply().map_err(|e| ProvisionError::Bootstrap {
        reason: format!("{e:#}"),
    })?;
    b.log.info(&format!("added {}", resource.description()));
    Ok(())
}
