//! Fatal error taxonomy for the provisioner.
//!
//! Only the errors in this module stop a run. Everything else a step can hit
//! is converted into a degraded or advisory outcome by the task runner (see
//! [`crate::tasks::execute`]). Command handlers return these through
//! [`anyhow::Error`] and `main` maps any of them to exit code 1.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that abort a provisioning run.
#[derive(Error, Debug)]
pub enum ProvisionError {
    /// The package root contains no usable package directories.
    #[error(
        "no packages found in {dir}\n\
         expected one directory per package, mirroring $HOME, e.g.:\n  \
         {dir}/shell/dot-zshrc\n  \
         {dir}/git/dot-gitconfig.personal\n  \
         {dir}/homebrew/Brewfile",
        dir = .root.display()
    )]
    NoPackages {
        /// Directory that was scanned.
        root: PathBuf,
    },

    /// The package root directory itself is missing or unreadable.
    #[error("cannot read package root {}: {source}", .root.display())]
    PackageRoot {
        /// Directory that was scanned.
        root: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// Homebrew could not be installed.
    #[error("failed to bootstrap Homebrew: {reason}")]
    Bootstrap {
        /// Human-readable reason.
        reason: String,
    },

    /// A required tool could not be installed through Homebrew.
    #[error("failed to install required tool '{tool}': {reason}")]
    ToolInstall {
        /// Tool that was being installed.
        tool: String,
        /// Human-readable reason.
        reason: String,
    },

    /// `provision.toml` exists but cannot be read or parsed.
    #[error("invalid configuration in {}: {message}", .path.display())]
    Config {
        /// Path of the configuration file.
        path: PathBuf,
        /// Parser or I/O message.
        message: String,
    },

    /// The repository root could not be located.
    #[error("cannot determine repository root. Use --root or set PROVISION_ROOT")]
    RootNotFound,

    /// `HOME` is not set.
    #[error("HOME environment variable is not set")]
    HomeNotSet,
}
