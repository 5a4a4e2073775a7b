//! Idempotent macOS machine provisioning.
//!
//! Bootstraps Homebrew and GNU Stow, links dotfile packages into `$HOME`,
//! picks personal or work variants of selected files, backs up conflicting
//! targets, appends shell environment lines, runs `brew bundle` and offers
//! optional customizer scripts. Side commands apply `defaults`, the Dock
//! layout and manage a `tart` VM.
//!
//! The public API is organised into four layers:
//!
//! - **[`config`]**: load and validate `provision.toml`
//! - **[`resources`]**: idempotent `check + apply` primitives (aliases, profile lines, Stow packages, …)
//! - **[`tasks`]**: named, ordered units of work wired to resources
//! - **[`commands`]**: top-level subcommand orchestration (`install`, `prefs`, `dock`, `vm`)
#![deny(clippy::or_fun_call)]
#![deny(clippy::bool_to_int_with_if)]

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod exec;
pub mod logging;
pub mod mode;
pub mod operations;
pub mod packages;
pub mod platform;
pub mod prompt;
pub mod report;
pub mod resources;
pub mod tasks;
pub mod tools;
