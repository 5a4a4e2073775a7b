//! Command: manage the tart virtual machine.
use anyhow::{Context as _, Result, anyhow, bail};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::CommandSetup;
use crate::cli::{GlobalOpts, VmAction};
use crate::config::vm::VmConfig;
use crate::exec::{Executor, SystemExecutor};
use crate::logging::{Log, Logger};

/// Run the vm command.
///
/// # Errors
///
/// Returns an error if `tart` is missing or the requested action fails.
pub fn run(global: &GlobalOpts, action: &VmAction, log: &Arc<Logger>) -> Result<()> {
    let setup = CommandSetup::init(global, log)?;
    let executor = SystemExecutor;
    let program = executor
        .locate("tart")
        .ok_or_else(|| anyhow!("tart not found; install it with `brew install cirruslabs/cli/tart`"))?;
    let tart = Tart {
        program,
        vm: &setup.config.vm,
        executor: &executor,
        log: log.as_ref(),
        dry_run: global.dry_run,
    };
    dispatch(&tart, action, &mut std::io::stdout().lock())
}

/// Perform `action`, writing command output (the IP address) to `out`.
///
/// # Errors
///
/// Propagates the action's error.
pub fn dispatch(tart: &Tart<'_>, action: &VmAction, out: &mut impl Write) -> Result<()> {
    match action {
        VmAction::Recreate => tart.recreate(),
        VmAction::Run => tart.boot(),
        VmAction::Ip => {
            let ip = tart.ip()?;
            writeln!(out, "{ip}")?;
            Ok(())
        }
        VmAction::Ssh => tart.ssh(),
        VmAction::Copy { src, dst } => tart.copy(src, dst),
    }
}

/// The configured VM, driven through the `tart` CLI.
pub struct Tart<'a> {
    /// Absolute `tart` binary.
    pub program: PathBuf,
    /// `[vm]` settings.
    pub vm: &'a VmConfig,
    /// Command runner.
    pub executor: &'a dyn Executor,
    /// Output.
    pub log: &'a dyn Log,
    /// Report instead of changing anything.
    pub dry_run: bool,
}

impl std::fmt::Debug for Tart<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Tart")
            .field("program", &self.program)
            .field("vm", &self.vm)
            .field("dry_run", &self.dry_run)
            .finish_non_exhaustive()
    }
}

impl Tart<'_> {
    fn program(&self) -> String {
        self.program.to_string_lossy().into_owned()
    }

    /// Whether a local VM with the configured name exists.
    ///
    /// # Errors
    ///
    /// Returns an error if `tart list` fails.
    pub fn exists(&self) -> Result<bool> {
        let result = self
            .executor
            .run(&self.program(), &["list", "--quiet"])
            .context("listing VMs")?;
        Ok(result.stdout.lines().any(|line| line.trim() == self.vm.name))
    }

    /// Delete the VM if present, then clone it again from the image.
    ///
    /// # Errors
    ///
    /// Returns an error if deleting or cloning fails.
    pub fn recreate(&self) -> Result<()> {
        let name = self.vm.name.as_str();
        let image = self.vm.image.as_str();
        if self.exists()? {
            if self.dry_run {
                self.log.dry_run(&format!("would delete VM {name}"));
            } else {
                self.log.info(&format!("deleting VM {name}"));
                self.executor
                    .run(&self.program(), &["delete", name])
                    .with_context(|| format!("deleting VM {name}"))?;
            }
        }

        if self.dry_run {
            self.log
                .dry_run(&format!("would clone {image} as {name}"));
            return Ok(());
        }
        self.log.info(&format!("cloning {image} as {name}"));
        let result = self
            .executor
            .run_interactive(&self.program(), &["clone", image, name])?;
        if !result.success {
            bail!("tart clone exited with {}", result.code.unwrap_or(-1));
        }
        self.log.success(&format!("VM {name} ready"));
        Ok(())
    }

    /// Boot the VM attached to the terminal.
    ///
    /// # Errors
    ///
    /// Returns an error if `tart run` fails.
    pub fn boot(&self) -> Result<()> {
        let name = self.vm.name.as_str();
        if self.dry_run {
            self.log.dry_run(&format!("would boot VM {name}"));
            return Ok(());
        }
        let result = self.executor.run_interactive(&self.program(), &["run", name])?;
        if !result.success {
            bail!("tart run exited with {}", result.code.unwrap_or(-1));
        }
        Ok(())
    }

    /// The VM's IP address.
    ///
    /// # Errors
    ///
    /// Returns an error if the VM is not running or has no address yet.
    pub fn ip(&self) -> Result<String> {
        let name = self.vm.name.as_str();
        let result = self
            .executor
            .run(&self.program(), &["ip", name])
            .with_context(|| format!("resolving the IP of {name}; is it running?"))?;
        let ip = result.stdout.trim();
        if ip.is_empty() {
            bail!("tart reported no IP address for {name}");
        }
        Ok(ip.to_string())
    }

    /// `user@ip` of the guest.
    fn login(&self) -> Result<String> {
        Ok(format!("{}@{}", self.vm.user, self.ip()?))
    }

    /// Open an interactive SSH session.
    ///
    /// # Errors
    ///
    /// Returns an error if the address cannot be resolved or `ssh` fails.
    pub fn ssh(&self) -> Result<()> {
        let login = self.login()?;
        if self.dry_run {
            self.log.dry_run(&format!("would connect to {login}"));
            return Ok(());
        }
        let result = self.executor.run_interactive("ssh", &[&login])?;
        if !result.success {
            bail!("ssh exited with {}", result.code.unwrap_or(-1));
        }
        Ok(())
    }

    /// Copy `src` to `dst` inside the guest with `scp -r`.
    ///
    /// # Errors
    ///
    /// Returns an error if the address cannot be resolved or `scp` fails.
    pub fn copy(&self, src: &Path, dst: &str) -> Result<()> {
        let target = format!("{}:{dst}", self.login()?);
        if self.dry_run {
            self.log
                .dry_run(&format!("would copy {} to {target}", src.display()));
            return Ok(());
        }
        let source = src.to_string_lossy();
        let result = self
            .executor
            .run_interactive("scp", &["-r", &source, &target])?;
        if !result.success {
            bail!("scp exited with {}", result.code.unwrap_or(-1));
        }
        self.log.success(&format!("copied {} to {target}", src.display()));
        Ok(())
    }
}
