//! Command-line interface definition.
use clap::{Parser, Subcommand};

/// Top-level CLI entry point for the provisioner.
#[derive(Parser, Debug)]
#[command(
    name = "provision",
    about = "Idempotent macOS machine provisioning",
    version
)]
pub struct Cli {
    /// Defaults to `install`.
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Flags shared by every subcommand.
    #[command(flatten)]
    pub global: GlobalOpts,
}

impl Cli {
    /// The selected command, `install` when none was given.
    #[must_use]
    pub fn selected(&self) -> Command {
        self.command.clone().unwrap_or(Command::Install)
    }
}

/// Options shared across all subcommands.
#[derive(Parser, Debug, Clone, Default)]
pub struct GlobalOpts {
    /// Use the work variants instead of the personal ones
    #[arg(long, global = true)]
    pub work: bool,

    /// Preview changes without applying
    #[arg(short = 'd', long, global = true)]
    pub dry_run: bool,

    /// Override the repository root directory
    #[arg(long, global = true)]
    pub root: Option<std::path::PathBuf>,
}

/// Available subcommands.
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Install tools, link dotfiles and apply dependencies (default)
    Install,
    /// Apply the configured macOS defaults
    Prefs,
    /// Apply the configured Dock layout
    Dock,
    /// Manage the tart virtual machine
    Vm {
        /// VM action
        #[command(subcommand)]
        action: VmAction,
    },
    /// Generate shell completions
    Completions {
        /// Target shell
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
    /// Print version information
    Version,
}

impl Command {
    /// Name used for the log file of this command.
    #[must_use]
    pub const fn log_name(&self) -> &'static str {
        match self {
            Self::Install => "install",
            Self::Prefs => "prefs",
            Self::Dock => "dock",
            Self::Vm { .. } => "vm",
            Self::Completions { .. } => "completions",
            Self::Version => "version",
        }
    }
}

/// Actions of the `vm` subcommand.
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum VmAction {
    /// Delete the VM if present and clone it again from the image
    Recreate,
    /// Boot the VM
    Run,
    /// Print the VM's IP address
    Ip,
    /// Open an SSH session in the VM
    Ssh,
    /// Copy a file or directory into the VM
    Copy {
        /// Local source path
        src: std::path::PathBuf,
        /// Destination path inside the guest
        dst: String,
    },
}
