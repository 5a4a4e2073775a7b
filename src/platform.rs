//! Host platform detection: operating system and CPU architecture.
use std::fmt;
use std::path::PathBuf;

/// Detected operating system.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Os {
    /// macOS, the primary target.
    MacOs,
    /// Linux (Homebrew on Linux; `defaults`/`dockutil` do not apply).
    Linux,
    /// Anything else.
    Other,
}

impl fmt::Display for Os {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MacOs => write!(f, "macos"),
            Self::Linux => write!(f, "linux"),
            Self::Other => write!(f, "other"),
        }
    }
}

/// CPU architecture, which decides the Homebrew prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arch {
    /// Apple Silicon / aarch64.
    Arm64,
    /// Intel / x86_64.
    X86_64,
}

impl fmt::Display for Arch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Arm64 => write!(f, "arm64"),
            Self::X86_64 => write!(f, "x86_64"),
        }
    }
}

/// Platform information for the current system.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Platform {
    /// Operating system.
    pub os: Os,
    /// CPU architecture.
    pub arch: Arch,
}

impl Platform {
    /// Detect the current platform.
    #[must_use]
    pub const fn detect() -> Self {
        Self {
            os: Self::detect_os(),
            arch: Self::detect_arch(),
        }
    }

    /// Create a platform with explicit values.
    #[must_use]
    pub const fn new(os: Os, arch: Arch) -> Self {
        Self { os, arch }
    }

    /// Whether the host runs macOS.
    #[must_use]
    pub fn is_macos(&self) -> bool {
        self.os == Os::MacOs
    }

    /// Default Homebrew installation prefix for this platform.
    ///
    /// Apple Silicon installs under `/opt/homebrew`, which is not on the
    /// default `PATH`; Intel Macs use `/usr/local`; Linux uses
    /// `/home/linuxbrew/.linuxbrew`.
    #[must_use]
    pub fn brew_prefix(&self) -> PathBuf {
        match (self.os, self.arch) {
            (Os::Linux, _) => PathBuf::from("/home/linuxbrew/.linuxbrew"),
            (_, Arch::Arm64) => PathBuf::from("/opt/homebrew"),
            (_, Arch::X86_64) => PathBuf::from("/usr/local"),
        }
    }

    /// Whether the Homebrew prefix must be added to the shell environment
    /// explicitly (`brew shellenv`) because it is not on the default `PATH`.
    #[must_use]
    pub fn needs_shellenv(&self) -> bool {
        !(self.os == Os::MacOs && self.arch == Arch::X86_64)
    }

    const fn detect_os() -> Os {
        if cfg!(target_os = "macos") {
            Os::MacOs
        } else if cfg!(target_os = "linux") {
            Os::Linux
        } else {
            Os::Other
        }
    }

    const fn detect_arch() -> Arch {
        if cfg!(target_arch = "aarch64") {
            Arch::Arm64
        } else {
            Arch::X86_64
        }
    }
}
