//! Personal/work mode and variant file selection.
//!
//! A *variant-able* file exists in up to three forms inside a directory:
//! `<name>.personal`, `<name>.work`, and the mode-independent `<name>`.
//! [`resolve_variant`] picks the one that applies to a [`Mode`].
use std::fmt;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::operations::FileSystemOps;

/// Configuration profile selected once per run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Personal machine (default).
    #[default]
    Personal,
    /// Work machine (`--work`).
    Work,
}

impl Mode {
    /// Select the mode from the `--work` flag.
    #[must_use]
    pub const fn from_work_flag(work: bool) -> Self {
        if work { Self::Work } else { Self::Personal }
    }

    /// File-name suffix (without the dot) used by this mode's variants.
    #[must_use]
    pub const fn suffix(self) -> &'static str {
        match self {
            Self::Personal => "personal",
            Self::Work => "work",
        }
    }

    /// Name of this mode's variant of `base_name` (e.g. `Brewfile.work`).
    #[must_use]
    pub fn variant_name(self, base_name: &str) -> String {
        format!("{base_name}.{}", self.suffix())
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.suffix())
    }
}

/// Outcome of selecting a variant-able file for a mode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Variant {
    /// The mode-suffixed file exists and should be used.
    Suffixed(PathBuf),
    /// Only the mode-independent file exists; it is used as-is.
    Canonical(PathBuf),
    /// Neither form exists.
    Missing,
}

impl Variant {
    /// Path of the selected file, if any.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::Suffixed(p) | Self::Canonical(p) => Some(p),
            Self::Missing => None,
        }
    }
}

/// Select which file in `dir` stands for `base_name` under `mode`.
///
/// The suffixed variant wins over the canonical file. A canonical path that
/// is itself an alias (symlink) still counts as present, so a previously
/// materialised alias is reported as [`Variant::Canonical`] only when no
/// suffixed variant exists for this mode.
#[must_use]
pub fn resolve_variant(fs: &dyn FileSystemOps, mode: Mode, dir: &Path, base_name: &str) -> Variant {
    let suffixed = dir.join(mode.variant_name(base_name));
    if fs.exists(&suffixed) {
        return Variant::Suffixed(suffixed);
    }
    let canonical = dir.join(base_name);
    if fs.exists(&canonical) || fs.read_link(&canonical).is_ok() {
        return Variant::Canonical(canonical);
    }
    Variant::Missing
}
