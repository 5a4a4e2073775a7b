//! Repository configuration loaded from `provision.toml`.
//!
//! Every section has defaults, so a repository without the file behaves
//! like a conventional Stow dotfiles checkout: packages under `packages/`,
//! a shared `Brewfile` at the root and customizer scripts under `scripts/`.
pub mod dock;
pub mod preferences;
pub mod shell;
pub mod toml_loader;
pub mod validation;
pub mod vm;

use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::error::ProvisionError;

/// Configuration file name at the repository root.
pub const CONFIG_FILE: &str = "provision.toml";

/// All configuration for one repository.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Repository root; set by [`Config::load`].
    #[serde(skip)]
    pub root: PathBuf,
    /// `[packages]`
    pub packages: PackagesConfig,
    /// `[tools]`
    pub tools: ToolsConfig,
    /// `[[variants]]`
    pub variants: Variants,
    /// `[manifests]`
    pub manifests: ManifestsConfig,
    /// `[backup]`
    pub backup: BackupConfig,
    /// `[shell]`
    pub shell: shell::ShellConfig,
    /// `[customizers]`
    pub customizers: CustomizersConfig,
    /// `[[preferences]]`
    pub preferences: Vec<preferences::Preference>,
    /// `[prefs]`
    pub prefs: preferences::PrefsConfig,
    /// `[dock]`
    pub dock: dock::DockConfig,
    /// `[vm]`
    pub vm: vm::VmConfig,
}

impl Config {
    /// Load `provision.toml` from `root`, falling back to defaults when absent.
    ///
    /// # Errors
    ///
    /// Returns [`ProvisionError::Config`] if the file exists but is invalid.
    pub fn load(root: &Path) -> Result<Self, ProvisionError> {
        let mut config: Self = toml_loader::load_config(&root.join(CONFIG_FILE))?;
        config.root = root.to_path_buf();
        Ok(config)
    }

    /// Directory whose subdirectories are Stow packages.
    #[must_use]
    pub fn package_root(&self) -> PathBuf {
        self.root.join(&self.packages.dir)
    }

    /// Shared dependency manifest at the repository root.
    #[must_use]
    pub fn shared_manifest(&self) -> PathBuf {
        self.root.join(&self.manifests.shared)
    }

    /// Absolute path of the OS customizer script.
    #[must_use]
    pub fn os_customizer(&self) -> PathBuf {
        self.root.join(&self.customizers.os)
    }

    /// Absolute path of the Dock customizer script.
    #[must_use]
    pub fn dock_customizer(&self) -> PathBuf {
        self.root.join(&self.customizers.dock)
    }

    /// Run every validator and collect the warnings.
    #[must_use]
    pub fn validate(&self) -> Vec<validation::ValidationWarning> {
        validation::validate_all(self)
    }
}

/// `[packages]` section.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PackagesConfig {
    /// Package root relative to the repository.
    pub dir: String,
    /// Package names skipped during discovery.
    pub ignore: Vec<String>,
}

impl Default for PackagesConfig {
    fn default() -> Self {
        Self {
            dir: "packages".to_string(),
            ignore: Vec::new(),
        }
    }
}

/// `[tools]` section.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ToolsConfig {
    /// Tools installed with `brew install` when missing. `brew` itself is
    /// always required.
    pub required: Vec<String>,
    /// Homebrew installer script URL.
    pub installer_url: String,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            required: vec!["stow".to_string()],
            installer_url: "https://raw.githubusercontent.com/Homebrew/install/HEAD/install.sh"
                .to_string(),
        }
    }
}

/// One `[[variants]]` entry.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct VariantFile {
    /// Base file name inside a package (e.g. `dot-gitconfig`).
    pub file: String,
    /// Materialise `<file>` as a symlink to the active variant.
    #[serde(default)]
    pub alias: bool,
}

/// The `[[variants]]` list, defaulting to an aliased `dot-gitconfig`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct Variants(pub Vec<VariantFile>);

impl Default for Variants {
    fn default() -> Self {
        Self(vec![VariantFile {
            file: "dot-gitconfig".to_string(),
            alias: true,
        }])
    }
}

impl Variants {
    /// Iterate over the configured variant files.
    pub fn iter(&self) -> std::slice::Iter<'_, VariantFile> {
        self.0.iter()
    }

    /// Whether no variant files are configured.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// `[manifests]` section.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ManifestsConfig {
    /// Shared manifest relative to the repository root.
    pub shared: String,
    /// Base name of the mode-specific manifest.
    pub name: String,
}

impl Default for ManifestsConfig {
    fn default() -> Self {
        Self {
            shared: "Brewfile".to_string(),
            name: "Brewfile".to_string(),
        }
    }
}

/// `[backup]` section.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BackupConfig {
    /// Backup directory name prefix, followed by `YYYYmmdd_HHMMSS`.
    pub prefix: String,
}

impl Default for BackupConfig {
    fn default() -> Self {
        Self {
            prefix: ".dotfiles-backup-".to_string(),
        }
    }
}

/// `[customizers]` section.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CustomizersConfig {
    /// OS preferences script relative to the repository root.
    pub os: String,
    /// Dock layout script relative to the repository root.
    pub dock: String,
}

impl Default for CustomizersConfig {
    fn default() -> Self {
        Self {
            os: "scripts/macos.sh".to_string(),
            dock: "scripts/dock.sh".to_string(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::mode::Mode;

    #[test]
    fn missing_file_uses_defaults() {
        let tmp = tempfile::tempdir().unwrap();
        let config = Config::load(tmp.path()).unwrap();
        assert_eq!(config.root, tmp.path());
        assert_eq!(config.package_root(), tmp.path().join("packages"));
        assert_eq!(config.shared_manifest(), tmp.path().join("Brewfile"));
        assert_eq!(config.os_customizer(), tmp.path().join("scripts/macos.sh"));
        assert_eq!(config.dock_customizer(), tmp.path().join("scripts/dock.sh"));
        assert_eq!(config.tools.required, vec!["stow"]);
        assert_eq!(config.backup.prefix, ".dotfiles-backup-");
        assert_eq!(config.variants.0.len(), 1);
        assert!(config.variants.0[0].alias);
        assert!(config.preferences.is_empty());
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(
            tmp.path().join(CONFIG_FILE),
            "[packages]\ndir = \"stow\"\nignore = [\"scratch\"]\n",
        )
        .unwrap();
        let config = Config::load(tmp.path()).unwrap();
        assert_eq!(config.package_root(), tmp.path().join("stow"));
        assert_eq!(config.packages.ignore, vec!["scratch"]);
        assert_eq!(config.manifests.name, "Brewfile");
        assert_eq!(config.shell.profile, ".zshrc");
    }

    #[test]
    fn explicit_variants_replace_default() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(
            tmp.path().join(CONFIG_FILE),
            "[[variants]]\nfile = \"dot-npmrc\"\n",
        )
        .unwrap();
        let config = Config::load(tmp.path()).unwrap();
        let files: Vec<_> = config.variants.iter().map(|v| v.file.as_str()).collect();
        assert_eq!(files, vec!["dot-npmrc"]);
        assert!(!config.variants.0[0].alias);
    }

    #[test]
    fn shell_env_modes_parse() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(
            tmp.path().join(CONFIG_FILE),
            "[[shell.env]]\nname = \"WORK_PROXY\"\nvalue = \"1\"\nmodes = [\"work\"]\n",
        )
        .unwrap();
        let config = Config::load(tmp.path()).unwrap();
        assert_eq!(config.shell.env.len(), 1);
        assert_eq!(config.shell.env[0].modes, vec![Mode::Work]);
    }

    #[test]
    fn unknown_section_is_config_error() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(tmp.path().join(CONFIG_FILE), "[bogus]\nx = 1\n").unwrap();
        let err = Config::load(tmp.path()).unwrap_err();
        assert!(matches!(err, ProvisionError::Config { .. }));
    }
}
