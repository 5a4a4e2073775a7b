//! Shell startup file settings (`[shell]` and `[[shell.env]]`).
use serde::Deserialize;

use crate::mode::Mode;

/// `[shell]` section.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ShellConfig {
    /// Startup file relative to `$HOME` that receives `export` lines.
    pub profile: String,
    /// Environment variables to export.
    pub env: Vec<EnvVar>,
}

impl Default for ShellConfig {
    fn default() -> Self {
        Self {
            profile: ".zshrc".to_string(),
            env: vec![EnvVar {
                name: "DISABLE_AUTOUPDATER".to_string(),
                value: "1".to_string(),
                modes: vec![Mode::Personal],
            }],
        }
    }
}

/// One `[[shell.env]]` entry.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EnvVar {
    /// Variable name.
    pub name: String,
    /// Value written verbatim after `=`.
    pub value: String,
    /// Modes in which the variable is exported. Empty means all modes.
    #[serde(default)]
    pub modes: Vec<Mode>,
}

impl EnvVar {
    /// Whether this variable applies to `mode`.
    #[must_use]
    pub fn applies_to(&self, mode: Mode) -> bool {
        self.modes.is_empty() || self.modes.contains(&mode)
    }

    /// The `export` line written to the startup file.
    #[must_use]
    pub fn export_line(&self) -> String {
        format!("export {}={}", self.name, self.value)
    }

    /// Whether `name` is a valid POSIX shell variable name.
    #[must_use]
    pub fn has_valid_name(&self) -> bool {
        let mut chars = self.name.chars();
        chars
            .next()
            .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
            && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
    }
}
