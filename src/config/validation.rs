//! Non-fatal configuration checks.
use std::path::Path;

use super::Config;
use super::dock::DockAdd;
use super::preferences::Preference;
use super::shell::EnvVar;

/// A validation warning detected during configuration loading.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationWarning {
    /// The configuration section (e.g., "shell.env", "preferences").
    pub source: String,
    /// The specific item that triggered the warning.
    pub item: String,
    /// Human-readable warning message.
    pub message: String,
}

impl ValidationWarning {
    /// Create a warning.
    #[must_use]
    pub fn new(
        source: impl Into<String>,
        item: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            source: source.into(),
            item: item.into(),
            message: message.into(),
        }
    }
}

/// Trait for configuration validators.
pub trait ConfigValidator {
    /// Validate the configuration and return any warnings found.
    fn validate(&self, root: &Path) -> Vec<ValidationWarning>;
}

/// Validator for `[[variants]]` entries.
#[derive(Debug)]
pub struct VariantValidator<'a> {
    variants: &'a super::Variants,
}

impl ConfigValidator for VariantValidator<'_> {
    fn validate(&self, _root: &Path) -> Vec<ValidationWarning> {
        self.variants
            .iter()
            .filter(|v| v.file.trim().is_empty() || v.file.contains('/'))
            .map(|v| {
                ValidationWarning::new(
                    "variants",
                    &v.file,
                    "variant file must be a plain file name inside a package",
                )
            })
            .collect()
    }
}

/// Validator for `[[shell.env]]` entries.
#[derive(Debug)]
pub struct ShellEnvValidator<'a> {
    env: &'a [EnvVar],
}

impl ConfigValidator for ShellEnvValidator<'_> {
    fn validate(&self, _root: &Path) -> Vec<ValidationWarning> {
        self.env
            .iter()
            .filter(|var| !var.has_valid_name())
            .map(|var| {
                ValidationWarning::new("shell.env", &var.name, "not a valid shell variable name")
            })
            .collect()
    }
}

/// Validator for `[[preferences]]` entries.
#[derive(Debug)]
pub struct PreferenceValidator<'a> {
    preferences: &'a [Preference],
}

impl ConfigValidator for PreferenceValidator<'_> {
    fn validate(&self, _root: &Path) -> Vec<ValidationWarning> {
        let mut warnings = Vec::new();
        for pref in self.preferences {
            let item = format!("{} {}", pref.domain, pref.key);
            if pref.domain.trim().is_empty() || pref.key.trim().is_empty() {
                warnings.push(ValidationWarning::new(
                    "preferences",
                    &item,
                    "domain and key are required",
                ));
            }
            match (&pref.value, pref.delete) {
                (None, false) => warnings.push(ValidationWarning::new(
                    "preferences",
                    &item,
                    "neither value nor delete is set",
                )),
                (Some(_), true) => warnings.push(ValidationWarning::new(
                    "preferences",
                    &item,
                    "value is ignored because delete = true",
                )),
                _ => {}
            }
        }
        warnings
    }
}

/// Validator for `[[dock.add]]` entries.
#[derive(Debug)]
pub struct DockValidator<'a> {
    add: &'a [DockAdd],
}

impl ConfigValidator for DockValidator<'_> {
    fn validate(&self, _root: &Path) -> Vec<ValidationWarning> {
        self.add
            .iter()
            .filter(|item| !Path::new(&item.path).is_absolute())
            .map(|item| ValidationWarning::new("dock.add", &item.path, "path should be absolute"))
            .collect()
    }
}

/// Validator for customizer script locations.
#[derive(Debug)]
pub struct CustomizerValidator<'a> {
    customizers: &'a super::CustomizersConfig,
}

impl ConfigValidator for CustomizerValidator<'_> {
    fn validate(&self, _root: &Path) -> Vec<ValidationWarning> {
        [&self.customizers.os, &self.customizers.dock]
            .into_iter()
            .filter(|script| Path::new(script).is_absolute())
            .map(|script| {
                ValidationWarning::new(
                    "customizers",
                    script,
                    "script path should be relative to the repository root",
                )
            })
            .collect()
    }
}

/// Validate all configuration and return collected warnings.
#[must_use]
pub fn validate_all(config: &Config) -> Vec<ValidationWarning> {
    let validators: Vec<Box<dyn ConfigValidator>> = vec![
        Box::new(VariantValidator {
            variants: &config.variants,
        }),
        Box::new(ShellEnvValidator {
            env: &config.shell.env,
        }),
        Box::new(PreferenceValidator {
            preferences: &config.preferences,
        }),
        Box::new(DockValidator {
            add: &config.dock.add,
        }),
        Box::new(CustomizerValidator {
            customizers: &config.customizers,
        }),
    ];

    validators
        .iter()
        .flat_map(|v| v.validate(&config.root))
        .collect()
}
