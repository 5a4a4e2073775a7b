//! TOML configuration file parsing.
use serde::de::DeserializeOwned;
use std::path::Path;

use crate::error::ProvisionError;

/// Load and deserialize a TOML file.
///
/// A missing file deserializes from empty TOML, so every section falls back
/// to its defaults.
///
/// # Errors
///
/// Returns [`ProvisionError::Config`] if the file exists but cannot be read
/// or parsed.
pub fn load_config<T: DeserializeOwned>(path: &Path) -> Result<T, ProvisionError> {
    let content = if path.exists() {
        std::fs::read_to_string(path).map_err(|e| ProvisionError::Config {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?
    } else {
        String::new()
    };

    toml::from_str(&content).map_err(|e| ProvisionError::Config {
        path: path.to_path_buf(),
        message: e.message().to_string(),
    })
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Default, Deserialize)]
    #[serde(default)]
    struct Sample {
        name: String,
        count: u32,
    }

    #[test]
    fn missing_file_yields_defaults() {
        let tmp = tempfile::tempdir().unwrap();
        let sample: Sample = load_config(&tmp.path().join("absent.toml")).unwrap();
        assert!(sample.name.is_empty());
        assert_eq!(sample.count, 0);
    }

    #[test]
    fn parses_existing_file() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("c.toml");
        std::fs::write(&path, "name = \"x\"\ncount = 3\n").unwrap();
        let sample: Sample = load_config(&path).unwrap();
        assert_eq!(sample.name, "x");
        assert_eq!(sample.count, 3);
    }

    #[test]
    fn invalid_file_is_config_error() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("c.toml");
        std::fs::write(&path, "count = \"not a number\"\n").unwrap();
        let err = load_config::<Sample>(&path).unwrap_err();
        assert!(matches!(err, ProvisionError::Config { .. }));
        assert!(err.to_string().contains("c.toml"));
    }
}
