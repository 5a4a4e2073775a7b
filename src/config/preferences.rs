//! macOS `defaults` entries (`[[preferences]]` and `[prefs]`).
use std::fmt;

use serde::Deserialize;

/// A typed preference value.
///
/// TOML booleans, integers and strings map onto the `-bool`, `-int` and
/// `-string` flags of `defaults write`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum PrefValue {
    /// `-bool`
    Bool(bool),
    /// `-int`
    Int(i64),
    /// `-string`
    String(String),
}

impl PrefValue {
    /// The `defaults write` type flag.
    #[must_use]
    pub const fn type_flag(&self) -> &'static str {
        match self {
            Self::Bool(_) => "-bool",
            Self::Int(_) => "-int",
            Self::String(_) => "-string",
        }
    }

    /// Whether `defaults read` output `raw` represents this value.
    ///
    /// `defaults read` prints booleans as `1`/`0`.
    #[must_use]
    pub fn matches_read(&self, raw: &str) -> bool {
        let raw = raw.trim();
        match self {
            Self::Bool(b) => raw == if *b { "1" } else { "0" },
            Self::Int(i) => raw.parse::<i64>().is_ok_and(|v| v == *i),
            Self::String(s) => raw == s,
        }
    }
}

impl fmt::Display for PrefValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(b) => write!(f, "{b}"),
            Self::Int(i) => write!(f, "{i}"),
            Self::String(s) => f.write_str(s),
        }
    }
}

/// One `[[preferences]]` entry.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Preference {
    /// Preference domain (e.g. `com.apple.dock`).
    pub domain: String,
    /// Key within the domain.
    pub key: String,
    /// Desired value. Ignored when `delete` is set.
    #[serde(default)]
    pub value: Option<PrefValue>,
    /// Remove the key instead of writing it.
    #[serde(default)]
    pub delete: bool,
}

impl Preference {
    /// The value the key should end up with; `None` means absent.
    #[must_use]
    pub const fn desired(&self) -> Option<&PrefValue> {
        if self.delete { None } else { self.value.as_ref() }
    }
}

/// `[prefs]` section.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PrefsConfig {
    /// Applications restarted with `killall` after any change.
    pub restart: Vec<String>,
}
