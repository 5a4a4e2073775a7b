//! Shell startup file line resource.
//!
//! Appends a single line to a file such as `~/.zshrc` or `~/.zprofile`
//! unless an equivalent line is already present, so repeated runs write it
//! exactly once.
use anyhow::{Context as _, Result};
use std::io::Write as _;
use std::path::PathBuf;

use super::{Applicable, Resource, ResourceChange, ResourceState};

/// A line that must appear in a shell startup file.
#[derive(Debug, Clone)]
pub struct ProfileLineResource {
    /// Startup file.
    pub file: PathBuf,
    /// Line appended when missing.
    pub line: String,
    /// Any existing line starting with this prefix (after leading
    /// whitespace) counts as present.
    pub marker: String,
}

impl ProfileLineResource {
    /// Require `line` verbatim.
    #[must_use]
    pub fn exact(file: PathBuf, line: impl Into<String>) -> Self {
        let line = line.into();
        Self {
            file,
            marker: line.clone(),
            line,
        }
    }

    /// Require an `export NAME=value` line; any existing export of `NAME`
    /// is left alone.
    #[must_use]
    pub fn export(file: PathBuf, name: &str, value: &str) -> Self {
        Self {
            file,
            line: format!("export {name}={value}"),
            marker: format!("export {name}="),
        }
    }
}

impl Applicable for ProfileLineResource {
    fn description(&self) -> String {
        format!("{} in {}", self.line, self.file.display())
    }

    fn apply(&self) -> Result<ResourceChange> {
        let existing = std::fs::read_to_string(&self.file).unwrap_or_default();
        let mut file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.file)
            .with_context(|| format!("open {}", self.file.display()))?;
        let separator = if existing.is_empty() || existing.ends_with('\n') {
            ""
        } else {
            "\n"
        };
        writeln!(file, "{separator}{}", self.line)
            .with_context(|| format!("append to {}", self.file.display()))?;
        Ok(ResourceChange::Applied)
    }
}

impl Resource for ProfileLineResource {
    fn current_state(&self) -> Result<ResourceState> {
        let content = match std::fs::read_to_string(&self.file) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Ok(ResourceState::Missing);
            }
            Err(e) => {
                return Err(e).with_context(|| format!("read {}", self.file.display()));
            }
        };
        let present = content
            .lines()
            .any(|l| l.trim_start().starts_with(&self.marker));
        Ok(if present {
            ResourceState::Correct
        } else {
            ResourceState::Missing
        })
    }
}
