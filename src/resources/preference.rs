//! macOS user defaults resource.
use anyhow::Result;

use super::{Applicable, Resource, ResourceChange, ResourceState};
use crate::config::preferences::Preference;
use crate::exec::Executor;

/// A `defaults` key that should hold a value, or be absent.
#[derive(Debug)]
pub struct PreferenceResource<'a> {
    pref: &'a Preference,
    executor: &'a dyn Executor,
}

impl<'a> PreferenceResource<'a> {
    /// Create a resource for `pref`.
    #[must_use]
    pub const fn new(pref: &'a Preference, executor: &'a dyn Executor) -> Self {
        Self { pref, executor }
    }

    /// Current raw value, or `None` when the key does not exist.
    fn read(&self) -> Result<Option<String>> {
        let result = self
            .executor
            .run_unchecked("defaults", &["read", &self.pref.domain, &self.pref.key])?;
        Ok(result.success.then(|| result.stdout.trim().to_string()))
    }
}

impl Applicable for PreferenceResource<'_> {
    fn description(&self) -> String {
        match self.pref.desired() {
            Some(value) => format!("{} {} = {value}", self.pref.domain, self.pref.key),
            None => format!("{} {} (delete)", self.pref.domain, self.pref.key),
        }
    }

    fn apply(&self) -> Result<ResourceChange> {
        let domain = self.pref.domain.as_str();
        let key = self.pref.key.as_str();
        match self.pref.desired() {
            Some(value) => {
                let rendered = value.to_string();
                self.executor.run(
                    "defaults",
                    &["write", domain, key, value.type_flag(), &rendered],
                )?;
            }
            None => {
                self.executor.run("defaults", &["delete", domain, key])?;
            }
        }
        Ok(ResourceChange::Applied)
    }
}

impl Resource for PreferenceResource<'_> {
    fn current_state(&self) -> Result<ResourceState> {
        Ok(match (self.pref.desired(), self.read()?) {
            (None, None) => ResourceState::Correct,
            (Some(_), None) => ResourceState::Missing,
            (Some(value), Some(current)) if value.matches_read(&current) => {
                ResourceState::Correct
            }
            (_, Some(current)) => ResourceState::Incorrect { current },
        })
    }
}
