//! Dock item resource backed by `dockutil`.
use anyhow::Result;
use std::path::Path;

use super::{Applicable, Resource, ResourceChange, ResourceState};
use crate::config::dock::DockAdd;
use crate::exec::Executor;

/// What should happen to a Dock item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DockAction {
    /// The item should be in the Dock.
    Add {
        /// Application or folder path.
        path: String,
        /// Optional `--position` argument.
        position: Option<String>,
    },
    /// The item should not be in the Dock.
    Remove,
}

/// A Dock item identified by its label.
#[derive(Debug)]
pub struct DockItemResource<'a> {
    /// Label as shown by `dockutil --list`.
    pub label: String,
    /// Desired presence.
    pub action: DockAction,
    dockutil: &'a Path,
    executor: &'a dyn Executor,
}

impl<'a> DockItemResource<'a> {
    /// An item that must be present.
    #[must_use]
    pub fn add(item: &DockAdd, dockutil: &'a Path, executor: &'a dyn Executor) -> Self {
        Self {
            label: item.label(),
            action: DockAction::Add {
                path: item.path.clone(),
                position: item.position.clone(),
            },
            dockutil,
            executor,
        }
    }

    /// An item that must be absent.
    #[must_use]
    pub fn remove(label: &str, dockutil: &'a Path, executor: &'a dyn Executor) -> Self {
        Self {
            label: label.to_string(),
            action: DockAction::Remove,
            dockutil,
            executor,
        }
    }

    fn program(&self) -> String {
        self.dockutil.to_string_lossy().into_owned()
    }
}

impl Applicable for DockItemResource<'_> {
    fn description(&self) -> String {
        match &self.action {
            DockAction::Add { .. } => format!("dock item {}", self.label),
            DockAction::Remove => format!("dock item {} (remove)", self.label),
        }
    }

    fn apply(&self) -> Result<ResourceChange> {
        let program = self.program();
        match &self.action {
            DockAction::Add { path, position } => {
                let mut args = vec!["--add", path.as_str()];
                if let Some(position) = position {
                    args.extend(["--position", position.as_str()]);
                }
                args.push("--no-restart");
                self.executor.run(&program, &args)?;
            }
            DockAction::Remove => {
                self.executor
                    .run(&program, &["--remove", &self.label, "--no-restart"])?;
            }
        }
        Ok(ResourceChange::Applied)
    }
}

impl Resource for DockItemResource<'_> {
    fn current_state(&self) -> Result<ResourceState> {
        let present = self
            .executor
            .run_unchecked(&self.program(), &["--find", &self.label])?
            .success;
        Ok(match (&self.action, present) {
            (DockAction::Add { .. }, true) | (DockAction::Remove, false) => ResourceState::Correct,
            (DockAction::Add { .. }, false) => ResourceState::Missing,
            (DockAction::Remove, true) => ResourceState::Incorrect {
                current: "present".to_string(),
            },
        })
    }
}
