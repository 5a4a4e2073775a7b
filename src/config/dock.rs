//! Dock layout (`[dock]` and `[[dock.add]]`).
use serde::Deserialize;

/// `[dock]` section.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DockConfig {
    /// Item labels to remove.
    pub remove: Vec<String>,
    /// Items to add.
    pub add: Vec<DockAdd>,
}

/// One `[[dock.add]]` entry.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DockAdd {
    /// Application or folder path.
    pub path: String,
    /// `dockutil --position` argument (`beginning`, `end`, an index or a label).
    #[serde(default)]
    pub position: Option<String>,
}

impl DockAdd {
    /// Label dockutil shows for this item: the file stem of `path`.
    #[must_use]
    pub fn label(&self) -> String {
        std::path::Path::new(&self.path)
            .file_stem()
            .map_or_else(|| self.path.clone(), |s| s.to_string_lossy().into_owned())
    }
}
