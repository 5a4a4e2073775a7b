//! Virtual machine settings (`[vm]`).
use serde::Deserialize;

/// `[vm]` section used by `provision vm`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct VmConfig {
    /// Local tart VM name.
    pub name: String,
    /// OCI image cloned by `vm recreate`.
    pub image: String,
    /// Guest login user for `ssh` and `scp`.
    pub user: String,
}

impl Default for VmConfig {
    fn default() -> Self {
        Self {
            name: "sequoia".to_string(),
            image: "ghcr.io/cirruslabs/macos-sequoia-base:latest".to_string(),
            user: "admin".to_string(),
        }
    }
}
