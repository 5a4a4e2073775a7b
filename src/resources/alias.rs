//! Variant alias resource: a fixed-name symlink inside a package pointing at
//! the active mode's variant (e.g. `dot-gitconfig -> dot-gitconfig.work`).
use anyhow::{Context as _, Result};
use std::path::{Path, PathBuf};

use super::{Applicable, Resource, ResourceChange, ResourceState};

/// A variant alias that can be checked and applied.
#[derive(Debug, Clone)]
pub struct AliasResource {
    /// The fixed-name path Stow links by name.
    pub link: PathBuf,
    /// The variant file name the link points to, relative to the link's
    /// directory so the package stays relocatable.
    pub target: PathBuf,
}

impl AliasResource {
    /// Create an alias for `variant`, placed next to it under `base_name`.
    #[must_use]
    pub fn for_variant(variant: &Path, base_name: &str) -> Self {
        let dir = variant.parent().unwrap_or_else(|| Path::new("."));
        let target = variant
            .file_name()
            .map_or_else(|| variant.to_path_buf(), PathBuf::from);
        Self {
            link: dir.join(base_name),
            target,
        }
    }

    /// Sibling temporary path used for the atomic swap.
    fn staging_path(&self) -> PathBuf {
        let name = self
            .link
            .file_name()
            .map_or_else(String::new, |n| n.to_string_lossy().into_owned());
        self.link.with_file_name(format!(".{name}.provision-tmp"))
    }
}

impl Applicable for AliasResource {
    fn description(&self) -> String {
        format!("{} -> {}", self.link.display(), self.target.display())
    }

    /// Point the alias at the target by creating a symlink under a temporary
    /// name and renaming it over the alias, so readers never see the alias
    /// missing.
    fn apply(&self) -> Result<ResourceChange> {
        let staging = self.staging_path();
        if super::fs::occupied(&staging) {
            std::fs::remove_file(&staging)
                .with_context(|| format!("remove stale staging link: {}", staging.display()))?;
        }
        create_symlink(&self.target, &staging)?;
        if let Err(e) = std::fs::rename(&staging, &self.link) {
            let _ = std::fs::remove_file(&staging);
            return Err(e).with_context(|| format!("replace alias: {}", self.link.display()));
        }
        Ok(ResourceChange::Applied)
    }
}

impl Resource for AliasResource {
    fn current_state(&self) -> Result<ResourceState> {
        match std::fs::read_link(&self.link) {
            Ok(existing) if existing == self.target => Ok(ResourceState::Correct),
            Ok(existing) => Ok(ResourceState::Incorrect {
                current: format!("points to {}", existing.display()),
            }),
            Err(_) if super::fs::occupied(&self.link) => Ok(ResourceState::Invalid {
                reason: "a regular file occupies the alias path".to_string(),
            }),
            Err(_) => Ok(ResourceState::Missing),
        }
    }
}

/// Create a symlink at `link` pointing to `target`.
fn create_symlink(target: &Path, link: &Path) -> Result<()> {
    #[cfg(unix)]
    {
        std::os::unix::fs::symlink(target, link).with_context(|| {
            format!(
                "creating symlink {} -> {}",
                link.display(),
                target.display()
            )
        })
    }

    #[cfg(not(unix))]
    {
        anyhow::bail!(
            "symlinks are only supported on unix: {} -> {}",
            link.display(),
            target.display()
        )
    }
}

#[cfg(all(test, unix))]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    fn package_with_variants() -> tempfile::TempDir {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(tmp.path().join("dot-gitconfig.personal"), "personal").unwrap();
        std::fs::write(tmp.path().join("dot-gitconfig.work"), "work").unwrap();
        tmp
    }

    fn alias(dir: &Path, variant: &str) -> AliasResource {
        AliasResource::for_variant(&dir.join(variant), "dot-gitconfig")
    }

    #[test]
    fn for_variant_uses_relative_target() {
        let resource = AliasResource::for_variant(
            Path::new("/repo/packages/git/dot-gitconfig.work"),
            "dot-gitconfig",
        );
        assert_eq!(resource.link, PathBuf::from("/repo/packages/git/dot-gitconfig"));
        assert_eq!(resource.target, PathBuf::from("dot-gitconfig.work"));
        assert_eq!(
            resource.description(),
            "/repo/packages/git/dot-gitconfig -> dot-gitconfig.work"
        );
    }

    #[test]
    fn missing_then_correct_after_apply() {
        let tmp = package_with_variants();
        let resource = alias(tmp.path(), "dot-gitconfig.personal");
        assert_eq!(resource.current_state().unwrap(), ResourceState::Missing);

        resource.apply().unwrap();
        assert_eq!(resource.current_state().unwrap(), ResourceState::Correct);
        assert_eq!(
            std::fs::read_to_string(tmp.path().join("dot-gitconfig")).unwrap(),
            "personal"
        );
    }

    #[test]
    fn mode_switch_rewrites_without_stale_target() {
        let tmp = package_with_variants();
        alias(tmp.path(), "dot-gitconfig.personal").apply().unwrap();

        let work = alias(tmp.path(), "dot-gitconfig.work");
        assert!(matches!(
            work.current_state().unwrap(),
            ResourceState::Incorrect { .. }
        ));
        work.apply().unwrap();

        assert_eq!(
            std::fs::read_link(tmp.path().join("dot-gitconfig")).unwrap(),
            PathBuf::from("dot-gitconfig.work")
        );
        assert!(!tmp.path().join(".dot-gitconfig.provision-tmp").exists());
    }

    #[test]
    fn regular_file_at_alias_path_is_invalid() {
        let tmp = package_with_variants();
        std::fs::write(tmp.path().join("dot-gitconfig"), "hand written").unwrap();
        let resource = alias(tmp.path(), "dot-gitconfig.personal");
        assert!(matches!(
            resource.current_state().unwrap(),
            ResourceState::Invalid { .. }
        ));
    }

    #[test]
    fn stale_staging_link_is_replaced() {
        let tmp = package_with_variants();
        std::os::unix::fs::symlink("gone", tmp.path().join(".dot-gitconfig.provision-tmp"))
            .unwrap();
        let resource = alias(tmp.path(), "dot-gitconfig.work");
        resource.apply().unwrap();
        assert_eq!(resource.current_state().unwrap(), ResourceState::Correct);
    }
}
