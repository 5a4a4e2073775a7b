//! Stow package discovery.
use std::path::{Path, PathBuf};

use crate::error::ProvisionError;
use crate::operations::FileSystemOps;

/// A Stow package: one directory under the package root mirroring `$HOME`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Package {
    /// Directory basename, passed to `stow` as the package argument.
    pub name: String,
    /// Absolute package directory.
    pub dir: PathBuf,
}

/// List the packages under `root`, sorted by name.
///
/// Hidden directories (names starting with `.`), plain files and names in
/// `ignore` are excluded.
///
/// # Errors
///
/// Returns [`ProvisionError::PackageRoot`] if `root` cannot be listed and
/// [`ProvisionError::NoPackages`] if nothing qualifies.
pub fn discover(
    fs: &dyn FileSystemOps,
    root: &Path,
    ignore: &[String],
) -> Result<Vec<Package>, ProvisionError> {
    let entries = fs.read_dir(root).map_err(|source| ProvisionError::PackageRoot {
        root: root.to_path_buf(),
        source,
    })?;

    let mut packages: Vec<Package> = entries
        .into_iter()
        .filter(|path| fs.is_dir(path))
        .filter_map(|dir| {
            let name = dir.file_name()?.to_string_lossy().into_owned();
            if name.starts_with('.') || ignore.contains(&name) {
                return None;
            }
            Some(Package { name, dir })
        })
        .collect();

    if packages.is_empty() {
        return Err(ProvisionError::NoPackages {
            root: root.to_path_buf(),
        });
    }

    packages.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(packages)
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::operations::MockFileSystemOps;

    fn names(packages: &[Package]) -> Vec<&str> {
        packages.iter().map(|p| p.name.as_str()).collect()
    }

    #[test]
    fn returns_sorted_non_hidden_directories() {
        let fs = MockFileSystemOps::new()
            .with_dir("/repo/packages")
            .with_dir("/repo/packages/zsh")
            .with_dir("/repo/packages/git")
            .with_dir("/repo/packages/.git")
            .with_file("/repo/packages/README.md");
        let packages = discover(&fs, Path::new("/repo/packages"), &[]).unwrap();
        assert_eq!(names(&packages), vec!["git", "zsh"]);
        assert_eq!(packages[0].dir, PathBuf::from("/repo/packages/git"));
    }

    #[test]
    fn ignored_names_are_skipped() {
        let fs = MockFileSystemOps::new()
            .with_dir("/p")
            .with_dir("/p/git")
            .with_dir("/p/scratch");
        let packages = discover(&fs, Path::new("/p"), &["scratch".to_string()]).unwrap();
        assert_eq!(names(&packages), vec!["git"]);
    }

    #[test]
    fn only_hidden_directories_is_fatal() {
        let fs = MockFileSystemOps::new()
            .with_dir("/p")
            .with_dir("/p/.cache")
            .with_file("/p/notes.txt");
        let err = discover(&fs, Path::new("/p"), &[]).unwrap_err();
        assert!(matches!(err, ProvisionError::NoPackages { .. }));
        assert!(err.to_string().contains("dot-zshrc"));
    }

    #[test]
    fn missing_root_is_package_root_error() {
        let fs = MockFileSystemOps::new();
        let err = discover(&fs, Path::new("/nope"), &[]).unwrap_err();
        assert!(matches!(err, ProvisionError::PackageRoot { .. }));
    }

    #[test]
    fn real_directory_discovery() {
        let tmp = tempfile::tempdir().unwrap();
        for name in ["shell", "git", ".hidden"] {
            std::fs::create_dir(tmp.path().join(name)).unwrap();
        }
        std::fs::write(tmp.path().join("Brewfile"), "").unwrap();
        let packages =
            discover(&crate::operations::SystemFileSystemOps, tmp.path(), &[]).unwrap();
        assert_eq!(names(&packages), vec!["git", "shell"]);
    }
}
