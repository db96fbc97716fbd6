//! Project root discovery
//!
//! A project is rooted at the nearest ancestor directory carrying a
//! `.burrow.toml` or a `.git` entry. The root names the default
//! environment and is the host side of the source mount.

use std::path::{Path, PathBuf};

/// File name of the project-local config document.
pub const LOCAL_CONFIG_FILE: &str = ".burrow.toml";

fn find_marker_root(start: &Path) -> Option<PathBuf> {
    start
        .ancestors()
        .find(|p| p.join(LOCAL_CONFIG_FILE).exists() || p.join(".git").exists())
        .map(Path::to_path_buf)
}

/// Project root for `start`: the nearest marked ancestor, or `start`
/// itself when no marker exists anywhere above it.
pub fn project_root(start: &Path) -> PathBuf {
    find_marker_root(start).unwrap_or_else(|| start.to_path_buf())
}

/// Default environment name for a project root (its basename).
pub fn default_env_name(root: &Path) -> Option<String> {
    root.file_name().map(|n| n.to_string_lossy().into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_root_is_marked_ancestor() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("proj");
        let nested = root.join("src").join("deep");
        std::fs::create_dir_all(&nested).unwrap();
        std::fs::create_dir(root.join(".git")).unwrap();

        assert_eq!(project_root(&nested), root);
    }

    #[test]
    fn test_local_config_marks_root() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("proj");
        let nested = root.join("sub");
        std::fs::create_dir_all(&nested).unwrap();
        std::fs::write(root.join(LOCAL_CONFIG_FILE), "").unwrap();

        assert_eq!(project_root(&nested), root);
    }

    #[test]
    fn test_unmarked_dir_is_its_own_root() {
        let dir = tempfile::tempdir().unwrap();
        let plain = dir.path().join("plain");
        std::fs::create_dir_all(&plain).unwrap();

        assert_eq!(project_root(&plain), plain);
        assert_eq!(default_env_name(&plain).as_deref(), Some("plain"));
    }

    #[test]
    fn test_nearest_marker_wins() {
        let dir = tempfile::tempdir().unwrap();
        let outer = dir.path().join("outer");
        let inner = outer.join("inner");
        std::fs::create_dir_all(&inner).unwrap();
        std::fs::create_dir(outer.join(".git")).unwrap();
        std::fs::write(inner.join(LOCAL_CONFIG_FILE), "").unwrap();

        assert_eq!(project_root(&inner), inner);
    }
}
