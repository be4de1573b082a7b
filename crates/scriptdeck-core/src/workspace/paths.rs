use std::path::{Component, Path, PathBuf};

use crate::config::ScanSettings;

/// Key of the package living directly in the primary workspace root
pub const ROOT_KEY: &str = "/";

/// Key of `dir` relative to `root`, `/`-separated.
///
/// Returns [`ROOT_KEY`] when `dir` is the root itself. Directories outside
/// the root (secondary workspace roots) get `..` segments, so distinct
/// directories never share a key.
pub fn relative_key(root: &Path, dir: &Path) -> String {
    let root: Vec<Component> = root.components().filter(|c| !is_cur_dir(c)).collect();
    let dir: Vec<Component> = dir.components().filter(|c| !is_cur_dir(c)).collect();

    let common = root
        .iter()
        .zip(dir.iter())
        .take_while(|(a, b)| a == b)
        .count();

    let mut segments: Vec<String> = Vec::new();
    segments.extend(std::iter::repeat("..".to_string()).take(root.len() - common));
    segments.extend(
        dir[common..]
            .iter()
            .map(|c| c.as_os_str().to_string_lossy().into_owned()),
    );

    if segments.is_empty() {
        ROOT_KEY.to_string()
    } else {
        segments.join("/")
    }
}

/// Absolute form of a workspace root.
///
/// Existing roots are canonicalized; a root that cannot be resolved is only
/// joined onto the current directory.
pub fn absolute_root(root: &Path) -> PathBuf {
    std::fs::canonicalize(root)
        .or_else(|_| std::path::absolute(root))
        .unwrap_or_else(|_| root.to_path_buf())
}

/// Manifest path with its directory resolved like a workspace root
pub fn absolute_manifest_path(path: &Path) -> PathBuf {
    match (path.parent(), path.file_name()) {
        (Some(dir), Some(file)) => {
            let dir = if dir.as_os_str().is_empty() { Path::new(".") } else { dir };
            absolute_root(dir).join(file)
        }
        _ => absolute_root(path),
    }
}

fn is_cur_dir(c: &Component) -> bool {
    matches!(c, Component::CurDir)
}

/// Check whether any directory segment of `path` is excluded
pub fn contains_excluded_segment(path: &Path, settings: &ScanSettings) -> bool {
    path.components().any(|c| match c {
        Component::Normal(name) => name.to_str().is_some_and(|n| settings.is_excluded(n)),
        _ => false,
    })
}
