use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::ScanSettings;

use super::paths::{absolute_root, contains_excluded_segment};

/// Failure enumerating a workspace root
#[derive(Debug, Error)]
pub enum ScanError {
    #[error("cannot read workspace root {root:?}: {source}")]
    RootUnreadable {
        root: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Finds manifest files under workspace roots
#[derive(Debug, Clone, Default)]
pub struct WorkspaceScanner {
    settings: ScanSettings,
}

impl WorkspaceScanner {
    pub fn new(settings: ScanSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &ScanSettings {
        &self.settings
    }

    /// All manifest paths under any of `roots`, deduplicated.
    ///
    /// A root that cannot be enumerated is logged and contributes nothing;
    /// the remaining roots are still scanned.
    pub fn scan(&self, roots: &[PathBuf]) -> BTreeSet<PathBuf> {
        let mut found = BTreeSet::new();

        for root in roots {
            match self.scan_root(root) {
                Ok(paths) => {
                    debug!("Found {} manifest(s) under {:?}", paths.len(), root);
                    found.extend(paths);
                }
                Err(e) => warn!("{}", e),
            }
        }

        found
    }

    /// Absolute manifest paths under a single root
    ///
    /// Excluded directories are never descended into and symlinked
    /// directories are not followed. Unreadable sub-directories are skipped.
    pub fn scan_root(&self, root: &Path) -> Result<Vec<PathBuf>, ScanError> {
        let root = absolute_root(root);
        let root = root.as_path();
        let entries = std::fs::read_dir(root).map_err(|source| ScanError::RootUnreadable {
            root: root.to_path_buf(),
            source,
        })?;

        let mut found = Vec::new();
        let mut pending: Vec<std::fs::ReadDir> = vec![entries];

        while let Some(entries) = pending.pop() {
            for entry in entries.flatten() {
                let path = entry.path();
                let file_type = match entry.file_type() {
                    Ok(t) => t,
                    Err(_) => continue,
                };

                let name = entry.file_name();
                let name = name.to_string_lossy();

                if file_type.is_dir() {
                    if self.settings.is_excluded(&name) {
                        continue;
                    }
                    match std::fs::read_dir(&path) {
                        Ok(sub) => pending.push(sub),
                        Err(e) => debug!("Skipping unreadable directory {:?}: {}", path, e),
                    }
                    continue;
                }

                let is_file = file_type.is_file() || (file_type.is_symlink() && path.is_file());
                if is_file && name == self.settings.manifest_name.as_str() {
                    let relative = path.strip_prefix(root).unwrap_or(&path);
                    if !contains_excluded_segment(relative, &self.settings) {
                        found.push(path);
                    }
                }
            }
        }

        Ok(found)
    }
}
