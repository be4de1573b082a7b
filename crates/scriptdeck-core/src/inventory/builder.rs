use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::config::ScanSettings;
use crate::manifest::try_read_manifest;
use crate::workspace::{
    absolute_manifest_path, absolute_root, relative_key, WorkspaceScanner,
};

use super::types::{Inventory, PackageEntry, UnreadableManifest};

/// Aggregates manifests into an [`Inventory`] keyed relative to a primary root
pub struct InventoryBuilder {
    primary_root: PathBuf,
}

impl InventoryBuilder {
    /// `primary_root` may be relative; it is resolved to an absolute path
    pub fn new(primary_root: impl AsRef<Path>) -> Self {
        Self {
            primary_root: absolute_root(primary_root.as_ref()),
        }
    }

    /// Build an inventory from manifest paths, in the order given.
    ///
    /// One entry per readable manifest. If two manifests map to the same key
    /// the later one replaces the earlier one (with a warning).
    pub fn build<I, P>(&self, manifest_paths: I) -> Inventory
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        let mut by_key: BTreeMap<String, PackageEntry> = BTreeMap::new();
        let mut unreadable = Vec::new();

        for path in manifest_paths {
            let path = absolute_manifest_path(path.as_ref());
            let path = path.as_path();
            let manifest = match try_read_manifest(path) {
                Ok(m) => m,
                Err(e) => {
                    warn!("{}", e);
                    unreadable.push(UnreadableManifest {
                        path: path.to_path_buf(),
                        reason: e.to_string(),
                    });
                    continue;
                }
            };

            let dir = path.parent().unwrap_or(path);
            let key = relative_key(&self.primary_root, dir);
            let display_name = manifest
                .name
                .unwrap_or_else(|| directory_name(dir));

            let entry = PackageEntry {
                key: key.clone(),
                display_name,
                manifest_path: path.to_path_buf(),
                tasks: manifest.tasks,
            };

            if let Some(replaced) = by_key.insert(key.clone(), entry) {
                warn!(
                    "Package key '{}' claimed by both {:?} and {:?}; keeping the latter",
                    key, replaced.manifest_path, path
                );
            }
        }

        Inventory::new(by_key.into_values().collect(), unreadable)
    }
}

/// Base name of an absolute directory; a filesystem root shows as itself
fn directory_name(dir: &Path) -> String {
    dir.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .filter(|n| !n.is_empty())
        .unwrap_or_else(|| dir.display().to_string())
}

/// Scan `roots` and build the inventory.
///
/// The first root is the primary root that keys are relative to. No roots
/// yields an empty inventory.
pub fn build_inventory(roots: &[PathBuf], settings: &ScanSettings) -> Inventory {
    let roots: Vec<PathBuf> = roots.iter().map(|r| absolute_root(r)).collect();
    let Some(primary) = roots.first() else {
        return Inventory::empty();
    };

    let paths = WorkspaceScanner::new(settings.clone()).scan(&roots);
    let inventory = InventoryBuilder::new(primary).build(&paths);

    info!(
        "Inventory built: {} package(s), {} task(s), {} unreadable manifest(s)",
        inventory.len(),
        inventory.task_count(),
        inventory.unreadable().len()
    );
    inventory
}
