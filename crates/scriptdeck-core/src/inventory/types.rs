use serde::Serialize;
use std::cmp::Ordering;
use std::path::{Path, PathBuf};

use crate::manifest::TaskSet;
use crate::workspace::ROOT_KEY;

/// One discovered package
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PackageEntry {
    /// Directory relative to the primary workspace root (`"/"` for the root)
    pub key: String,
    /// Declared package name, or the directory name
    pub display_name: String,
    /// Absolute path of the manifest
    pub manifest_path: PathBuf,
    /// Declared scripts
    pub tasks: TaskSet,
}

impl PackageEntry {
    pub fn is_root(&self) -> bool {
        self.key == ROOT_KEY
    }

    pub fn has_tasks(&self) -> bool {
        !self.tasks.is_empty()
    }

    /// Directory tasks of this package run in
    pub fn directory(&self) -> &Path {
        self.manifest_path
            .parent()
            .unwrap_or(self.manifest_path.as_path())
    }
}

/// Inventory order: the root package first, then by key
pub fn compare_keys(a: &str, b: &str) -> Ordering {
    match (a == ROOT_KEY, b == ROOT_KEY) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Less,
        (false, true) => Ordering::Greater,
        (false, false) => a.cmp(b),
    }
}

/// A manifest that was found but could not be read
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnreadableManifest {
    pub path: PathBuf,
    pub reason: String,
}

/// Ordered snapshot of every discovered package.
///
/// Rebuilt wholesale on every refresh and never patched in place.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Inventory {
    entries: Vec<PackageEntry>,
    unreadable: Vec<UnreadableManifest>,
}

impl Inventory {
    /// Build from entries; sorts them into inventory order
    pub(crate) fn new(mut entries: Vec<PackageEntry>, unreadable: Vec<UnreadableManifest>) -> Self {
        entries.sort_by(|a, b| compare_keys(&a.key, &b.key));
        Self {
            entries,
            unreadable,
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    /// Every package, including those without tasks
    pub fn entries(&self) -> &[PackageEntry] {
        &self.entries
    }

    /// Packages worth rendering (at least one task)
    pub fn visible_entries(&self) -> impl Iterator<Item = &PackageEntry> {
        self.entries.iter().filter(|e| e.has_tasks())
    }

    /// Manifests that were found but skipped
    pub fn unreadable(&self) -> &[UnreadableManifest] {
        &self.unreadable
    }

    pub fn get(&self, key: &str) -> Option<&PackageEntry> {
        self.entries.iter().find(|e| e.key == key)
    }

    pub fn find_by_manifest(&self, manifest_path: &Path) -> Option<&PackageEntry> {
        self.entries.iter().find(|e| e.manifest_path == manifest_path)
    }

    /// Packages declaring a task with this name
    pub fn packages_with_task<'a>(&'a self, task: &'a str) -> impl Iterator<Item = &'a PackageEntry> {
        self.entries.iter().filter(move |e| e.tasks.contains(task))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// True when any manifest was found, readable or not
    pub fn has_manifests(&self) -> bool {
        !self.entries.is_empty() || !self.unreadable.is_empty()
    }

    pub fn task_count(&self) -> usize {
        self.entries.iter().map(|e| e.tasks.len()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(key: &str, tasks: &[(&str, &str)]) -> PackageEntry {
        PackageEntry {
            key: key.to_string(),
            display_name: key.to_string(),
            manifest_path: PathBuf::from(format!("/proj/{}/package.json", key)),
            tasks: tasks.iter().copied().collect(),
        }
    }

    #[test]
    fn test_root_sorts_first() {
        let inventory = Inventory::new(
            vec![
                entry("b", &[]),
                entry("/", &[]),
                entry("a/z", &[]),
                entry("A", &[]),
            ],
            Vec::new(),
        );
        let keys: Vec<&str> = inventory.entries().iter().map(|e| e.key.as_str()).collect();
        assert_eq!(keys, vec!["/", "A", "a/z", "b"]);
    }

    #[test]
    fn test_visible_entries_hide_empty_packages() {
        let inventory = Inventory::new(
            vec![entry("a", &[("build", "tsc")]), entry("b", &[])],
            Vec::new(),
        );
        assert_eq!(inventory.len(), 2);
        let visible: Vec<&str> = inventory.visible_entries().map(|e| e.key.as_str()).collect();
        assert_eq!(visible, vec!["a"]);
        assert!(inventory.get("b").is_some());
        assert_eq!(inventory.task_count(), 1);
    }

    #[test]
    fn test_directory_and_lookup() {
        let inventory = Inventory::new(vec![entry("a", &[("test", "jest")])], Vec::new());
        let a = inventory
            .find_by_manifest(Path::new("/proj/a/package.json"))
            .unwrap();
        assert_eq!(a.directory(), Path::new("/proj/a"));
        assert!(!a.is_root());
        assert_eq!(inventory.packages_with_task("test").count(), 1);
        assert_eq!(inventory.packages_with_task("build").count(), 0);
    }

    #[test]
    fn test_has_manifests_counts_unreadable() {
        let inventory = Inventory::new(
            Vec::new(),
            vec![UnreadableManifest {
                path: PathBuf::from("/proj/package.json"),
                reason: "bad".to_string(),
            }],
        );
        assert!(inventory.is_empty());
        assert!(inventory.has_manifests());
        assert!(!Inventory::empty().has_manifests());
    }
}
