//! Query methods on [`ScriptDeckCore`].
//!
//! All queries return owned snapshots so callers never hold a lock.

use std::path::PathBuf;
use std::sync::Arc;

use crate::inventory::{Inventory, PackageEntry};
use crate::session::SessionMode;

use super::core::ScriptDeckCore;
use super::types::ApiError;

impl ScriptDeckCore {
    /// Latest completed inventory snapshot
    pub fn inventory(&self) -> Arc<Inventory> {
        self.state().read().inventory.clone()
    }

    /// Workspace roots (first = primary)
    pub fn workspace_roots(&self) -> Vec<PathBuf> {
        self.state().read().roots.clone()
    }

    pub fn has_workspace(&self) -> bool {
        !self.state().read().roots.is_empty()
    }

    /// Whether any manifest was found by the last refresh
    pub fn entry_point_visible(&self) -> bool {
        self.state().read().entry_point_visible
    }

    /// Remembered session mode preference
    pub fn session_mode(&self) -> SessionMode {
        self.state().read().session_mode
    }

    /// Find the package a task should run in.
    ///
    /// With `package`, the key must exist and declare the task. Without it,
    /// the task must be declared by exactly one package, or by the root.
    pub fn resolve_task_target(
        &self,
        task: &str,
        package: Option<&str>,
    ) -> Result<PackageEntry, ApiError> {
        let inventory = self.inventory();

        if let Some(key) = package {
            let entry = inventory.get(key).ok_or_else(|| ApiError::PackageNotFound {
                key: key.to_string(),
            })?;
            if !entry.tasks.contains(task) {
                return Err(ApiError::TaskNotFound {
                    package: entry.key.clone(),
                    task: task.to_string(),
                });
            }
            return Ok(entry.clone());
        }

        let candidates: Vec<&PackageEntry> = inventory.packages_with_task(task).collect();
        match candidates.as_slice() {
            [] => Err(ApiError::TaskNotFound {
                package: "<any>".to_string(),
                task: task.to_string(),
            }),
            [only] => Ok((*only).clone()),
            many => match many.iter().find(|e| e.is_root()) {
                Some(root) => Ok((*root).clone()),
                None => Err(ApiError::AmbiguousTask {
                    task: task.to_string(),
                    candidates: many.iter().map(|e| e.key.clone()).collect(),
                }),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::ScriptDeckCoreBuilder;
    use crate::config::Settings;
    use std::fs;
    use tempfile::TempDir;

    fn workspace() -> (TempDir, ScriptDeckCore) {
        let tmp = TempDir::new().unwrap();
        let write = |rel: &str, content: &str| {
            let path = tmp.path().join(rel);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(path, content).unwrap();
        };
        write("package.json", r#"{ "name": "root", "scripts": { "build": "tsc -b" } }"#);
        write("pkgs/a/package.json", r#"{ "scripts": { "build": "tsc", "test": "jest" } }"#);
        write("pkgs/b/package.json", r#"{ "scripts": { "test": "vitest" } }"#);

        let core = ScriptDeckCoreBuilder::new(Settings::default())
            .with_roots(vec![tmp.path().to_path_buf()])
            .build();
        core.refresh();
        (tmp, core)
    }

    #[test]
    fn test_explicit_package() {
        let (_tmp, core) = workspace();
        let entry = core.resolve_task_target("test", Some("pkgs/b")).unwrap();
        assert_eq!(entry.display_name, "b");
    }

    #[test]
    fn test_unknown_package_or_task() {
        let (_tmp, core) = workspace();
        assert!(matches!(
            core.resolve_task_target("test", Some("pkgs/zzz")),
            Err(ApiError::PackageNotFound { .. })
        ));
        assert!(matches!(
            core.resolve_task_target("lint", Some("/")),
            Err(ApiError::TaskNotFound { .. })
        ));
        assert!(matches!(
            core.resolve_task_target("lint", None),
            Err(ApiError::TaskNotFound { .. })
        ));
    }

    #[test]
    fn test_root_wins_when_ambiguous() {
        let (_tmp, core) = workspace();
        let entry = core.resolve_task_target("build", None).unwrap();
        assert!(entry.is_root());
    }

    #[test]
    fn test_ambiguous_without_root() {
        let (_tmp, core) = workspace();
        match core.resolve_task_target("test", None) {
            Err(ApiError::AmbiguousTask { candidates, .. }) => {
                assert_eq!(candidates, vec!["pkgs/a".to_string(), "pkgs/b".to_string()]);
            }
            other => panic!("expected ambiguity, got {:?}", other.map(|e| e.key)),
        }
    }

    #[test]
    fn test_snapshot_queries() {
        let (tmp, core) = workspace();
        assert!(core.has_workspace());
        assert!(core.entry_point_visible());
        assert_eq!(core.workspace_roots(), vec![tmp.path().canonicalize().unwrap()]);
        assert_eq!(core.inventory().len(), 3);
        assert_eq!(core.session_mode(), SessionMode::Isolated);
    }
}
