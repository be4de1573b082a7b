//! Action methods on [`ScriptDeckCore`].
//!
//! These methods perform side-effects (rescan the workspace, type into
//! sessions, change preferences) and broadcast the resulting [`CoreEvent`]s.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::inventory::{build_inventory, Inventory};
use crate::session::{SessionManager, SessionMode};
use crate::workspace::{absolute_manifest_path, absolute_root};

use super::core::ScriptDeckCore;
use super::events::CoreEvent;
use super::types::ApiError;

impl ScriptDeckCore {
    /// Return the session manager, or `ApiError::NoSessionHost`
    fn require_session_manager(&self) -> Result<&Arc<SessionManager>, ApiError> {
        self.session_manager().ok_or(ApiError::NoSessionHost)
    }

    // =========================================================
    // Inventory actions
    // =========================================================

    /// Rebuild the inventory from scratch and swap it into state.
    ///
    /// The scan runs without holding the state lock; only the swap does.
    pub fn refresh(&self) -> Arc<Inventory> {
        let roots = self.workspace_roots();
        let inventory = build_inventory(&roots, &self.settings().scan);
        let packages = inventory.len();
        let tasks = inventory.task_count();

        let (snapshot, flipped, visible) = {
            let mut state = self.state().write();
            let flipped = state.replace_inventory(inventory);
            (state.inventory.clone(), flipped, state.entry_point_visible)
        };

        self.emit(CoreEvent::InventoryUpdated { packages, tasks });
        if flipped {
            debug!("Entry point visibility changed: {}", visible);
            self.emit(CoreEvent::EntryPointVisibilityChanged { visible });
        }
        snapshot
    }

    /// Replace the workspace roots and rebuild the inventory
    pub fn set_workspace_roots(&self, roots: Vec<PathBuf>) -> Arc<Inventory> {
        info!("Workspace roots changed: {} root(s)", roots.len());
        let roots: Vec<PathBuf> = roots.iter().map(|r| absolute_root(r)).collect();
        self.state().write().roots = roots;
        self.refresh()
    }

    // =========================================================
    // Preferences
    // =========================================================

    /// Remember the session mode used when a caller does not pick one
    pub fn set_session_mode(&self, mode: SessionMode) {
        let changed = {
            let mut state = self.state().write();
            let changed = state.session_mode != mode;
            state.session_mode = mode;
            changed
        };
        if changed {
            self.emit(CoreEvent::SessionModeChanged { mode });
        }
    }

    // =========================================================
    // Task dispatch
    // =========================================================

    /// Run `task` from the manifest at `manifest_path`.
    ///
    /// `mode` falls back to the remembered preference. Returns the name of
    /// the session the task went to.
    pub fn run_task(
        &self,
        task: &str,
        manifest_path: &Path,
        mode: Option<SessionMode>,
    ) -> Result<String, ApiError> {
        if task.trim().is_empty() {
            return Err(ApiError::InvalidInput {
                message: "task name is empty".to_string(),
            });
        }
        let manager = self.require_session_manager()?;
        let mode = mode.unwrap_or_else(|| self.session_mode());
        let manifest_path = absolute_manifest_path(manifest_path);
        let manifest_path = manifest_path.as_path();
        let package_name = self.package_name_for(manifest_path);

        match manager.dispatch(task, &package_name, manifest_path, mode) {
            Ok(session) => {
                let session = session.name().to_string();
                info!("Dispatched '{}' from {} to '{}'", task, package_name, session);
                self.emit(CoreEvent::TaskDispatched {
                    task: task.to_string(),
                    session: session.clone(),
                });
                Ok(session)
            }
            Err(e) => {
                warn!("Failed to run '{}' from {}: {:#}", task, manifest_path.display(), e);
                self.emit(CoreEvent::DispatchFailed {
                    task: task.to_string(),
                    message: format!("{:#}", e),
                });
                Err(ApiError::Dispatch(e))
            }
        }
    }

    /// Run `task` in the package with `key` (or wherever it is uniquely declared)
    pub fn run_task_by_key(
        &self,
        task: &str,
        package: Option<&str>,
        mode: Option<SessionMode>,
    ) -> Result<String, ApiError> {
        if !self.has_workspace() {
            return Err(ApiError::NoWorkspace);
        }
        let entry = self.resolve_task_target(task, package)?;
        self.run_task(task, &entry.manifest_path, mode)
    }

    /// Display name of the package owning `manifest_path`.
    ///
    /// Manifests unknown to the current inventory use their directory name.
    fn package_name_for(&self, manifest_path: &Path) -> String {
        if let Some(entry) = self.inventory().find_by_manifest(manifest_path) {
            return entry.display_name.clone();
        }
        manifest_path
            .parent()
            .and_then(|dir| dir.file_name())
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::ScriptDeckCoreBuilder;
    use crate::config::Settings;
    use crate::session::testing::{FakeHost, Sent};
    use pretty_assertions::assert_eq;
    use std::fs;
    use tempfile::TempDir;
    use tokio::sync::broadcast::error::TryRecvError;

    fn write(root: &Path, rel: &str, content: &str) -> PathBuf {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, content).unwrap();
        path
    }

    fn core_with_host(root: &Path) -> (ScriptDeckCore, Arc<FakeHost>) {
        let host = Arc::new(FakeHost::new());
        let core = ScriptDeckCoreBuilder::new(Settings::default())
            .with_roots(vec![root.to_path_buf()])
            .with_session_host(host.clone())
            .build();
        (core, host)
    }

    #[test]
    fn test_refresh_emits_inventory_and_visibility() {
        let tmp = TempDir::new().unwrap();
        write(tmp.path(), "package.json", r#"{ "scripts": { "build": "tsc" } }"#);
        let (core, _host) = core_with_host(tmp.path());
        let mut rx = core.subscribe();

        let inventory = core.refresh();
        assert_eq!(inventory.len(), 1);
        assert!(core.entry_point_visible());

        assert_eq!(
            rx.try_recv().unwrap(),
            CoreEvent::InventoryUpdated {
                packages: 1,
                tasks: 1
            }
        );
        assert_eq!(
            rx.try_recv().unwrap(),
            CoreEvent::EntryPointVisibilityChanged { visible: true }
        );

        // Second refresh: same visibility, no flip event
        core.refresh();
        assert!(matches!(rx.try_recv(), Ok(CoreEvent::InventoryUpdated { .. })));
        assert!(matches!(rx.try_recv(), Err(TryRecvError::Empty)));
    }

    #[test]
    fn test_refresh_picks_up_edits_and_deletions() {
        let tmp = TempDir::new().unwrap();
        let manifest = write(tmp.path(), "package.json", r#"{ "scripts": { "a": "x" } }"#);
        let (core, _host) = core_with_host(tmp.path());
        core.refresh();

        fs::write(&manifest, r#"{ "scripts": { "a": "x", "b": "y" } }"#).unwrap();
        assert_eq!(core.refresh().task_count(), 2);

        fs::remove_file(&manifest).unwrap();
        let inventory = core.refresh();
        assert!(inventory.is_empty());
        assert!(!core.entry_point_visible());
    }

    #[test]
    fn test_no_roots_hides_entry_point() {
        let core = ScriptDeckCoreBuilder::new(Settings::default()).build();
        assert!(core.refresh().is_empty());
        assert!(!core.entry_point_visible());
    }

    #[test]
    fn test_set_workspace_roots_rescans() {
        let tmp = TempDir::new().unwrap();
        write(tmp.path(), "web/package.json", r#"{ "scripts": { "dev": "vite" } }"#);
        let core = ScriptDeckCoreBuilder::new(Settings::default()).build();
        core.refresh();
        assert!(!core.entry_point_visible());

        let inventory = core.set_workspace_roots(vec![tmp.path().to_path_buf()]);
        assert_eq!(inventory.entries()[0].key, "web");
        assert!(core.entry_point_visible());
    }

    #[test]
    fn test_run_task_uses_inventory_display_name() {
        let tmp = TempDir::new().unwrap();
        let manifest = write(
            tmp.path(),
            "pkgs/api/package.json",
            r#"{ "name": "@acme/api", "scripts": { "start": "node ." } }"#,
        );
        let (core, host) = core_with_host(tmp.path());
        core.refresh();
        let mut rx = core.subscribe();

        let session = core
            .run_task("start", &manifest, Some(SessionMode::Isolated))
            .unwrap();
        assert_eq!(session, "npm: @acme/api - start");

        let dir = manifest.parent().unwrap().display().to_string();
        assert_eq!(
            host.log_for(&session),
            vec![
                Sent::Text(format!("cd '{}'", dir)),
                Sent::Text("npm run start".to_string()),
                Sent::Reveal,
            ]
        );
        assert_eq!(
            rx.try_recv().unwrap(),
            CoreEvent::TaskDispatched {
                task: "start".to_string(),
                session
            }
        );
    }

    #[test]
    fn test_relative_root_dispatches_to_absolute_directory() {
        let tmp = tempfile::Builder::new()
            .prefix("rel-run-")
            .tempdir_in(".")
            .unwrap();
        write(tmp.path(), "package.json", r#"{ "scripts": { "build": "tsc" } }"#);
        let manifest = write(tmp.path(), "pkgs/a/package.json", r#"{ "scripts": { "test": "jest" } }"#);
        assert!(manifest.is_relative());

        let (core, host) = core_with_host(tmp.path());
        let inventory = core.refresh();
        let base = tmp.path().canonicalize().unwrap();
        assert_eq!(core.workspace_roots(), vec![base.clone()]);
        assert_ne!(inventory.entries()[0].display_name, "/");

        core.run_task("test", &manifest, Some(SessionMode::Shared)).unwrap();
        core.run_task("test", &manifest, Some(SessionMode::Shared)).unwrap();

        let cd = Sent::Text(format!("cd '{}'", base.join("pkgs/a").display()));
        let log = host.log_for("NPM Scripts Runner");
        assert_eq!(log.len(), 6);
        assert_eq!(log[0], cd);
        assert_eq!(log[3], cd);
    }

    #[test]
    fn test_run_task_unknown_manifest_uses_directory_name() {
        let tmp = TempDir::new().unwrap();
        let (core, host) = core_with_host(tmp.path());

        let session = core
            .run_task("build", Path::new("/elsewhere/tools/package.json"), None)
            .unwrap();
        assert_eq!(session, "npm: tools - build");
        assert_eq!(host.created_names(), vec![session]);
    }

    #[test]
    fn test_run_task_follows_remembered_mode() {
        let tmp = TempDir::new().unwrap();
        let manifest = write(tmp.path(), "package.json", r#"{ "scripts": { "a": "x" } }"#);
        let (core, host) = core_with_host(tmp.path());
        core.refresh();

        core.set_session_mode(SessionMode::Shared);
        core.run_task("a", &manifest, None).unwrap();
        core.run_task("a", &manifest, None).unwrap();

        assert_eq!(host.created_names(), vec!["NPM Scripts Runner".to_string()]);
    }

    #[test]
    fn test_run_task_failure_is_reported() {
        let tmp = TempDir::new().unwrap();
        let (core, host) = core_with_host(tmp.path());
        host.fail_creates();
        let mut rx = core.subscribe();

        let result = core.run_task("build", &tmp.path().join("package.json"), None);
        assert!(matches!(result, Err(ApiError::Dispatch(_))));
        assert!(matches!(
            rx.try_recv(),
            Ok(CoreEvent::DispatchFailed { task, .. }) if task == "build"
        ));
    }

    #[test]
    fn test_run_task_without_host() {
        let core = ScriptDeckCoreBuilder::new(Settings::default()).build();
        let result = core.run_task("build", Path::new("/p/package.json"), None);
        assert!(matches!(result, Err(ApiError::NoSessionHost)));
    }

    #[test]
    fn test_run_task_by_key() {
        let tmp = TempDir::new().unwrap();
        write(tmp.path(), "package.json", r#"{ "scripts": { "lint": "eslint ." } }"#);
        let (core, host) = core_with_host(tmp.path());
        core.refresh();

        let session = core.run_task_by_key("lint", Some("/"), None).unwrap();
        let root_name = tmp
            .path()
            .file_name()
            .unwrap()
            .to_string_lossy()
            .into_owned();
        assert_eq!(session, format!("npm: {} - lint", root_name));
        assert_eq!(host.created_names().len(), 1);
    }

    #[test]
    fn test_run_task_by_key_without_workspace() {
        let core = ScriptDeckCoreBuilder::new(Settings::default())
            .with_session_host(Arc::new(FakeHost::new()))
            .build();
        assert!(matches!(
            core.run_task_by_key("build", None, None),
            Err(ApiError::NoWorkspace)
        ));
    }

    #[test]
    fn test_set_session_mode_emits_once() {
        let core = ScriptDeckCoreBuilder::new(Settings::default()).build();
        let mut rx = core.subscribe();

        core.set_session_mode(SessionMode::Shared);
        core.set_session_mode(SessionMode::Shared);

        assert_eq!(core.session_mode(), SessionMode::Shared);
        assert_eq!(
            rx.try_recv().unwrap(),
            CoreEvent::SessionModeChanged {
                mode: SessionMode::Shared
            }
        );
        assert!(matches!(rx.try_recv(), Err(TryRecvError::Empty)));
    }
}
