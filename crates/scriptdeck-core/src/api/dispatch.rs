//! Routing of user actions and workspace events to core handlers.
//!
//! Every incoming event is tagged with an [`EventKind`] and looked up in a
//! table of handler functions, the same way a router maps paths to handlers.

use std::collections::HashMap;
use std::path::PathBuf;

use tracing::{debug, warn};

use crate::monitor::WorkspaceEvent;
use crate::session::SessionMode;

use super::core::ScriptDeckCore;
use super::types::ApiError;

/// Something the user asked for
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserAction {
    /// Run a task from a manifest (`None` = remembered mode)
    RunTask {
        task: String,
        manifest_path: PathBuf,
        use_shared: Option<bool>,
    },
    /// Rescan the workspace
    Refresh,
    /// Persist the session mode preference
    SaveSettings { use_shared: bool },
}

/// Anything the dispatcher routes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CoreInput {
    User(UserAction),
    Workspace(WorkspaceEvent),
}

impl From<UserAction> for CoreInput {
    fn from(action: UserAction) -> Self {
        CoreInput::User(action)
    }
}

impl From<WorkspaceEvent> for CoreInput {
    fn from(event: WorkspaceEvent) -> Self {
        CoreInput::Workspace(event)
    }
}

/// Lookup tag for [`CoreInput`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    RunTask,
    Refresh,
    SaveSettings,
    ManifestCreated,
    ManifestChanged,
    ManifestDeleted,
    RootsChanged,
}

impl CoreInput {
    pub fn kind(&self) -> EventKind {
        match self {
            CoreInput::User(UserAction::RunTask { .. }) => EventKind::RunTask,
            CoreInput::User(UserAction::Refresh) => EventKind::Refresh,
            CoreInput::User(UserAction::SaveSettings { .. }) => EventKind::SaveSettings,
            CoreInput::Workspace(WorkspaceEvent::ManifestCreated(_)) => EventKind::ManifestCreated,
            CoreInput::Workspace(WorkspaceEvent::ManifestChanged(_)) => EventKind::ManifestChanged,
            CoreInput::Workspace(WorkspaceEvent::ManifestDeleted(_)) => EventKind::ManifestDeleted,
            CoreInput::Workspace(WorkspaceEvent::RootsChanged(_)) => EventKind::RootsChanged,
        }
    }

    /// Whether handling this input only needs an inventory rebuild
    fn is_rescan(&self) -> bool {
        matches!(
            self.kind(),
            EventKind::Refresh
                | EventKind::ManifestCreated
                | EventKind::ManifestChanged
                | EventKind::ManifestDeleted
        )
    }
}

/// Handler invoked for one tagged input
pub type Handler = fn(&ScriptDeckCore, CoreInput) -> Result<(), ApiError>;

/// Tag → handler lookup table
pub struct EventDispatcher {
    handlers: HashMap<EventKind, Handler>,
}

impl Default for EventDispatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl EventDispatcher {
    /// Dispatcher with the standard handler for every tag
    pub fn new() -> Self {
        let mut dispatcher = Self::empty();
        dispatcher
            .register(EventKind::RunTask, handle_run_task)
            .register(EventKind::Refresh, handle_rescan)
            .register(EventKind::SaveSettings, handle_save_settings)
            .register(EventKind::ManifestCreated, handle_rescan)
            .register(EventKind::ManifestChanged, handle_rescan)
            .register(EventKind::ManifestDeleted, handle_rescan)
            .register(EventKind::RootsChanged, handle_roots_changed);
        dispatcher
    }

    /// Dispatcher with no handlers
    pub fn empty() -> Self {
        Self {
            handlers: HashMap::new(),
        }
    }

    /// Install (or replace) the handler for `kind`
    pub fn register(&mut self, kind: EventKind, handler: Handler) -> &mut Self {
        self.handlers.insert(kind, handler);
        self
    }

    /// Route one input to its handler. Inputs without a handler are ignored.
    pub fn dispatch(&self, core: &ScriptDeckCore, input: CoreInput) -> Result<(), ApiError> {
        let kind = input.kind();
        match self.handlers.get(&kind) {
            Some(handler) => handler(core, input),
            None => {
                debug!("No handler for {:?}", kind);
                Ok(())
            }
        }
    }

    /// Route a debounced burst.
    ///
    /// Consecutive rescans collapse into one, and a root change absorbs the
    /// rescans and root changes right before and after it. Other inputs keep
    /// their order.
    ///
    /// A failing input does not stop the rest of the burst; the first error
    /// is returned once every input has been handled.
    pub fn dispatch_batch<I>(&self, core: &ScriptDeckCore, inputs: I) -> Result<(), ApiError>
    where
        I: IntoIterator<Item = CoreInput>,
    {
        let mut first_error = None;
        for input in coalesce(inputs) {
            let kind = input.kind();
            if let Err(e) = self.dispatch(core, input) {
                warn!("{:?} failed: {}", kind, e);
                first_error.get_or_insert(e);
            }
        }
        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

/// Collapse redundant rebuilds in a burst
fn coalesce<I>(inputs: I) -> Vec<CoreInput>
where
    I: IntoIterator<Item = CoreInput>,
{
    let rebuilds = |input: &CoreInput| input.is_rescan() || input.kind() == EventKind::RootsChanged;
    let mut out: Vec<CoreInput> = Vec::new();

    for input in inputs {
        if input.is_rescan() {
            if out.last().is_some_and(rebuilds) {
                continue;
            }
        } else if input.kind() == EventKind::RootsChanged {
            while out.last().is_some_and(rebuilds) {
                out.pop();
            }
        }
        out.push(input);
    }
    out
}

fn handle_run_task(core: &ScriptDeckCore, input: CoreInput) -> Result<(), ApiError> {
    let kind = input.kind();
    let CoreInput::User(UserAction::RunTask {
        task,
        manifest_path,
        use_shared,
    }) = input
    else {
        return Err(unexpected(kind));
    };
    let mode = use_shared.map(SessionMode::from_shared_flag);
    core.run_task(&task, &manifest_path, mode).map(|_| ())
}

fn handle_rescan(core: &ScriptDeckCore, _input: CoreInput) -> Result<(), ApiError> {
    core.refresh();
    Ok(())
}

fn handle_save_settings(core: &ScriptDeckCore, input: CoreInput) -> Result<(), ApiError> {
    let kind = input.kind();
    let CoreInput::User(UserAction::SaveSettings { use_shared }) = input else {
        return Err(unexpected(kind));
    };
    core.set_session_mode(SessionMode::from_shared_flag(use_shared));
    Ok(())
}

fn handle_roots_changed(core: &ScriptDeckCore, input: CoreInput) -> Result<(), ApiError> {
    let kind = input.kind();
    let CoreInput::Workspace(WorkspaceEvent::RootsChanged(roots)) = input else {
        return Err(unexpected(kind));
    };
    core.set_workspace_roots(roots);
    Ok(())
}

fn unexpected(kind: EventKind) -> ApiError {
    ApiError::InvalidInput {
        message: format!("handler cannot process {:?}", kind),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{CoreEvent, ScriptDeckCoreBuilder};
    use crate::config::Settings;
    use crate::session::testing::FakeHost;
    use pretty_assertions::assert_eq;
    use std::fs;
    use std::sync::Arc;
    use tempfile::TempDir;
    use tokio::sync::broadcast::error::TryRecvError;

    fn workspace() -> (TempDir, ScriptDeckCore, Arc<FakeHost>) {
        let tmp = TempDir::new().unwrap();
        fs::write(
            tmp.path().join("package.json"),
            r#"{ "name": "app", "scripts": { "dev": "vite" } }"#,
        )
        .unwrap();
        let host = Arc::new(FakeHost::new());
        let core = ScriptDeckCoreBuilder::new(Settings::default())
            .with_roots(vec![tmp.path().to_path_buf()])
            .with_session_host(host.clone())
            .build();
        (tmp, core, host)
    }

    fn drain_refreshes(rx: &mut tokio::sync::broadcast::Receiver<CoreEvent>) -> usize {
        let mut count = 0;
        loop {
            match rx.try_recv() {
                Ok(CoreEvent::InventoryUpdated { .. }) => count += 1,
                Ok(_) => {}
                Err(TryRecvError::Empty) => return count,
                Err(e) => panic!("unexpected receive error: {e}"),
            }
        }
    }

    #[test]
    fn test_kind_tags() {
        let input: CoreInput = WorkspaceEvent::ManifestDeleted(PathBuf::from("/p/package.json")).into();
        assert_eq!(input.kind(), EventKind::ManifestDeleted);
        let input: CoreInput = UserAction::SaveSettings { use_shared: true }.into();
        assert_eq!(input.kind(), EventKind::SaveSettings);
    }

    #[test]
    fn test_run_task_action() {
        let (tmp, core, host) = workspace();
        let dispatcher = EventDispatcher::new();
        dispatcher.dispatch(&core, UserAction::Refresh.into()).unwrap();

        dispatcher
            .dispatch(
                &core,
                UserAction::RunTask {
                    task: "dev".to_string(),
                    manifest_path: tmp.path().join("package.json"),
                    use_shared: Some(true),
                }
                .into(),
            )
            .unwrap();

        assert_eq!(host.created_names(), vec!["NPM Scripts Runner".to_string()]);
    }

    #[test]
    fn test_save_settings_action() {
        let (_tmp, core, _host) = workspace();
        EventDispatcher::new()
            .dispatch(&core, UserAction::SaveSettings { use_shared: true }.into())
            .unwrap();
        assert_eq!(core.session_mode(), SessionMode::Shared);
    }

    #[test]
    fn test_manifest_events_refresh() {
        let (tmp, core, _host) = workspace();
        let dispatcher = EventDispatcher::new();

        let path = tmp.path().join("package.json");
        dispatcher
            .dispatch(&core, WorkspaceEvent::ManifestCreated(path.clone()).into())
            .unwrap();
        assert!(core.entry_point_visible());

        fs::remove_file(&path).unwrap();
        dispatcher
            .dispatch(&core, WorkspaceEvent::ManifestDeleted(path).into())
            .unwrap();
        assert!(!core.entry_point_visible());
    }

    #[test]
    fn test_batch_coalesces_rescans() {
        let (tmp, core, _host) = workspace();
        let mut rx = core.subscribe();
        let path = tmp.path().join("package.json");

        EventDispatcher::new()
            .dispatch_batch(
                &core,
                vec![
                    WorkspaceEvent::ManifestCreated(path.clone()).into(),
                    WorkspaceEvent::ManifestChanged(path.clone()).into(),
                    WorkspaceEvent::ManifestChanged(path).into(),
                ],
            )
            .unwrap();

        assert_eq!(drain_refreshes(&mut rx), 1);
    }

    #[test]
    fn test_batch_keeps_last_root_change() {
        let (tmp, core, _host) = workspace();
        let other = TempDir::new().unwrap();
        let mut rx = core.subscribe();

        EventDispatcher::new()
            .dispatch_batch(
                &core,
                vec![
                    WorkspaceEvent::RootsChanged(vec![other.path().to_path_buf()]).into(),
                    WorkspaceEvent::ManifestChanged(tmp.path().join("package.json")).into(),
                    WorkspaceEvent::RootsChanged(vec![tmp.path().to_path_buf()]).into(),
                ],
            )
            .unwrap();

        assert_eq!(core.workspace_roots(), vec![tmp.path().canonicalize().unwrap()]);
        assert_eq!(drain_refreshes(&mut rx), 1);
    }

    #[test]
    fn test_batch_continues_after_failed_run() {
        let (tmp, core, host) = workspace();
        host.fail_creates();

        let result = EventDispatcher::new().dispatch_batch(
            &core,
            vec![
                UserAction::RunTask {
                    task: "dev".to_string(),
                    manifest_path: tmp.path().join("package.json"),
                    use_shared: None,
                }
                .into(),
                UserAction::Refresh.into(),
            ],
        );

        assert!(matches!(result, Err(ApiError::Dispatch(_))));
        assert_eq!(core.inventory().len(), 1);
        assert!(core.entry_point_visible());
    }

    #[test]
    fn test_custom_handler_replaces_default() {
        let (_tmp, core, _host) = workspace();
        let mut dispatcher = EventDispatcher::empty();
        dispatcher.register(EventKind::Refresh, |core, _| {
            core.set_session_mode(SessionMode::Shared);
            Ok(())
        });

        dispatcher.dispatch(&core, UserAction::Refresh.into()).unwrap();
        // Unregistered tag is a no-op
        dispatcher
            .dispatch(&core, UserAction::SaveSettings { use_shared: false }.into())
            .unwrap();

        assert_eq!(core.session_mode(), SessionMode::Shared);
        assert!(core.inventory().is_empty());
    }
}
