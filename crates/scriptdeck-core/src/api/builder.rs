//! Builder for constructing a [`ScriptDeckCore`] instance.
//!
//! ```ignore
//! let core = ScriptDeckCoreBuilder::new(settings)
//!     .with_roots(vec![cwd])
//!     .with_session_host(Arc::new(TmuxHost::default()))
//!     .build();
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use crate::config::Settings;
use crate::session::{SessionHost, SessionManager};
use crate::state::{AppState, SharedState};
use crate::workspace::absolute_root;

use super::core::ScriptDeckCore;

/// Builder for constructing a [`ScriptDeckCore`] Facade instance
pub struct ScriptDeckCoreBuilder {
    settings: Arc<Settings>,
    roots: Vec<PathBuf>,
    state: Option<SharedState>,
    session_host: Option<Arc<dyn SessionHost>>,
}

impl ScriptDeckCoreBuilder {
    /// Create a new builder with the given settings
    pub fn new(settings: Settings) -> Self {
        Self {
            settings: Arc::new(settings),
            roots: Vec::new(),
            state: None,
            session_host: None,
        }
    }

    /// Workspace roots; the first one is the primary root.
    ///
    /// Relative roots are resolved against the current directory.
    pub fn with_roots(mut self, roots: Vec<PathBuf>) -> Self {
        self.roots = roots.iter().map(|r| absolute_root(r)).collect();
        self
    }

    /// Use an existing shared state instead of creating a new one
    ///
    /// Roots given to [`Self::with_roots`] are ignored in that case.
    pub fn with_state(mut self, state: SharedState) -> Self {
        self.state = Some(state);
        self
    }

    /// Set the host sessions are created on
    pub fn with_session_host(mut self, host: Arc<dyn SessionHost>) -> Self {
        self.session_host = Some(host);
        self
    }

    /// Build the `ScriptDeckCore` instance
    pub fn build(self) -> ScriptDeckCore {
        let settings = self.settings;
        let state = self
            .state
            .unwrap_or_else(|| AppState::new(self.roots, settings.session_mode).into_shared());

        let session_manager = self.session_host.map(|host| {
            Arc::new(SessionManager::new(
                host,
                settings.session.clone(),
                settings.shell_kind(),
                settings.task_runner.clone(),
            ))
        });

        ScriptDeckCore::new(state, session_manager, settings)
    }
}
