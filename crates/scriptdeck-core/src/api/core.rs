//! ScriptDeckCore: the Facade entry-point for all consumers (CLI, watchers, UIs)
//!
//! This struct owns every shared service and exposes high-level methods.
//! Consumers never need to acquire locks or wire services themselves.

use std::sync::Arc;

use tokio::sync::broadcast;

use crate::config::Settings;
use crate::session::SessionManager;
use crate::state::SharedState;

use super::events::CoreEvent;

/// Default broadcast channel capacity
const EVENT_CHANNEL_CAPACITY: usize = 256;

/// The Facade that wraps all scriptdeck-core services.
///
/// Constructed via [`ScriptDeckCoreBuilder`](super::builder::ScriptDeckCoreBuilder).
pub struct ScriptDeckCore {
    /// Process-scoped state (inventory snapshot, roots, preferences)
    state: SharedState,
    /// Session policy + dispatch; absent when no host is available
    session_manager: Option<Arc<SessionManager>>,
    /// Application settings
    settings: Arc<Settings>,
    /// Broadcast sender for core events
    event_tx: broadcast::Sender<CoreEvent>,
}

impl ScriptDeckCore {
    /// Create a new ScriptDeckCore instance (prefer `ScriptDeckCoreBuilder`)
    pub(crate) fn new(
        state: SharedState,
        session_manager: Option<Arc<SessionManager>>,
        settings: Arc<Settings>,
    ) -> Self {
        let (event_tx, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            state,
            session_manager,
            settings,
            event_tx,
        }
    }

    /// Access application settings (read-only)
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Subscribe to core events.
    ///
    /// If the receiver falls behind, older events are dropped (lagged).
    pub fn subscribe(&self) -> broadcast::Receiver<CoreEvent> {
        self.event_tx.subscribe()
    }

    /// Emit an event; ignored when nobody listens
    pub(crate) fn emit(&self, event: CoreEvent) {
        let _ = self.event_tx.send(event);
    }

    pub(crate) fn state(&self) -> &SharedState {
        &self.state
    }

    pub(crate) fn session_manager(&self) -> Option<&Arc<SessionManager>> {
        self.session_manager.as_ref()
    }
}
