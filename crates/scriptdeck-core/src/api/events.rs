//! Core event system for push-based change notification.
//!
//! Consumers call [`ScriptDeckCore::subscribe()`](super::ScriptDeckCore::subscribe)
//! and render from the events; dispatch failures arrive here too so a
//! front-end can surface them as notifications.

use crate::session::SessionMode;

/// Events emitted by the core when state changes occur.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CoreEvent {
    /// A refresh completed and a new inventory snapshot is in place
    InventoryUpdated {
        /// Number of packages (including those without tasks)
        packages: usize,
        /// Number of tasks across all packages
        tasks: usize,
    },

    /// The entry point should be shown or hidden
    EntryPointVisibilityChanged { visible: bool },

    /// A task was typed into a session
    TaskDispatched {
        task: String,
        /// Name of the session the task went to
        session: String,
    },

    /// The session host rejected a task run
    DispatchFailed { task: String, message: String },

    /// The session mode preference changed
    SessionModeChanged { mode: SessionMode },
}
