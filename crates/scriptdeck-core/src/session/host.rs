use anyhow::Result;
use std::sync::Arc;

/// A persistent process owned by the host (e.g. a tmux session).
///
/// The host decides how text is delivered and what "visible" means; this
/// crate never closes a session.
pub trait ExecutionSession: Send + Sync {
    /// Name the host knows the session by
    fn name(&self) -> &str;

    /// Type a line of literal text into the session and submit it
    fn send_text(&self, text: &str) -> Result<()>;

    /// Bring the session to the foreground
    fn reveal(&self) -> Result<()>;
}

/// Shared handle to a session. Identity is pointer identity (`Arc::ptr_eq`).
pub type SessionHandle = Arc<dyn ExecutionSession>;

/// Host capability for finding and creating sessions
pub trait SessionHost: Send + Sync {
    /// Sessions that currently exist on the host
    fn sessions(&self) -> Result<Vec<SessionHandle>>;

    /// Find an existing session by the name it was requested under
    fn find_session(&self, name: &str) -> Result<Option<SessionHandle>> {
        Ok(self.sessions()?.into_iter().find(|s| s.name() == name))
    }

    /// Create a new session
    ///
    /// Always creates; hosts that require unique names may disambiguate.
    fn create_session(&self, name: &str) -> Result<SessionHandle>;
}

/// Compare two handles by identity rather than by name
pub fn same_session(a: &SessionHandle, b: &SessionHandle) -> bool {
    Arc::ptr_eq(a, b)
}
