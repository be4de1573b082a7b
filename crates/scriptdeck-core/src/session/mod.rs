//! Execution sessions: the host seam, reuse policy and shell quoting.

mod host;
mod manager;
pub mod shell;

pub use host::{same_session, ExecutionSession, SessionHandle, SessionHost};
pub use manager::{SessionManager, SessionMode, SharedSessionSlot};
pub use shell::ShellKind;
