//! Session reuse policy and task dispatch.

use anyhow::{Context, Result};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

use crate::config::SessionSettings;

use super::host::{SessionHandle, SessionHost};
use super::shell::{change_directory_command, quote_if_needed, ShellKind};

/// How sessions are picked for a task run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionMode {
    /// Every run reuses the one reserved session
    Shared,
    /// Every run gets a freshly created session
    #[default]
    Isolated,
}

impl SessionMode {
    pub fn from_shared_flag(use_shared: bool) -> Self {
        if use_shared {
            SessionMode::Shared
        } else {
            SessionMode::Isolated
        }
    }
}

/// Process-scoped slot remembering the shared session handle
#[derive(Default)]
pub struct SharedSessionSlot {
    handle: Mutex<Option<SessionHandle>>,
}

impl SharedSessionSlot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self) -> Option<SessionHandle> {
        self.handle.lock().clone()
    }

    fn set(&self, handle: SessionHandle) {
        *self.handle.lock() = Some(handle);
    }

    /// Forget the remembered handle
    pub fn clear(&self) {
        *self.handle.lock() = None;
    }
}

/// Maps (task, package, mode) to a session and types the task into it
pub struct SessionManager {
    host: Arc<dyn SessionHost>,
    settings: SessionSettings,
    shell: ShellKind,
    task_runner: String,
    shared_slot: Arc<SharedSessionSlot>,
}

impl SessionManager {
    pub fn new(
        host: Arc<dyn SessionHost>,
        settings: SessionSettings,
        shell: ShellKind,
        task_runner: impl Into<String>,
    ) -> Self {
        Self {
            host,
            settings,
            shell,
            task_runner: task_runner.into(),
            shared_slot: Arc::new(SharedSessionSlot::new()),
        }
    }

    /// Use an externally owned shared-session slot
    pub fn with_shared_slot(mut self, slot: Arc<SharedSessionSlot>) -> Self {
        self.shared_slot = slot;
        self
    }

    pub fn shell(&self) -> ShellKind {
        self.shell
    }

    /// Name of an isolated session for a package/task pair
    pub fn isolated_session_name(&self, package_name: &str, task: &str) -> String {
        format!("{}{} - {}", self.settings.isolated_prefix, package_name, task)
    }

    /// Pick the session a task run goes to
    pub fn resolve_session(
        &self,
        task: &str,
        package_name: &str,
        mode: SessionMode,
    ) -> Result<SessionHandle> {
        match mode {
            SessionMode::Shared => self.shared_session(),
            SessionMode::Isolated => {
                let name = self.isolated_session_name(package_name, task);
                debug!("Creating isolated session '{}'", name);
                self.host.create_session(&name)
            }
        }
    }

    /// Return the reserved shared session, creating it on first use
    fn shared_session(&self) -> Result<SessionHandle> {
        // Prefer the remembered handle while the host still has it
        if let Some(remembered) = self.shared_slot.get() {
            let alive = self
                .host
                .sessions()?
                .iter()
                .any(|s| s.name() == remembered.name());
            if alive {
                return Ok(remembered);
            }
            debug!("Shared session '{}' is gone", remembered.name());
            self.shared_slot.clear();
        }

        let reserved = &self.settings.shared_name;
        let handle = match self.host.find_session(reserved)? {
            Some(found) => found,
            None => {
                debug!("Creating shared session '{}'", reserved);
                self.host.create_session(reserved)?
            }
        };
        self.shared_slot.set(handle.clone());
        Ok(handle)
    }

    /// Send the directory change, the task invocation, then reveal the session
    ///
    /// A relative manifest path is resolved against the current directory.
    pub fn run_task(&self, task: &str, manifest_path: &Path, session: &SessionHandle) -> Result<()> {
        let dir = match manifest_path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let dir = std::path::absolute(dir)
            .with_context(|| format!("Failed to resolve directory of {:?}", manifest_path))?;
        session.send_text(&change_directory_command(&dir, self.shell))?;
        session.send_text(&self.invocation(task))?;
        session.reveal()?;
        Ok(())
    }

    /// Resolve a session and run the task in it
    pub fn dispatch(
        &self,
        task: &str,
        package_name: &str,
        manifest_path: &Path,
        mode: SessionMode,
    ) -> Result<SessionHandle> {
        let session = self.resolve_session(task, package_name, mode)?;
        self.run_task(task, manifest_path, &session)?;
        Ok(session)
    }

    /// Text that invokes a task through the configured runner
    pub fn invocation(&self, task: &str) -> String {
        format!("{} {}", self.task_runner, quote_if_needed(task, self.shell))
    }
}
