//! [`SessionHost`] backed by tmux sessions

use anyhow::Result;
use std::sync::Arc;
use tracing::{debug, info};

use crate::session::{ExecutionSession, SessionHandle, SessionHost};

use super::client::{sanitize_session_name, TmuxClient};

/// A tmux session addressed by name
pub struct TmuxSessionHandle {
    client: TmuxClient,
    name: String,
}

impl ExecutionSession for TmuxSessionHandle {
    fn name(&self) -> &str {
        &self.name
    }

    fn send_text(&self, text: &str) -> Result<()> {
        self.client.send_text_and_enter(&self.name, text)
    }

    fn reveal(&self) -> Result<()> {
        if self.client.inside_tmux() {
            self.client.switch_client(&self.name)
        } else {
            info!("Session ready: attach with `tmux attach -t {}`", self.name);
            Ok(())
        }
    }
}

/// Creates and finds sessions on the local tmux server
#[derive(Debug, Clone, Default)]
pub struct TmuxHost {
    client: TmuxClient,
}

impl TmuxHost {
    pub fn new(client: TmuxClient) -> Self {
        Self { client }
    }

    fn handle(&self, name: String) -> SessionHandle {
        Arc::new(TmuxSessionHandle {
            client: self.client.clone(),
            name,
        })
    }
}

/// First name not in `taken`: `base`, then `base-2`, `base-3`, ...
pub fn unique_name(base: &str, taken: &[String]) -> String {
    if !taken.iter().any(|t| t == base) {
        return base.to_string();
    }
    (2..)
        .map(|n| format!("{}-{}", base, n))
        .find(|candidate| !taken.iter().any(|t| t == candidate))
        .unwrap_or_else(|| base.to_string())
}

impl SessionHost for TmuxHost {
    fn sessions(&self) -> Result<Vec<SessionHandle>> {
        Ok(self
            .client
            .list_sessions()?
            .into_iter()
            .map(|name| self.handle(name))
            .collect())
    }

    fn find_session(&self, name: &str) -> Result<Option<SessionHandle>> {
        let wanted = sanitize_session_name(name);
        Ok(self
            .client
            .list_sessions()?
            .into_iter()
            .find(|s| *s == wanted)
            .map(|s| self.handle(s)))
    }

    fn create_session(&self, name: &str) -> Result<SessionHandle> {
        let base = sanitize_session_name(name);
        let taken = self.client.list_sessions()?;
        let actual = unique_name(&base, &taken);
        debug!("Creating tmux session '{}' for '{}'", actual, name);
        self.client.create_session(&actual)?;
        Ok(self.handle(actual))
    }
}
