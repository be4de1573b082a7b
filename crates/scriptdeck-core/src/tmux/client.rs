use anyhow::{Context, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use std::process::Command;

/// Characters tmux accepts in a session name we generate
static UNSAFE_NAME_CHARS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^A-Za-z0-9_-]+").expect("Invalid UNSAFE_NAME_CHARS regex"));

/// Valid session target: a sanitized name
static SESSION_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9_-]+$").expect("Invalid SESSION_PATTERN regex"));

/// Turn an arbitrary session name into one tmux accepts
///
/// tmux rejects `.` and `:` in session names; everything outside
/// `[A-Za-z0-9_-]` collapses to a single `_`.
pub fn sanitize_session_name(name: &str) -> String {
    let cleaned = UNSAFE_NAME_CHARS.replace_all(name.trim(), "_");
    let cleaned = cleaned.trim_matches('_');
    if cleaned.is_empty() {
        "session".to_string()
    } else {
        cleaned.to_string()
    }
}

/// Validate a session target to prevent option injection
fn validate_session(target: &str) -> Result<()> {
    if !SESSION_PATTERN.is_match(target) {
        anyhow::bail!("Invalid tmux session name: {}", target);
    }
    Ok(())
}

/// Client for interacting with tmux
#[derive(Debug, Clone, Default)]
pub struct TmuxClient;

impl TmuxClient {
    /// Creates a new TmuxClient
    pub fn new() -> Self {
        Self
    }

    /// Check if tmux is installed and a server answers
    pub fn is_available(&self) -> bool {
        Command::new("tmux")
            .arg("-V")
            .output()
            .map(|o| o.status.success())
            .unwrap_or(false)
    }

    /// Whether this process runs inside a tmux client
    pub fn inside_tmux(&self) -> bool {
        std::env::var_os("TMUX").is_some()
    }

    /// Lists all session names
    ///
    /// No running server means no sessions, not an error.
    pub fn list_sessions(&self) -> Result<Vec<String>> {
        let output = Command::new("tmux")
            .args(["list-sessions", "-F", "#{session_name}"])
            .output()
            .context("Failed to execute tmux list-sessions")?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            if stderr.contains("no server running") || stderr.contains("error connecting") {
                return Ok(Vec::new());
            }
            anyhow::bail!("tmux list-sessions failed: {}", stderr);
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        Ok(stdout.lines().map(|s| s.to_string()).collect())
    }

    /// Create a new detached session
    pub fn create_session(&self, name: &str) -> Result<()> {
        validate_session(name)?;
        let output = Command::new("tmux")
            .args(["new-session", "-d", "-s", name])
            .output()
            .context("Failed to execute tmux new-session")?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            anyhow::bail!("tmux new-session failed for {}: {}", name, stderr);
        }

        Ok(())
    }

    /// Sends literal text (with -l flag) to a session
    pub fn send_keys_literal(&self, target: &str, keys: &str) -> Result<()> {
        validate_session(target)?;
        let output = Command::new("tmux")
            .args(["send-keys", "-t", target, "-l", keys])
            .output()
            .context("Failed to execute tmux send-keys")?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            anyhow::bail!("tmux send-keys failed for {}: {}", target, stderr);
        }

        Ok(())
    }

    /// Sends a key name (e.g. `Enter`) to a session
    pub fn send_keys(&self, target: &str, keys: &str) -> Result<()> {
        validate_session(target)?;
        let output = Command::new("tmux")
            .args(["send-keys", "-t", target, keys])
            .output()
            .context("Failed to execute tmux send-keys")?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            anyhow::bail!("tmux send-keys failed for {}: {}", target, stderr);
        }

        Ok(())
    }

    /// Type a command and press Enter
    pub fn send_text_and_enter(&self, target: &str, text: &str) -> Result<()> {
        self.send_keys_literal(target, text)?;
        self.send_keys(target, "Enter")?;
        Ok(())
    }

    /// Switch the attached client to a session
    pub fn switch_client(&self, target: &str) -> Result<()> {
        validate_session(target)?;
        let output = Command::new("tmux")
            .args(["switch-client", "-t", target])
            .output()
            .context("Failed to execute tmux switch-client")?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            anyhow::bail!("tmux switch-client failed for {}: {}", target, stderr);
        }

        Ok(())
    }
}
