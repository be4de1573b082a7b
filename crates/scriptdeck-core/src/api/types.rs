//! API error types

use thiserror::Error;

/// Errors returned by [`ScriptDeckCore`](super::ScriptDeckCore) actions
#[derive(Debug, Error)]
pub enum ApiError {
    /// No workspace root is configured
    #[error("no workspace root configured")]
    NoWorkspace,

    /// No package has this key
    #[error("package not found: {key}")]
    PackageNotFound { key: String },

    /// The package does not declare the task
    #[error("task '{task}' not found in package {package}")]
    TaskNotFound { package: String, task: String },

    /// Several packages declare the task and none was chosen
    #[error("task '{task}' is declared by several packages: {}", .candidates.join(", "))]
    AmbiguousTask {
        task: String,
        candidates: Vec<String>,
    },

    /// No session host was configured
    #[error("session host not available")]
    NoSessionHost,

    /// A handler received an action it does not handle
    #[error("invalid input: {message}")]
    InvalidInput { message: String },

    /// The session host rejected a command
    #[error("dispatch failed: {0}")]
    Dispatch(#[from] anyhow::Error),
}
