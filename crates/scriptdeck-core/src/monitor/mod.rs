//! Change monitoring for manifest files

mod debounce;
mod watcher;

pub use debounce::next_batch;
pub use watcher::{ChangeMonitor, EventFilter, WorkspaceEvent};
