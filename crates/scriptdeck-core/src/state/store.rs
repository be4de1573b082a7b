use parking_lot::RwLock;
use std::path::PathBuf;
use std::sync::Arc;

use crate::inventory::Inventory;
use crate::session::SessionMode;

/// Shared state type alias
pub type SharedState = Arc<RwLock<AppState>>;

/// Process-scoped state, created at startup and dropped at shutdown
#[derive(Debug, Default)]
pub struct AppState {
    /// Latest completed inventory snapshot
    pub inventory: Arc<Inventory>,
    /// Workspace roots (first = primary)
    pub roots: Vec<PathBuf>,
    /// Whether the entry point (status item / menu) should be shown
    pub entry_point_visible: bool,
    /// Remembered session mode preference
    pub session_mode: SessionMode,
    /// Number of completed refreshes
    pub refresh_count: u64,
}

impl AppState {
    pub fn new(roots: Vec<PathBuf>, session_mode: SessionMode) -> Self {
        Self {
            roots,
            session_mode,
            ..Self::default()
        }
    }

    /// Create a new shared state with default values
    pub fn shared() -> SharedState {
        Arc::new(RwLock::new(Self::default()))
    }

    /// Wrap this state for sharing
    pub fn into_shared(self) -> SharedState {
        Arc::new(RwLock::new(self))
    }

    /// Swap in a freshly built inventory.
    ///
    /// Returns `true` when entry-point visibility flipped.
    pub fn replace_inventory(&mut self, inventory: Inventory) -> bool {
        let visible = inventory.has_manifests();
        let flipped = visible != self.entry_point_visible;

        self.inventory = Arc::new(inventory);
        self.entry_point_visible = visible;
        self.refresh_count += 1;
        flipped
    }
}
