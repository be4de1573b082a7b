use anyhow::{Context, Result};
use notify::event::{ModifyKind, RenameMode};
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use std::path::{Path, PathBuf};
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::config::ScanSettings;
use crate::workspace::{absolute_root, contains_excluded_segment};

/// Something that changed in the workspace
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkspaceEvent {
    ManifestCreated(PathBuf),
    ManifestChanged(PathBuf),
    ManifestDeleted(PathBuf),
    /// The set of workspace roots changed (first = primary)
    RootsChanged(Vec<PathBuf>),
}

/// Decides which raw file events concern manifests
#[derive(Debug, Clone)]
pub struct EventFilter {
    roots: Vec<PathBuf>,
    settings: ScanSettings,
}

impl EventFilter {
    pub fn new(roots: Vec<PathBuf>, settings: ScanSettings) -> Self {
        Self { roots, settings }
    }

    /// Whether `path` is a manifest outside any excluded directory
    pub fn is_manifest(&self, path: &Path) -> bool {
        let named = path
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| n == self.settings.manifest_name);
        if !named {
            return false;
        }

        let relative = self
            .roots
            .iter()
            .find_map(|root| path.strip_prefix(root).ok())
            .unwrap_or(path);
        !contains_excluded_segment(relative, &self.settings)
    }

    /// Translate a raw watcher event into workspace events
    pub fn classify(&self, event: &Event) -> Vec<WorkspaceEvent> {
        let manifests = |ctor: fn(PathBuf) -> WorkspaceEvent| -> Vec<WorkspaceEvent> {
            event
                .paths
                .iter()
                .filter(|p| self.is_manifest(p))
                .map(|p| ctor(p.clone()))
                .collect()
        };

        match &event.kind {
            EventKind::Create(_) => manifests(WorkspaceEvent::ManifestCreated),
            EventKind::Remove(_) => manifests(WorkspaceEvent::ManifestDeleted),
            EventKind::Modify(ModifyKind::Name(RenameMode::From)) => {
                manifests(WorkspaceEvent::ManifestDeleted)
            }
            EventKind::Modify(ModifyKind::Name(RenameMode::To)) => {
                manifests(WorkspaceEvent::ManifestCreated)
            }
            EventKind::Modify(ModifyKind::Name(RenameMode::Both)) => {
                // paths = [from, to]
                let mut out = Vec::new();
                if let Some(from) = event.paths.first().filter(|p| self.is_manifest(p)) {
                    out.push(WorkspaceEvent::ManifestDeleted(from.clone()));
                }
                if let Some(to) = event.paths.get(1).filter(|p| self.is_manifest(p)) {
                    out.push(WorkspaceEvent::ManifestCreated(to.clone()));
                }
                out
            }
            EventKind::Modify(ModifyKind::Metadata(_)) => Vec::new(),
            EventKind::Modify(_) => manifests(WorkspaceEvent::ManifestChanged),
            EventKind::Access(_) | EventKind::Any | EventKind::Other => Vec::new(),
        }
    }
}

/// Watches workspace roots and forwards manifest events.
///
/// Watching stops when the monitor is dropped.
pub struct ChangeMonitor {
    _watcher: RecommendedWatcher,
    roots: Vec<PathBuf>,
}

impl ChangeMonitor {
    /// Start watching `roots` recursively
    ///
    /// A root that cannot be watched is logged and skipped.
    pub fn start(
        roots: &[PathBuf],
        settings: &ScanSettings,
        tx: mpsc::UnboundedSender<WorkspaceEvent>,
    ) -> Result<Self> {
        let roots: Vec<PathBuf> = roots.iter().map(|r| absolute_root(r)).collect();
        let filter = EventFilter::new(roots.clone(), settings.clone());

        let mut watcher = notify::recommended_watcher(move |res: notify::Result<Event>| {
            match res {
                Ok(event) => {
                    for change in filter.classify(&event) {
                        debug!("Manifest event: {:?}", change);
                        // Receiver gone means the consumer shut down
                        let _ = tx.send(change);
                    }
                }
                Err(e) => warn!("File watch error: {}", e),
            }
        })
        .context("Failed to create file watcher")?;

        let mut watched = Vec::new();
        for root in &roots {
            match watcher.watch(root, RecursiveMode::Recursive) {
                Ok(()) => watched.push(root.clone()),
                Err(e) => warn!("Cannot watch {:?}: {}", root, e),
            }
        }

        Ok(Self {
            _watcher: watcher,
            roots: watched,
        })
    }

    /// Roots actually being watched
    pub fn roots(&self) -> &[PathBuf] {
        &self.roots
    }
}
