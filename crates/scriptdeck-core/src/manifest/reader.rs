use serde::Deserialize;
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};

use super::tasks::TaskSet;

/// Why a manifest could not be used
#[derive(Debug, Error)]
pub enum ManifestError {
    /// The file vanished or could not be read
    #[error("failed to read manifest {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The content is not a valid manifest
    #[error("failed to parse manifest {path:?}: {source}")]
    Malformed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl ManifestError {
    pub fn path(&self) -> &Path {
        match self {
            ManifestError::Io { path, .. } | ManifestError::Malformed { path, .. } => path,
        }
    }
}

/// Parsed manifest content
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Manifest {
    /// Declared package name (`None` when absent or empty)
    pub name: Option<String>,
    /// Declared scripts
    pub tasks: TaskSet,
}

/// Raw `package.json` structure; unknown fields are ignored
#[derive(Debug, Deserialize)]
struct RawManifest {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    scripts: Option<Map<String, Value>>,
}

impl Manifest {
    /// Parse manifest content
    pub fn parse(content: &str) -> Result<Self, serde_json::Error> {
        // npm tolerates a leading byte-order mark
        let content = content.strip_prefix('\u{feff}').unwrap_or(content);
        let raw: RawManifest = serde_json::from_str(content)?;

        let mut tasks = TaskSet::new();
        for (name, value) in raw.scripts.unwrap_or_default() {
            match value {
                Value::String(command) => tasks.insert(name, command),
                other => debug!("Skipping script '{}' with non-string command: {}", name, other),
            }
        }

        Ok(Self {
            name: raw.name.filter(|n| !n.trim().is_empty()),
            tasks,
        })
    }
}

/// Read and parse one manifest
pub fn try_read_manifest(path: &Path) -> Result<Manifest, ManifestError> {
    let content = std::fs::read_to_string(path).map_err(|source| ManifestError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    Manifest::parse(&content).map_err(|source| ManifestError::Malformed {
        path: path.to_path_buf(),
        source,
    })
}

/// Read one manifest, logging and swallowing any failure
pub fn read_manifest(path: &Path) -> Option<Manifest> {
    match try_read_manifest(path) {
        Ok(manifest) => Some(manifest),
        Err(e) => {
            warn!("{}", e);
            None
        }
    }
}
