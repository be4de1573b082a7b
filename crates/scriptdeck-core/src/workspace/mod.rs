//! Workspace discovery: finding manifests under workspace roots

mod paths;
mod scanner;

pub use paths::{
    absolute_manifest_path, absolute_root, contains_excluded_segment, relative_key, ROOT_KEY,
};
pub use scanner::{ScanError, WorkspaceScanner};
