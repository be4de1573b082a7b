//! Task manifest (`package.json`) parsing

mod reader;
mod tasks;

pub use reader::{read_manifest, try_read_manifest, Manifest, ManifestError};
pub use tasks::{Task, TaskSet};
