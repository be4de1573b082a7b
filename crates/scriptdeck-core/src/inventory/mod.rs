//! Inventory of discovered packages and their tasks

mod builder;
mod types;

pub use builder::{build_inventory, InventoryBuilder};
pub use types::{compare_keys, Inventory, PackageEntry, UnreadableManifest};
