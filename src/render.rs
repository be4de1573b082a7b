//! Plain-text rendering of the script inventory

use std::fmt::Write;

use scriptdeck_core::inventory::{Inventory, PackageEntry};

/// Label used for the workspace root package
const ROOT_LABEL: &str = "(root)";

/// Render the inventory as an indented listing.
///
/// Packages without scripts are hidden unless `all` is set.
pub fn render_inventory(inventory: &Inventory, manifest_name: &str, all: bool) -> String {
    let entries: Vec<&PackageEntry> = if all {
        inventory.entries().iter().collect()
    } else {
        inventory.visible_entries().collect()
    };

    let mut out = String::new();
    if entries.is_empty() {
        let _ = writeln!(out, "No scripts found in any {} files", manifest_name);
    }

    for entry in entries {
        let key = if entry.is_root() { ROOT_LABEL } else { &entry.key };
        let _ = writeln!(out, "{} [{}]", entry.display_name, key);

        let width = entry.tasks.names().map(str::len).max().unwrap_or(0);
        for task in entry.tasks.iter() {
            let _ = writeln!(out, "  {:<width$}  {}", task.name, task.command, width = width);
        }
    }

    let unreadable = inventory.unreadable();
    if !unreadable.is_empty() {
        let _ = writeln!(out, "\nSkipped {} unreadable manifest(s):", unreadable.len());
        for skipped in unreadable {
            let _ = writeln!(out, "  {}", skipped.reason);
        }
    }
    out
}
