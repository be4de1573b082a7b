//! Core library for scriptdeck.
//!
//! Discovers `package.json` manifests across one or more workspace roots,
//! aggregates their scripts into an ordered [`inventory::Inventory`], and
//! dispatches selected scripts into shared or isolated execution sessions
//! through the [`session::SessionHost`] seam.
//!
//! Consumers should go through [`api::ScriptDeckCore`].

pub mod api;
pub mod config;
pub mod inventory;
pub mod manifest;
pub mod monitor;
pub mod session;
pub mod state;
pub mod tmux;
pub mod workspace;
