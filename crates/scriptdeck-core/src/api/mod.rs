//! Public API layer (Facade) for scriptdeck-core.
//!
//! This module provides [`ScriptDeckCore`], a high-level entry-point that
//! encapsulates all core services and exposes typed query/action methods.
//! Consumers (CLI, watchers, editor integrations) should use this API instead
//! of directly operating on `SharedState`.
//!
//! # Quick Start
//!
//! ```ignore
//! use scriptdeck_core::api::{ScriptDeckCore, ScriptDeckCoreBuilder};
//!
//! let core = ScriptDeckCoreBuilder::new(settings)
//!     .with_roots(vec![cwd])
//!     .build();
//!
//! let inventory = core.refresh();
//! let mut rx = core.subscribe();
//! ```

mod actions;
mod builder;
mod core;
pub mod dispatch;
pub mod events;
mod queries;
pub mod types;

pub use builder::ScriptDeckCoreBuilder;
pub use core::ScriptDeckCore;
pub use dispatch::{CoreInput, EventDispatcher, EventKind, UserAction};
pub use events::CoreEvent;
pub use types::ApiError;
