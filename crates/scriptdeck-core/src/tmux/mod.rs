mod client;
mod host;

pub use client::{sanitize_session_name, TmuxClient};
pub use host::{unique_name, TmuxHost, TmuxSessionHandle};
