//! Typed client for the terminal proxy's `/api` endpoints.

pub mod client;
pub mod types;

pub use client::TerminalClient;
pub use types::*;
