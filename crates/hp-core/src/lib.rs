//! # hp-core
//!
//! Shared error types for the hepplotting workspace.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;

pub use error::{Error, Result};

/// Workspace version, stamped into artifacts.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
