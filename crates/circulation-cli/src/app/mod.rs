//! Application-level utilities for the Circulation CLI.
//!
//! This module provides:
//! - Path resolution for config and store files
//! - The lazily-configured application context

mod context;
mod resolver;

// Re-export public API
pub use context::{open_store, AppContext};
pub use resolver::{resolve_config_path, StoreTarget};
