//! Core constants shared across ruleforge crates.
//!
//! This crate provides:
//! - Default configuration values
//! - Common project metadata

pub mod defaults;

pub use defaults::*;

/// Project name.
pub const PROJECT_NAME: &str = "ruleforge";
/// Project version (from Cargo.toml).
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
