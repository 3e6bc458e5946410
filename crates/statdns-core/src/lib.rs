//! Core types and constants shared across statdns crates.
//!
//! This crate provides:
//! - Default configuration values
//! - Logging configuration and subscriber setup
//! - Bidirectional relay used by the proxy engine

pub mod defaults;
pub mod io;
pub mod logging;

pub use defaults::*;
pub use logging::{LoggingConfig, init_tracing};

/// Project name.
pub const PROJECT_NAME: &str = "statdns";
/// Project version (from Cargo.toml).
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
