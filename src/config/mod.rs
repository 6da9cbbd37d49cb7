//! Configuration module
//!
//! Settings loaded from `config.toml` in the user's config directory.

pub mod config;

pub use config::{BackendKind, Config};
