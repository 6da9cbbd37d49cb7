//! Utility functions and helpers
//!
//! Paths, logging and the in-memory log buffer shown in the debug pane.

pub mod app_paths;
pub mod dual_logging;
pub mod logging;
