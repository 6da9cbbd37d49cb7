//! User interface layer
//!
//! The terminal app, the item views it switches between, and the theme
//! helpers they draw with.

pub mod actions;
pub mod app;
pub mod detail_view;
pub mod filter_bar;
pub mod grid_renderer;
pub mod key_mapper;
pub mod list_view;
pub mod theme;
pub mod tints;

pub use app::CrudApp;
