pub mod config;
pub mod data;
pub mod grid;
pub mod i18n;
pub mod preferences;
pub mod services;
pub mod ui;
pub mod utils;
