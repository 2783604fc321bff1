//! Application configuration module.
//!
//! Manages the TOML config file holding the TMDB connection settings
//! and browser tuning knobs.

#[allow(clippy::module_inception)]
mod config;
mod paths;

#[allow(clippy::module_name_repetitions)]
pub use config::{API_KEY_ENV, AppConfig, BrowserConfig};
pub use paths::{resolve_config_dir, resolve_config_path};
