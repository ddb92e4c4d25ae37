//! Configuration management for dockwatch
//!
//! Settings live in `config.toml`; the same directory holds the inventory
//! document and the activity log.

mod manager;
pub mod settings;

pub use manager::{CONFIG_DIR_ENV, ConfigManager};
pub use settings::{AppSettings, LoggingSettings};
