//! Configuration management for quizrip.
//!
//! This module provides:
//! - TOML-based configuration with logical sections
//! - Atomic file writes (write to temp, then rename)
//! - Validation on load with automatic defaults
//!
//! # Example
//!
//! ```no_run
//! use quizrip_core::config::ConfigManager;
//!
//! // Create manager and load (or create default) config
//! let mut config = ConfigManager::new(".config/quizrip.toml");
//! config.load_or_create().unwrap();
//!
//! // Read settings
//! println!("Mixer: {}", config.settings().tools.mixer);
//! ```

mod manager;
mod settings;

pub use manager::{ConfigError, ConfigManager, ConfigResult};
pub use settings::{
    ConfigSection, EncodingSettings, LoggingSettings, OverlapSettings, PathSettings, RunSettings,
    Settings, ToolSettings,
};
