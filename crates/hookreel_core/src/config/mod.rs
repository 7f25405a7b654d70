//! Configuration management for hookreel.
//!
//! This module provides:
//! - TOML-based settings with logical sections, every key defaulted
//! - Loading that tolerates a missing file and reports unknown tables
//! - Atomic writes of a commented default file
//!
//! Job inputs (locators, captions) are not settings; they arrive through the
//! CLI and end up in a [`crate::models::JobSpec`].
//!
//! # Example
//!
//! ```no_run
//! use hookreel_core::config::ConfigManager;
//!
//! let mut config = ConfigManager::new("hookreel.toml");
//! config.load_or_default().unwrap();
//!
//! println!("ffmpeg: {}", config.settings().tools.ffmpeg_path);
//! ```

mod manager;
mod settings;

pub use manager::{ConfigError, ConfigManager, ConfigResult};
pub use settings::{
    ConfigSection, FetchSettings, LoggingSettings, OverlaySettings, PathSettings, Settings,
    ToolSettings,
};
