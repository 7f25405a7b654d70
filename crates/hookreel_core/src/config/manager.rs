//! Config manager for loading and saving the settings file.
//!
//! Key features:
//! - Missing file falls back to defaults (CI runs usually have none)
//! - Unknown top-level tables are reported, not fatal
//! - Atomic writes (write to temp file, then rename)
//! - Generated files carry a comment above each section

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use thiserror::Error;
use toml_edit::{DocumentMut, Item};

use super::settings::{ConfigSection, Settings};

/// Errors that can occur during config operations.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] io::Error),

    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Failed to serialize config: {0}")]
    SerializeError(#[from] toml::ser::Error),

    #[error("Failed to parse config for editing: {0}")]
    EditParseError(#[from] toml_edit::TomlError),

    #[error("Config file not found: {0}")]
    NotFound(PathBuf),
}

/// Result type for config operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Loads and saves the settings file.
pub struct ConfigManager {
    /// Path to the config file.
    config_path: PathBuf,
    /// Current settings loaded in memory.
    settings: Settings,
    /// Top-level tables found in the file that no section claims.
    unknown_sections: Vec<String>,
}

impl ConfigManager {
    /// Create a new config manager with the given config file path.
    ///
    /// Does not load the config - call `load()` or `load_or_default()` after.
    pub fn new(config_path: impl Into<PathBuf>) -> Self {
        Self {
            config_path: config_path.into(),
            settings: Settings::default(),
            unknown_sections: Vec::new(),
        }
    }

    /// Get the config file path.
    pub fn path(&self) -> &Path {
        &self.config_path
    }

    /// Get a reference to the current settings.
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Consume the manager, keeping only the settings.
    pub fn into_settings(self) -> Settings {
        self.settings
    }

    /// Tables in the loaded file that were ignored.
    pub fn unknown_sections(&self) -> &[String] {
        &self.unknown_sections
    }

    /// Load config from file.
    ///
    /// Returns error if file doesn't exist.
    pub fn load(&mut self) -> ConfigResult<()> {
        if !self.config_path.exists() {
            return Err(ConfigError::NotFound(self.config_path.clone()));
        }

        let content = fs::read_to_string(&self.config_path)?;
        let (settings, unknown) = parse_and_validate(&content)?;

        for name in &unknown {
            tracing::warn!(
                "Ignoring unknown section [{}] in {}",
                name,
                self.config_path.display()
            );
        }

        self.settings = settings;
        self.unknown_sections = unknown;
        Ok(())
    }

    /// Load config from file, keeping defaults if it doesn't exist.
    ///
    /// The file is never created or rewritten here.
    pub fn load_or_default(&mut self) -> ConfigResult<()> {
        if self.config_path.exists() {
            self.load()
        } else {
            tracing::debug!(
                "No config at {}, using defaults",
                self.config_path.display()
            );
            self.settings = Settings::default();
            self.unknown_sections.clear();
            Ok(())
        }
    }

    /// Save the entire config atomically.
    pub fn save(&self) -> ConfigResult<()> {
        let content = generate_config_with_comments(&self.settings)?;
        self.atomic_write(&content)?;
        Ok(())
    }

    /// Write content to config file atomically.
    ///
    /// Writes to a temp file first, then renames.
    fn atomic_write(&self, content: &str) -> io::Result<()> {
        if let Some(parent) = self.config_path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        // Temp file in the same directory so the rename stays on one filesystem
        let temp_path = self.config_path.with_extension("toml.tmp");

        {
            let mut file = fs::File::create(&temp_path)?;
            file.write_all(content.as_bytes())?;
            file.sync_all()?;
        }

        fs::rename(&temp_path, &self.config_path)?;

        Ok(())
    }
}

/// Parse settings and list top-level tables no section claims.
fn parse_and_validate(content: &str) -> ConfigResult<(Settings, Vec<String>)> {
    let doc: DocumentMut = content.parse()?;
    let settings: Settings = toml::from_str(content)?;

    let unknown = doc
        .iter()
        .map(|(key, _)| key)
        .filter(|key| ConfigSection::from_table_name(key).is_none())
        .map(|key| key.to_string())
        .collect();

    Ok((settings, unknown))
}

/// Serialize settings with a comment above every section.
fn generate_config_with_comments(settings: &Settings) -> ConfigResult<String> {
    let body = toml::to_string_pretty(settings)?;
    let mut doc: DocumentMut = body.parse()?;

    for section in ConfigSection::ALL {
        if let Some(Item::Table(table)) = doc.get_mut(section.table_name()) {
            table.set_implicit(false);
            table
                .decor_mut()
                .set_prefix(format!("\n# {}\n", section.comment()));
        }
    }

    let mut output = String::new();
    output.push_str("# hookreel configuration\n");
    output.push_str("# Every key is optional; missing keys use built-in defaults.\n");
    output.push_str(&doc.to_string());
    Ok(output)
}
