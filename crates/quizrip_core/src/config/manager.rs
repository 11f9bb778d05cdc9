//! Config manager for loading and saving settings.
//!
//! Key features:
//! - Atomic writes (write to temp file, then rename)
//! - Validation on load (unknown sections are dropped on rewrite)
//! - Defaults filled in for missing keys

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use thiserror::Error;
use toml_edit::DocumentMut;

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

/// Manages application configuration.
pub struct ConfigManager {
    /// Path to the config file.
    config_path: PathBuf,
    /// Current settings loaded in memory.
    settings: Settings,
}

impl ConfigManager {
    /// Create a new config manager with the given config file path.
    ///
    /// Does not load the config - call `load()` or `load_or_create()` after.
    pub fn new(config_path: impl Into<PathBuf>) -> Self {
        Self {
            config_path: config_path.into(),
            settings: Settings::default(),
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

    /// Consume the manager, keeping the loaded settings.
    pub fn into_settings(self) -> Settings {
        self.settings
    }

    /// Load config from file.
    ///
    /// Returns error if file doesn't exist.
    pub fn load(&mut self) -> ConfigResult<()> {
        if !self.config_path.exists() {
            return Err(ConfigError::NotFound(self.config_path.clone()));
        }

        let content = fs::read_to_string(&self.config_path)?;
        self.settings = toml::from_str(&content)?;
        Ok(())
    }

    /// Load config from file, creating with defaults if it doesn't exist.
    ///
    /// Also validates and cleans up the config, saving if changes were made.
    pub fn load_or_create(&mut self) -> ConfigResult<()> {
        if self.config_path.exists() {
            let content = fs::read_to_string(&self.config_path)?;
            let (settings, was_modified) = parse_validate_and_clean(&content)?;
            self.settings = settings;

            if was_modified {
                tracing::debug!("Rewriting {} with defaults", self.config_path.display());
                self.save()?;
            }
        } else {
            self.settings = Settings::default();
            self.save()?;
        }
        Ok(())
    }

    /// Save the entire config atomically.
    pub fn save(&self) -> ConfigResult<()> {
        let content = generate_config_with_comments(&self.settings)?;
        self.atomic_write(&content)?;
        Ok(())
    }

    /// Write content to config file atomically.
    ///
    /// Writes to a temp file in the same directory first, then renames.
    fn atomic_write(&self, content: &str) -> io::Result<()> {
        if let Some(parent) = self.config_path.parent() {
            fs::create_dir_all(parent)?;
        }

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

/// Parse config content and report whether it needs rewriting.
///
/// A rewrite is needed when the file has unknown sections or lacks keys
/// that were filled from defaults.
fn parse_validate_and_clean(content: &str) -> ConfigResult<(Settings, bool)> {
    let doc: DocumentMut = content.parse()?;

    // Missing fields get their defaults here.
    let settings: Settings = toml::from_str(content)?;

    let has_unknown = doc.iter().any(|(key, _)| {
        !ConfigSection::all()
            .iter()
            .any(|section| section.table_name() == key)
    });

    let has_missing = ConfigSection::all().iter().any(|section| {
        let defaults = section_toml(&settings, *section).unwrap_or_default();
        let present = doc.get(section.table_name()).and_then(|item| item.as_table());
        match present {
            Some(table) => defaults
                .lines()
                .filter_map(|line| line.split('=').next())
                .map(str::trim)
                .filter(|key| !key.is_empty())
                .any(|key| !table.contains_key(key)),
            None => true,
        }
    });

    Ok((settings, has_unknown || has_missing))
}

/// Serialize one section's body (without its table header).
fn section_toml(settings: &Settings, section: ConfigSection) -> ConfigResult<String> {
    let body = match section {
        ConfigSection::Paths => toml::to_string_pretty(&settings.paths)?,
        ConfigSection::Tools => toml::to_string_pretty(&settings.tools)?,
        ConfigSection::Encoding => toml::to_string_pretty(&settings.encoding)?,
        ConfigSection::Overlap => toml::to_string_pretty(&settings.overlap)?,
        ConfigSection::Logging => toml::to_string_pretty(&settings.logging)?,
        ConfigSection::Run => toml::to_string_pretty(&settings.run)?,
    };
    Ok(body)
}

/// Generate config content with helpful comments.
fn generate_config_with_comments(settings: &Settings) -> ConfigResult<String> {
    let mut output = String::new();

    output.push_str("# quizrip configuration\n");
    output.push_str("# Missing keys fall back to their defaults.\n\n");

    for section in ConfigSection::all() {
        output.push_str(&format!("# {}\n", section.description()));
        output.push_str(&format!("[{}]\n", section.table_name()));
        for line in section_toml(settings, *section)?.lines() {
            output.push_str(line);
            output.push('\n');
        }
        output.push('\n');
    }

    Ok(output)
}
