//! Configuration management for codewalk
//!
//! codewalk stores configuration in ~/.codewalk/config.toml

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Largest accepted `display.context_lines`
pub const MAX_CONTEXT_LINES: usize = 20;

/// codewalk configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Snippet display settings
    #[serde(default)]
    pub display: DisplayConfig,

    /// Debug logging settings
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisplayConfig {
    /// Lines of leading context shown before a highlight
    #[serde(default = "default_context_lines")]
    pub context_lines: Option<usize>,

    /// Colorize terminal output
    #[serde(default = "default_color")]
    pub color: Option<bool>,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            context_lines: Some(4),
            color: Some(true),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Write debug logs to ~/.codewalk/codewalk.log
    #[serde(default = "default_debug")]
    pub debug: Option<bool>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { debug: Some(false) }
    }
}

// Default functions for serde
fn default_context_lines() -> Option<usize> { Some(4) }
fn default_color() -> Option<bool> { Some(true) }
fn default_debug() -> Option<bool> { Some(false) }

impl Config {
    pub fn context_lines(&self) -> usize {
        self.display.context_lines.unwrap_or(4)
    }

    pub fn color(&self) -> bool {
        self.display.color.unwrap_or(true)
    }

    pub fn debug(&self) -> bool {
        self.logging.debug.unwrap_or(false)
    }
}

/// Get the configuration directory, creating it if needed
pub fn config_dir() -> Result<PathBuf> {
    let home_dir = dirs::home_dir()
        .ok_or_else(|| anyhow::anyhow!("Cannot determine home directory"))?;

    let config_dir = home_dir.join(".codewalk");
    fs::create_dir_all(&config_dir)
        .with_context(|| format!("Failed to create config directory: {}", config_dir.display()))?;

    Ok(config_dir)
}

/// Get the configuration file path
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join("config.toml"))
}

/// Get the default configuration file content with comments
fn get_default_config_content() -> &'static str {
    r#"# codewalk Configuration File
#
# Values set here can be overridden by command-line flags.

[display]
# Lines of leading context shown before a highlighted fragment (default: 4, max: 20)
context_lines = 4

# Colorize output when writing to a terminal (default: true)
# The NO_COLOR environment variable always disables color.
color = true

[logging]
# Write debug logs to ~/.codewalk/codewalk.log (default: false)
# Setting CODEWALK_DEBUG in the environment has the same effect.
debug = false
"#
}

/// Write the default commented configuration file to `path`
pub fn save_default_config_to(path: &Path) -> Result<()> {
    fs::write(path, get_default_config_content())
        .with_context(|| format!("Failed to write default config file: {}", path.display()))
}

/// Load configuration from `path`, creating the default file if needed
///
/// A malformed file is replaced with the defaults.
pub fn load_config_from(path: &Path) -> Result<Config> {
    if !path.exists() {
        save_default_config_to(path)?;
    }

    let config_str = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: Config = match toml::from_str(&config_str) {
        Ok(config) => config,
        Err(e) => {
            tracing::warn!(
                path = %path.display(),
                error = %e,
                "malformed config, restoring defaults"
            );
            save_default_config_to(path)?;
            return Ok(Config::default());
        }
    };

    Ok(config)
}

/// Load configuration from ~/.codewalk/config.toml
pub fn load_config() -> Result<Config> {
    load_config_from(&config_file_path()?)
}

/// Validate configuration values
pub fn validate_config(config: &Config) -> Result<()> {
    if let Some(context) = config.display.context_lines {
        if context > MAX_CONTEXT_LINES {
            anyhow::bail!("Invalid context_lines: {} (max {})", context, MAX_CONTEXT_LINES);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.display.context_lines, Some(4));
        assert_eq!(config.display.color, Some(true));
        assert_eq!(config.logging.debug, Some(false));
        assert_eq!(config.context_lines(), 4);
        assert!(config.color());
        assert!(!config.debug());
    }

    #[test]
    fn test_default_content_parses_to_defaults() {
        let config: Config = toml::from_str(get_default_config_content()).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_validate_config() {
        let mut config = Config::default();
        assert!(validate_config(&config).is_ok());

        config.display.context_lines = Some(MAX_CONTEXT_LINES + 1);
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_partial_config_keeps_defaults() {
        let config: Config = toml::from_str("[display]\ncontext_lines = 2\n").unwrap();
        assert_eq!(config.context_lines(), 2);
        assert!(config.color());
        assert!(!config.debug());
    }

    #[test]
    fn test_load_config_creates_default_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");

        let config = load_config_from(&path).unwrap();
        assert_eq!(config, Config::default());
        assert!(path.exists());
    }

    #[test]
    fn test_load_config_replaces_malformed_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[display\ncontext_lines = ").unwrap();

        let config = load_config_from(&path).unwrap();
        assert_eq!(config, Config::default());
        let restored = fs::read_to_string(&path).unwrap();
        assert!(restored.contains("[display]"));
    }

    #[test]
    fn test_config_to_toml() {
        let config = Config::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        assert!(toml_str.contains("[display]"));
        assert!(toml_str.contains("[logging]"));
    }
}
