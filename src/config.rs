//! Configuration types and loading.

use serde::Deserialize;
use std::path::Path;
use thiserror::Error;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Top-level runtime configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Bot identity and default behavior.
    #[serde(default)]
    pub bot: BotConfig,
    /// Module autoload configuration.
    #[serde(default)]
    pub modules: ModulesConfig,
    /// Static id/name directory for the stdio client.
    #[serde(default)]
    pub directory: DirectoryConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }
}

/// Bot identity and default settings seeded into [`crate::settings::Settings`].
#[derive(Debug, Clone, Deserialize)]
pub struct BotConfig {
    /// Display name of the bot.
    #[serde(default = "default_bot_name")]
    pub name: String,
    /// Default channel for console-originated sends.
    #[serde(default = "default_send_channel")]
    pub send_channel: String,
    /// Whether typing indicators are logged.
    #[serde(default)]
    pub show_typing: bool,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            name: default_bot_name(),
            send_channel: default_send_channel(),
            show_typing: false,
        }
    }
}

fn default_bot_name() -> String {
    "chatterd".to_string()
}

fn default_send_channel() -> String {
    "general".to_string()
}

/// Which modules to load at startup.
#[derive(Debug, Clone, Deserialize)]
pub struct ModulesConfig {
    /// Modules loaded at startup, in order. A failed load is logged and
    /// skipped, never fatal.
    #[serde(default = "default_autoload")]
    pub autoload: Vec<String>,
}

impl Default for ModulesConfig {
    fn default() -> Self {
        Self {
            autoload: default_autoload(),
        }
    }
}

fn default_autoload() -> Vec<String> {
    vec!["log".to_string(), "console".to_string(), "admin".to_string()]
}

/// Static channel/user directories for the stdio client.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DirectoryConfig {
    #[serde(default)]
    pub channels: Vec<DirectoryEntry>,
    #[serde(default)]
    pub users: Vec<DirectoryEntry>,
}

/// One id → display-name mapping.
#[derive(Debug, Clone, Deserialize)]
pub struct DirectoryEntry {
    pub id: String,
    pub name: String,
}
