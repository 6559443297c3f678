use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
/// Enumerates supported `RuntimeMode` values.
pub enum RuntimeMode {
    Production,
    Development,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
/// Runtime configuration for the bot lifecycle loop.
pub struct BotConfig {
    /// Single-character command prefix checked against inbound messages.
    #[serde(default = "default_command_prefix")]
    pub command_prefix: char,
    #[serde(default = "default_mode")]
    pub mode: RuntimeMode,
    /// Destination of the latency-driven health timestamp. Production only.
    #[serde(default = "default_healthcheck_path")]
    pub healthcheck_path: PathBuf,
    /// Presence text applied once on the first ready event.
    #[serde(default)]
    pub presence: Option<String>,
}

fn default_command_prefix() -> char {
    '!'
}

fn default_mode() -> RuntimeMode {
    RuntimeMode::Development
}

fn default_healthcheck_path() -> PathBuf {
    PathBuf::from("healthcheck.txt")
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            command_prefix: default_command_prefix(),
            mode: default_mode(),
            healthcheck_path: default_healthcheck_path(),
            presence: None,
        }
    }
}

/// Loads bot configuration from a TOML file.
pub fn load_bot_config(path: &Path) -> Result<BotConfig> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config {}", path.display()))?;
    toml::from_str(&raw).with_context(|| format!("failed to parse config {}", path.display()))
}
