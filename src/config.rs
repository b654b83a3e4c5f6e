//! Application configuration file.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::engine::Timing;

/// Looked up in the working directory when no `--config` is given.
pub const DEFAULT_CONFIG_FILE: &str = "level-quest.toml";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    /// Directory holding one TOML content table per game
    pub games_dir: PathBuf,
    /// Pause between answering and moving on
    pub submit_delay_ms: u64,
    /// How long feedback messages stay on screen
    pub feedback_display_ms: u64,
    /// Where logs go while the terminal UI is running
    pub log_file: Option<PathBuf>,
    /// Default log filter when RUST_LOG is unset
    pub log_level: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        let timing = Timing::default();
        Self {
            games_dir: PathBuf::from("games"),
            submit_delay_ms: timing.submit_delay.as_millis() as u64,
            feedback_display_ms: timing.feedback_display.as_millis() as u64,
            log_file: None,
            log_level: "info".to_string(),
        }
    }
}

impl AppConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: AppConfig = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Loads `explicit` if given (it must exist), otherwise the default file
    /// when present, otherwise built-in defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        match explicit {
            Some(path) => Self::from_file(path),
            None => {
                let default = Path::new(DEFAULT_CONFIG_FILE);
                if default.is_file() {
                    Self::from_file(default)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    pub fn timing(&self) -> Timing {
        Timing {
            submit_delay: Duration::from_millis(self.submit_delay_ms),
            feedback_display: Duration::from_millis(self.feedback_display_ms),
        }
    }
}
