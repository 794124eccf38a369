//! Session configuration read from `ZWAP_*` environment variables

use std::path::PathBuf;

use anyhow::{Context, Result};
use log::LevelFilter;

use crate::adapter::load_settings_file;
use crate::core::GameSettings;

pub const DEFAULT_SAVE_PATH: &str = "zwap-save.json";
pub const DEFAULT_LOG_PATH: &str = "zwap.log";
pub const DEFAULT_AUTOPLAY_TURNS: usize = 20;

#[derive(Debug, Clone, PartialEq)]
pub struct SessionConfig {
    /// JSON `GameSettings`; `GameSettings::normal()` when unset
    pub settings_path: Option<PathBuf>,
    pub save_path: PathBuf,
    /// Random when unset
    pub seed: Option<u64>,
    pub autoplay_turns: usize,
    pub log_path: String,
    pub log_level: LevelFilter,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            settings_path: None,
            save_path: PathBuf::from(DEFAULT_SAVE_PATH),
            seed: None,
            autoplay_turns: DEFAULT_AUTOPLAY_TURNS,
            log_path: DEFAULT_LOG_PATH.to_string(),
            log_level: LevelFilter::Info,
        }
    }
}

impl SessionConfig {
    pub fn from_env() -> Self {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    /// Read the config through `var`; unparsable values fall back to defaults
    pub fn from_vars(var: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let non_empty = |key: &str| {
            var(key)
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
        };

        Self {
            settings_path: non_empty("ZWAP_SETTINGS").map(PathBuf::from),
            save_path: non_empty("ZWAP_SAVE_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.save_path),
            seed: non_empty("ZWAP_SEED").and_then(|s| s.parse().ok()),
            autoplay_turns: non_empty("ZWAP_AUTOPLAY_TURNS")
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.autoplay_turns),
            log_path: non_empty("ZWAP_LOG_PATH").unwrap_or(defaults.log_path),
            log_level: non_empty("ZWAP_LOG_LEVEL")
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.log_level),
        }
    }

    /// Settings for a new game. Not validated; `Game::new` does that.
    pub fn load_settings(&self) -> Result<GameSettings> {
        match &self.settings_path {
            Some(path) => load_settings_file(path)
                .with_context(|| format!("reading settings from {}", path.display())),
            None => Ok(GameSettings::normal()),
        }
    }

    pub fn seed_or_random(&self) -> u64 {
        self.seed.unwrap_or_else(rand::random)
    }
}
