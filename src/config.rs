use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::app_dirs::AppDirs;
use crate::idle_timer::DEFAULT_IDLE_WINDOW;
use crate::keystroke::{KeystrokeLimits, DEFAULT_MAX_INSERTED, DEFAULT_MAX_REPLACED};

/// Key under which the best score is persisted
pub const HIGHSCORE_KEY: &str = "typespeed.highestWPM";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub idle_timeout_ms: u64,
    pub max_inserted_chars: usize,
    pub max_replaced_chars: usize,
    pub highscore_key: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            idle_timeout_ms: DEFAULT_IDLE_WINDOW.as_millis() as u64,
            max_inserted_chars: DEFAULT_MAX_INSERTED,
            max_replaced_chars: DEFAULT_MAX_REPLACED,
            highscore_key: HIGHSCORE_KEY.to_string(),
        }
    }
}

impl Config {
    pub fn idle_window(&self) -> Duration {
        Duration::from_millis(self.idle_timeout_ms)
    }

    pub fn keystroke_limits(&self) -> KeystrokeLimits {
        KeystrokeLimits {
            max_inserted: self.max_inserted_chars,
            max_replaced: self.max_replaced_chars,
        }
    }
}

pub trait ConfigStore {
    fn load(&self) -> Config;
    fn save(&self, cfg: &Config) -> std::io::Result<()>;
}

#[derive(Debug, Clone)]
pub struct FileConfigStore {
    path: PathBuf,
}

impl FileConfigStore {
    pub fn new() -> Self {
        let path = AppDirs::config_path().unwrap_or_else(|| PathBuf::from("typespeed_config.json"));
        Self { path }
    }

    pub fn with_path<P: AsRef<Path>>(p: P) -> Self {
        Self {
            path: p.as_ref().to_path_buf(),
        }
    }
}

impl Default for FileConfigStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigStore for FileConfigStore {
    fn load(&self) -> Config {
        if let Ok(bytes) = fs::read(&self.path) {
            if let Ok(cfg) = serde_json::from_slice::<Config>(&bytes) {
                return cfg;
            }
        }
        Config::default()
    }

    fn save(&self, cfg: &Config) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_vec_pretty(cfg).map_err(std::io::Error::other)?;
        fs::write(&self.path, data)
    }
}
