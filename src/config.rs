use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Path to the SQLite database
    pub database_path: PathBuf,
    /// Path to the session file
    pub session_path: PathBuf,
    /// Sync settings
    pub sync: SyncConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// Document store server URL (e.g. "http://localhost:8080")
    pub server_url: Option<String>,
    /// API key override; the logged-in session's key takes precedence
    pub api_key: Option<String>,
    /// Period between scheduled sync runs
    pub interval_hours: u64,
    /// Delay before the first scheduled run
    pub initial_delay_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
        Self {
            database_path: home.join(".welltrack").join("welltrack.db"),
            session_path: home.join(".welltrack").join("session.yaml"),
            sync: SyncConfig::default(),
        }
    }
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            server_url: None,
            api_key: None,
            interval_hours: 24,
            initial_delay_secs: 60,
        }
    }
}

impl SyncConfig {
    pub fn is_configured(&self) -> bool {
        self.server_url.is_some()
    }
}

impl Config {
    /// Load configuration with priority: env vars > config file > defaults
    pub fn load(config_path: Option<PathBuf>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        let path = config_path.unwrap_or_else(Self::default_config_path);
        if path.exists() {
            let contents = std::fs::read_to_string(&path)
                .map_err(|e| ConfigError::Read(path.clone(), e))?;
            config =
                serde_yaml::from_str(&contents).map_err(|e| ConfigError::Parse(path.clone(), e))?;
        }

        // Apply environment variable overrides
        if let Ok(db_path) = std::env::var("WELLTRACK_DATABASE_PATH") {
            config.database_path = PathBuf::from(db_path);
        }
        if let Ok(session_path) = std::env::var("WELLTRACK_SESSION_PATH") {
            config.session_path = PathBuf::from(session_path);
        }
        if let Ok(url) = std::env::var("WELLTRACK_SYNC_URL") {
            config.sync.server_url = Some(url);
        }
        if let Ok(key) = std::env::var("WELLTRACK_SYNC_API_KEY") {
            config.sync.api_key = Some(key);
        }

        Ok(config)
    }

    /// Default config file path: ~/.config/welltrack/config.yaml
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("welltrack")
            .join("config.yaml")
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file '{0}': {1}")]
    Read(PathBuf, std::io::Error),
    #[error("failed to parse config file '{0}': {1}")]
    Parse(PathBuf, serde_yaml::Error),
}
