//! Application configuration management.

use std::path::PathBuf;

use color_eyre::Result;
use serde::{Deserialize, Serialize};

/// Application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Server configuration
    pub server: ServerConfig,

    /// Player configuration
    #[serde(default)]
    pub player: PlayerConfig,
}

/// Data source configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Database API base URL (e.g., "https://xyz.supabase.co")
    pub url: String,

    /// Anon API key for the database
    #[serde(default)]
    pub api_key: String,

    /// Sermon podcast RSS feed URL
    #[serde(default = "default_feed_url")]
    pub feed_url: String,
}

/// Player configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerConfig {
    /// Volume level (0-100)
    #[serde(default = "default_volume")]
    pub volume: u8,
}

fn default_volume() -> u8 {
    80
}

fn default_feed_url() -> String {
    String::from("https://feed.podbean.com/pecharchive/feed.xml")
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                url: String::new(),
                api_key: String::new(),
                feed_url: default_feed_url(),
            },
            player: PlayerConfig::default(),
        }
    }
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            volume: default_volume(),
        }
    }
}

impl Config {
    /// Get the configuration file path.
    pub fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| color_eyre::eyre::eyre!("Could not determine config directory"))?;

        Ok(config_dir.join("chapel-tui").join("config.toml"))
    }

    /// Load configuration from file.
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;

        if !path.exists() {
            // First run: write the defaults so there is a file to edit.
            let config = Self::default();
            config.save()?;
            return Ok(config);
        }

        let contents = std::fs::read_to_string(&path)?;
        let mut config: Config = toml::from_str(&contents)?;

        // Clamp volume to valid range (0-100)
        config.player.volume = config.player.volume.min(100);

        Ok(config)
    }

    /// Save configuration to file.
    pub fn save(&self) -> Result<()> {
        let path = Self::config_path()?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)?;
        std::fs::write(&path, contents)?;

        Ok(())
    }

    /// Check if the configuration is valid for connecting.
    pub fn is_valid(&self) -> bool {
        let valid_url = !self.server.url.is_empty()
            && (self.server.url.starts_with("http://") || self.server.url.starts_with("https://"));

        valid_url && !self.server.api_key.is_empty()
    }
}
