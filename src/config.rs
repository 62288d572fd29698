use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf};

/// Default API base URL (OpenWeatherMap data API).
pub const DEFAULT_BASE_URL: &str = "https://api.openweathermap.org/data/2.5";

/// Default per-attempt request timeout, in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Default total try budget for one logical fetch call.
pub const DEFAULT_RETRY_ATTEMPTS: u32 = 3;

/// Default fixed pause between attempts, in seconds.
pub const DEFAULT_RETRY_DELAY_SECS: u64 = 2;

/// Default unit system sent with every request.
pub const DEFAULT_UNITS: &str = "metric";

/// Default location used by callers that don't have one of their own.
pub const DEFAULT_LOCATION: &str = "New York";

/// Default forecast length, in days.
pub const DEFAULT_FORECAST_DAYS: u32 = 5;

/// Process-wide configuration for the data-acquisition layer.
///
/// All fetcher tunables live here so they are visible at the call site;
/// the fetcher itself never reads the environment or the filesystem.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// API credential attached to every outbound request.
    pub api_key: Option<String>,

    /// Base URL the `/weather` and `/forecast` paths are resolved against.
    pub base_url: String,

    /// Per-attempt request timeout in seconds.
    pub timeout_secs: u64,

    /// Total tries allowed for one logical fetch call.
    pub retry_attempts: u32,

    /// Fixed pause between tries, in seconds.
    pub retry_delay_secs: u64,

    /// Unit system requested from the API ("metric", "imperial", "standard").
    pub units: String,

    /// Fallback location for callers without an explicit one.
    pub default_location: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            retry_attempts: DEFAULT_RETRY_ATTEMPTS,
            retry_delay_secs: DEFAULT_RETRY_DELAY_SECS,
            units: DEFAULT_UNITS.to_string(),
            default_location: DEFAULT_LOCATION.to_string(),
        }
    }
}

impl Config {
    /// Load config from disk, or return the documented defaults if no file exists yet.
    pub fn load() -> Result<Self> {
        let path = Self::config_file_path()?;
        if !path.exists() {
            // First run: no config file, return defaults.
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let cfg: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(cfg)
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        let path = Self::config_file_path()?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(&path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "weather-analytics", "weather-fetcher")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }
}
