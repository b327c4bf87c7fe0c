use anyhow::{Context, Result, anyhow, bail};
use directories::ProjectDirs;
use serde::Deserialize;
use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use crate::provider::ProviderKind;

const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

/// Connection settings for one upstream weather provider.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct ProviderConfig {
    pub base_url: String,
    pub city: String,
    pub unit: String,
    pub access_key: String,
    /// Selects the primary query parameter mapping when true.
    #[serde(default)]
    pub primary: bool,
}

/// Service configuration, loaded once at startup.
///
/// Example TOML:
/// ```toml
/// stale_time = "3s"
///
/// [primary_weather_provider]
/// base_url = "http://api.weatherstack.com/current"
/// city = "Melbourne"
/// unit = "m"
/// access_key = "..."
/// primary = true
///
/// [secondary_weather_provider]
/// base_url = "http://api.openweathermap.org/data/2.5/weather"
/// city = "Melbourne,AU"
/// unit = "metric"
/// access_key = "..."
/// ```
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct Config {
    pub primary_weather_provider: ProviderConfig,
    pub secondary_weather_provider: ProviderConfig,

    /// How long a cached reading is served before a refresh, e.g. "3s".
    pub stale_time: String,

    /// Per-attempt bound on outbound requests, e.g. "5s". Defaults to 5 seconds.
    #[serde(default)]
    pub request_timeout: Option<String>,
}

impl Config {
    /// Load and validate config from the given TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let cfg: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        cfg.validate()
            .with_context(|| format!("Invalid configuration in {}", path.display()))?;

        Ok(cfg)
    }

    /// Resolve which config file to use.
    ///
    /// An explicit path wins; otherwise `config.toml` in the working directory, then the
    /// platform config directory.
    pub fn locate(explicit: Option<&Path>) -> Result<PathBuf> {
        if let Some(path) = explicit {
            return Ok(path.to_path_buf());
        }

        let local = PathBuf::from("config.toml");
        if local.exists() {
            return Ok(local);
        }

        Self::config_file_path()
    }

    /// Path to the config file in the platform config directory.
    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "weather-service", "weather-server")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }

    pub fn stale_threshold(&self) -> Result<Duration> {
        humantime::parse_duration(&self.stale_time)
            .with_context(|| format!("Invalid stale_time '{}'", self.stale_time))
    }

    pub fn request_timeout(&self) -> Result<Duration> {
        match &self.request_timeout {
            Some(raw) => humantime::parse_duration(raw)
                .with_context(|| format!("Invalid request_timeout '{raw}'")),
            None => Ok(DEFAULT_REQUEST_TIMEOUT),
        }
    }

    /// Provider config for the given slot.
    pub fn provider(&self, kind: ProviderKind) -> &ProviderConfig {
        match kind {
            ProviderKind::Primary => &self.primary_weather_provider,
            ProviderKind::Secondary => &self.secondary_weather_provider,
        }
    }

    pub fn validate(&self) -> Result<()> {
        for kind in ProviderKind::all() {
            let provider = self.provider(*kind);
            if provider.base_url.trim().is_empty() {
                bail!("{kind} weather provider has an empty base_url");
            }
            if ProviderKind::of(provider) != *kind {
                bail!(
                    "{kind} weather provider has primary = {}, expected {}",
                    provider.primary,
                    *kind == ProviderKind::Primary
                );
            }
        }

        self.stale_threshold()?;
        self.request_timeout()?;

        Ok(())
    }
}
