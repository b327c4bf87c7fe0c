use std::{sync::Arc, time::Duration};

use tokio::{sync::Mutex, time::Instant};
use tracing::{debug, info, warn};

use crate::{
    Config, WeatherError, WeatherReading,
    config::ProviderConfig,
    provider::{HttpSource, ProviderKind, WeatherSource, normalize},
};

/// Last successful reading together with the moment it was stored.
#[derive(Debug, Clone, Copy)]
struct CacheEntry {
    reading: WeatherReading,
    last_updated: Instant,
}

impl CacheEntry {
    fn is_fresh(&self, threshold: Duration) -> bool {
        self.last_updated.elapsed() <= threshold
    }
}

/// Serves the current reading, refreshing from the primary then the secondary
/// provider once the cached one goes stale.
#[derive(Debug)]
pub struct WeatherService {
    primary: ProviderConfig,
    secondary: ProviderConfig,
    stale_threshold: Duration,
    source: Arc<dyn WeatherSource>,
    // Held for the whole check-refresh-store sequence.
    cache: Mutex<Option<CacheEntry>>,
}

impl WeatherService {
    pub fn new(config: &Config, source: Arc<dyn WeatherSource>) -> anyhow::Result<Self> {
        Ok(Self {
            primary: config.primary_weather_provider.clone(),
            secondary: config.secondary_weather_provider.clone(),
            stale_threshold: config.stale_threshold()?,
            source,
            cache: Mutex::new(None),
        })
    }

    /// Build a service that talks to the configured upstreams over HTTP.
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let source = HttpSource::new(config.request_timeout()?)?;
        Self::new(config, Arc::new(source))
    }

    pub fn stale_threshold(&self) -> Duration {
        self.stale_threshold
    }

    /// Return the cached reading if fresh, otherwise refresh it.
    ///
    /// A failed refresh falls back to the stale reading when one exists; an error is
    /// only returned if no provider has ever succeeded.
    pub async fn get_current_weather(&self) -> Result<WeatherReading, WeatherError> {
        let mut cache = self.cache.lock().await;

        if let Some(entry) = cache.as_ref() {
            if entry.is_fresh(self.stale_threshold) {
                debug!("serving cached weather reading");
                return Ok(entry.reading);
            }
        }

        match self.refresh().await {
            Ok(reading) => {
                *cache = Some(CacheEntry { reading, last_updated: Instant::now() });
                Ok(reading)
            }
            Err(err) => match cache.as_ref() {
                Some(entry) => {
                    warn!(error = %err, "refresh failed, serving stale weather reading");
                    Ok(entry.reading)
                }
                None => Err(err),
            },
        }
    }

    #[cfg(test)]
    async fn cached(&self) -> Option<WeatherReading> {
        self.cache.lock().await.as_ref().map(|entry| entry.reading)
    }

    async fn refresh(&self) -> Result<WeatherReading, WeatherError> {
        let primary_err = match self.attempt(&self.primary).await {
            Ok(reading) => return Ok(reading),
            Err(err) => err,
        };
        warn!(error = %primary_err, "primary weather provider failed, failing over to secondary");

        self.attempt(&self.secondary).await.map_err(|secondary_err| {
            warn!(error = %secondary_err, "secondary weather provider failed");
            WeatherError::Unavailable {
                primary: primary_err.to_string(),
                secondary: secondary_err.to_string(),
            }
        })
    }

    async fn attempt(&self, config: &ProviderConfig) -> Result<WeatherReading, WeatherError> {
        let kind = ProviderKind::of(config);
        debug!(provider = %kind, url = %config.base_url, "requesting current weather");

        let body = self.source.fetch(config).await?;
        let reading = normalize(kind, &body)?;

        info!(
            provider = %kind,
            temperature = reading.temperature_degrees,
            wind_speed = reading.wind_speed,
            "weather reading refreshed"
        );
        Ok(reading)
    }
}
