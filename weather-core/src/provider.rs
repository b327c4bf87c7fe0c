use crate::{WeatherError, WeatherReading, config::ProviderConfig};
use async_trait::async_trait;
use reqwest::Client;
use std::{fmt::Debug, time::Duration};

pub mod primary;
pub mod secondary;

/// Which configured slot a provider occupies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProviderKind {
    Primary,
    Secondary,
}

impl ProviderKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderKind::Primary => "primary",
            ProviderKind::Secondary => "secondary",
        }
    }

    pub const fn all() -> &'static [ProviderKind] {
        &[ProviderKind::Primary, ProviderKind::Secondary]
    }

    pub fn of(config: &ProviderConfig) -> Self {
        if config.primary { ProviderKind::Primary } else { ProviderKind::Secondary }
    }
}

impl std::fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Issues one outbound request for a provider and returns the raw response body.
#[async_trait]
pub trait WeatherSource: Send + Sync + Debug {
    async fn fetch(&self, config: &ProviderConfig) -> Result<Vec<u8>, WeatherError>;
}

/// Query parameters for a provider, keyed by its slot.
pub fn query_params(config: &ProviderConfig) -> Vec<(&'static str, String)> {
    let (city_key, key_key) = match ProviderKind::of(config) {
        ProviderKind::Primary => ("query", "access_key"),
        ProviderKind::Secondary => ("q", "appid"),
    };

    vec![
        (city_key, config.city.clone()),
        (key_key, config.access_key.clone()),
        ("units", config.unit.clone()),
    ]
}

/// Extract a reading from a raw body shaped like the given provider's response.
pub fn normalize(kind: ProviderKind, body: &[u8]) -> Result<WeatherReading, WeatherError> {
    match kind {
        ProviderKind::Primary => primary::normalize(body),
        ProviderKind::Secondary => secondary::normalize(body),
    }
}

/// Two-step decode shared by both normalizers: syntax first, then the typed schema.
pub(crate) fn decode<T>(kind: ProviderKind, body: &[u8]) -> Result<T, WeatherError>
where
    T: serde::de::DeserializeOwned,
{
    let value: serde_json::Value = serde_json::from_slice(body)
        .map_err(|source| WeatherError::Parse { provider: kind, source })?;

    serde_json::from_value(value).map_err(|source| WeatherError::Shape { provider: kind, source })
}

/// `WeatherSource` backed by `reqwest`.
#[derive(Debug, Clone)]
pub struct HttpSource {
    http: Client,
}

impl HttpSource {
    /// `timeout` bounds each request attempt, body read included.
    pub fn new(timeout: Duration) -> reqwest::Result<Self> {
        let http = Client::builder().timeout(timeout).build()?;

        Ok(Self { http })
    }
}

#[async_trait]
impl WeatherSource for HttpSource {
    async fn fetch(&self, config: &ProviderConfig) -> Result<Vec<u8>, WeatherError> {
        let kind = ProviderKind::of(config);

        let res = self
            .http
            .get(&config.base_url)
            .query(&query_params(config))
            .send()
            .await
            .map_err(|err| WeatherError::transport(kind, err.without_url()))?;

        let status = res.status();
        let body = res.bytes().await.map_err(|err| {
            WeatherError::transport(kind, format!("failed to read body: {}", err.without_url()))
        })?;

        if !status.is_success() {
            return Err(WeatherError::Upstream {
                provider: kind,
                status: status.as_u16(),
                body: truncate_body(&String::from_utf8_lossy(&body)),
            });
        }

        Ok(body.to_vec())
    }
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}
