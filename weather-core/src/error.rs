use thiserror::Error;

use crate::provider::ProviderKind;

/// Failures surfaced while retrieving a weather reading.
#[derive(Debug, Error)]
pub enum WeatherError {
    /// Request construction, network execution or body read failed.
    #[error("{provider} provider request failed: {message}")]
    Transport { provider: ProviderKind, message: String },

    /// Upstream answered with a non-success status.
    #[error("{provider} provider responded with status {status}: {body}")]
    Upstream { provider: ProviderKind, status: u16, body: String },

    /// Payload is not valid JSON.
    #[error("{provider} provider returned malformed JSON: {source}")]
    Parse {
        provider: ProviderKind,
        #[source]
        source: serde_json::Error,
    },

    /// Payload is valid JSON but lacks the expected fields or types.
    #[error("{provider} provider returned an unexpected payload shape: {source}")]
    Shape {
        provider: ProviderKind,
        #[source]
        source: serde_json::Error,
    },

    /// Both providers failed and nothing has been cached yet.
    #[error("no weather provider available (primary: {primary}; secondary: {secondary})")]
    Unavailable { primary: String, secondary: String },
}

impl WeatherError {
    pub fn transport(provider: ProviderKind, err: impl std::fmt::Display) -> Self {
        WeatherError::Transport { provider, message: err.to_string() }
    }
}
