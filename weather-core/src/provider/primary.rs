//! Primary provider payload: `{"current": {"temperature": .., "wind_speed": ..}}`.

use serde::Deserialize;

use crate::{WeatherError, WeatherReading, provider::ProviderKind};

#[derive(Debug, Deserialize)]
struct PrimaryCurrent {
    temperature: f64,
    wind_speed: f64,
}

#[derive(Debug, Deserialize)]
struct PrimaryResponse {
    current: PrimaryCurrent,
}

pub fn normalize(body: &[u8]) -> Result<WeatherReading, WeatherError> {
    let parsed: PrimaryResponse = super::decode(ProviderKind::Primary, body)?;

    Ok(WeatherReading {
        temperature_degrees: parsed.current.temperature,
        wind_speed: parsed.current.wind_speed,
    })
}
