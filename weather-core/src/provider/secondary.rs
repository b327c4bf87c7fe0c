//! Secondary provider payload: `{"main": {"temp": ..}, "wind": {"speed": ..}}`.

use serde::Deserialize;

use crate::{WeatherError, WeatherReading, provider::ProviderKind};

#[derive(Debug, Deserialize)]
struct SecondaryMain {
    temp: f64,
}

#[derive(Debug, Deserialize)]
struct SecondaryWind {
    speed: f64,
}

#[derive(Debug, Deserialize)]
struct SecondaryResponse {
    main: SecondaryMain,
    wind: SecondaryWind,
}

pub fn normalize(body: &[u8]) -> Result<WeatherReading, WeatherError> {
    let parsed: SecondaryResponse = super::decode(ProviderKind::Secondary, body)?;

    Ok(WeatherReading { temperature_degrees: parsed.main.temp, wind_speed: parsed.wind.speed })
}
