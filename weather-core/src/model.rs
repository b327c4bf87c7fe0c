use serde::Serialize;

/// Current conditions normalized from either upstream provider.
///
/// Always replaced as a whole; both fields come from the same provider response.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct WeatherReading {
    pub temperature_degrees: f64,
    pub wind_speed: f64,
}
