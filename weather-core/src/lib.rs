//! Core library for the weather service.
//!
//! This crate defines:
//! - Configuration loading and validation
//! - The provider client and per-provider response normalization
//! - The caching orchestrator with primary-to-secondary failover
//!
//! It is used by `weather-server`, but can also be embedded in other binaries.

pub mod config;
pub mod error;
pub mod model;
pub mod provider;
pub mod service;

pub use config::{Config, ProviderConfig};
pub use error::WeatherError;
pub use model::WeatherReading;
pub use provider::{HttpSource, ProviderKind, WeatherSource};
pub use service::WeatherService;
