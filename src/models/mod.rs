//! Data models for the `WeatherPlan` library
//!
//! This module contains the core domain models organized by concern:
//! - Location: Geographic coordinates and display name
//! - Weather: Validated current conditions and hourly series
//! - Forecast: Snapshot, daily summary and flat current report

pub mod forecast;
pub mod location;
pub mod weather;

// Re-export all public types for convenient access
pub use forecast::{CurrentWeatherReport, ForecastSnapshot, ForecastSummary};
pub use location::Location;
pub use weather::{CurrentConditions, HourlySeries, WindAndHumidity};
