//! Forecast records handed to downstream consumers

use super::{CurrentConditions, HourlySeries, Location};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Validated result of one forecast fetch
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ForecastSnapshot {
    /// Location the forecast was requested for
    pub location: Location,
    /// Current conditions
    pub current: CurrentConditions,
    /// Hourly series, present when hourly fields were requested
    pub hourly: Option<HourlySeries>,
}

/// Daily forecast summary. Its JSON form is the stable downstream contract.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ForecastSummary {
    /// Aggregation time, not the forecast's own day
    pub date: DateTime<Utc>,
    pub max_temp: f64,
    pub min_temp: f64,
    /// Peak hourly precipitation probability (0-100)
    pub precipitation_chance: f64,
    /// Localized condition text for the current weather code
    pub condition: String,
    /// Display name of the location
    pub location: String,
}

impl ForecastSummary {
    /// Format the temperature range with unit
    #[must_use]
    pub fn format_temperature_range(&self) -> String {
        format!("{:.1}°C – {:.1}°C", self.min_temp, self.max_temp)
    }
}

/// Flat current-conditions record returned by the weather tool
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CurrentWeatherReport {
    pub temperature: f64,
    pub feels_like: f64,
    pub humidity: f64,
    pub wind_speed: f64,
    pub wind_gust: f64,
    pub conditions: String,
    pub location: String,
}
