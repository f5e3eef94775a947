//! Current-conditions lookup by place name
//!
//! Thin composition of [`Geocoder`] and a current-only
//! [`ForecastAggregator`], shaped for agent-style tool calls.

use crate::aggregator::{FieldSelection, ForecastAggregator};
use crate::conditions::WeatherCodeTable;
use crate::config::WeatherPlanConfig;
use crate::geocoder::Geocoder;
use crate::http::HttpClient;
use crate::models::CurrentWeatherReport;
use crate::{Result, WeatherPlanError};

/// Tool identifier exposed to agent frameworks
pub const TOOL_ID: &str = "get-weather";
/// Tool description exposed to agent frameworks
pub const TOOL_DESCRIPTION: &str = "Get current weather for a location";

pub struct WeatherTool<C> {
    geocoder: Geocoder<C>,
    aggregator: ForecastAggregator<C>,
}

impl<C: HttpClient + Clone> WeatherTool<C> {
    pub fn new(client: C, config: &WeatherPlanConfig) -> Self {
        Self {
            geocoder: Geocoder::new(client.clone(), config.api.geocoding_url.clone()),
            aggregator: ForecastAggregator::new(client, config.api.forecast_url.clone())
                .with_selection(FieldSelection::CURRENT_ONLY)
                .with_code_table(WeatherCodeTable::builtin(config.forecast.locale)),
        }
    }
}

impl<C: HttpClient> WeatherTool<C> {
    /// Resolve `location_name` and report its current conditions
    pub async fn current(&self, location_name: &str) -> Result<CurrentWeatherReport> {
        let location = self.geocoder.resolve(location_name).await?;
        let snapshot = self.aggregator.fetch(&location).await?;

        let details = snapshot.current.details.ok_or_else(|| {
            WeatherPlanError::invalid_shape("current wind and humidity fields were not returned")
        })?;

        Ok(CurrentWeatherReport {
            temperature: snapshot.current.temperature,
            feels_like: details.apparent_temperature,
            humidity: details.relative_humidity,
            wind_speed: details.wind_speed,
            wind_gust: details.wind_gust,
            conditions: self
                .aggregator
                .code_table()
                .describe(snapshot.current.weather_code)
                .to_string(),
            location: snapshot.location.name,
        })
    }
}
