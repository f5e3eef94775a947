//! Forecast fetching and daily reduction
//!
//! [`ForecastAggregator`] issues one forecast request for the fields selected
//! by its [`FieldSelection`] and reduces the hourly series into a
//! [`ForecastSummary`].

use crate::conditions::WeatherCodeTable;
use crate::config::WeatherPlanConfig;
use crate::http::HttpClient;
use crate::models::{ForecastSnapshot, ForecastSummary, HourlySeries, Location};
use crate::{Result, WeatherPlanError, open_meteo};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::{debug, info, instrument, warn};

/// Which optional field groups a forecast request asks for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldSelection {
    /// Hourly precipitation probability and temperature
    pub include_hourly: bool,
    /// Apparent temperature, humidity, wind speed and gusts
    pub include_wind_and_humidity: bool,
}

impl FieldSelection {
    /// Everything both the summary and the weather tool need
    pub const ALL: Self = Self {
        include_hourly: true,
        include_wind_and_humidity: true,
    };

    /// Current conditions with comfort fields, no hourly series
    pub const CURRENT_ONLY: Self = Self {
        include_hourly: false,
        include_wind_and_humidity: true,
    };
}

impl Default for FieldSelection {
    fn default() -> Self {
        Self::ALL
    }
}

/// Behaviour when the hourly temperature series is empty
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum EmptySeriesPolicy {
    /// Fail with [`WeatherPlanError::EmptySeries`]
    #[default]
    Fail,
    /// Use the current temperature as both maximum and minimum
    UseCurrent,
}

/// Fetches forecasts and reduces them into daily summaries
pub struct ForecastAggregator<C> {
    client: C,
    base_url: String,
    selection: FieldSelection,
    forecast_days: Option<u8>,
    empty_series: EmptySeriesPolicy,
    codes: WeatherCodeTable,
}

impl<C: HttpClient> ForecastAggregator<C> {
    /// Aggregator requesting every field against `base_url`
    pub fn new(client: C, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            selection: FieldSelection::default(),
            forecast_days: None,
            empty_series: EmptySeriesPolicy::default(),
            codes: WeatherCodeTable::default(),
        }
    }

    /// Aggregator configured from the forecast and API sections of `config`
    pub fn from_config(client: C, config: &WeatherPlanConfig) -> Self {
        Self::new(client, config.api.forecast_url.clone())
            .with_selection(config.forecast.field_selection())
            .with_forecast_days(config.forecast.forecast_days)
            .with_empty_series_policy(config.forecast.empty_series)
            .with_code_table(WeatherCodeTable::builtin(config.forecast.locale))
    }

    #[must_use]
    pub fn with_selection(mut self, selection: FieldSelection) -> Self {
        self.selection = selection;
        self
    }

    #[must_use]
    pub fn with_forecast_days(mut self, days: Option<u8>) -> Self {
        self.forecast_days = days;
        self
    }

    #[must_use]
    pub fn with_empty_series_policy(mut self, policy: EmptySeriesPolicy) -> Self {
        self.empty_series = policy;
        self
    }

    #[must_use]
    pub fn with_code_table(mut self, codes: WeatherCodeTable) -> Self {
        self.codes = codes;
        self
    }

    #[must_use]
    pub fn selection(&self) -> FieldSelection {
        self.selection
    }

    #[must_use]
    pub fn code_table(&self) -> &WeatherCodeTable {
        &self.codes
    }

    /// Fetch and reduce the forecast for `location`
    pub async fn aggregate(&self, location: &Location) -> Result<ForecastSummary> {
        let snapshot = self.fetch(location).await?;
        self.summarize(&snapshot)
    }

    /// Fetch and validate the selected fields for `location`
    #[instrument(skip(self, location), fields(location = %location.name))]
    pub async fn fetch(&self, location: &Location) -> Result<ForecastSnapshot> {
        info!(
            "Getting forecast for coordinates: {}",
            location.format_coordinates()
        );
        let start_time = Instant::now();

        let url = open_meteo::forecast_url(
            &self.base_url,
            location,
            self.selection,
            self.forecast_days,
        );
        debug!("OpenMeteo forecast request URL: {}", url);

        let response = self.client.fetch(&url).await?;
        let body: open_meteo::ForecastResponse = response.json("forecast")?;
        let (current, hourly) = body.into_parts(self.selection)?;

        info!(
            "Retrieved forecast with {} hourly points in {:.3}s",
            hourly.as_ref().map_or(0, |h| h.len()),
            start_time.elapsed().as_secs_f64()
        );

        Ok(ForecastSnapshot {
            location: location.clone(),
            current,
            hourly,
        })
    }

    /// Reduce a snapshot into a daily summary stamped with the current time
    pub fn summarize(&self, snapshot: &ForecastSnapshot) -> Result<ForecastSummary> {
        let hourly = match (&snapshot.hourly, self.empty_series) {
            (Some(hourly), _) => hourly.clone(),
            (None, EmptySeriesPolicy::UseCurrent) => HourlySeries::default(),
            (None, EmptySeriesPolicy::Fail) => {
                return Err(WeatherPlanError::invalid_input(
                    "hourly fields were not requested, so daily extremes cannot be computed",
                ));
            }
        };

        let (max_temp, min_temp) = match (hourly.temperature_extremes(), self.empty_series) {
            (Some(extremes), _) => extremes,
            (None, EmptySeriesPolicy::UseCurrent) => {
                warn!("Hourly temperatures empty, using current temperature");
                let current = snapshot.current.temperature;
                (current, current)
            }
            (None, EmptySeriesPolicy::Fail) => {
                return Err(WeatherPlanError::empty_series("temperature_2m"));
            }
        };

        Ok(ForecastSummary {
            date: Utc::now(),
            max_temp,
            min_temp,
            precipitation_chance: hourly.peak_precipitation_chance(),
            condition: self
                .codes
                .describe(snapshot.current.weather_code)
                .to_string(),
            location: snapshot.location.name.clone(),
        })
    }
}
