//! `OpenMeteo` API request builders and response structures
//!
//! Wire types mirror the JSON bodies loosely (everything optional) and are
//! converted into validated models, so a missing field is reported by name
//! instead of failing somewhere inside serde.

use crate::aggregator::FieldSelection;
use crate::models::{CurrentConditions, HourlySeries, Location, WindAndHumidity};
use crate::{Result, WeatherPlanError};
use serde::Deserialize;

const HOURLY_FIELDS: &str = "precipitation_probability,temperature_2m";

/// Geocoding search URL requesting a single candidate
#[must_use]
pub fn geocoding_url(base_url: &str, location_name: &str) -> String {
    format!(
        "{}?name={}&count=1",
        base_url,
        urlencoding::encode(location_name)
    )
}

/// Comma-separated `current` fields for a selection
#[must_use]
pub fn current_fields(selection: FieldSelection) -> String {
    let mut fields = vec!["temperature_2m", "precipitation", "weather_code"];
    if selection.include_wind_and_humidity {
        fields.extend([
            "apparent_temperature",
            "relative_humidity_2m",
            "wind_speed_10m",
            "wind_gusts_10m",
        ]);
    }
    fields.join(",")
}

/// Forecast URL for the union of fields in `selection`
#[must_use]
pub fn forecast_url(
    base_url: &str,
    location: &Location,
    selection: FieldSelection,
    forecast_days: Option<u8>,
) -> String {
    let mut url = format!(
        "{}?latitude={}&longitude={}&current={}",
        base_url,
        location.latitude,
        location.longitude,
        current_fields(selection)
    );
    if selection.include_hourly {
        url.push_str("&hourly=");
        url.push_str(HOURLY_FIELDS);
    }
    url.push_str("&timezone=auto");
    if let Some(days) = forecast_days {
        url.push_str(&format!("&forecast_days={days}"));
    }
    url
}

/// Geocoding response from `OpenMeteo`
#[derive(Debug, Deserialize)]
pub struct GeocodingResponse {
    pub results: Option<Vec<GeocodingResult>>,
}

#[derive(Debug, Deserialize)]
pub struct GeocodingResult {
    pub name: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub country: Option<String>,
}

impl GeocodingResult {
    pub fn into_location(self) -> Result<Location> {
        let name = self.name.ok_or_else(|| missing("results[0].name"))?;
        let latitude = self.latitude.ok_or_else(|| missing("results[0].latitude"))?;
        let longitude = self.longitude.ok_or_else(|| missing("results[0].longitude"))?;

        let location = Location::new(name, latitude, longitude);
        Ok(match self.country {
            Some(country) => location.with_country(country),
            None => location,
        })
    }
}

/// Forecast response from `OpenMeteo`
#[derive(Debug, Deserialize)]
pub struct ForecastResponse {
    pub current: Option<CurrentData>,
    pub hourly: Option<HourlyData>,
}

/// Current weather data from `OpenMeteo`
#[derive(Debug, Deserialize)]
pub struct CurrentData {
    pub time: Option<String>,
    #[serde(rename = "temperature_2m")]
    pub temperature: Option<f64>,
    pub apparent_temperature: Option<f64>,
    #[serde(rename = "relative_humidity_2m")]
    pub relative_humidity: Option<f64>,
    #[serde(rename = "wind_speed_10m")]
    pub wind_speed: Option<f64>,
    #[serde(rename = "wind_gusts_10m")]
    pub wind_gusts: Option<f64>,
    pub precipitation: Option<f64>,
    #[serde(alias = "weathercode")]
    pub weather_code: Option<i32>,
}

/// Hourly weather data from `OpenMeteo`; hours beyond the model horizon are `null`
#[derive(Debug, Deserialize)]
pub struct HourlyData {
    pub precipitation_probability: Option<Vec<Option<f64>>>,
    #[serde(rename = "temperature_2m")]
    pub temperature: Option<Vec<Option<f64>>>,
}

impl ForecastResponse {
    /// Validate the body against what `selection` asked for
    pub fn into_parts(
        self,
        selection: FieldSelection,
    ) -> Result<(CurrentConditions, Option<HourlySeries>)> {
        let current = self
            .current
            .ok_or_else(|| missing("current"))?
            .into_conditions(selection)?;

        let hourly = if selection.include_hourly {
            Some(self.hourly.ok_or_else(|| missing("hourly"))?.into_series()?)
        } else {
            None
        };

        Ok((current, hourly))
    }
}

impl CurrentData {
    fn into_conditions(self, selection: FieldSelection) -> Result<CurrentConditions> {
        let details = if selection.include_wind_and_humidity {
            Some(WindAndHumidity {
                apparent_temperature: self
                    .apparent_temperature
                    .ok_or_else(|| missing("current.apparent_temperature"))?,
                relative_humidity: self
                    .relative_humidity
                    .ok_or_else(|| missing("current.relative_humidity_2m"))?,
                wind_speed: self
                    .wind_speed
                    .ok_or_else(|| missing("current.wind_speed_10m"))?,
                wind_gust: self
                    .wind_gusts
                    .ok_or_else(|| missing("current.wind_gusts_10m"))?,
            })
        } else {
            None
        };

        Ok(CurrentConditions {
            timestamp: self.time.ok_or_else(|| missing("current.time"))?,
            temperature: self
                .temperature
                .ok_or_else(|| missing("current.temperature_2m"))?,
            weather_code: self
                .weather_code
                .ok_or_else(|| missing("current.weather_code"))?,
            precipitation: self.precipitation,
            details,
        })
    }
}

impl HourlyData {
    fn into_series(self) -> Result<HourlySeries> {
        let precipitation = self
            .precipitation_probability
            .ok_or_else(|| missing("hourly.precipitation_probability"))?;
        let temperature = self
            .temperature
            .ok_or_else(|| missing("hourly.temperature_2m"))?;

        if precipitation.len() != temperature.len() {
            return Err(WeatherPlanError::invalid_shape(format!(
                "hourly series are misaligned: {} precipitation values vs {} temperatures",
                precipitation.len(),
                temperature.len()
            )));
        }

        let mut series = HourlySeries {
            precipitation_probability: Vec::with_capacity(precipitation.len()),
            temperature: Vec::with_capacity(temperature.len()),
        };

        // Hours with a null in either series are dropped from both
        for (chance, temp) in precipitation.into_iter().zip(temperature) {
            let (Some(chance), Some(temp)) = (chance, temp) else {
                continue;
            };
            if !(0.0..=100.0).contains(&chance) {
                return Err(WeatherPlanError::invalid_shape(format!(
                    "precipitation probability {chance} is outside 0-100"
                )));
            }
            series.precipitation_probability.push(chance);
            series.temperature.push(temp);
        }

        Ok(series)
    }
}

fn missing(field: &str) -> WeatherPlanError {
    WeatherPlanError::invalid_shape(format!("missing field '{field}'"))
}
