//! Forward geocoding of free-text place names via the `OpenMeteo` search API

use crate::http::HttpClient;
use crate::models::Location;
use crate::{Result, WeatherPlanError, open_meteo};
use std::time::Instant;
use tracing::{debug, info, instrument, warn};

/// Resolves a place name to its best-matching [`Location`]
pub struct Geocoder<C> {
    client: C,
    base_url: String,
}

impl<C: HttpClient> Geocoder<C> {
    pub fn new(client: C, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }

    /// Resolve `location_name` to the first candidate returned.
    ///
    /// The name is sent as given; no case or diacritic normalization.
    #[instrument(skip(self), fields(location = location_name))]
    pub async fn resolve(&self, location_name: &str) -> Result<Location> {
        if location_name.trim().is_empty() {
            return Err(WeatherPlanError::invalid_input("Location cannot be empty"));
        }

        info!("Geocoding location: '{}'", location_name);
        let start_time = Instant::now();

        let url = open_meteo::geocoding_url(&self.base_url, location_name);
        let response = self.client.fetch(&url).await?;
        let body: open_meteo::GeocodingResponse = response.json("geocoding")?;

        let Some(best) = body.results.and_then(|results| results.into_iter().next()) else {
            warn!("No results found for location '{}'", location_name);
            return Err(WeatherPlanError::location_not_found(location_name));
        };

        let location = best.into_location()?;
        debug!(
            "Found location: {} ({:.4}, {:.4}) in {:.3}s",
            location.name,
            location.latitude,
            location.longitude,
            start_time.elapsed().as_secs_f64()
        );

        Ok(location)
    }
}
