//! Validated weather observations

use serde::{Deserialize, Serialize};

/// Current conditions from a single forecast fetch
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct CurrentConditions {
    /// Provider-local timestamp of the observation (ISO 8601, no offset)
    pub timestamp: String,
    /// Air temperature at 2 m in Celsius
    pub temperature: f64,
    /// WMO weather code
    pub weather_code: i32,
    /// Precipitation in mm over the preceding interval
    pub precipitation: Option<f64>,
    /// Present exactly when wind and humidity fields were requested
    pub details: Option<WindAndHumidity>,
}

/// Comfort-related current fields
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
pub struct WindAndHumidity {
    /// Feels-like temperature in Celsius
    pub apparent_temperature: f64,
    /// Relative humidity at 2 m in percent
    pub relative_humidity: f64,
    /// Wind speed at 10 m in km/h
    pub wind_speed: f64,
    /// Wind gusts at 10 m in km/h
    pub wind_gust: f64,
}

/// Hour-aligned forecast series. Both vectors always have the same length.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
pub struct HourlySeries {
    /// Precipitation probability per hour (0-100)
    pub precipitation_probability: Vec<f64>,
    /// Temperature per hour in Celsius
    pub temperature: Vec<f64>,
}

impl HourlySeries {
    #[must_use]
    pub fn len(&self) -> usize {
        self.temperature.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.temperature.is_empty()
    }

    /// (max, min) of the hourly temperatures, `None` when empty
    #[must_use]
    pub fn temperature_extremes(&self) -> Option<(f64, f64)> {
        let mut values = self.temperature.iter().copied();
        let first = values.next()?;
        Some(values.fold((first, first), |(max, min), t| (max.max(t), min.min(t))))
    }

    /// Highest precipitation probability, 0 when empty
    #[must_use]
    pub fn peak_precipitation_chance(&self) -> f64 {
        self.precipitation_probability
            .iter()
            .copied()
            .fold(0.0, f64::max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::RngExt;
    use rstest::rstest;

    fn series(precipitation: &[f64], temperature: &[f64]) -> HourlySeries {
        HourlySeries {
            precipitation_probability: precipitation.to_vec(),
            temperature: temperature.to_vec(),
        }
    }

    #[rstest]
    #[case(&[18.0, 22.0, 25.0, 19.0], (25.0, 18.0))]
    #[case(&[-4.5], (-4.5, -4.5))]
    #[case(&[-10.0, -2.0, -7.5], (-2.0, -10.0))]
    #[case(&[3.0, 3.0, 3.0], (3.0, 3.0))]
    fn test_temperature_extremes(#[case] temperature: &[f64], #[case] expected: (f64, f64)) {
        let hourly = series(&vec![0.0; temperature.len()], temperature);
        assert_eq!(hourly.temperature_extremes(), Some(expected));
    }

    #[test]
    fn test_temperature_extremes_empty() {
        assert_eq!(HourlySeries::default().temperature_extremes(), None);
    }

    #[rstest]
    #[case(&[10.0, 40.0, 70.0, 20.0], 70.0)]
    #[case(&[0.0, 0.0], 0.0)]
    #[case(&[100.0], 100.0)]
    #[case(&[], 0.0)]
    fn test_peak_precipitation(#[case] precipitation: &[f64], #[case] expected: f64) {
        let hourly = series(precipitation, &vec![15.0; precipitation.len()]);
        assert_eq!(hourly.peak_precipitation_chance(), expected);
    }

    #[test]
    fn test_random_series_extremes_match_actual() {
        let mut rng = rand::rng();
        for _ in 0..200 {
            let len = rng.random_range(1..96usize);
            let temperature: Vec<f64> = (0..len).map(|_| rng.random_range(-60.0..60.0)).collect();
            let precipitation: Vec<f64> = (0..len).map(|_| rng.random_range(0.0..=100.0)).collect();
            let hourly = series(&precipitation, &temperature);

            let (max, min) = hourly.temperature_extremes().unwrap();
            assert!(max >= min);
            assert!(temperature.contains(&max));
            assert!(temperature.contains(&min));
            assert!(temperature.iter().all(|t| *t <= max && *t >= min));

            let peak = hourly.peak_precipitation_chance();
            assert!((0.0..=100.0).contains(&peak));
            assert!(precipitation.contains(&peak));
            assert!(precipitation.iter().all(|p| *p <= peak));
        }
    }
}
