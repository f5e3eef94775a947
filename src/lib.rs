//! `WeatherPlan` - weather-aware activity planning
//!
//! This library resolves place names, fetches Open-Meteo forecasts and
//! reduces them into compact summaries that a text-generation collaborator
//! turns into activity suggestions.

pub mod aggregator;
pub mod conditions;
pub mod config;
pub mod error;
pub mod geocoder;
pub mod http;
pub mod models;
pub mod open_meteo;
pub mod telemetry;
pub mod weather_tool;
pub mod workflow;

// Re-export core types for public API
pub use aggregator::{EmptySeriesPolicy, FieldSelection, ForecastAggregator};
pub use conditions::{Locale, WeatherCodeTable};
pub use config::WeatherPlanConfig;
pub use error::WeatherPlanError;
pub use geocoder::Geocoder;
pub use http::{HttpClient, HttpResponse, ReqwestHttpClient};
pub use models::{CurrentWeatherReport, ForecastSnapshot, ForecastSummary, Location};
pub use weather_tool::WeatherTool;
pub use workflow::{ActivityPlan, ActivityPlanner, BoundedRun, CallBudget, WeatherWorkflow};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Core result type used throughout the library
pub type Result<T> = std::result::Result<T, WeatherPlanError>;
