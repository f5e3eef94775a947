//! Error types and handling for `WeatherPlan`

use std::time::Duration;
use thiserror::Error;

/// Boxed transport failure as produced by an [`HttpClient`](crate::http::HttpClient).
pub type TransportSource = Box<dyn std::error::Error + Send + Sync>;

/// Main error type for the `WeatherPlan` library
#[derive(Error, Debug)]
pub enum WeatherPlanError {
    /// The geocoder returned no candidates for the query
    #[error("Location '{query}' not found")]
    LocationNotFound { query: String },

    /// An upstream body was missing required fields or carried invalid values
    #[error("Invalid response shape: {message}")]
    InvalidResponseShape { message: String },

    /// Network, DNS or timeout failure. Never retried internally.
    #[error("Transport error: {source}")]
    Transport {
        #[source]
        source: TransportSource,
    },

    /// Upstream answered with a non-success status
    #[error("Upstream returned HTTP {status}: {reason}")]
    Upstream { status: u16, reason: String },

    /// An hourly series needed for a min/max reduction was empty
    #[error("Hourly series '{series}' is empty")]
    EmptySeries { series: String },

    /// Caller input rejected before any request was made
    #[error("Invalid input: {message}")]
    InvalidInput { message: String },

    /// The caller cancelled the operation
    #[error("Operation cancelled")]
    Cancelled,

    /// The caller's deadline elapsed before the operation finished
    #[error("Operation exceeded its deadline of {after:?}")]
    DeadlineExceeded { after: Duration },

    /// Configuration-related errors
    #[error("Configuration error: {message}")]
    Config { message: String },
}

impl WeatherPlanError {
    pub fn location_not_found<S: Into<String>>(query: S) -> Self {
        Self::LocationNotFound {
            query: query.into(),
        }
    }

    pub fn invalid_shape<S: Into<String>>(message: S) -> Self {
        Self::InvalidResponseShape {
            message: message.into(),
        }
    }

    pub fn transport<E: Into<TransportSource>>(source: E) -> Self {
        Self::Transport {
            source: source.into(),
        }
    }

    pub fn upstream<S: Into<String>>(status: u16, reason: S) -> Self {
        Self::Upstream {
            status,
            reason: reason.into(),
        }
    }

    pub fn empty_series<S: Into<String>>(series: S) -> Self {
        Self::EmptySeries {
            series: series.into(),
        }
    }

    pub fn invalid_input<S: Into<String>>(message: S) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }

    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Whether a caller may reasonably retry the same request later
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Transport { .. } | Self::DeadlineExceeded { .. } => true,
            Self::Upstream { status, .. } => *status >= 500 || *status == 429,
            _ => false,
        }
    }

    /// Get a user-friendly error message
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::LocationNotFound { query } => {
                format!("Could not find '{query}'. Please check the spelling or try another city.")
            }
            Self::InvalidResponseShape { .. } | Self::EmptySeries { .. } => {
                "The weather service returned incomplete data. Please try again later.".to_string()
            }
            Self::Transport { .. } => {
                "Unable to reach the weather service. Please check your internet connection."
                    .to_string()
            }
            Self::Upstream { status, reason } if *status < 500 => {
                format!("The weather service rejected the request: {reason}")
            }
            Self::Upstream { .. } => {
                "The weather service is having trouble. Please try again later.".to_string()
            }
            Self::InvalidInput { message } => format!("Invalid input: {message}"),
            Self::Cancelled => "The request was cancelled.".to_string(),
            Self::DeadlineExceeded { .. } => "The request took too long. Please try again.".to_string(),
            Self::Config { .. } => {
                "Configuration error. Please check your config file.".to_string()
            }
        }
    }
}
