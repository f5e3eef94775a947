//! Activity planning workflow
//!
//! A fixed two-step pipeline: resolve the city and aggregate its forecast,
//! then hand the summary to an [`ActivityPlanner`] and collect the text it
//! streams back. Both steps run under one [`CallBudget`].

use crate::aggregator::ForecastAggregator;
use crate::config::WeatherPlanConfig;
use crate::geocoder::Geocoder;
use crate::http::HttpClient;
use crate::models::ForecastSummary;
use crate::{Result, WeatherPlanError};
use async_trait::async_trait;
use futures::StreamExt;
use futures::stream::BoxStream;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument};

/// Finite, non-restartable stream of generated text fragments
pub type TextStream = BoxStream<'static, Result<String>>;

/// Text-generation collaborator that turns a forecast into suggestions
#[async_trait]
pub trait ActivityPlanner: Send + Sync {
    async fn plan(&self, forecast: &ForecastSummary) -> Result<TextStream>;
}

/// Prompt payload for a planner: a lead sentence plus the summary as JSON
pub fn activity_prompt(forecast: &ForecastSummary) -> Result<String> {
    let json = serde_json::to_string_pretty(forecast).map_err(|e| {
        WeatherPlanError::invalid_shape(format!("forecast could not be serialized: {e}"))
    })?;
    Ok(format!(
        "Based on the following weather forecast for {}, suggest appropriate activities:\n{}\n",
        forecast.location, json
    ))
}

/// Cancellation and deadline bounding one workflow run
#[derive(Debug, Clone, Default)]
pub struct CallBudget {
    pub cancel: CancellationToken,
    pub deadline: Option<Duration>,
}

impl CallBudget {
    #[must_use]
    pub fn new(cancel: CancellationToken, deadline: Option<Duration>) -> Self {
        Self { cancel, deadline }
    }

    #[must_use]
    pub fn with_deadline(deadline: Duration) -> Self {
        Self {
            cancel: CancellationToken::new(),
            deadline: Some(deadline),
        }
    }

    /// Fix the deadline to an instant measured from now.
    ///
    /// Every step run through the returned [`BoundedRun`] shares that
    /// instant, so chained steps together stay within one deadline.
    #[must_use]
    pub fn start(&self) -> BoundedRun<'_> {
        BoundedRun {
            budget: self,
            expires_at: self.deadline.map(|after| Instant::now() + after),
        }
    }

    /// Run a single `fut` unless cancelled first or the deadline elapses
    pub async fn run<T, F>(&self, fut: F) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        self.start().run(fut).await
    }
}

/// A [`CallBudget`] whose deadline has started counting down
#[derive(Debug, Clone, Copy)]
pub struct BoundedRun<'a> {
    budget: &'a CallBudget,
    expires_at: Option<Instant>,
}

impl BoundedRun<'_> {
    /// Run `fut` unless cancelled first or the shared deadline passes
    pub async fn run<T, F>(&self, fut: F) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        let bounded = async {
            match (self.expires_at, self.budget.deadline) {
                (Some(at), Some(after)) => tokio::time::timeout_at(at, fut)
                    .await
                    .map_err(|_| WeatherPlanError::DeadlineExceeded { after })?,
                _ => fut.await,
            }
        };

        tokio::select! {
            biased;
            () = self.budget.cancel.cancelled() => Err(WeatherPlanError::Cancelled),
            result = bounded => result,
        }
    }
}

/// Geocode `city` and aggregate its forecast within `run`
pub async fn fetch_forecast<C: HttpClient>(
    geocoder: &Geocoder<C>,
    aggregator: &ForecastAggregator<C>,
    city: &str,
    run: &BoundedRun<'_>,
) -> Result<ForecastSummary> {
    run.run(async {
        let location = geocoder.resolve(city).await?;
        aggregator.aggregate(&location).await
    })
    .await
}

/// Forecast plus the planner's collected suggestions
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ActivityPlan {
    pub forecast: ForecastSummary,
    pub activities: String,
}

pub struct WeatherWorkflow<C, P> {
    geocoder: Geocoder<C>,
    aggregator: ForecastAggregator<C>,
    planner: P,
}

impl<C: HttpClient + Clone, P: ActivityPlanner> WeatherWorkflow<C, P> {
    pub fn new(client: C, config: &WeatherPlanConfig, planner: P) -> Self {
        Self {
            geocoder: Geocoder::new(client.clone(), config.api.geocoding_url.clone()),
            aggregator: ForecastAggregator::from_config(client, config),
            planner,
        }
    }
}

impl<C: HttpClient, P: ActivityPlanner> WeatherWorkflow<C, P> {
    /// Geocode `city` and aggregate its forecast
    pub async fn fetch_forecast(&self, city: &str, budget: &CallBudget) -> Result<ForecastSummary> {
        fetch_forecast(&self.geocoder, &self.aggregator, city, &budget.start()).await
    }

    /// Fetch the forecast for `city` and collect the planner's suggestions.
    ///
    /// The budget's deadline covers both steps together.
    #[instrument(skip(self, budget))]
    pub async fn run(&self, city: &str, budget: &CallBudget) -> Result<ActivityPlan> {
        let bounded = budget.start();
        let forecast = fetch_forecast(&self.geocoder, &self.aggregator, city, &bounded).await?;
        info!(
            "Forecast for {}: {} ({}, {:.0}% precipitation)",
            forecast.location,
            forecast.condition,
            forecast.format_temperature_range(),
            forecast.precipitation_chance
        );

        let activities = bounded
            .run(async {
                let mut stream = self.planner.plan(&forecast).await?;
                let mut text = String::new();
                while let Some(fragment) = stream.next().await {
                    text.push_str(&fragment?);
                }
                Ok(text)
            })
            .await?;
        debug!("Planner returned {} bytes", activities.len());

        Ok(ActivityPlan {
            forecast,
            activities,
        })
    }
}
