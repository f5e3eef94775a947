use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use weatherplan::aggregator::ForecastAggregator;
use weatherplan::workflow::{activity_prompt, fetch_forecast};
use weatherplan::{
    CallBudget, Geocoder, Locale, ReqwestHttpClient, WeatherPlanConfig, WeatherPlanError,
    WeatherTool, telemetry,
};

/// Weather lookups for activity planning, backed by Open-Meteo
#[derive(Debug, Parser)]
#[command(name = "weatherplan", version, about)]
struct Cli {
    /// Path to a TOML configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Condition text language (en, pt-BR)
    #[arg(long, global = true, env = "WEATHERPLAN_LOCALE")]
    locale: Option<Locale>,

    /// Give up after this many seconds
    #[arg(long, global = true)]
    deadline: Option<u64>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Daily forecast summary for a city
    Forecast {
        #[arg(long)]
        city: String,
        /// Print the activity prompt instead of the summary JSON
        #[arg(long)]
        prompt: bool,
    },
    /// Current conditions for a location
    Current {
        #[arg(long)]
        location: String,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    if let Err(e) = run(cli).await {
        match e.downcast_ref::<WeatherPlanError>() {
            Some(err) => {
                error!("{err}");
                eprintln!("{}", err.user_message());
            }
            None => eprintln!("Error: {e:#}"),
        }
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let mut config = WeatherPlanConfig::load_from_path(cli.config.clone())?;
    if let Some(locale) = cli.locale {
        config.forecast.locale = locale;
    }
    if cli.verbose {
        config.logging.level = "debug".to_string();
    }
    telemetry::init_logging(&config.logging)?;

    let client = ReqwestHttpClient::new(&config.api)?;

    let cancel = CancellationToken::new();
    let ctrl_c = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Interrupted, cancelling");
            ctrl_c.cancel();
        }
    });
    let budget = CallBudget::new(cancel, cli.deadline.map(Duration::from_secs));

    let output = match cli.command {
        Command::Forecast { city, prompt } => {
            let geocoder = Geocoder::new(client.clone(), config.api.geocoding_url.clone());
            let aggregator = ForecastAggregator::from_config(client, &config);
            let summary = fetch_forecast(&geocoder, &aggregator, &city, &budget.start()).await?;
            if prompt {
                activity_prompt(&summary)?
            } else {
                serde_json::to_string_pretty(&summary)
                    .context("Failed to serialize forecast summary")?
            }
        }
        Command::Current { location } => {
            let tool = WeatherTool::new(client, &config);
            let report = budget.run(tool.current(&location)).await?;
            serde_json::to_string_pretty(&report).context("Failed to serialize weather report")?
        }
    };

    println!("{output}");
    Ok(())
}
