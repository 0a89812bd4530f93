//! Demo driver: wires the pipeline together, runs it once, and prints the
//! terminal state. All real control flow lives in the library.

use std::sync::Arc;

use anyhow::Result;
use tracing_subscriber::EnvFilter;

use skycast::client::{ForecastClient, ForecastSource};
use skycast::config::SkycastConfig;
use skycast::location::{GeoPositionProvider, LocationProbe, PlaceResolver};
use skycast::mock::{
    sample_forecast, ScriptedForecastClient, ScriptedGeocodeBackend, ScriptedPositionBackend,
};
use skycast::models::Coordinate;
use skycast::orchestrator::{ForecastOrchestrator, PipelineState};

#[tokio::main]
async fn main() -> Result<()> {
    let config = SkycastConfig::load()?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config.logging.level.clone())),
        )
        .init();

    // No portable system location backend ships with the demo, so the
    // location side runs on scripted backends against a fixed position.
    let position = Coordinate::new(42.6977, 23.3219);
    let provider = GeoPositionProvider::with_timeout(
        Arc::new(ScriptedPositionBackend::delivering(position)),
        config.location.acquisition_timeout(),
    );
    let resolver = PlaceResolver::new(Arc::new(ScriptedGeocodeBackend::resolving("Sofia")));
    let probe = LocationProbe::new(provider, resolver);

    let client: Box<dyn ForecastSource> = if config.weather.api_key.is_some() {
        Box::new(ForecastClient::new(config.weather.clone())?)
    } else {
        tracing::warn!("no API key configured, replaying scripted forecast data");
        Box::new(ScriptedForecastClient::succeeding(sample_forecast(
            "Sofia", 7, 10,
        )))
    };

    let orchestrator = ForecastOrchestrator::new(probe, client);
    orchestrator.run().await;

    match orchestrator.state() {
        PipelineState::Succeeded(forecast) => {
            println!(
                "Forecast for {} ({}, UTC{:+})",
                forecast.resolved_address, forecast.timezone, forecast.tz_offset
            );
            for day in &forecast.days {
                println!(
                    "  {}  {:>5.1}°C / {:>5.1}°C  {}",
                    day.datetime, day.temp_min, day.temp_max, day.description
                );
            }
            if !forecast.alerts.is_empty() {
                println!("Active alerts: {}", forecast.alerts.join("; "));
            }
        }
        PipelineState::Failed(message) => println!("{message}"),
        state => println!("Pipeline ended in unexpected state: {}", state.name()),
    }

    Ok(())
}
