//! End-to-end orchestrator scenarios driven by scripted doubles

use std::sync::Arc;

use chrono::NaiveDate;
use rstest::rstest;

use skycast::error::{ForecastError, LocationError};
use skycast::mock::{
    sample_forecast, sample_forecast_days, ScriptedForecastClient, ScriptedLocationProbe,
};
use skycast::orchestrator::{ForecastOrchestrator, PipelineState};

fn march_first() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 3, 1).unwrap()
}

/// Scenario: probe resolves "Sofia", client returns a 10-day forecast; the
/// run ends in `Succeeded` holding exactly that forecast.
#[tokio::test]
async fn successful_run_holds_exact_forecast() {
    let fixture = sample_forecast_days("Sofia", march_first(), 42, 10);
    let orchestrator = ForecastOrchestrator::new(
        ScriptedLocationProbe::succeeding("Sofia"),
        ScriptedForecastClient::succeeding(fixture.clone()),
    );

    assert_eq!(orchestrator.state(), PipelineState::Idle);
    orchestrator.run().await;
    assert_eq!(orchestrator.state(), PipelineState::Succeeded(fixture));
}

/// Scenario: location services disabled; the run fails with the mapped
/// message and the forecast client is never invoked.
#[tokio::test]
async fn disabled_services_fail_without_touching_the_client() {
    let client = Arc::new(ScriptedForecastClient::succeeding(sample_forecast(
        "Sofia", 1, 3,
    )));
    let orchestrator = ForecastOrchestrator::new(
        ScriptedLocationProbe::failing(LocationError::ServicesDisabled),
        Arc::clone(&client),
    );

    orchestrator.run().await;
    assert_eq!(
        orchestrator.state(),
        PipelineState::Failed("Location services are disabled.".to_string())
    );
    assert_eq!(client.calls(), 0);
}

/// Scenario: probe succeeds, weather service replies with a bad status.
#[tokio::test]
async fn invalid_response_fails_with_mapped_message() {
    let probe = Arc::new(ScriptedLocationProbe::succeeding("Sofia"));
    let orchestrator = ForecastOrchestrator::new(
        Arc::clone(&probe),
        ScriptedForecastClient::failing(ForecastError::InvalidResponse),
    );

    orchestrator.run().await;
    assert_eq!(
        orchestrator.state(),
        PipelineState::Failed("The weather service returned an invalid response.".to_string())
    );
    assert_eq!(probe.calls(), 1);
}

/// Scenario: a day entry missing one required field poisons the whole
/// decode, and the run surfaces the decoding message.
#[tokio::test]
async fn partial_day_entry_fails_the_whole_run() {
    let mut body = serde_json::to_value(sample_forecast_days("Sofia", march_first(), 9, 10))
        .unwrap();
    body["days"][9].as_object_mut().unwrap().remove("sunset");

    let error = skycast::decode_forecast(&body.to_string()).unwrap_err();
    assert!(matches!(error, ForecastError::DecodingFailed(_)));

    let orchestrator = ForecastOrchestrator::new(
        ScriptedLocationProbe::succeeding("Sofia"),
        ScriptedForecastClient::failing(error),
    );
    orchestrator.run().await;

    match orchestrator.state() {
        PipelineState::Failed(message) => {
            assert!(message.starts_with("Failed to decode weather data:"));
        }
        state => panic!("expected Failed, got {}", state.name()),
    }
}

#[rstest]
#[case::services_disabled(LocationError::ServicesDisabled, "Location services are disabled.")]
#[case::acquisition_failed(LocationError::AcquisitionFailed, "Failed to get the current location.")]
#[case::resolution_failed(LocationError::ResolutionFailed, "Failed to get the city name.")]
#[tokio::test]
async fn every_location_error_maps_to_its_fixed_message(
    #[case] error: LocationError,
    #[case] message: &str,
) {
    let orchestrator = ForecastOrchestrator::new(
        ScriptedLocationProbe::failing(error),
        ScriptedForecastClient::succeeding(sample_forecast("Sofia", 1, 3)),
    );
    orchestrator.run().await;
    assert_eq!(
        orchestrator.state(),
        PipelineState::Failed(message.to_string())
    );
}

#[rstest]
#[case::invalid_query(ForecastError::InvalidQuery, "The weather service URL is invalid.")]
#[case::transport(
    ForecastError::TransportFailed("connection reset".to_string()),
    "Network request failed: connection reset."
)]
#[case::invalid_response(
    ForecastError::InvalidResponse,
    "The weather service returned an invalid response."
)]
#[case::decoding(
    ForecastError::DecodingFailed("missing field `dew`".to_string()),
    "Failed to decode weather data: missing field `dew`."
)]
#[case::unknown(ForecastError::Unknown, "An unknown error occurred.")]
#[tokio::test]
async fn every_forecast_error_maps_to_its_fixed_message(
    #[case] error: ForecastError,
    #[case] message: &str,
) {
    let orchestrator = ForecastOrchestrator::new(
        ScriptedLocationProbe::succeeding("Sofia"),
        ScriptedForecastClient::failing(error),
    );
    orchestrator.run().await;
    assert_eq!(
        orchestrator.state(),
        PipelineState::Failed(message.to_string())
    );
}

/// Reading the state repeatedly without another run returns the same value.
#[tokio::test]
async fn state_reads_are_idempotent() {
    let fixture = sample_forecast_days("Sofia", march_first(), 5, 4);
    let orchestrator = ForecastOrchestrator::new(
        ScriptedLocationProbe::succeeding("Sofia"),
        ScriptedForecastClient::succeeding(fixture),
    );
    orchestrator.run().await;

    let first = orchestrator.state();
    assert_eq!(orchestrator.state(), first);
    assert_eq!(orchestrator.state(), first);
}

/// A second run overwrites the prior terminal state, starting with Loading.
#[tokio::test]
async fn a_new_run_overwrites_the_previous_terminal_state() {
    let probe = Arc::new(ScriptedLocationProbe::failing(
        LocationError::AcquisitionFailed,
    ));
    let orchestrator = Arc::new(ForecastOrchestrator::new(
        Arc::clone(&probe),
        ScriptedForecastClient::succeeding(sample_forecast("Sofia", 1, 3)),
    ));

    orchestrator.run().await;
    let first = orchestrator.state();
    assert!(first.is_terminal());

    // Hold the second run at its suspension point so the Loading overwrite
    // of the terminal state is observable from outside.
    probe.stall();
    let in_flight = Arc::clone(&orchestrator);
    let second = tokio::spawn(async move { in_flight.run().await });
    tokio::task::yield_now().await;
    assert_eq!(orchestrator.state(), PipelineState::Loading);
    second.abort();
}

/// A run fired while one is already in flight is rejected and leaves the
/// in-flight run undisturbed.
#[tokio::test]
async fn reentrant_run_is_rejected_while_loading() {
    let orchestrator = Arc::new(ForecastOrchestrator::new(
        ScriptedLocationProbe::stalling(),
        ScriptedForecastClient::succeeding(sample_forecast("Sofia", 1, 3)),
    ));

    let in_flight = Arc::clone(&orchestrator);
    let first = tokio::spawn(async move { in_flight.run().await });
    // Let the first run claim the guard and reach its suspension point
    tokio::task::yield_now().await;
    assert_eq!(orchestrator.state(), PipelineState::Loading);

    // Returns immediately instead of racing the in-flight run
    orchestrator.run().await;
    assert_eq!(orchestrator.state(), PipelineState::Loading);

    first.abort();
}
