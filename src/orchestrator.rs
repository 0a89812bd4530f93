//! Top-level state machine driving the location → forecast pipeline
//!
//! One `run()` executes strictly sequentially: location before place name
//! before forecast. The observable [`PipelineState`] is the only mutable
//! shared value in the core; the orchestrator is its single writer and the
//! presentation layer only reads (or subscribes to) it.

use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::watch;
use tracing::{debug, info, instrument, warn};

use crate::client::ForecastSource;
use crate::location::CityNameSource;
use crate::models::Forecast;

/// Observable state of one orchestration run.
///
/// `NoData` is a reserved terminal for "probe succeeded, forecast empty";
/// no current transition enters it.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum PipelineState {
    #[default]
    Idle,
    Loading,
    Succeeded(Forecast),
    Failed(String),
    NoData,
}

impl PipelineState {
    /// Short name for logging and display plumbing
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Loading => "loading",
            Self::Succeeded(_) => "succeeded",
            Self::Failed(_) => "failed",
            Self::NoData => "no data",
        }
    }

    /// True once a run has ended, one way or the other
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Succeeded(_) | Self::Failed(_) | Self::NoData)
    }
}

/// Drives the probe and the client, mapping every error into a single
/// display state.
pub struct ForecastOrchestrator<P, C> {
    probe: P,
    client: C,
    state: watch::Sender<PipelineState>,
    running: AtomicBool,
}

impl<P: CityNameSource, C: ForecastSource> ForecastOrchestrator<P, C> {
    /// Create an orchestrator in the `Idle` state
    #[must_use]
    pub fn new(probe: P, client: C) -> Self {
        let (state, _) = watch::channel(PipelineState::Idle);
        Self {
            probe,
            client,
            state,
            running: AtomicBool::new(false),
        }
    }

    /// Snapshot of the current pipeline state
    #[must_use]
    pub fn state(&self) -> PipelineState {
        self.state.borrow().clone()
    }

    /// Watch receiver for presentation layers that want push updates
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<PipelineState> {
        self.state.subscribe()
    }

    /// Drive one complete run: `Loading`, then `Succeeded` or `Failed`.
    ///
    /// Never fails outright; every error ends as `Failed` with its fixed
    /// display message. A call while a run is already in flight is rejected
    /// and leaves the in-flight run undisturbed.
    #[instrument(skip(self))]
    pub async fn run(&self) {
        if self.running.swap(true, Ordering::AcqRel) {
            warn!("run already in progress, ignoring re-entrant call");
            return;
        }
        // Frees the run flag on every exit path, including this future being
        // dropped mid-await.
        let _running = RunGuard(&self.running);

        self.transition(PipelineState::Loading);

        let terminal = match self.probe.current_city_name().await {
            Err(error) => {
                debug!("location probe failed: {error}");
                PipelineState::Failed(error.to_string())
            }
            Ok(place) => {
                info!("fetching forecast for {place}");
                match self.client.fetch_forecast(place.as_str()).await {
                    Err(error) => {
                        debug!("forecast fetch failed: {error}");
                        PipelineState::Failed(error.to_string())
                    }
                    Ok(forecast) => PipelineState::Succeeded(forecast),
                }
            }
        };

        self.transition(terminal);
    }

    fn transition(&self, next: PipelineState) {
        debug!("pipeline state -> {}", next.name());
        // send_replace keeps working with zero subscribers
        self.state.send_replace(next);
    }
}

/// Clears the running flag when a run ends, whether it finishes normally or
/// its future is dropped.
struct RunGuard<'a>(&'a AtomicBool);

impl Drop for RunGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}
