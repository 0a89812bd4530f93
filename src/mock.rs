//! Deterministic test doubles for the pipeline components
//!
//! Each double replays a scripted outcome without touching hardware or the
//! network. The success-payload generator is a pure function of a seed, so
//! fixtures are reproducible across runs.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{Days, NaiveDate, NaiveTime, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::client::ForecastSource;
use crate::error::{ForecastError, LocationError};
use crate::location::geoposition::{Authorization, PositionBackend, PositionCallback};
use crate::location::place::{GeocodeCallback, ReverseGeocodeBackend};
use crate::location::CityNameSource;
use crate::models::{
    Coordinate, CurrentConditions, Forecast, ForecastDay, HourConditions, PlaceName,
};

/// Replays a scripted city-name outcome and counts invocations.
pub struct ScriptedLocationProbe {
    /// `None` means the next call never completes
    outcome: Mutex<Option<Result<PlaceName, LocationError>>>,
    calls: AtomicUsize,
}

impl ScriptedLocationProbe {
    fn with_outcome(outcome: Option<Result<PlaceName, LocationError>>) -> Self {
        Self {
            outcome: Mutex::new(outcome),
            calls: AtomicUsize::new(0),
        }
    }

    /// Always resolves to `name`.
    ///
    /// # Panics
    /// Panics when `name` is empty or blank.
    #[must_use]
    pub fn succeeding(name: &str) -> Self {
        Self::with_outcome(Some(Ok(PlaceName::new(name).expect("non-empty place name"))))
    }

    /// Always fails with `error`
    #[must_use]
    pub fn failing(error: LocationError) -> Self {
        Self::with_outcome(Some(Err(error)))
    }

    /// Never completes; useful for exercising in-flight behavior
    #[must_use]
    pub fn stalling() -> Self {
        Self::with_outcome(None)
    }

    /// Re-script the probe so subsequent calls never complete
    pub fn stall(&self) {
        *self.outcome.lock().expect("scripted outcome lock poisoned") = None;
    }

    /// Number of times the probe has been invoked
    #[must_use]
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CityNameSource for ScriptedLocationProbe {
    async fn current_city_name(&self) -> Result<PlaceName, LocationError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let scripted = self
            .outcome
            .lock()
            .expect("scripted outcome lock poisoned")
            .clone();
        match scripted {
            Some(outcome) => outcome,
            None => std::future::pending().await,
        }
    }
}

/// Replays a scripted forecast outcome and counts invocations.
pub struct ScriptedForecastClient {
    outcome: Result<Forecast, ForecastError>,
    calls: AtomicUsize,
}

impl ScriptedForecastClient {
    /// Always returns `forecast`
    #[must_use]
    pub fn succeeding(forecast: Forecast) -> Self {
        Self {
            outcome: Ok(forecast),
            calls: AtomicUsize::new(0),
        }
    }

    /// Always fails with `error`
    #[must_use]
    pub fn failing(error: ForecastError) -> Self {
        Self {
            outcome: Err(error),
            calls: AtomicUsize::new(0),
        }
    }

    /// Number of times the client has been invoked
    #[must_use]
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ForecastSource for ScriptedForecastClient {
    async fn fetch_forecast(&self, _place: &str) -> Result<Forecast, ForecastError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.outcome.clone()
    }
}

/// Scripted platform location backend for exercising the awaitable bridge
pub struct ScriptedPositionBackend {
    enabled: bool,
    authorization: Authorization,
    /// `None` means the platform never answers
    outcome: Option<Result<Coordinate, String>>,
    /// Callbacks parked by the unresponsive mode so the request stays
    /// pending instead of being dropped
    parked: Mutex<Vec<PositionCallback>>,
    authorization_requests: AtomicUsize,
    position_requests: AtomicUsize,
}

impl ScriptedPositionBackend {
    fn with_outcome(
        enabled: bool,
        authorization: Authorization,
        outcome: Option<Result<Coordinate, String>>,
    ) -> Self {
        Self {
            enabled,
            authorization,
            outcome,
            parked: Mutex::new(Vec::new()),
            authorization_requests: AtomicUsize::new(0),
            position_requests: AtomicUsize::new(0),
        }
    }

    /// Delivers `position` on every request
    #[must_use]
    pub fn delivering(position: Coordinate) -> Self {
        Self::with_outcome(true, Authorization::Granted, Some(Ok(position)))
    }

    /// Reports `cause` on every request
    #[must_use]
    pub fn erroring(cause: &str) -> Self {
        Self::with_outcome(true, Authorization::Granted, Some(Err(cause.to_string())))
    }

    /// Location services are switched off
    #[must_use]
    pub fn disabled() -> Self {
        Self::with_outcome(false, Authorization::Granted, None)
    }

    /// Accepts requests but never invokes their callbacks
    #[must_use]
    pub fn unresponsive() -> Self {
        Self::with_outcome(true, Authorization::Granted, None)
    }

    /// Override the reported authorization state
    #[must_use]
    pub fn with_authorization(mut self, authorization: Authorization) -> Self {
        self.authorization = authorization;
        self
    }

    #[must_use]
    pub fn authorization_requests(&self) -> usize {
        self.authorization_requests.load(Ordering::SeqCst)
    }

    #[must_use]
    pub fn position_requests(&self) -> usize {
        self.position_requests.load(Ordering::SeqCst)
    }
}

impl PositionBackend for ScriptedPositionBackend {
    fn services_enabled(&self) -> bool {
        self.enabled
    }

    fn authorization(&self) -> Authorization {
        self.authorization
    }

    fn request_authorization(&self) {
        self.authorization_requests.fetch_add(1, Ordering::SeqCst);
    }

    fn request_position(&self, deliver: PositionCallback) {
        self.position_requests.fetch_add(1, Ordering::SeqCst);
        match self.outcome.clone() {
            Some(outcome) => deliver(outcome),
            None => self
                .parked
                .lock()
                .expect("parked callbacks lock poisoned")
                .push(deliver),
        }
    }
}

/// Scripted reverse-geocoding backend
pub struct ScriptedGeocodeBackend {
    outcome: Result<Option<String>, String>,
}

impl ScriptedGeocodeBackend {
    /// Resolves every coordinate to `locality`
    #[must_use]
    pub fn resolving(locality: &str) -> Self {
        Self {
            outcome: Ok(Some(locality.to_string())),
        }
    }

    /// Succeeds but finds no usable locality
    #[must_use]
    pub fn empty() -> Self {
        Self { outcome: Ok(None) }
    }

    /// Fails transport-side with `cause`
    #[must_use]
    pub fn erroring(cause: &str) -> Self {
        Self {
            outcome: Err(cause.to_string()),
        }
    }
}

impl ReverseGeocodeBackend for ScriptedGeocodeBackend {
    fn reverse_geocode(&self, _position: Coordinate, deliver: GeocodeCallback) {
        deliver(self.outcome.clone());
    }
}

const DESCRIPTIONS: &[&str] = &[
    "Clear conditions throughout the day.",
    "Partly cloudy throughout the day.",
    "Becoming cloudy in the afternoon.",
    "Rain showers in the morning.",
    "Snow flurries possible late.",
];

/// Build a valid multi-day forecast for `place` starting at `start`.
///
/// Pure function of its arguments: the same seed always yields the same
/// forecast. Days are chronological with unique epochs, extremes bracket the
/// daily temperature, and every day carries 24 hourly samples.
#[must_use]
pub fn sample_forecast_days(
    place: &str,
    start: NaiveDate,
    seed: u64,
    day_count: usize,
) -> Forecast {
    let mut rng = StdRng::seed_from_u64(seed);
    let latitude = round4(rng.random_range(-60.0..60.0));
    let longitude = round4(rng.random_range(-180.0..180.0));

    let days: Vec<ForecastDay> = (0..day_count)
        .map(|offset| {
            let date = start + Days::new(offset as u64);
            let temp_min = round1(rng.random_range(-5.0..12.0));
            let temp_max = round1(temp_min + rng.random_range(2.0..15.0));
            let temp = round1((temp_min + temp_max) / 2.0);
            let dew = round1(temp_min - rng.random_range(0.0..3.0));

            let hours = (0..24)
                .map(|hour| HourConditions {
                    datetime: format!("{hour:02}:00:00"),
                    dew: round1(dew + rng.random_range(-1.0..1.0)),
                })
                .collect();

            ForecastDay {
                datetime: date.format("%Y-%m-%d").to_string(),
                datetime_epoch: date.and_time(NaiveTime::MIN).and_utc().timestamp(),
                temp_max,
                temp_min,
                temp,
                dew,
                sunrise: format!(
                    "{:02}:{:02}:{:02}",
                    rng.random_range(5..8),
                    rng.random_range(0..60),
                    rng.random_range(0..60)
                ),
                sunset: format!(
                    "{:02}:{:02}:{:02}",
                    rng.random_range(17..21),
                    rng.random_range(0..60),
                    rng.random_range(0..60)
                ),
                description: DESCRIPTIONS[rng.random_range(0..DESCRIPTIONS.len())].to_string(),
                hours,
            }
        })
        .collect();

    let current_conditions = days.first().map_or_else(
        || CurrentConditions {
            dew: 0.0,
            sunrise: "06:30:00".to_string(),
            sunset: "18:30:00".to_string(),
        },
        |today| CurrentConditions {
            dew: today.dew,
            sunrise: today.sunrise.clone(),
            sunset: today.sunset.clone(),
        },
    );

    Forecast {
        query_cost: 1,
        latitude,
        longitude,
        resolved_address: place.to_string(),
        address: place.to_string(),
        timezone: "Etc/UTC".to_string(),
        tz_offset: 0.0,
        days,
        alerts: Vec::new(),
        current_conditions,
    }
}

/// Same generator anchored at today's date
#[must_use]
pub fn sample_forecast(place: &str, seed: u64, day_count: usize) -> Forecast {
    sample_forecast_days(place, Utc::now().date_naive(), seed, day_count)
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

fn round4(value: f64) -> f64 {
    (value * 10_000.0).round() / 10_000.0
}
