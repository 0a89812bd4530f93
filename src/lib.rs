//! `skycast` - location-aware multi-day weather forecasts
//!
//! This library composes two independent, fallible asynchronous sources - a
//! device location provider and a remote weather API - into a single
//! observable pipeline state. Callback-style platform APIs are bridged into
//! awaitable calls, three error domains are unified into fixed display
//! messages, and deterministic doubles allow testing the whole pipeline
//! without hardware or network.

pub mod client;
pub mod config;
pub mod error;
pub mod location;
pub mod mock;
pub mod models;
pub mod orchestrator;

// Re-export core types for public API
pub use client::{decode_forecast, ForecastClient, ForecastSource};
pub use config::SkycastConfig;
pub use error::{ForecastError, LocationError};
pub use location::{
    CityNameSource, GeoPositionProvider, LocationProbe, PlaceResolver, PositionBackend,
    ReverseGeocodeBackend,
};
pub use models::{Coordinate, Forecast, ForecastDay, PlaceName};
pub use orchestrator::{ForecastOrchestrator, PipelineState};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
