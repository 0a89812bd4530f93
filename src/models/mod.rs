//! Data models for the skycast pipeline
//!
//! Organized by concern:
//! - Location: coordinates and resolved place names
//! - Forecast: the multi-day weather result decoded from the wire

pub mod forecast;
pub mod location;

// Re-export all public types for convenient access
pub use forecast::{CurrentConditions, Forecast, ForecastDay, HourConditions};
pub use location::{Coordinate, PlaceName};
