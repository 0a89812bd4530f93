//! Error taxonomy for the forecast pipeline
//!
//! Both sets are closed: every lower-level failure is caught and
//! reclassified at its component boundary, and nothing escapes past
//! [`crate::location::LocationProbe`] or [`crate::client::ForecastClient`]
//! unclassified. The `Display` strings are the exact user-facing text the
//! orchestrator surfaces when a run terminates in `Failed`.

use thiserror::Error;

/// Failures while resolving the current city name
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LocationError {
    /// The platform location capability is switched off
    #[error("Location services are disabled.")]
    ServicesDisabled,

    /// The provider reported an error, returned no position, or timed out
    #[error("Failed to get the current location.")]
    AcquisitionFailed,

    /// Reverse geocoding errored or produced no usable locality; both cases
    /// fold into this one display category
    #[error("Failed to get the city name.")]
    ResolutionFailed,
}

/// Failures while fetching or decoding the forecast
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ForecastError {
    /// The place name could not be encoded into a well-formed request
    #[error("The weather service URL is invalid.")]
    InvalidQuery,

    /// The network call itself errored
    #[error("Network request failed: {0}.")]
    TransportFailed(String),

    /// The service replied with a non-success status
    #[error("The weather service returned an invalid response.")]
    InvalidResponse,

    /// The reply body could not be parsed into the forecast shape
    #[error("Failed to decode weather data: {0}.")]
    DecodingFailed(String),

    /// Catch-all for failures no branch above classifies
    #[error("An unknown error occurred.")]
    Unknown,
}
