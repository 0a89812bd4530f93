//! HTTP client for the timeline weather endpoint
//!
//! Issues exactly one GET per call and classifies every failure mode into
//! the closed [`ForecastError`] set. No retries and no caching: each user
//! action maps to one request.

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{Client, Url};
use tracing::{debug, error, info, instrument, warn};

use crate::config::WeatherConfig;
use crate::error::ForecastError;
use crate::models::Forecast;

/// Source of forecasts for a place name.
///
/// [`ForecastClient`] is the production implementation; scripted doubles
/// live in [`crate::mock`].
#[async_trait]
pub trait ForecastSource: Send + Sync {
    async fn fetch_forecast(&self, place: &str) -> Result<Forecast, ForecastError>;
}

#[async_trait]
impl<T: ForecastSource + ?Sized> ForecastSource for std::sync::Arc<T> {
    async fn fetch_forecast(&self, place: &str) -> Result<Forecast, ForecastError> {
        (**self).fetch_forecast(place).await
    }
}

#[async_trait]
impl<T: ForecastSource + ?Sized> ForecastSource for Box<T> {
    async fn fetch_forecast(&self, place: &str) -> Result<Forecast, ForecastError> {
        (**self).fetch_forecast(place).await
    }
}

/// Weather API client for the timeline endpoint
pub struct ForecastClient {
    client: Client,
    config: WeatherConfig,
}

impl ForecastClient {
    /// Create a new client from the weather configuration
    pub fn new(config: WeatherConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds.into()))
            .user_agent(concat!("skycast/", env!("CARGO_PKG_VERSION")))
            .build()
            .with_context(|| "Failed to create HTTP client")?;

        Ok(Self { client, config })
    }

    /// Pure string composition: base URL + encoded place + fixed query
    /// parameters.
    fn build_request_url(&self, place: &str) -> Result<Url, ForecastError> {
        if place.trim().is_empty() {
            warn!("empty place name cannot be encoded into a request");
            return Err(ForecastError::InvalidQuery);
        }

        let raw = format!(
            "{}/{}/today?unitGroup=metric&elements={}&key={}&contentType=json",
            self.config.base_url.trim_end_matches('/'),
            urlencoding::encode(place.trim()),
            self.config.elements,
            self.config.api_key.as_deref().unwrap_or_default(),
        );

        Url::parse(&raw).map_err(|e| {
            warn!("composed weather URL is malformed: {e}");
            ForecastError::InvalidQuery
        })
    }
}

#[async_trait]
impl ForecastSource for ForecastClient {
    #[instrument(skip(self))]
    async fn fetch_forecast(&self, place: &str) -> Result<Forecast, ForecastError> {
        let url = self.build_request_url(place)?;
        debug!("requesting forecast for '{place}'");

        let response = self.client.get(url).send().await.map_err(|e| {
            // The request URL carries the API key, so it must not surface in
            // logs or the error message
            let e = e.without_url();
            warn!("forecast request failed: {e}");
            ForecastError::TransportFailed(e.to_string())
        })?;

        let status = response.status();
        if !status.is_success() {
            warn!("weather endpoint returned {status}");
            return Err(ForecastError::InvalidResponse);
        }

        // Success status but the body stream broke; nothing above can
        // classify this more precisely
        let body = response.text().await.map_err(|e| {
            error!("failed to read forecast body: {e}");
            ForecastError::Unknown
        })?;

        let forecast = decode_forecast(&body)?;
        info!(
            "fetched {}-day forecast for '{}'",
            forecast.days.len(),
            forecast.resolved_address
        );
        Ok(forecast)
    }
}

/// Total-or-nothing decode: a body missing any required field is rejected
/// rather than defaulted into a partial forecast, and the day sequence must
/// be chronological with unique epochs.
pub fn decode_forecast(body: &str) -> Result<Forecast, ForecastError> {
    let forecast: Forecast =
        serde_json::from_str(body).map_err(|e| ForecastError::DecodingFailed(e.to_string()))?;

    if !forecast.days_chronological() {
        return Err(ForecastError::DecodingFailed(
            "days are not in chronological order".to_string(),
        ));
    }

    Ok(forecast)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::sample_forecast_days;
    use chrono::NaiveDate;
    use serde_json::Value;

    fn client() -> ForecastClient {
        ForecastClient::new(WeatherConfig {
            api_key: Some("test-key".to_string()),
            ..WeatherConfig::default()
        })
        .unwrap()
    }

    fn fixture_json() -> String {
        let start = NaiveDate::from_ymd_opt(2026, 3, 1).unwrap();
        serde_json::to_string(&sample_forecast_days("Sofia", start, 11, 10)).unwrap()
    }

    #[test]
    fn test_url_contains_fixed_query_parameters() {
        let url = client().build_request_url("Sofia").unwrap();
        let rendered = url.as_str();
        assert!(rendered.contains("/Sofia/today?"));
        assert!(rendered.contains("unitGroup=metric"));
        assert!(rendered.contains("key=test-key"));
        assert!(rendered.contains("contentType=json"));
    }

    #[test]
    fn test_url_percent_encodes_place() {
        let url = client().build_request_url("New York").unwrap();
        assert!(url.as_str().contains("/New%20York/today?"));
    }

    #[test]
    fn test_empty_place_is_invalid_query() {
        assert_eq!(
            client().build_request_url("").unwrap_err(),
            ForecastError::InvalidQuery
        );
        assert_eq!(
            client().build_request_url("   ").unwrap_err(),
            ForecastError::InvalidQuery
        );
    }

    #[tokio::test]
    async fn test_transport_error_does_not_leak_the_api_key() {
        // Nothing listens on this port, so the send fails at the socket
        let client = ForecastClient::new(WeatherConfig {
            api_key: Some("secret-key".to_string()),
            base_url: "http://127.0.0.1:9".to_string(),
            timeout_seconds: 1,
            ..WeatherConfig::default()
        })
        .unwrap();

        match client.fetch_forecast("Sofia").await.unwrap_err() {
            ForecastError::TransportFailed(cause) => {
                assert!(
                    !cause.contains("secret-key"),
                    "transport error exposed the key: {cause}"
                );
            }
            other => panic!("expected TransportFailed, got {other:?}"),
        }
    }

    #[test]
    fn test_decode_round_trips_valid_body() {
        let body = fixture_json();
        let forecast = decode_forecast(&body).unwrap();
        assert_eq!(forecast.days.len(), 10);
        assert!(forecast.days_chronological());
    }

    #[test]
    fn test_decode_rejects_missing_day_field() {
        let mut value: Value = serde_json::from_str(&fixture_json()).unwrap();
        value["days"][3]
            .as_object_mut()
            .unwrap()
            .remove("dew")
            .unwrap();

        let error = decode_forecast(&value.to_string()).unwrap_err();
        assert!(matches!(error, ForecastError::DecodingFailed(_)));
    }

    #[test]
    fn test_decode_rejects_missing_top_level_field() {
        let mut value: Value = serde_json::from_str(&fixture_json()).unwrap();
        value.as_object_mut().unwrap().remove("timezone").unwrap();

        let error = decode_forecast(&value.to_string()).unwrap_err();
        assert!(matches!(error, ForecastError::DecodingFailed(_)));
    }

    #[test]
    fn test_decode_rejects_out_of_order_days() {
        let mut value: Value = serde_json::from_str(&fixture_json()).unwrap();
        let days = value["days"].as_array_mut().unwrap();
        days.swap(0, 5);

        let error = decode_forecast(&value.to_string()).unwrap_err();
        assert_eq!(
            error,
            ForecastError::DecodingFailed("days are not in chronological order".to_string())
        );
    }
}
