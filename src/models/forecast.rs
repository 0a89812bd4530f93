//! Forecast models mirroring the timeline weather API response shape.
//!
//! Every field is required: a response body missing any of them fails the
//! whole decode instead of producing a partially populated forecast.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Complete multi-day weather result for one place.
///
/// Immutable once constructed; owned by the orchestrator run that fetched it
/// and handed to the presentation layer by value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Forecast {
    /// Cost units charged for the query
    #[serde(rename = "queryCost")]
    pub query_cost: u32,
    pub latitude: f64,
    pub longitude: f64,
    /// Full address the service resolved the query to
    #[serde(rename = "resolvedAddress")]
    pub resolved_address: String,
    /// Short form of the queried address
    pub address: String,
    /// IANA timezone name for the resolved place
    pub timezone: String,
    /// UTC offset in hours, fractional for half-hour zones
    #[serde(rename = "tzoffset")]
    pub tz_offset: f64,
    /// Daily summaries, chronological starting from the query day
    pub days: Vec<ForecastDay>,
    /// Active weather alerts, possibly empty
    pub alerts: Vec<String>,
    #[serde(rename = "currentConditions")]
    pub current_conditions: CurrentConditions,
}

impl Forecast {
    /// Weather for the query day (first entry)
    #[must_use]
    pub fn current_day(&self) -> Option<&ForecastDay> {
        self.days.first()
    }

    /// Weather `offset` days after the query day
    #[must_use]
    pub fn day(&self, offset: usize) -> Option<&ForecastDay> {
        self.days.get(offset)
    }

    /// True when the day sequence is strictly ascending by epoch, which also
    /// guarantees each day's identity is unique within the forecast.
    #[must_use]
    pub fn days_chronological(&self) -> bool {
        self.days
            .windows(2)
            .all(|pair| pair[0].datetime_epoch < pair[1].datetime_epoch)
    }
}

/// One calendar day's weather summary within a [`Forecast`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastDay {
    /// Calendar date string (`YYYY-MM-DD`)
    pub datetime: String,
    /// Unix timestamp identifying this day within the forecast
    #[serde(rename = "datetimeEpoch")]
    pub datetime_epoch: i64,
    #[serde(rename = "tempmax")]
    pub temp_max: f64,
    #[serde(rename = "tempmin")]
    pub temp_min: f64,
    /// Temperature at the reading closest to now
    pub temp: f64,
    /// Dew point in the configured unit system
    pub dew: f64,
    /// Sunrise time as `HH:MM:SS`
    pub sunrise: String,
    /// Sunset time as `HH:MM:SS`
    pub sunset: String,
    /// Free-text conditions summary
    pub description: String,
    /// Hourly samples for the day, in hour order
    pub hours: Vec<HourConditions>,
}

impl ForecastDay {
    /// Parse the calendar string into a date
    #[must_use]
    pub fn date(&self) -> Option<NaiveDate> {
        NaiveDate::parse_from_str(&self.datetime, "%Y-%m-%d").ok()
    }
}

/// One hourly sample within a day
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HourConditions {
    /// Time of day as `HH:MM:SS`
    pub datetime: String,
    pub dew: f64,
}

/// Snapshot of conditions at query time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentConditions {
    pub dew: f64,
    pub sunrise: String,
    pub sunset: String,
}
