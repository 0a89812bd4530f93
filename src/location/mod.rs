//! Location probing: current position to a classified city-name result

pub mod geoposition;
pub mod place;

use async_trait::async_trait;
use tracing::{debug, instrument};

use crate::error::LocationError;
use crate::models::PlaceName;

pub use geoposition::{
    Authorization, GeoPositionProvider, PositionBackend, PositionCallback, PositionError,
    DEFAULT_ACQUISITION_TIMEOUT,
};
pub use place::{GeocodeCallback, PlaceResolver, ResolveError, ReverseGeocodeBackend};

/// Source of the current city name.
///
/// [`LocationProbe`] is the production implementation; scripted doubles live
/// in [`crate::mock`].
#[async_trait]
pub trait CityNameSource: Send + Sync {
    /// Never panics and never escapes a raw backend failure: every failure
    /// path is captured into the `LocationError` result.
    async fn current_city_name(&self) -> Result<PlaceName, LocationError>;
}

#[async_trait]
impl<T: CityNameSource + ?Sized> CityNameSource for std::sync::Arc<T> {
    async fn current_city_name(&self) -> Result<PlaceName, LocationError> {
        (**self).current_city_name().await
    }
}

#[async_trait]
impl<T: CityNameSource + ?Sized> CityNameSource for Box<T> {
    async fn current_city_name(&self) -> Result<PlaceName, LocationError> {
        (**self).current_city_name().await
    }
}

/// Composes [`GeoPositionProvider`] and [`PlaceResolver`] into one
/// operation: current city name or a classified location error.
pub struct LocationProbe {
    provider: GeoPositionProvider,
    resolver: PlaceResolver,
}

impl LocationProbe {
    #[must_use]
    pub fn new(provider: GeoPositionProvider, resolver: PlaceResolver) -> Self {
        Self { provider, resolver }
    }
}

#[async_trait]
impl CityNameSource for LocationProbe {
    #[instrument(skip(self))]
    async fn current_city_name(&self) -> Result<PlaceName, LocationError> {
        let position = self
            .provider
            .acquire_current_position()
            .await
            .map_err(|error| match error {
                PositionError::ServicesDisabled => LocationError::ServicesDisabled,
                PositionError::AcquisitionFailed | PositionError::AlreadyAcquiring => {
                    LocationError::AcquisitionFailed
                }
            })?;
        debug!("acquired position {}", position.format());

        // Both resolver failure kinds fold into one category: the caller
        // only needs display-level granularity, not provider detail.
        let name = self
            .resolver
            .resolve_place_name(position)
            .await
            .map_err(|_| LocationError::ResolutionFailed)?;
        debug!("current city name: {name}");
        Ok(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{ScriptedGeocodeBackend, ScriptedPositionBackend};
    use crate::models::Coordinate;
    use std::sync::Arc;

    fn probe(
        position: ScriptedPositionBackend,
        geocoder: ScriptedGeocodeBackend,
    ) -> LocationProbe {
        LocationProbe::new(
            GeoPositionProvider::new(Arc::new(position)),
            PlaceResolver::new(Arc::new(geocoder)),
        )
    }

    #[tokio::test]
    async fn test_probe_resolves_city_name() {
        let p = probe(
            ScriptedPositionBackend::delivering(Coordinate::new(42.6977, 23.3219)),
            ScriptedGeocodeBackend::resolving("Sofia"),
        );
        assert_eq!(p.current_city_name().await.unwrap().as_str(), "Sofia");
    }

    #[tokio::test]
    async fn test_disabled_services_keep_their_kind() {
        let p = probe(
            ScriptedPositionBackend::disabled(),
            ScriptedGeocodeBackend::resolving("Sofia"),
        );
        assert_eq!(
            p.current_city_name().await,
            Err(LocationError::ServicesDisabled)
        );
    }

    #[tokio::test]
    async fn test_acquisition_error_maps_by_kind() {
        let p = probe(
            ScriptedPositionBackend::erroring("no satellites"),
            ScriptedGeocodeBackend::resolving("Sofia"),
        );
        assert_eq!(
            p.current_city_name().await,
            Err(LocationError::AcquisitionFailed)
        );
    }

    #[tokio::test]
    async fn test_resolver_failures_fold_into_one_category() {
        let transport = probe(
            ScriptedPositionBackend::delivering(Coordinate::new(0.0, 0.0)),
            ScriptedGeocodeBackend::erroring("dns failure"),
        );
        assert_eq!(
            transport.current_city_name().await,
            Err(LocationError::ResolutionFailed)
        );

        let empty = probe(
            ScriptedPositionBackend::delivering(Coordinate::new(0.0, 0.0)),
            ScriptedGeocodeBackend::empty(),
        );
        assert_eq!(
            empty.current_city_name().await,
            Err(LocationError::ResolutionFailed)
        );
    }
}
