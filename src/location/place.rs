//! Reverse geocoding: coordinates to a human-readable place name
//!
//! Same bridging shape as position acquisition, but pure request/response:
//! there is no shared pending slot, so independent coordinates may be
//! resolved concurrently.

use std::sync::Arc;

use tokio::sync::oneshot;
use tracing::{debug, instrument, warn};

use crate::models::{Coordinate, PlaceName};

/// Terminal callback for one reverse-geocoding request. Carries the locality
/// name (`None` when the service found no usable locality field) or the
/// transport error description.
pub type GeocodeCallback = Box<dyn FnOnce(Result<Option<String>, String>) + Send + 'static>;

/// Reverse-geocoding boundary: input coordinates, one terminal callback with
/// a locality string or an error
pub trait ReverseGeocodeBackend: Send + Sync + 'static {
    fn reverse_geocode(&self, position: Coordinate, deliver: GeocodeCallback);
}

/// Low-level resolution failures, folded into a single
/// [`crate::error::LocationError::ResolutionFailed`] category by the probe
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolveError {
    /// The geocoding call errored transport-side
    ResolutionFailed,
    /// The call succeeded but returned no usable locality
    NoLocality,
}

/// Awaitable wrapper around a [`ReverseGeocodeBackend`]
pub struct PlaceResolver {
    backend: Arc<dyn ReverseGeocodeBackend>,
}

impl PlaceResolver {
    #[must_use]
    pub fn new(backend: Arc<dyn ReverseGeocodeBackend>) -> Self {
        Self { backend }
    }

    /// Suspend until the geocoding backend answers for `position`
    #[instrument(skip(self), fields(position = %position.format()))]
    pub async fn resolve_place_name(
        &self,
        position: Coordinate,
    ) -> Result<PlaceName, ResolveError> {
        let (tx, rx) = oneshot::channel();
        self.backend.reverse_geocode(
            position,
            Box::new(move |outcome| {
                let _ = tx.send(outcome);
            }),
        );

        match rx.await {
            // A blank locality string counts as no locality
            Ok(Ok(Some(locality))) => {
                debug!("resolved locality: {locality}");
                PlaceName::new(locality).ok_or(ResolveError::NoLocality)
            }
            Ok(Ok(None)) => {
                debug!("geocoder returned no locality for {}", position.format());
                Err(ResolveError::NoLocality)
            }
            Ok(Err(cause)) => {
                warn!("reverse geocoding failed: {cause}");
                Err(ResolveError::ResolutionFailed)
            }
            Err(_) => {
                warn!("geocoder discarded the request");
                Err(ResolveError::ResolutionFailed)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::ScriptedGeocodeBackend;

    #[tokio::test]
    async fn test_resolve_returns_locality() {
        let resolver = PlaceResolver::new(Arc::new(ScriptedGeocodeBackend::resolving("Sofia")));
        let name = resolver
            .resolve_place_name(Coordinate::new(42.6977, 23.3219))
            .await
            .unwrap();
        assert_eq!(name.as_str(), "Sofia");
    }

    #[tokio::test]
    async fn test_missing_locality_is_no_locality() {
        let resolver = PlaceResolver::new(Arc::new(ScriptedGeocodeBackend::empty()));
        assert_eq!(
            resolver
                .resolve_place_name(Coordinate::new(0.0, 0.0))
                .await,
            Err(ResolveError::NoLocality)
        );
    }

    #[tokio::test]
    async fn test_blank_locality_is_no_locality() {
        let resolver = PlaceResolver::new(Arc::new(ScriptedGeocodeBackend::resolving("   ")));
        assert_eq!(
            resolver
                .resolve_place_name(Coordinate::new(0.0, 0.0))
                .await,
            Err(ResolveError::NoLocality)
        );
    }

    #[tokio::test]
    async fn test_transport_error_is_resolution_failed() {
        let resolver =
            PlaceResolver::new(Arc::new(ScriptedGeocodeBackend::erroring("dns failure")));
        assert_eq!(
            resolver
                .resolve_place_name(Coordinate::new(0.0, 0.0))
                .await,
            Err(ResolveError::ResolutionFailed)
        );
    }
}
