//! Awaitable bridge over the platform's callback-style location API
//!
//! The platform boundary hands results to a delegate callback instead of an
//! awaitable call. [`GeoPositionProvider`] converts "one pending request, one
//! eventual callback" into a single awaitable outcome via a one-shot channel.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use tokio::sync::oneshot;
use tracing::{debug, instrument, warn};

use crate::models::Coordinate;

/// Terminal callback for one position request. Invoked exactly once with the
/// position or the platform's error description.
pub type PositionCallback = Box<dyn FnOnce(Result<Coordinate, String>) + Send + 'static>;

/// Authorization state of the platform location capability
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Authorization {
    Undetermined,
    Granted,
    Denied,
}

/// Platform location boundary: one pending request at a time, one terminal
/// callback per request. The core treats everything behind it as opaque.
pub trait PositionBackend: Send + Sync + 'static {
    /// Whether the location capability is switched on at all
    fn services_enabled(&self) -> bool;

    fn authorization(&self) -> Authorization;

    /// Prompt the user for permission; the platform answers out of band
    fn request_authorization(&self);

    /// Request a one-shot position fix
    fn request_position(&self, deliver: PositionCallback);
}

/// Low-level acquisition failures, folded into
/// [`crate::error::LocationError`] by the probe
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PositionError {
    ServicesDisabled,
    AcquisitionFailed,
    /// Another acquisition is already pending on this provider. The second
    /// caller is rejected; the first keeps its callback slot.
    AlreadyAcquiring,
}

/// Upper bound on one acquisition when none is configured
pub const DEFAULT_ACQUISITION_TIMEOUT: Duration = Duration::from_secs(15);

/// Single-shot awaitable wrapper around a [`PositionBackend`].
///
/// Holds one pending-request slot. A second concurrent call is rejected with
/// [`PositionError::AlreadyAcquiring`] instead of silently replacing the
/// pending callback.
pub struct GeoPositionProvider {
    backend: Arc<dyn PositionBackend>,
    in_flight: AtomicBool,
    timeout: Duration,
}

impl GeoPositionProvider {
    #[must_use]
    pub fn new(backend: Arc<dyn PositionBackend>) -> Self {
        Self::with_timeout(backend, DEFAULT_ACQUISITION_TIMEOUT)
    }

    #[must_use]
    pub fn with_timeout(backend: Arc<dyn PositionBackend>, timeout: Duration) -> Self {
        Self {
            backend,
            in_flight: AtomicBool::new(false),
            timeout,
        }
    }

    /// Suspend until the platform delivers a position or an error, bounded by
    /// the acquisition timeout.
    ///
    /// Side effect: triggers the platform permission prompt when
    /// authorization is still undetermined.
    #[instrument(skip(self))]
    pub async fn acquire_current_position(&self) -> Result<Coordinate, PositionError> {
        if !self.backend.services_enabled() {
            return Err(PositionError::ServicesDisabled);
        }

        if self.backend.authorization() == Authorization::Undetermined {
            debug!("authorization undetermined, requesting permission");
            self.backend.request_authorization();
        }

        if self.in_flight.swap(true, Ordering::AcqRel) {
            warn!("position request already pending, rejecting second caller");
            return Err(PositionError::AlreadyAcquiring);
        }
        // Frees the slot on every exit path, including this future being
        // dropped mid-await.
        let _slot = SlotGuard(&self.in_flight);

        let (tx, rx) = oneshot::channel();
        self.backend.request_position(Box::new(move |outcome| {
            let _ = tx.send(outcome);
        }));

        match tokio::time::timeout(self.timeout, rx).await {
            Ok(Ok(Ok(position))) => {
                debug!("platform delivered position {}", position.format());
                Ok(position)
            }
            Ok(Ok(Err(cause))) => {
                warn!("position acquisition failed: {cause}");
                Err(PositionError::AcquisitionFailed)
            }
            // Backend dropped the callback without ever invoking it
            Ok(Err(_)) => {
                warn!("platform discarded the position request");
                Err(PositionError::AcquisitionFailed)
            }
            // A callback arriving after the deadline lands in a closed
            // channel and is discarded
            Err(_) => {
                warn!(
                    "position acquisition timed out after {:?}",
                    self.timeout
                );
                Err(PositionError::AcquisitionFailed)
            }
        }
    }
}

/// Clears the pending-request flag when the acquisition ends, whether it
/// resolves normally or its future is dropped.
struct SlotGuard<'a>(&'a AtomicBool);

impl Drop for SlotGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}
