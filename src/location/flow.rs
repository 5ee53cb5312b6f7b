//! Location acquisition flow: permission check, conditional prompt,
//! last-known-location fetch, then a single hand-off to the caller.
//!
//! Stage 1: current state → prompt only if not granted → answer
//! Stage 2: last known location → coordinate or nothing
//!
//! There is no retry and no timeout. Each call runs both stages at most once.

use std::sync::Arc;

use tokio::sync::oneshot;
use tracing::{debug, info};

use super::capability::{LocationProvider, PermissionChecker};
use super::types::{AcquireError, Coordinate, FailurePolicy, LocationRequestOutcome, PermissionState};

/// Resolves the device position while respecting the permission state.
///
/// Holds no mutable state, so one flow can be shared and invoked repeatedly.
/// Where the coordinate ends up is the caller's business.
#[derive(Clone)]
pub struct LocationAcquisitionFlow {
    permissions: Arc<dyn PermissionChecker>,
    provider: Arc<dyn LocationProvider>,
}

impl LocationAcquisitionFlow {
    pub fn new(permissions: Arc<dyn PermissionChecker>, provider: Arc<dyn LocationProvider>) -> Self {
        Self { permissions, provider }
    }

    /// Current permission state, without prompting.
    pub fn permission_state(&self) -> PermissionState {
        self.permissions.current_state()
    }

    /// Run the flow and hand the coordinate to `on_resolved`.
    ///
    /// Denial and a missing fix both end the flow without calling
    /// `on_resolved`; nothing is reported back.
    pub async fn acquire<F>(&self, on_resolved: F)
    where
        F: FnOnce(Coordinate),
    {
        match self.locate().await {
            Ok(coordinate) => on_resolved(coordinate),
            Err(e) => debug!(error = %e, "location acquisition ended without a fix"),
        }
    }

    /// Run the flow and report why it failed, if it did.
    pub async fn locate(&self) -> Result<Coordinate, AcquireError> {
        self.ensure_permission().await?;

        let (tx, rx) = oneshot::channel();
        self.provider.last_known_location(tx);
        match rx.await {
            Ok(Some(coordinate)) => {
                info!(lat = coordinate.lat(), lon = coordinate.lon(), "resolved last known location");
                Ok(coordinate)
            }
            Ok(None) => {
                debug!("location provider has no cached fix");
                Err(AcquireError::LocationUnavailable)
            }
            Err(_) => {
                debug!("location provider closed without replying");
                Err(AcquireError::LocationUnavailable)
            }
        }
    }

    /// Run the flow and collapse the result to resolved / unavailable.
    pub async fn outcome(&self) -> LocationRequestOutcome {
        self.locate().await.into()
    }

    /// Run the flow under `policy`: `Silent` behaves like [`Self::acquire`]
    /// and always returns `Ok`, `Strict` surfaces the failure.
    pub async fn run<F>(&self, policy: FailurePolicy, on_resolved: F) -> Result<(), AcquireError>
    where
        F: FnOnce(Coordinate),
    {
        match policy {
            FailurePolicy::Silent => {
                self.acquire(on_resolved).await;
                Ok(())
            }
            FailurePolicy::Strict => {
                let coordinate = self.locate().await?;
                on_resolved(coordinate);
                Ok(())
            }
        }
    }

    async fn ensure_permission(&self) -> Result<(), AcquireError> {
        let state = self.permissions.current_state();
        if state.is_granted() {
            return Ok(());
        }

        debug!(%state, "requesting location permission");
        let (tx, rx) = oneshot::channel();
        self.permissions.request_permission(tx);
        match rx.await {
            Ok(PermissionState::Granted) => {
                info!("location permission granted");
                Ok(())
            }
            // A dismissed prompt leaves the state undetermined; treat it as a no.
            Ok(answer) => {
                debug!(%answer, "location permission not granted");
                Err(AcquireError::PermissionDenied)
            }
            Err(_) => {
                debug!("permission prompt closed without an answer");
                Err(AcquireError::PermissionDenied)
            }
        }
    }
}

impl std::fmt::Debug for LocationAcquisitionFlow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocationAcquisitionFlow")
            .field("permission", &self.permissions.current_state())
            .finish_non_exhaustive()
    }
}
