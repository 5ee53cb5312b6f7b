//! Platform capabilities the acquisition flow depends on.
//!
//! Both traits answer through a `oneshot::Sender`. The sender is consumed by
//! `send`, so a collaborator can reply at most once; dropping it without a
//! reply closes the stage.

use super::types::{Coordinate, PermissionState};
use tokio::sync::oneshot;

/// Reports and requests the fine-location permission.
pub trait PermissionChecker: Send + Sync {
    /// Current authorization status. Must not prompt the user.
    fn current_state(&self) -> PermissionState;

    /// Show the user-facing prompt once and reply with the decision.
    fn request_permission(&self, reply: oneshot::Sender<PermissionState>);
}

/// Supplies the platform's last recorded position.
pub trait LocationProvider: Send + Sync {
    /// Reply with the cached fix, or `None` when the device has none.
    fn last_known_location(&self, reply: oneshot::Sender<Option<Coordinate>>);
}
