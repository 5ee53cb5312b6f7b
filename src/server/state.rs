use crate::location::{FailurePolicy, LocationAcquisitionFlow};
use crate::screen::{MapScreen, Scene};

pub struct AppState {
    pub screen: MapScreen,
    pub flow: LocationAcquisitionFlow,
    pub policy: FailurePolicy,
}

impl AppState {
    /// Snapshot the screen with the permission read live from the backend,
    /// so the "my location" layer is right before the first locate.
    pub fn scene(&self) -> Scene {
        self.screen.set_permission(self.flow.permission_state());
        self.screen.scene()
    }
}
