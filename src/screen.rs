//! Map screen state: what the user sees, and the sink the acquisition flow
//! writes to.

use std::sync::{Mutex, MutexGuard};

use serde::Serialize;
use tracing::debug;

use crate::camera::{CameraAnimation, CameraPosition, Viewport};
use crate::config::Settings;
use crate::location::{Coordinate, PermissionState};
use crate::overlay::{arequipa_overlays, MapType, Marker, Overlays, Polygon, Polyline};

#[derive(Debug, Clone)]
struct ScreenState {
    current_location: Option<Coordinate>,
    camera: CameraPosition,
    map_type: MapType,
    permission: PermissionState,
}

/// UI-layer state of the map screen.
///
/// Acquisitions may overlap; the last one to complete wins. Coordinate and
/// camera are written under the same lock so they always agree.
#[derive(Debug)]
pub struct MapScreen {
    state: Mutex<ScreenState>,
    overlays: Overlays,
    follow_zoom: f32,
    intro: Option<CameraAnimation>,
}

/// A serializable snapshot of everything drawn on the screen.
#[derive(Debug, Clone, Serialize)]
pub struct Scene {
    pub map_type: MapType,
    pub map_type_label: &'static str,
    pub camera: CameraPosition,
    pub my_location_enabled: bool,
    pub current_location: Option<Coordinate>,
    pub markers: Vec<Marker>,
    pub polygons: Vec<Polygon>,
    pub polylines: Vec<RouteView>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub intro_animation: Option<CameraAnimation>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RouteView {
    #[serde(flatten)]
    pub line: Polyline,
    pub length_m: f64,
}

impl MapScreen {
    pub fn new(settings: &Settings) -> Self {
        Self::with_overlays(settings, arequipa_overlays())
    }

    pub fn with_overlays(settings: &Settings, overlays: Overlays) -> Self {
        Self {
            state: Mutex::new(ScreenState {
                current_location: None,
                camera: settings.initial_camera,
                map_type: settings.map_type,
                permission: PermissionState::Undetermined,
            }),
            overlays,
            follow_zoom: settings.follow_zoom,
            intro: settings.intro_animation(),
        }
    }

    fn lock(&self) -> MutexGuard<'_, ScreenState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Store a resolved fix and follow it with the camera.
    pub fn on_location(&self, coordinate: Coordinate) {
        let mut state = self.lock();
        state.current_location = Some(coordinate);
        state.camera = CameraPosition::from_coordinate_zoom(coordinate, self.follow_zoom);
        // A fix only arrives once permission was granted.
        state.permission = PermissionState::Granted;
        debug!(%coordinate, zoom = self.follow_zoom, "following current location");
    }

    /// Record the permission state; drives the "my location" layer.
    pub fn set_permission(&self, permission: PermissionState) {
        self.lock().permission = permission;
    }

    pub fn set_map_type(&self, map_type: MapType) {
        debug!(%map_type, "map type changed");
        self.lock().map_type = map_type;
    }

    pub fn map_type(&self) -> MapType {
        self.lock().map_type
    }

    pub fn current_location(&self) -> Option<Coordinate> {
        self.lock().current_location
    }

    pub fn camera(&self) -> CameraPosition {
        self.lock().camera
    }

    pub fn scene(&self) -> Scene {
        let state = self.lock().clone();
        let mut markers = self.overlays.markers.clone();
        if let Some(here) = state.current_location {
            markers.push(Marker::current_location(here));
        }
        let polylines = self
            .overlays
            .polylines
            .iter()
            .map(|line| RouteView { length_m: line.length_m(), line: line.clone() })
            .collect();

        Scene {
            map_type: state.map_type,
            map_type_label: state.map_type.label(),
            camera: state.camera,
            my_location_enabled: state.permission.is_granted(),
            current_location: state.current_location,
            markers,
            polygons: self.overlays.polygons.clone(),
            polylines,
            intro_animation: self.intro,
        }
    }
}

impl Viewport for MapScreen {
    fn recenter(&self, target: Coordinate, zoom: f32) {
        debug!(%target, zoom, "camera recentered");
        self.lock().camera = CameraPosition::from_coordinate_zoom(target, zoom);
    }
}
