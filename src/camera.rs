//! Camera position, the viewport sink, and timed camera moves.

use serde::{Deserialize, Serialize};

use crate::location::Coordinate;

pub const MIN_ZOOM: f32 = 2.0;
pub const MAX_ZOOM: f32 = 21.0;

/// Zoom used when the camera follows a freshly resolved fix.
pub const FOLLOW_ZOOM: f32 = 15.0;

/// Where the map is looking. Zoom always lies in `MIN_ZOOM..=MAX_ZOOM`,
/// including after deserialization.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawCameraPosition")]
pub struct CameraPosition {
    target: Coordinate,
    zoom: f32,
}

#[derive(Deserialize)]
struct RawCameraPosition {
    target: Coordinate,
    zoom: f32,
}

impl From<RawCameraPosition> for CameraPosition {
    fn from(raw: RawCameraPosition) -> Self {
        CameraPosition::from_coordinate_zoom(raw.target, raw.zoom)
    }
}

impl CameraPosition {
    /// Zoom is clamped to the supported range.
    pub fn from_coordinate_zoom(target: Coordinate, zoom: f32) -> Self {
        Self { target, zoom: clamp_zoom(zoom) }
    }

    pub fn target(&self) -> Coordinate {
        self.target
    }

    pub fn zoom(&self) -> f32 {
        self.zoom
    }
}

fn clamp_zoom(zoom: f32) -> f32 {
    if zoom.is_nan() {
        MIN_ZOOM
    } else {
        zoom.clamp(MIN_ZOOM, MAX_ZOOM)
    }
}

/// Anything that can recenter a map view.
pub trait Viewport {
    fn recenter(&self, target: Coordinate, zoom: f32);
}

/// A linear camera move over a fixed duration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CameraAnimation {
    pub from: CameraPosition,
    pub to: CameraPosition,
    pub duration_ms: u64,
}

impl CameraAnimation {
    pub fn new(from: CameraPosition, to: CameraPosition, duration_ms: u64) -> Self {
        Self { from, to, duration_ms }
    }

    /// Interpolated position `elapsed_ms` into the move. Clamped to the end.
    pub fn position_at(&self, elapsed_ms: u64) -> CameraPosition {
        if self.is_finished(elapsed_ms) {
            return self.to;
        }
        let t = elapsed_ms as f64 / self.duration_ms as f64;
        let lerp = |a: f64, b: f64| a + (b - a) * t;
        let lat = lerp(self.from.target().lat(), self.to.target().lat());
        let lon = lerp(self.from.target().lon(), self.to.target().lon());
        let zoom = lerp(f64::from(self.from.zoom()), f64::from(self.to.zoom())) as f32;
        // Both endpoints are in range, so every point between them is too.
        CameraPosition::from_coordinate_zoom(Coordinate::from_static(lat, lon), zoom)
    }

    pub fn is_finished(&self, elapsed_ms: u64) -> bool {
        elapsed_ms >= self.duration_ms
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn pos(lat: f64, lon: f64, zoom: f32) -> CameraPosition {
        CameraPosition::from_coordinate_zoom(Coordinate::new(lat, lon).unwrap(), zoom)
    }

    #[test]
    fn test_zoom_clamped() {
        assert_eq!(pos(0.0, 0.0, 40.0).zoom(), MAX_ZOOM);
        assert_eq!(pos(0.0, 0.0, 0.0).zoom(), MIN_ZOOM);
        assert_eq!(pos(0.0, 0.0, f32::NAN).zoom(), MIN_ZOOM);
        assert_eq!(pos(0.0, 0.0, 12.0).zoom(), 12.0);
    }

    #[test]
    fn test_animation_endpoints() {
        let from = pos(-16.4040102, -71.559611, 12.0);
        let to = pos(-16.2520984, -71.6836503, 12.0);
        let anim = CameraAnimation::new(from, to, 3000);
        assert_eq!(anim.position_at(0), from);
        assert_eq!(anim.position_at(3000), to);
        assert_eq!(anim.position_at(10_000), to);
        assert!(!anim.is_finished(2999));
        assert!(anim.is_finished(3000));
    }

    #[test]
    fn test_animation_midpoint() {
        let anim = CameraAnimation::new(pos(0.0, 0.0, 10.0), pos(10.0, -20.0, 14.0), 1000);
        let mid = anim.position_at(500);
        assert_relative_eq!(mid.target().lat(), 5.0);
        assert_relative_eq!(mid.target().lon(), -10.0);
        assert_relative_eq!(mid.zoom(), 12.0);
    }

    #[test]
    fn test_deserialize_clamps_zoom() {
        let far: CameraPosition =
            serde_json::from_str(r#"{"target": {"lat": 1.0, "lon": 2.0}, "zoom": 40.0}"#).unwrap();
        assert_eq!(far.zoom(), MAX_ZOOM);
        let near: CameraPosition =
            serde_json::from_str(r#"{"target": {"lat": 1.0, "lon": 2.0}, "zoom": -3.0}"#).unwrap();
        assert_eq!(near.zoom(), MIN_ZOOM);
    }

    #[test]
    fn test_zero_duration_jumps() {
        let to = pos(1.0, 1.0, 15.0);
        let anim = CameraAnimation::new(pos(0.0, 0.0, 12.0), to, 0);
        assert_eq!(anim.position_at(0), to);
    }
}
