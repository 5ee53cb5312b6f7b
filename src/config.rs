//! Settings file at `<config dir>/geoscreen/config.toml`.
//!
//! Every field is optional; a missing file yields the defaults.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::camera::{CameraAnimation, CameraPosition, FOLLOW_ZOOM};
use crate::location::providers::DEFAULT_IP_ENDPOINT;
use crate::location::FailurePolicy;
use crate::overlay::{MapType, AREQUIPA, YURA};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Cannot read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Invalid config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub initial_camera: CameraPosition,
    pub follow_zoom: f32,
    pub intro: IntroSettings,
    pub map_type: MapType,
    pub failure_policy: FailurePolicy,
    pub ip_endpoint: String,
    pub server: ServerSettings,
}

/// Camera move played once when the screen opens. It always starts from
/// `initial_camera`; `duration_ms = 0` disables it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IntroSettings {
    pub to: CameraPosition,
    pub duration_ms: u64,
}

impl Default for IntroSettings {
    fn default() -> Self {
        Self { to: CameraPosition::from_coordinate_zoom(YURA, 12.0), duration_ms: 3000 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self { host: "127.0.0.1".into(), port: 3400 }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            initial_camera: CameraPosition::from_coordinate_zoom(AREQUIPA, 12.0),
            follow_zoom: FOLLOW_ZOOM,
            intro: IntroSettings::default(),
            map_type: MapType::Normal,
            failure_policy: FailurePolicy::Silent,
            ip_endpoint: DEFAULT_IP_ENDPOINT.into(),
            server: ServerSettings::default(),
        }
    }
}

impl Settings {
    /// Load from the default path; defaults if the file does not exist.
    pub fn load() -> Result<Self, ConfigError> {
        match Self::default_path() {
            Some(path) => Self::load_from(&path),
            None => Ok(Self::default()),
        }
    }

    /// Load from `path`; defaults if the file does not exist.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let data = match fs::read_to_string(path) {
            Ok(data) => data,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "no config file, using defaults");
                return Ok(Self::default());
            }
            Err(source) => return Err(ConfigError::Io { path: path.to_path_buf(), source }),
        };
        let settings: Settings = toml::from_str(&data)
            .map_err(|source| ConfigError::Parse { path: path.to_path_buf(), source })?;
        debug!(path = %path.display(), "loaded config");
        Ok(settings)
    }

    /// The intro move, starting from wherever the camera opens.
    pub fn intro_animation(&self) -> Option<CameraAnimation> {
        (self.intro.duration_ms > 0)
            .then(|| CameraAnimation::new(self.initial_camera, self.intro.to, self.intro.duration_ms))
    }

    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("geoscreen").join("config.toml"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::{MAX_ZOOM, MIN_ZOOM};
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = TempDir::new().unwrap();
        let settings = Settings::load_from(&dir.path().join("nope.toml")).unwrap();
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.initial_camera.target(), AREQUIPA);
        assert_eq!(settings.initial_camera.zoom(), 12.0);
        assert_eq!(settings.follow_zoom, 15.0);
        let intro = settings.intro_animation().unwrap();
        assert_eq!(intro.from, settings.initial_camera);
        assert_eq!(intro.to.target(), YURA);
        assert_eq!(intro.duration_ms, 3000);
    }

    #[test]
    fn test_partial_override() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(
            &path,
            r#"
map_type = "satellite"
failure_policy = "strict"
follow_zoom = 17.0

[server]
port = 8080
"#,
        )
        .unwrap();

        let settings = Settings::load_from(&path).unwrap();
        assert_eq!(settings.map_type, MapType::Satellite);
        assert_eq!(settings.failure_policy, FailurePolicy::Strict);
        assert_eq!(settings.follow_zoom, 17.0);
        assert_eq!(settings.server.port, 8080);
        assert_eq!(settings.server.host, "127.0.0.1");
        assert_eq!(settings.initial_camera.target(), AREQUIPA);
    }

    #[test]
    fn test_camera_override() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(
            &path,
            r#"
[initial_camera]
zoom = 10.0
target = { lat = 59.3293, lon = 18.0686 }
"#,
        )
        .unwrap();

        let settings = Settings::load_from(&path).unwrap();
        assert_eq!(settings.initial_camera.target().lat(), 59.3293);
        assert_eq!(settings.initial_camera.zoom(), 10.0);
        // The default intro starts from the overridden camera.
        let intro = settings.intro_animation().unwrap();
        assert_eq!(intro.from, settings.initial_camera);
        assert_eq!(intro.to.target(), YURA);
    }

    #[test]
    fn test_out_of_range_zoom_clamped() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(
            &path,
            r#"
[initial_camera]
zoom = 40.0
target = { lat = -16.4, lon = -71.5 }

[intro]
to = { zoom = 0.5, target = { lat = -16.25, lon = -71.68 } }
"#,
        )
        .unwrap();

        let settings = Settings::load_from(&path).unwrap();
        assert_eq!(settings.initial_camera.zoom(), MAX_ZOOM);
        let intro = settings.intro_animation().unwrap();
        assert_eq!(intro.from.zoom(), MAX_ZOOM);
        assert_eq!(intro.to.zoom(), MIN_ZOOM);
        assert_eq!(intro.duration_ms, 3000);
    }

    #[test]
    fn test_zero_duration_disables_intro() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[intro]\nduration_ms = 0\n").unwrap();
        let settings = Settings::load_from(&path).unwrap();
        assert!(settings.intro_animation().is_none());
    }

    #[test]
    fn test_invalid_values_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");

        fs::write(&path, "map_type = \"roadmap\"\n").unwrap();
        assert!(matches!(Settings::load_from(&path), Err(ConfigError::Parse { .. })));

        fs::write(&path, "[initial_camera]\nzoom = 12.0\ntarget = { lat = 95.0, lon = 0.0 }\n").unwrap();
        assert!(matches!(Settings::load_from(&path), Err(ConfigError::Parse { .. })));
    }
}
