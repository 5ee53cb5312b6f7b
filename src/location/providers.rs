//! Capability backends: scripted and terminal permission prompts, fixed and
//! IP-based location.

use std::io::{self, BufRead, Write};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;
use tokio::sync::oneshot;
use tracing::{debug, warn};

use super::capability::{LocationProvider, PermissionChecker};
use super::types::{Coordinate, CoordinateError, PermissionState};

pub const DEFAULT_IP_ENDPOINT: &str = "https://ipapi.co/json/";
const USER_AGENT: &str = concat!("geoscreen/", env!("CARGO_PKG_VERSION"));
const IP_LOOKUP_TIMEOUT: Duration = Duration::from_secs(5);

// ─── Permission backends ────────────────────────────────────────

/// A permission backend with a preset state and a preset answer to the prompt.
///
/// A granted answer sticks: later `current_state` calls report `Granted`.
#[derive(Debug)]
pub struct ScriptedPermission {
    state: Mutex<PermissionState>,
    decision: PermissionState,
    prompts: AtomicUsize,
}

impl ScriptedPermission {
    pub fn new(state: PermissionState, decision: PermissionState) -> Self {
        Self {
            state: Mutex::new(state),
            decision,
            prompts: AtomicUsize::new(0),
        }
    }

    pub fn granted() -> Self {
        Self::new(PermissionState::Granted, PermissionState::Granted)
    }

    /// How many times the prompt was shown.
    pub fn prompts(&self) -> usize {
        self.prompts.load(Ordering::SeqCst)
    }
}

impl PermissionChecker for ScriptedPermission {
    fn current_state(&self) -> PermissionState {
        *self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn request_permission(&self, reply: oneshot::Sender<PermissionState>) {
        self.prompts.fetch_add(1, Ordering::SeqCst);
        if self.decision.is_granted() {
            *self.state.lock().unwrap_or_else(|e| e.into_inner()) = PermissionState::Granted;
        }
        let _ = reply.send(self.decision);
    }
}

/// Asks on the terminal. The answer is remembered for the rest of the session.
#[derive(Debug)]
pub struct TerminalPermission {
    state: std::sync::Arc<Mutex<PermissionState>>,
}

impl TerminalPermission {
    pub fn new() -> Self {
        Self {
            state: std::sync::Arc::new(Mutex::new(PermissionState::Undetermined)),
        }
    }
}

impl Default for TerminalPermission {
    fn default() -> Self {
        Self::new()
    }
}

impl PermissionChecker for TerminalPermission {
    fn current_state(&self) -> PermissionState {
        *self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn request_permission(&self, reply: oneshot::Sender<PermissionState>) {
        let state = self.state.clone();
        tokio::task::spawn_blocking(move || {
            let answer = match prompt_stdin() {
                Ok(true) => PermissionState::Granted,
                Ok(false) => PermissionState::Denied,
                Err(e) => {
                    warn!(error = %e, "could not read permission answer");
                    PermissionState::Undetermined
                }
            };
            *state.lock().unwrap_or_else(|e| e.into_inner()) = answer;
            let _ = reply.send(answer);
        });
    }
}

fn prompt_stdin() -> io::Result<bool> {
    let mut stderr = io::stderr();
    write!(stderr, "  Allow geoscreen to access this device's location? [y/N] ")?;
    stderr.flush()?;
    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    Ok(parse_yes(&line))
}

fn parse_yes(answer: &str) -> bool {
    matches!(answer.trim().to_lowercase().as_str(), "y" | "yes" | "s" | "si" | "sí")
}

// ─── Location backends ──────────────────────────────────────────

/// Answers with a preset fix, or with nothing.
#[derive(Debug, Clone)]
pub struct FixedLocation {
    fix: Option<Coordinate>,
}

impl FixedLocation {
    pub fn new(fix: Option<Coordinate>) -> Self {
        Self { fix }
    }

    pub fn unavailable() -> Self {
        Self { fix: None }
    }
}

impl LocationProvider for FixedLocation {
    fn last_known_location(&self, reply: oneshot::Sender<Option<Coordinate>>) {
        let _ = reply.send(self.fix);
    }
}

#[derive(Deserialize)]
struct IpApiResult {
    latitude: Option<f64>,
    longitude: Option<f64>,
    city: Option<String>,
}

/// Approximates the device position from its public IP address.
#[derive(Debug, Clone)]
pub struct IpLocation {
    endpoint: String,
    offline: bool,
}

impl IpLocation {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self { endpoint: endpoint.into(), offline: false }
    }

    /// Offline mode: answer "unavailable" without touching the network.
    pub fn set_offline(&mut self, offline: bool) {
        self.offline = offline;
    }
}

impl Default for IpLocation {
    fn default() -> Self {
        Self::new(DEFAULT_IP_ENDPOINT)
    }
}

impl LocationProvider for IpLocation {
    fn last_known_location(&self, reply: oneshot::Sender<Option<Coordinate>>) {
        if self.offline {
            debug!("offline: skipping IP geolocation");
            let _ = reply.send(None);
            return;
        }
        let endpoint = self.endpoint.clone();
        tokio::task::spawn_blocking(move || {
            let fix = match ip_geolocate(&endpoint) {
                Ok(c) => Some(c),
                Err(e) => {
                    warn!(%endpoint, error = %e, "IP geolocation failed");
                    None
                }
            };
            let _ = reply.send(fix);
        });
    }
}

/// Why an IP lookup produced no fix. Logged, then answered as "unavailable".
#[derive(Debug, Error)]
enum IpLookupError {
    #[error("Network error: {0}")]
    Network(String),
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
    #[error("Response has no {0}")]
    MissingField(&'static str),
    #[error(transparent)]
    Coordinate(#[from] CoordinateError),
}

fn ip_geolocate(endpoint: &str) -> Result<Coordinate, IpLookupError> {
    let response = ureq::get(endpoint)
        .set("User-Agent", USER_AGENT)
        .timeout(IP_LOOKUP_TIMEOUT)
        .call()
        .map_err(|e| IpLookupError::Network(e.to_string()))?;

    let r: IpApiResult = response
        .into_json()
        .map_err(|e| IpLookupError::InvalidResponse(e.to_string()))?;
    parse_ip_result(r)
}

fn parse_ip_result(r: IpApiResult) -> Result<Coordinate, IpLookupError> {
    let lat = r.latitude.ok_or(IpLookupError::MissingField("latitude"))?;
    let lon = r.longitude.ok_or(IpLookupError::MissingField("longitude"))?;
    let coordinate = Coordinate::new(lat, lon)?;
    debug!(city = r.city.as_deref().unwrap_or("Unknown"), "IP geolocation answered");
    Ok(coordinate)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scripted_grant_sticks() {
        let p = ScriptedPermission::new(PermissionState::Undetermined, PermissionState::Granted);
        let (tx, mut rx) = oneshot::channel();
        p.request_permission(tx);
        assert_eq!(rx.try_recv().unwrap(), PermissionState::Granted);
        assert_eq!(p.current_state(), PermissionState::Granted);
        assert_eq!(p.prompts(), 1);
    }

    #[test]
    fn test_scripted_denial_keeps_state() {
        let p = ScriptedPermission::new(PermissionState::Undetermined, PermissionState::Denied);
        let (tx, mut rx) = oneshot::channel();
        p.request_permission(tx);
        assert_eq!(rx.try_recv().unwrap(), PermissionState::Denied);
        assert_eq!(p.current_state(), PermissionState::Undetermined);
    }

    #[test]
    fn test_fixed_location() {
        let c = Coordinate::new(-16.4, -71.5).unwrap();
        let (tx, mut rx) = oneshot::channel();
        FixedLocation::new(Some(c)).last_known_location(tx);
        assert_eq!(rx.try_recv().unwrap(), Some(c));

        let (tx, mut rx) = oneshot::channel();
        FixedLocation::unavailable().last_known_location(tx);
        assert_eq!(rx.try_recv().unwrap(), None);
    }

    #[tokio::test]
    async fn test_ip_offline_is_unavailable() {
        let mut ip = IpLocation::new("http://127.0.0.1:9/never");
        ip.set_offline(true);
        let (tx, rx) = oneshot::channel();
        ip.last_known_location(tx);
        assert_eq!(rx.await.unwrap(), None);
    }

    #[test]
    fn test_parse_ip_result() {
        let r: IpApiResult = serde_json::from_str(
            r#"{"latitude": -16.3988, "longitude": -71.535, "city": "Arequipa"}"#,
        )
        .unwrap();
        let c = parse_ip_result(r).unwrap();
        assert_eq!(c.lat(), -16.3988);

        let missing: IpApiResult = serde_json::from_str(r#"{"city": "Nowhere"}"#).unwrap();
        assert!(matches!(parse_ip_result(missing), Err(IpLookupError::MissingField("latitude"))));

        let no_lon: IpApiResult = serde_json::from_str(r#"{"latitude": 10.0}"#).unwrap();
        assert!(matches!(parse_ip_result(no_lon), Err(IpLookupError::MissingField("longitude"))));

        let bogus: IpApiResult = serde_json::from_str(r#"{"latitude": 99.0, "longitude": 0.0}"#).unwrap();
        assert!(matches!(
            parse_ip_result(bogus),
            Err(IpLookupError::Coordinate(CoordinateError::Latitude(_)))
        ));
    }

    #[test]
    fn test_ip_lookup_unreachable_is_network_error() {
        let err = ip_geolocate("http://127.0.0.1:9/json/").unwrap_err();
        assert!(matches!(err, IpLookupError::Network(_)));
        assert!(err.to_string().starts_with("Network error"));
    }

    #[test]
    fn test_parse_yes() {
        assert!(parse_yes("y\n"));
        assert!(parse_yes(" YES "));
        assert!(parse_yes("sí"));
        assert!(!parse_yes(""));
        assert!(!parse_yes("n"));
    }
}
