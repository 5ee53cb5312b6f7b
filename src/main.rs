use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, ValueEnum};
use geoscreen::config::Settings;
use geoscreen::location::{
    Coordinate, CoordinateError, FailurePolicy, FixedLocation, IpLocation, LocationAcquisitionFlow,
    LocationProvider, PermissionChecker, PermissionState, ScriptedPermission, TerminalPermission,
};
use geoscreen::overlay::MapType;
use geoscreen::screen::MapScreen;
use geoscreen::server::{self, AppState};
use tracing_subscriber::EnvFilter;

/// geoscreen — map screen with permission-gated location following
///
/// Resolves the device position once, recenters the camera on it, and prints
/// the map scene (markers, polygons, routes) as JSON. Without --lat/--lon or
/// --auto the device has no cached fix; only --auto contacts the network.
///
/// Examples:
///   geoscreen --auto
///   geoscreen --lat -16.4040102 --lon -71.559611 --decision grant
///   geoscreen --permission denied --decision deny --strict
///   geoscreen --map-type hybrid --serve --port 3400
#[derive(Parser)]
#[command(name = "geoscreen", version, about, long_about = None)]
struct Cli {
    /// Permission state before the flow runs (granted, denied, undetermined).
    #[arg(long)]
    permission: Option<PermissionState>,

    /// How the permission prompt is answered. "ask" prompts on the terminal.
    #[arg(long, value_enum, default_value_t = Decision::Ask)]
    decision: Decision,

    /// Latitude of the device's last known fix (-90 to 90).
    #[arg(long, allow_hyphen_values = true, requires = "lon")]
    lat: Option<f64>,

    /// Longitude of the device's last known fix (-180 to 180).
    #[arg(long, allow_hyphen_values = true, requires = "lat")]
    lon: Option<f64>,

    /// Approximate the last known fix via IP geolocation.
    #[arg(long, short = 'a', conflicts_with = "lat")]
    auto: bool,

    /// Offline mode: IP geolocation answers "unavailable".
    #[arg(long, requires = "auto")]
    offline: bool,

    /// Base map style (normal, hybrid, terrain, satellite).
    #[arg(long)]
    map_type: Option<MapType>,

    /// Report permission denial and missing fixes as errors.
    #[arg(long)]
    strict: bool,

    /// Settings file. Defaults to <config dir>/geoscreen/config.toml.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Serve the map screen over HTTP instead of printing it.
    #[arg(long)]
    serve: bool,

    #[arg(long)]
    host: Option<String>,

    #[arg(long)]
    port: Option<u16>,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Decision {
    Grant,
    Deny,
    Ask,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("geoscreen=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let loaded = match &cli.config {
        Some(path) => Settings::load_from(path),
        None => Settings::load(),
    };
    let mut settings = loaded.unwrap_or_else(|e| {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    });
    if let Some(map_type) = cli.map_type {
        settings.map_type = map_type;
    }
    if cli.strict {
        settings.failure_policy = FailurePolicy::Strict;
    }

    let flow = LocationAcquisitionFlow::new(permission_backend(&cli), location_backend(&cli, &settings));
    let screen = MapScreen::new(&settings);
    screen.set_permission(flow.permission_state());

    if cli.serve {
        let host = cli.host.clone().unwrap_or_else(|| settings.server.host.clone());
        let port = cli.port.unwrap_or(settings.server.port);
        let state = Arc::new(AppState { screen, flow, policy: settings.failure_policy });
        if let Err(e) = server::start(state, &host, port).await {
            eprintln!("Error: Cannot serve on {}:{}: {}", host, port, e);
            std::process::exit(1);
        }
        return;
    }

    // ── Acquire once ────────────────────────────────────────────

    let result = flow.run(settings.failure_policy, |c| screen.on_location(c)).await;
    screen.set_permission(flow.permission_state());
    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    // ── Print location banner ───────────────────────────────────

    match screen.current_location() {
        Some(here) => eprintln!("  \u{1F4CD} {} (zoom {})", here, screen.camera().zoom()),
        None => eprintln!("  \u{1F4CD} No current location; camera stays on {}", screen.camera().target()),
    }

    // JSON to stdout
    match serde_json::to_string_pretty(&screen.scene()) {
        Ok(json) => println!("{}", json),
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}

fn permission_backend(cli: &Cli) -> Arc<dyn PermissionChecker> {
    let state = cli.permission.unwrap_or(PermissionState::Undetermined);
    match cli.decision {
        Decision::Ask if !state.is_granted() => Arc::new(TerminalPermission::new()),
        Decision::Ask | Decision::Grant => Arc::new(ScriptedPermission::new(state, PermissionState::Granted)),
        Decision::Deny => Arc::new(ScriptedPermission::new(state, PermissionState::Denied)),
    }
}

/// Where the device's last known fix comes from.
#[derive(Debug, PartialEq)]
enum FixSource {
    NoFix,
    Fixed(Coordinate),
    Ip,
}

fn fix_source(cli: &Cli) -> Result<FixSource, CoordinateError> {
    if cli.auto {
        return Ok(FixSource::Ip);
    }
    match (cli.lat, cli.lon) {
        (Some(lat), Some(lon)) => Ok(FixSource::Fixed(Coordinate::new(lat, lon)?)),
        _ => Ok(FixSource::NoFix),
    }
}

fn location_backend(cli: &Cli, settings: &Settings) -> Arc<dyn LocationProvider> {
    let source = fix_source(cli).unwrap_or_else(|e| {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    });
    match source {
        FixSource::NoFix => Arc::new(FixedLocation::unavailable()),
        FixSource::Fixed(fix) => Arc::new(FixedLocation::new(Some(fix))),
        FixSource::Ip => {
            let mut ip = IpLocation::new(settings.ip_endpoint.clone());
            ip.set_offline(cli.offline);
            Arc::new(ip)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("geoscreen").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_default_run_has_no_fix() {
        assert_eq!(fix_source(&parse(&[])).unwrap(), FixSource::NoFix);
        assert_eq!(fix_source(&parse(&["--strict", "--decision", "grant"])).unwrap(), FixSource::NoFix);
    }

    #[test]
    fn test_only_auto_selects_ip() {
        assert_eq!(fix_source(&parse(&["--auto"])).unwrap(), FixSource::Ip);
        assert_eq!(fix_source(&parse(&["-a", "--offline"])).unwrap(), FixSource::Ip);
        assert!(Cli::try_parse_from(["geoscreen", "--offline"]).is_err());
        assert!(Cli::try_parse_from(["geoscreen", "--auto", "--lat", "1", "--lon", "2"]).is_err());
    }

    #[test]
    fn test_explicit_fix() {
        let cli = parse(&["--lat", "-16.4040102", "--lon", "-71.559611"]);
        let expected = Coordinate::new(-16.4040102, -71.559611).unwrap();
        assert_eq!(fix_source(&cli).unwrap(), FixSource::Fixed(expected));
        assert!(fix_source(&parse(&["--lat", "95", "--lon", "0"])).is_err());
    }
}
