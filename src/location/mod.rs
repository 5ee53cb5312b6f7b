//! Location subsystem for geoscreen.
//!
//! Provides the permission-gated acquisition flow, the capability traits it
//! runs against, and the concrete permission/location backends.

pub mod capability;
pub mod flow;
pub mod providers;
pub mod types;

pub use capability::{LocationProvider, PermissionChecker};
pub use flow::LocationAcquisitionFlow;
pub use providers::{FixedLocation, IpLocation, ScriptedPermission, TerminalPermission};
pub use types::{
    format_coords, AcquireError, Coordinate, CoordinateError, FailurePolicy, LocationRequestOutcome,
    ParseError, PermissionState,
};
