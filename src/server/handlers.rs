use axum::extract::{Query, State};
use axum::http::{header, StatusCode};
use axum::response::{Html, IntoResponse, Json, Response};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;
use tracing::info;

use crate::camera::CameraPosition;
use crate::location::{format_coords, AcquireError, Coordinate, FailurePolicy};
use crate::overlay::MapType;
use crate::screen::Scene;

use super::state::AppState;
use super::static_files;

// ─── Error response ──────────────────────────────────────────────

#[derive(Serialize)]
struct ApiErrorBody {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    kind: Option<AcquireError>,
    code: u16,
}

pub struct ApiError {
    status: StatusCode,
    message: String,
    kind: Option<AcquireError>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ApiErrorBody {
            error: self.message,
            kind: self.kind,
            code: self.status.as_u16(),
        };
        (self.status, Json(body)).into_response()
    }
}

fn api_error(status: StatusCode, msg: impl Into<String>) -> ApiError {
    ApiError { status, message: msg.into(), kind: None }
}

impl From<AcquireError> for ApiError {
    fn from(e: AcquireError) -> Self {
        let status = match e {
            AcquireError::PermissionDenied => StatusCode::FORBIDDEN,
            AcquireError::LocationUnavailable => StatusCode::NOT_FOUND,
        };
        ApiError { status, message: e.to_string(), kind: Some(e) }
    }
}

// ─── Static file handlers ────────────────────────────────────────

pub async fn index() -> Html<&'static str> {
    Html(static_files::INDEX_HTML)
}

pub async fn style() -> Response {
    ([(header::CONTENT_TYPE, "text/css")], static_files::STYLE_CSS).into_response()
}

pub async fn script() -> Response {
    ([(header::CONTENT_TYPE, "application/javascript")], static_files::APP_JS).into_response()
}

// ─── GET /api/scene ──────────────────────────────────────────────

pub async fn scene(State(state): State<Arc<AppState>>) -> Json<Scene> {
    Json(state.scene())
}

// ─── GET /api/map-types ──────────────────────────────────────────

#[derive(Serialize)]
pub struct MapTypeOption {
    pub id: MapType,
    pub label: &'static str,
}

pub async fn map_types() -> Json<Vec<MapTypeOption>> {
    Json(
        MapType::ALL
            .iter()
            .map(|&t| MapTypeOption { id: t, label: t.label() })
            .collect(),
    )
}

// ─── POST /api/map-type ──────────────────────────────────────────

#[derive(Deserialize)]
pub struct MapTypeQuery {
    #[serde(rename = "type")]
    pub map_type: Option<String>,
}

pub async fn set_map_type(
    State(state): State<Arc<AppState>>,
    Query(params): Query<MapTypeQuery>,
) -> Result<Json<Scene>, ApiError> {
    let raw = params.map_type.as_deref().unwrap_or("").trim();
    if raw.is_empty() {
        return Err(api_error(StatusCode::BAD_REQUEST, "Missing 'type' parameter"));
    }
    let map_type = MapType::parse(raw).map_err(|e| api_error(StatusCode::BAD_REQUEST, e.to_string()))?;
    state.screen.set_map_type(map_type);
    Ok(Json(state.scene()))
}

// ─── POST /api/locate ────────────────────────────────────────────

#[derive(Serialize)]
pub struct LocateResponse {
    pub coordinate: Coordinate,
    pub formatted_coords: String,
    pub camera: CameraPosition,
    pub resolved_at: DateTime<Utc>,
}

pub async fn locate(State(state): State<Arc<AppState>>) -> Result<Response, ApiError> {
    let start = Instant::now();

    let result = state.flow.locate().await;
    state.screen.set_permission(state.flow.permission_state());
    let elapsed_ms = start.elapsed().as_secs_f64() * 1000.0;

    match result {
        Ok(coordinate) => {
            state.screen.on_location(coordinate);
            info!(%coordinate, elapsed_ms, "POST /api/locate -> resolved");
            Ok(Json(LocateResponse {
                coordinate,
                formatted_coords: format_coords(coordinate.lat(), coordinate.lon()),
                camera: state.screen.camera(),
                resolved_at: Utc::now(),
            })
            .into_response())
        }
        Err(e) => {
            info!(error = %e, elapsed_ms, policy = ?state.policy, "POST /api/locate -> no fix");
            match state.policy {
                FailurePolicy::Silent => Ok(StatusCode::NO_CONTENT.into_response()),
                FailurePolicy::Strict => Err(e.into()),
            }
        }
    }
}
