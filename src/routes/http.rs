// HTTP handlers: data updates, polygon draw/modify/rename/remove, chart and heat layer reads

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

use super::AppState;
use crate::config::{HeatmapConfig, MapConfig};
use crate::error::PanelError;
use crate::geojson;
use crate::models::{Chart, FrameBatch, HeatPoint, PolygonId, RenameInput, RingInput};

const NAME: &str = env!("CARGO_PKG_NAME");
const VERSION: &str = env!("CARGO_PKG_VERSION");

impl IntoResponse for PanelError {
    fn into_response(self) -> Response {
        let status = match &self {
            PanelError::PolygonNotFound(_) => StatusCode::NOT_FOUND,
            PanelError::WorkerGone => StatusCode::SERVICE_UNAVAILABLE,
            PanelError::PersistenceDisabled => StatusCode::CONFLICT,
            PanelError::GeoJson(_) | PanelError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if status.is_server_error() {
            tracing::warn!(error = %self, "request failed");
        }
        let body = Json(serde_json::json!({ "error": self.to_string() }));
        (status, body).into_response()
    }
}

/// GET /version: service name and version (from Cargo.toml at build time).
pub(super) async fn version_handler() -> impl IntoResponse {
    Json(serde_json::json!({
        "name": NAME,
        "version": VERSION,
    }))
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PanelOptions {
    map: MapConfig,
    heatmap: HeatmapConfig,
    timezone: String,
}

/// GET /api/options: initial view, heat layer and label options for the renderer.
pub(super) async fn options_handler(State(state): State<AppState>) -> impl IntoResponse {
    let config = state.config;
    Json(PanelOptions {
        map: config.map,
        heatmap: config.heatmap,
        timezone: config.panel.timezone,
    })
}

/// POST /api/frames: replace the data; every live polygon is re-queried.
pub(super) async fn load_frames_handler(
    State(state): State<AppState>,
    Json(batch): Json<FrameBatch>,
) -> Result<Json<Chart>, PanelError> {
    Ok(Json(state.panel.load_frames(batch).await?))
}

#[derive(Serialize)]
struct HeatLayer {
    points: Vec<HeatPoint>,
    #[serde(flatten)]
    options: HeatmapConfig,
}

/// GET /api/heat: one Web Mercator point per event of the current frame.
pub(super) async fn heat_handler(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, PanelError> {
    let points = state
        .panel
        .frame()
        .await?
        .map(|f| f.heat.clone())
        .unwrap_or_default();
    Ok(Json(HeatLayer {
        points,
        options: state.config.heatmap,
    }))
}

/// GET /api/chart: the displayed chart.
pub(super) async fn chart_handler(
    State(state): State<AppState>,
) -> Result<Json<Chart>, PanelError> {
    Ok(Json(state.panel.chart().await?))
}

/// GET /api/polygons: live polygons as a GeoJSON FeatureCollection.
pub(super) async fn list_polygons_handler(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, PanelError> {
    Ok(Json(state.panel.export().await?))
}

#[derive(Serialize)]
struct Drawn {
    id: PolygonId,
    chart: Chart,
}

/// POST /api/polygons: draw end.
pub(super) async fn add_polygon_handler(
    State(state): State<AppState>,
    Json(input): Json<RingInput>,
) -> Result<impl IntoResponse, PanelError> {
    let (id, chart) = state.panel.add_polygon(input).await?;
    Ok((StatusCode::CREATED, Json(Drawn { id, chart })))
}

/// PUT /api/polygons/{id}: modify end.
pub(super) async fn modify_polygon_handler(
    State(state): State<AppState>,
    Path(id): Path<PolygonId>,
    Json(input): Json<RingInput>,
) -> Result<Json<Chart>, PanelError> {
    Ok(Json(state.panel.modify_polygon(id, input).await?))
}

/// PATCH /api/polygons/{id}: set or clear the polygon's name.
pub(super) async fn rename_polygon_handler(
    State(state): State<AppState>,
    Path(id): Path<PolygonId>,
    Json(input): Json<RenameInput>,
) -> Result<StatusCode, PanelError> {
    state.panel.rename_polygon(id, input.name).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /api/polygons/{id}
pub(super) async fn delete_polygon_handler(
    State(state): State<AppState>,
    Path(id): Path<PolygonId>,
) -> Result<impl IntoResponse, PanelError> {
    Ok(Json(state.panel.remove_polygon(id).await?))
}

/// DELETE /api/polygons: remove all polygons and clear the chart.
pub(super) async fn clear_polygons_handler(
    State(state): State<AppState>,
) -> Result<Json<Chart>, PanelError> {
    Ok(Json(state.panel.clear().await?))
}

/// POST /api/polygons/undo: drop the most recently drawn polygon.
pub(super) async fn undo_handler(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, PanelError> {
    Ok(Json(state.panel.undo().await?))
}

/// POST /api/polygons/save: write the live polygons to panel.geojson_path.
pub(super) async fn save_polygons_handler(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, PanelError> {
    let Some(path) = state.config.panel.geojson_path.as_deref() else {
        return Err(PanelError::PersistenceDisabled);
    };
    let collection = state.panel.export().await?;
    geojson::save(std::path::Path::new(path), &collection).await?;
    tracing::info!(path, polygons = collection.features.len(), "polygons saved");
    Ok(Json(serde_json::json!({ "saved": collection.features.len() })))
}
