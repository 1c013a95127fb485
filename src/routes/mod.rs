// HTTP + WebSocket routes

mod http;
mod ws;

use axum::{
    Router,
    routing::{get, post, put},
};
use tokio::sync::broadcast;
use tower_http::cors::{Any, CorsLayer};

use crate::config::AppConfig;
use crate::models::Chart;
use crate::worker::PanelHandle;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) panel: PanelHandle,
    pub(crate) chart_tx: broadcast::Sender<Chart>,
    pub(crate) config: AppConfig,
}

pub fn app(panel: PanelHandle, chart_tx: broadcast::Sender<Chart>, config: AppConfig) -> Router {
    let state = AppState {
        panel,
        chart_tx,
        config,
    };
    Router::new()
        .route("/", get(|| async { "heatfence: draw a polygon, count the devices" })) // GET /
        .route("/version", get(http::version_handler)) // GET /version
        .route("/api/options", get(http::options_handler)) // GET /api/options
        .route("/api/frames", post(http::load_frames_handler)) // POST /api/frames
        .route("/api/heat", get(http::heat_handler)) // GET /api/heat
        .route("/api/chart", get(http::chart_handler)) // GET /api/chart
        .route(
            "/api/polygons",
            get(http::list_polygons_handler)
                .post(http::add_polygon_handler)
                .delete(http::clear_polygons_handler),
        )
        .route("/api/polygons/undo", post(http::undo_handler)) // POST /api/polygons/undo
        .route("/api/polygons/save", post(http::save_polygons_handler)) // POST /api/polygons/save
        .route(
            "/api/polygons/{id}",
            put(http::modify_polygon_handler)
                .patch(http::rename_polygon_handler)
                .delete(http::delete_polygon_handler),
        )
        .route("/ws/chart", get(ws::ws_chart)) // WS /ws/chart
        .layer(CorsLayer::new().allow_origin(Any))
        .with_state(state)
}
