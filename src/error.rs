// Panel errors (worker commands, polygon edits, GeoJSON persistence)

use crate::models::PolygonId;

#[derive(Debug, thiserror::Error)]
pub enum PanelError {
    #[error("polygon {0} not found")]
    PolygonNotFound(PolygonId),
    #[error("panel worker is not running")]
    WorkerGone,
    #[error("panel.geojson_path is not configured")]
    PersistenceDisabled,
    #[error("geojson: {0}")]
    GeoJson(#[from] serde_json::Error),
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}
