// GeoJSON FeatureCollection of drawn polygons (lon/lat). Used to save/restore the panel's polygons.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::PanelError;
use crate::models::{DrawnPolygon, LonLat, PolygonId};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Geometry {
    Polygon { coordinates: Vec<Vec<LonLat>> },
    #[serde(other)]
    Unsupported,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Properties {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename = "Feature")]
pub struct Feature {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<PolygonId>,
    #[serde(default)]
    pub properties: Properties,
    pub geometry: Geometry,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename = "FeatureCollection")]
pub struct FeatureCollection {
    #[serde(default)]
    pub features: Vec<Feature>,
}

/// A polygon read back from GeoJSON, before the panel assigns it an id.
#[derive(Debug, Clone, PartialEq)]
pub struct SavedPolygon {
    pub name: Option<String>,
    pub ring: Vec<LonLat>,
}

impl FeatureCollection {
    pub fn from_polygons(polygons: &[DrawnPolygon]) -> Self {
        let features = polygons
            .iter()
            .map(|p| Feature {
                id: Some(p.id),
                properties: Properties {
                    name: p.name.clone(),
                },
                geometry: Geometry::Polygon {
                    coordinates: vec![p.ring.clone()],
                },
            })
            .collect();
        Self { features }
    }

    /// Polygon features in file order (outer ring only). Other geometries are skipped.
    pub fn into_polygons(self) -> Vec<SavedPolygon> {
        self.features
            .into_iter()
            .filter_map(|f| match f.geometry {
                Geometry::Polygon { coordinates } => {
                    let ring = coordinates.into_iter().next()?;
                    Some(SavedPolygon {
                        name: f.properties.name,
                        ring,
                    })
                }
                Geometry::Unsupported => {
                    warn!(id = ?f.id, "skipping non-polygon feature");
                    None
                }
            })
            .collect()
    }
}

/// Reads saved polygons from `path`. A missing file means no polygons.
pub async fn load(path: &Path) -> Result<Vec<SavedPolygon>, PanelError> {
    let text = match tokio::fs::read_to_string(path).await {
        Ok(text) => text,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(e.into()),
    };
    let collection: FeatureCollection = serde_json::from_str(&text)?;
    Ok(collection.into_polygons())
}

/// Writes `collection` to `path`, creating the parent directory if needed.
pub async fn save(path: &Path, collection: &FeatureCollection) -> Result<(), PanelError> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        tokio::fs::create_dir_all(parent).await?;
    }
    let json = serde_json::to_string_pretty(collection)?;
    tokio::fs::write(path, json).await?;
    Ok(())
}
