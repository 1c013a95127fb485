// Drawn polygons and the request shapes used to create/edit them

use serde::{Deserialize, Serialize};

use super::bucket::LonLat;
use crate::projection;

pub type PolygonId = u64;

/// A live polygon on the panel. `ring` is always geographic lon/lat.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DrawnPolygon {
    pub id: PolygonId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub ring: Vec<LonLat>,
}

/// Coordinate system of an incoming ring.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum RingProjection {
    #[default]
    #[serde(rename = "EPSG:4326")]
    Geographic,
    #[serde(rename = "EPSG:3857")]
    WebMercator,
}

/// Body of draw-end / modify-end requests.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RingInput {
    pub coordinates: Vec<LonLat>,
    #[serde(default)]
    pub projection: RingProjection,
    #[serde(default)]
    pub name: Option<String>,
}

impl RingInput {
    pub fn geographic(coordinates: Vec<LonLat>) -> Self {
        Self {
            coordinates,
            projection: RingProjection::Geographic,
            name: None,
        }
    }

    /// The ring in lon/lat, converting from Web Mercator when tagged so.
    pub fn to_lon_lat(&self) -> Vec<LonLat> {
        match self.projection {
            RingProjection::Geographic => self.coordinates.clone(),
            RingProjection::WebMercator => self
                .coordinates
                .iter()
                .map(|&[x, y]| projection::to_lon_lat(x, y))
                .collect(),
        }
    }
}

/// Body of a rename request. An empty or missing name clears it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RenameInput {
    #[serde(default)]
    pub name: Option<String>,
}
