// GeoJSON save/restore of drawn polygons

mod common;

use common::*;
use heatfence::geojson::{self, FeatureCollection, Geometry};
use heatfence::models::DrawnPolygon;
use tempfile::TempDir;

fn polygons() -> Vec<DrawnPolygon> {
    vec![
        DrawnPolygon {
            id: 1,
            name: Some("Lobby".into()),
            ring: square(0.0, 1.0),
        },
        DrawnPolygon {
            id: 2,
            name: None,
            ring: square(2.0, 3.0),
        },
    ]
}

#[test]
fn exports_feature_collection_shape() {
    let json = serde_json::to_value(FeatureCollection::from_polygons(&polygons())).unwrap();
    assert_eq!(json["type"], "FeatureCollection");
    assert_eq!(json["features"][0]["type"], "Feature");
    assert_eq!(json["features"][0]["id"], 1);
    assert_eq!(json["features"][0]["properties"]["name"], "Lobby");
    assert_eq!(json["features"][0]["geometry"]["type"], "Polygon");
    assert_eq!(json["features"][0]["geometry"]["coordinates"][0][1][0], 1.0);
    assert!(json["features"][1]["properties"].get("name").is_none());
}

#[test]
fn reads_foreign_collection_and_skips_other_geometries() {
    let text = r#"{
        "type": "FeatureCollection",
        "features": [
            { "type": "Feature", "properties": { "name": "Gate" },
              "geometry": { "type": "Polygon", "coordinates": [[[0,0],[1,0],[1,1],[0,0]]] } },
            { "type": "Feature", "properties": {},
              "geometry": { "type": "LineString", "coordinates": [[0,0],[1,1]] } }
        ]
    }"#;
    let collection: FeatureCollection = serde_json::from_str(text).unwrap();
    assert!(matches!(collection.features[1].geometry, Geometry::Unsupported));
    let saved = collection.into_polygons();
    assert_eq!(saved.len(), 1);
    assert_eq!(saved[0].name.as_deref(), Some("Gate"));
    assert_eq!(saved[0].ring.len(), 4);
}

#[tokio::test]
async fn missing_file_means_no_polygons() {
    let dir = TempDir::new().unwrap();
    let saved = geojson::load(&dir.path().join("none.geojson")).await.unwrap();
    assert!(saved.is_empty());
}

#[tokio::test]
async fn save_then_load_restores_rings_and_names() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("nested").join("polygons.geojson");
    geojson::save(&path, &FeatureCollection::from_polygons(&polygons()))
        .await
        .unwrap();
    let saved = geojson::load(&path).await.unwrap();
    assert_eq!(saved.len(), 2);
    assert_eq!(saved[0].name.as_deref(), Some("Lobby"));
    assert_eq!(saved[1].ring, square(2.0, 3.0));
}

#[tokio::test]
async fn corrupt_file_is_an_error() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("bad.geojson");
    std::fs::write(&path, "{ not json").unwrap();
    assert!(geojson::load(&path).await.is_err());
}
