// Spherical Web Mercator (EPSG:3857) <-> geographic lon/lat (EPSG:4326)

use std::f64::consts::PI;

use crate::models::{HeatPoint, LonLat};

const EARTH_RADIUS_M: f64 = 6_378_137.0;
/// Half the side of the square world extent, in metres.
pub const HALF_WORLD_M: f64 = PI * EARTH_RADIUS_M;

/// Projects lon/lat degrees to Web Mercator metres. Northing is clamped to the world extent.
pub fn to_web_mercator(lon: f64, lat: f64) -> HeatPoint {
    let x = EARTH_RADIUS_M * PI * lon / 180.0;
    let y = EARTH_RADIUS_M * (PI * (lat + 90.0) / 360.0).tan().ln();
    HeatPoint {
        x,
        y: y.clamp(-HALF_WORLD_M, HALF_WORLD_M),
    }
}

/// Inverse of [`to_web_mercator`].
pub fn to_lon_lat(x: f64, y: f64) -> LonLat {
    let lon = 180.0 * x / HALF_WORLD_M;
    let lat = 360.0 * (y / EARTH_RADIUS_M).exp().atan() / PI - 90.0;
    [lon, lat]
}
