// Point-in-polygon capability and its planar implementation (geo crate)

use geo::{Area, Coord, Intersects, LineString, Polygon};

use crate::models::LonLat;

/// Answers whether a lon/lat point lies inside (or on the boundary of) an area.
pub trait Containment {
    fn contains(&self, point: LonLat) -> bool;
}

/// Planar polygon over lon/lat. Degenerate rings contain nothing.
#[derive(Debug, Clone)]
pub struct PlanarPolygon {
    polygon: Option<Polygon<f64>>,
}

impl PlanarPolygon {
    /// Builds the polygon from a ring; an open ring is closed.
    /// Fewer than 3 distinct vertices, non-finite coordinates, or zero area make it degenerate.
    pub fn from_ring(ring: &[LonLat]) -> Self {
        Self {
            polygon: build(ring),
        }
    }

    pub fn is_degenerate(&self) -> bool {
        self.polygon.is_none()
    }
}

fn build(ring: &[LonLat]) -> Option<Polygon<f64>> {
    if ring.iter().any(|[x, y]| !x.is_finite() || !y.is_finite()) {
        return None;
    }
    let mut distinct: Vec<LonLat> = Vec::with_capacity(ring.len());
    for &p in ring {
        if !distinct.contains(&p) {
            distinct.push(p);
        }
    }
    if distinct.len() < 3 {
        return None;
    }
    let exterior: LineString<f64> = ring.iter().map(|&[x, y]| Coord { x, y }).collect();
    // Polygon::new closes the exterior if the last vertex differs from the first.
    let polygon = Polygon::new(exterior, vec![]);
    if polygon.unsigned_area() == 0.0 {
        return None;
    }
    Some(polygon)
}

impl Containment for PlanarPolygon {
    fn contains(&self, [x, y]: LonLat) -> bool {
        match &self.polygon {
            Some(polygon) => polygon.intersects(&Coord { x, y }),
            None => false,
        }
    }
}
