// Panel session: current bucketed frame, live polygons, displayed chart.
// Synchronous; the worker owns one Panel and applies commands one at a time.

use std::sync::Arc;

use chrono_tz::Tz;
use tracing::{debug, info};

use crate::bucketizer;
use crate::error::PanelError;
use crate::geojson::{FeatureCollection, SavedPolygon};
use crate::models::{
    BucketedFrame, Chart, DrawnPolygon, FrameBatch, LonLat, PolygonId, QueryResult, format_epoch,
};
use crate::query;

pub struct Panel {
    frame: Option<Arc<BucketedFrame>>,
    polygons: Vec<DrawnPolygon>,
    chart: Chart,
    next_id: PolygonId,
    timezone: Tz,
}

impl Panel {
    pub fn new(timezone: Tz) -> Self {
        Self {
            frame: None,
            polygons: Vec::new(),
            chart: Chart::default(),
            next_id: 1,
            timezone,
        }
    }

    pub fn chart(&self) -> &Chart {
        &self.chart
    }

    pub fn frame(&self) -> Option<&Arc<BucketedFrame>> {
        self.frame.as_ref()
    }

    pub fn polygons(&self) -> &[DrawnPolygon] {
        &self.polygons
    }

    /// Replaces the data. Without a "docs" frame the panel has no data and the chart is cleared.
    /// Otherwise the index is rebuilt and every live polygon re-queried; the last one is displayed.
    pub fn load_frames(&mut self, batch: FrameBatch) -> &Chart {
        let Some((events, external)) = batch.split() else {
            info!("no docs series in frame batch; clearing chart");
            self.frame = None;
            self.publish(Vec::new(), Vec::new());
            return &self.chart;
        };

        let frame = Arc::new(bucketizer::bucketize(&events, &external));
        info!(
            events = events.len(),
            buckets = frame.per_device.len(),
            polygons = self.polygons.len(),
            "frame loaded"
        );
        self.frame = Some(frame.clone());

        let mut data = Vec::new();
        for polygon in &self.polygons {
            data = query::query(&polygon.ring, &frame.per_device, &frame.per_area);
        }
        self.publish(frame.keys.clone(), data);
        &self.chart
    }

    /// Draw end: stores the polygon and displays its result when data is loaded.
    pub fn add_polygon(&mut self, ring: Vec<LonLat>, name: Option<String>) -> (PolygonId, &Chart) {
        let id = self.next_id;
        self.next_id += 1;
        self.polygons.push(DrawnPolygon {
            id,
            name: normalize_name(name),
            ring,
        });
        debug!(polygon_id = id, "polygon drawn");
        self.requery(id);
        (id, &self.chart)
    }

    /// Modify end: replaces the ring of `id` and re-queries it.
    pub fn modify_polygon(&mut self, id: PolygonId, ring: Vec<LonLat>) -> Result<&Chart, PanelError> {
        let polygon = self.find_mut(id)?;
        polygon.ring = ring;
        debug!(polygon_id = id, "polygon modified");
        self.requery(id);
        Ok(&self.chart)
    }

    pub fn rename_polygon(&mut self, id: PolygonId, name: Option<String>) -> Result<(), PanelError> {
        self.find_mut(id)?.name = normalize_name(name);
        Ok(())
    }

    pub fn remove_polygon(&mut self, id: PolygonId) -> Result<DrawnPolygon, PanelError> {
        let pos = self
            .polygons
            .iter()
            .position(|p| p.id == id)
            .ok_or(PanelError::PolygonNotFound(id))?;
        Ok(self.polygons.remove(pos))
    }

    /// Removes the most recently drawn polygon. The chart is left as is.
    pub fn undo(&mut self) -> Option<DrawnPolygon> {
        self.polygons.pop()
    }

    /// Removes every polygon and clears the chart data.
    pub fn clear(&mut self) -> &Chart {
        self.polygons.clear();
        let keys = self.chart.keys.clone();
        self.publish(keys, Vec::new());
        &self.chart
    }

    /// Adds polygons restored from GeoJSON, in order. No chart update.
    pub fn import(&mut self, saved: Vec<SavedPolygon>) -> usize {
        let n = saved.len();
        for s in saved {
            let id = self.next_id;
            self.next_id += 1;
            self.polygons.push(DrawnPolygon {
                id,
                name: normalize_name(s.name),
                ring: s.ring,
            });
        }
        n
    }

    pub fn export(&self) -> FeatureCollection {
        FeatureCollection::from_polygons(&self.polygons)
    }

    fn find_mut(&mut self, id: PolygonId) -> Result<&mut DrawnPolygon, PanelError> {
        self.polygons
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or(PanelError::PolygonNotFound(id))
    }

    /// Re-queries polygon `id` against the loaded frame. No frame: chart untouched.
    fn requery(&mut self, id: PolygonId) {
        let Some(frame) = self.frame.clone() else {
            return;
        };
        let Some(polygon) = self.polygons.iter().find(|p| p.id == id) else {
            return;
        };
        let data = query::query(&polygon.ring, &frame.per_device, &frame.per_area);
        self.publish(frame.keys.clone(), data);
    }

    fn publish(&mut self, keys: Vec<String>, data: QueryResult) {
        let labels = data
            .iter()
            .map(|r| format_epoch(r.timestamp, &self.timezone))
            .collect();
        self.chart = Chart {
            generation: self.chart.generation + 1,
            keys,
            data,
            labels,
        };
    }
}

fn normalize_name(name: Option<String>) -> Option<String> {
    name.map(|n| n.trim().to_string()).filter(|n| !n.is_empty())
}
