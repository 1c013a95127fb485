// Domain models: input frames, bucketed index, polygons, chart output

mod bucket;
mod chart;
mod event;
mod polygon;

pub use bucket::{
    BUCKET_WIDTH, BY_DEVICE, BucketedFrame, DevicePoints, ExternalMetricTable, HeatPoint, LonLat,
    MetricRow, PerDeviceIndex, bucket_key,
};
pub use chart::{Chart, ChartRecord, QueryResult, format_epoch};
pub use event::{DOCS_SERIES, Event, Frame, FrameBatch, NamedSeries};
pub use polygon::{DrawnPolygon, PolygonId, RenameInput, RingInput, RingProjection};
