use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    #[serde(default)]
    pub panel: PanelConfig,
    #[serde(default)]
    pub heatmap: HeatmapConfig,
    pub map: MapConfig,
    pub publishing: PublishingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub port: u16,
    pub host: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PanelConfig {
    /// IANA zone used for chart tick labels, e.g. "Asia/Jakarta".
    #[serde(default = "default_timezone")]
    pub timezone: String,
    /// Where drawn polygons are saved/restored as GeoJSON. Unset = polygons live in memory only.
    #[serde(default)]
    pub geojson_path: Option<String>,
}

fn default_timezone() -> String {
    "UTC".into()
}

impl Default for PanelConfig {
    fn default() -> Self {
        Self {
            timezone: default_timezone(),
            geojson_path: None,
        }
    }
}

impl PanelConfig {
    pub fn tz(&self) -> anyhow::Result<Tz> {
        self.timezone
            .parse::<Tz>()
            .map_err(|e| anyhow::anyhow!("panel.timezone {:?}: {}", self.timezone, e))
    }
}

/// Heat layer options handed to the renderer alongside the projected points.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HeatmapConfig {
    pub radius: u32,
    pub blur: u32,
    pub opacity: f64,
}

impl Default for HeatmapConfig {
    fn default() -> Self {
        Self {
            radius: 8,
            blur: 15,
            opacity: 0.9,
        }
    }
}

/// Initial map view for the renderer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MapConfig {
    pub center_lat: f64,
    pub center_lon: f64,
    pub zoom_level: u8,
    /// Extra XYZ tile layer; empty = none.
    #[serde(default)]
    pub tile_url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PublishingConfig {
    /// Charts kept in the broadcast channel for /ws/chart (slow clients skip ahead).
    pub broadcast_capacity: usize,
    /// Pending commands queued for the panel worker.
    pub command_capacity: usize,
}

impl AppConfig {
    pub fn load() -> anyhow::Result<Self> {
        let path = std::env::var("CONFIG_FILE").unwrap_or_else(|_| "config.toml".into());
        let s = std::fs::read_to_string(&path)?;
        Self::load_from_str(&s)
    }

    /// Parse and validate config from a string (e.g. for tests).
    pub fn load_from_str(s: &str) -> anyhow::Result<Self> {
        let config: AppConfig = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> anyhow::Result<()> {
        anyhow::ensure!(
            self.server.port > 0,
            "server.port must be between 1 and 65535, got {}",
            self.server.port
        );
        anyhow::ensure!(!self.server.host.is_empty(), "server.host must be non-empty");
        anyhow::ensure!(
            !self.panel.timezone.is_empty(),
            "panel.timezone must be non-empty"
        );
        self.panel.tz()?;
        if let Some(path) = &self.panel.geojson_path {
            anyhow::ensure!(
                !path.is_empty(),
                "panel.geojson_path must be non-empty when set"
            );
        }
        anyhow::ensure!(
            self.heatmap.radius > 0,
            "heatmap.radius must be > 0, got {}",
            self.heatmap.radius
        );
        anyhow::ensure!(
            (0.0..=1.0).contains(&self.heatmap.opacity),
            "heatmap.opacity must be within 0..=1, got {}",
            self.heatmap.opacity
        );
        anyhow::ensure!(
            (-90.0..=90.0).contains(&self.map.center_lat),
            "map.center_lat must be within -90..=90, got {}",
            self.map.center_lat
        );
        anyhow::ensure!(
            (-180.0..=180.0).contains(&self.map.center_lon),
            "map.center_lon must be within -180..=180, got {}",
            self.map.center_lon
        );
        anyhow::ensure!(
            self.map.zoom_level <= 22,
            "map.zoom_level must be <= 22, got {}",
            self.map.zoom_level
        );
        anyhow::ensure!(
            self.publishing.broadcast_capacity > 0,
            "publishing.broadcast_capacity must be > 0, got {}",
            self.publishing.broadcast_capacity
        );
        anyhow::ensure!(
            self.publishing.command_capacity > 0,
            "publishing.command_capacity must be > 0, got {}",
            self.publishing.command_capacity
        );
        Ok(())
    }
}
