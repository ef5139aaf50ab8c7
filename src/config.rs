use config::{Config, ConfigError, Environment, File, FileFormat};
use serde::Deserialize;
use tracing::{error, info};

pub const DEFAULT_CONFIG_PATH: &str = "config/default.toml";

/// Grid map construction parameters.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MapSettings {
    pub frame_id: String,
    /// Cell edge length (m).
    pub resolution: f64,
    /// Minimum growth per edge (m).
    pub min_expansion_size: f64,
}

impl Default for MapSettings {
    fn default() -> Self {
        MapSettings {
            frame_id: "map".to_owned(),
            resolution: 0.05,
            min_expansion_size: 1.0,
        }
    }
}

/// Synthetic range scanner driving the demo.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ScannerSettings {
    pub scan_count: u32,
    pub points_per_scan: u32,
    /// Max beam length (m).
    pub range: f32,
    /// Distance the sensor travels between scans (m).
    pub step: f32,
    pub period_ms: u64,
    pub seed: u64,
}

impl Default for ScannerSettings {
    fn default() -> Self {
        ScannerSettings {
            scan_count: 50,
            points_per_scan: 360,
            range: 2.5,
            step: 0.2,
            period_ms: 50,
            seed: 7,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BusSettings {
    pub capacity: usize,
}

impl Default for BusSettings {
    fn default() -> Self {
        BusSettings { capacity: 16 }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct MapperConfig {
    pub map: MapSettings,
    pub scanner: ScannerSettings,
    pub bus: BusSettings,
}

impl MapperConfig {
    pub fn validate(&self) -> anyhow::Result<()> {
        anyhow::ensure!(self.scanner.points_per_scan > 0, "scanner.points_per_scan must be positive");
        anyhow::ensure!(
            self.scanner.range.is_finite() && self.scanner.range > 0.0,
            "scanner.range must be positive"
        );
        anyhow::ensure!(self.scanner.step.is_finite(), "scanner.step must be finite");
        anyhow::ensure!(self.bus.capacity > 0, "bus.capacity must be positive");
        Ok(())
    }
}

/// Loads settings from `path` (optional) layered with `AURUS_` environment
/// variables, e.g. `AURUS_MAP__RESOLUTION=0.1`. Missing keys fall back to the
/// built-in defaults.
pub fn load_config(path: &str) -> Result<MapperConfig, ConfigError> {
    info!("Attempting to load configuration from {}", path);

    let settings = Config::builder()
        .add_source(File::new(path, FileFormat::Toml).required(false))
        .add_source(
            Environment::with_prefix("AURUS")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        )
        .build()
        .and_then(|c| c.try_deserialize::<MapperConfig>());

    match settings {
        Ok(config) => {
            info!("Successfully loaded configuration: {:?}", config);
            Ok(config)
        }
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            Err(e)
        }
    }
}
