//! Synthetic range scanner.
//!
//! Produces point clouds as seen by a sensor travelling along +x through a
//! cluttered corridor, so the map has to keep growing while scans stream in.

use std::f32::consts::TAU;
use std::time::Duration;

use aurus_gridmap::{PointXyz, WorldPoint};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tokio::time;
use tracing::{debug, info};

use crate::bus::Topic;
use crate::config::ScannerSettings;

/// One scan in world coordinates.
#[derive(Debug, Clone)]
pub struct PointCloud {
    pub seq: u32,
    /// Sensor position when the scan was taken.
    pub origin: WorldPoint,
    pub points: Vec<PointXyz>,
}

/// Sensor position for scan `seq`: straight along x with a slow sway in y.
fn sensor_position(seq: u32, step: f32) -> (f32, f32) {
    let x = seq as f32 * step;
    let y = 0.5 * (x * 0.5).sin();
    (x, y)
}

/// Casts `points_per_scan` evenly spaced beams; each returns a hit somewhere
/// between 30% and 100% of the configured range.
pub fn generate_scan(rng: &mut StdRng, seq: u32, settings: &ScannerSettings) -> PointCloud {
    let (sx, sy) = sensor_position(seq, settings.step);
    let beams = settings.points_per_scan;

    let points = (0..beams)
        .map(|i| {
            let angle = TAU * i as f32 / beams as f32;
            let r = rng.random_range(0.3..=1.0) * settings.range;
            PointXyz::new(sx + r * angle.cos(), sy + r * angle.sin(), 0.0)
        })
        .collect();

    PointCloud {
        seq,
        origin: WorldPoint::new(f64::from(sx), f64::from(sy)),
        points,
    }
}

/// Publishes `scan_count` scans, one every `period_ms`.
pub async fn run_scanner(settings: ScannerSettings, topic: Topic<PointCloud>) -> anyhow::Result<()> {
    info!(scans = settings.scan_count, "Scanner task started.");
    let mut rng = StdRng::seed_from_u64(settings.seed);
    let mut ticker = time::interval(Duration::from_millis(settings.period_ms.max(1)));

    for seq in 0..settings.scan_count {
        ticker.tick().await;
        let cloud = generate_scan(&mut rng, seq, &settings);
        debug!(seq, points = cloud.points.len(), "Publishing scan");
        topic.publish(cloud);
    }

    info!("Scanner task finished.");
    Ok(())
}
