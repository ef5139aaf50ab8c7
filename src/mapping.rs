use std::sync::Arc;

use aurus_gridmap::{GridMap, GridMapError, WorldPoint};
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use crate::scanner::PointCloud;

/// Cell value written for every beam endpoint.
pub const OCCUPIED: i8 = 100;

/// Counters accumulated by the mapping task.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MappingSummary {
    pub scans: u32,
    pub reallocations: u32,
    pub points_written: usize,
    pub points_skipped: usize,
}

/// Grows `grid` to fit `cloud` and marks every point as occupied.
///
/// Points that still fall outside the grid are skipped and counted; allocation
/// failures are propagated.
pub fn integrate(grid: &mut GridMap, cloud: &PointCloud, summary: &mut MappingSummary) -> anyhow::Result<()> {
    if grid.resize_to_cloud(&cloud.points)? {
        summary.reallocations += 1;
        debug!(
            seq = cloud.seq,
            sensor_x = cloud.origin.x,
            sensor_y = cloud.origin.y,
            width = grid.width(),
            height = grid.height(),
            "Grid map grew to fit scan"
        );
    }

    for p in &cloud.points {
        match grid.set_at_world(WorldPoint::new(f64::from(p.x), f64::from(p.y)), OCCUPIED) {
            Ok(()) => summary.points_written += 1,
            Err(e @ GridMapError::OutOfBounds { .. }) => {
                debug!(seq = cloud.seq, x = p.x, y = p.y, error = %e, "Skipping point");
                summary.points_skipped += 1;
            }
            Err(e) => return Err(e.into()),
        }
    }

    grid.header_mut().seq = cloud.seq;
    summary.scans += 1;
    Ok(())
}

/// Consumes scans until the topic closes, then hands back the grid.
pub async fn run_mapping_task(
    mut grid: GridMap,
    mut cloud_rx: broadcast::Receiver<Arc<PointCloud>>,
) -> anyhow::Result<(GridMap, MappingSummary)> {
    info!(
        frame_id = grid.frame_id(),
        resolution = grid.resolution(),
        min_expansion_size = grid.min_expansion_size(),
        "Mapping task started."
    );
    let mut summary = MappingSummary::default();

    loop {
        match cloud_rx.recv().await {
            Ok(cloud) => integrate(&mut grid, &cloud, &mut summary)?,
            Err(broadcast::error::RecvError::Lagged(n)) => {
                warn!("Cloud receiver lagged by {} messages in mapping task.", n);
                continue;
            }
            Err(broadcast::error::RecvError::Closed) => {
                info!("Cloud topic closed, mapping task finished.");
                break;
            }
        }
    }

    Ok((grid, summary))
}
