mod bus; // broadcast topics between tasks
mod config; // settings loaded through the `config` crate
mod mapping; // grows and fills the grid map
mod scanner; // synthetic point cloud source

use anyhow::Context;
use aurus_gridmap::GridMap;
use tracing::info;
use tracing_subscriber::{self, EnvFilter};

use bus::Topic;
use scanner::PointCloud;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .init();

    info!("Aurus Mapper started.");

    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| crate::config::DEFAULT_CONFIG_PATH.to_owned());
    let settings = crate::config::load_config(&config_path).context("loading configuration")?;
    settings.validate()?;

    let grid = GridMap::new(
        &settings.map.frame_id,
        settings.map.resolution,
        settings.map.min_expansion_size,
    )
    .context("creating grid map")?;

    let cloud_topic: Topic<PointCloud> = Topic::new("clouds", settings.bus.capacity);
    let mapping_task = tokio::spawn(mapping::run_mapping_task(grid, cloud_topic.subscribe()));

    // The topic closes once the scanner returns and drops the last sender.
    scanner::run_scanner(settings.scanner.clone(), cloud_topic).await?;

    let (grid, summary) = mapping_task.await.context("mapping task panicked")??;

    let occupied = grid.cells().iter().filter(|&&c| c == mapping::OCCUPIED).count();
    info!(
        scans = summary.scans,
        reallocations = summary.reallocations,
        points_written = summary.points_written,
        points_skipped = summary.points_skipped,
        width = grid.width(),
        height = grid.height(),
        occupied_cells = occupied,
        "Mapping finished."
    );
    if let Some(bounds) = grid.bounds() {
        info!(%bounds, origin = %grid.origin(), "Final map extent");
    }

    Ok(())
}
