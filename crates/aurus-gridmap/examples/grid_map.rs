use aurus_gridmap::{GridMap, PointXyz, WorldPoint};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::DEBUG.into()),
        )
        .init();

    // 0.1m cells, every growth moves an edge by at least 0.5m
    let mut grid = GridMap::new("map", 0.1, 0.5).unwrap();
    let mut rng = StdRng::seed_from_u64(42);

    // Simulate a sensor drifting along +x, producing small clouds around its position
    let mut reallocations = 0;
    for scan in 0..10 {
        let center_x = scan as f32 * 0.25;
        let cloud: Vec<PointXyz> = (0..30)
            .map(|_| {
                PointXyz::new(
                    center_x + rng.random_range(-0.4..0.4),
                    rng.random_range(-0.3..0.3),
                    0.0,
                )
            })
            .collect();

        if grid.resize_to_cloud(&cloud).unwrap() {
            reallocations += 1;
        }

        for p in &cloud {
            let world_p = WorldPoint::new(f64::from(p.x), f64::from(p.y));
            if let Err(e) = grid.set_at_world(world_p, 100) {
                println!("Skipping point {:?}: {}", p, e);
            }
        }
    }

    println!("Reallocated {} times over 10 scans\n", reallocations);
    println!("{}", grid);

    if let Some(b) = grid.bounds() {
        println!("Map bounds: {}", b);
    }

    // Query a lattice point and convert it back
    let probe = WorldPoint::new(0.5, 0.0);
    match grid.world_to_grid(probe) {
        Ok(gp) => {
            let back = grid.grid_to_world(gp);
            println!(
                "World {:?} -> grid ({}, {}) -> world ({:.2}, {:.2}), value {}",
                probe,
                gp.x,
                gp.y,
                back.x,
                back.y,
                grid.value_at_world(probe).unwrap()
            );
        }
        Err(e) => println!("World {:?} is outside the map: {}", probe, e),
    }
}
