//! Bounding box extraction from point clouds.

use crate::types::{Bounds, PointXyz, Vector3};

/// Computes the axis-aligned bounding box of `points` in a single pass.
///
/// x, y and z are tracked independently. Returns `None` for an empty slice,
/// in which case there is nothing to grow the map for.
pub fn compute_bounding_box(points: &[PointXyz]) -> Option<Bounds> {
    let (first, rest) = points.split_first()?;
    let start = Vector3::new(f64::from(first.x), f64::from(first.y), f64::from(first.z));

    let bounds = rest.iter().fold(Bounds::new(start, start), |mut b, p| {
        let (x, y, z) = (f64::from(p.x), f64::from(p.y), f64::from(p.z));
        b.min.x = b.min.x.min(x);
        b.min.y = b.min.y.min(y);
        b.min.z = b.min.z.min(z);
        b.max.x = b.max.x.max(x);
        b.max.y = b.max.y.max(y);
        b.max.z = b.max.z.max(z);
        b
    });

    Some(bounds)
}
