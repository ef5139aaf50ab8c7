//! Coordinate conversions between world coordinates, grid coordinates and
//! linear cell indices.
//!
//! All conversions are pure functions of a [`MapMetaData`]. They work against
//! the geometry of a live [`crate::GridMap`] as well as against any other
//! geometry, e.g. the one a resized buffer is about to get.
//!
//! World to grid mapping rounds to the nearest cell, so a world coordinate that
//! lies exactly on a lattice point maps onto that cell:
//!
//! ```rust
//! use aurus_gridmap::{GridPoint, MapMetaData, WorldPoint};
//!
//! let info = MapMetaData { resolution: 0.1, width: 11, height: 11, ..Default::default() };
//! assert_eq!(info.world_to_grid(WorldPoint::new(1.0, 0.3)).unwrap(), GridPoint::new(10, 3));
//! assert!(info.world_to_grid(WorldPoint::new(1.06, 0.3)).is_err());
//! ```

use tracing::trace;

use crate::error::{GridMapError, Result};
use crate::msg::MapMetaData;
use crate::types::{Bounds, GridPoint, Vector3, WorldPoint};

/// Checks a rounded grid coordinate against `[0, len)`, also making sure it is
/// representable as a `GridPoint` component.
fn axis_in_range(v: f64, len: u32) -> bool {
    v >= 0.0 && v < f64::from(len) && v <= f64::from(i32::MAX)
}

impl MapMetaData {
    fn out_of_bounds(&self, x: i64, y: i64) -> GridMapError {
        GridMapError::OutOfBounds {
            x,
            y,
            width: self.width,
            height: self.height,
        }
    }

    /// Number of cells described by this geometry, `None` on overflow.
    pub fn cell_count(&self) -> Option<usize> {
        (self.width as usize).checked_mul(self.height as usize)
    }

    /// Returns `true` if `p` names a cell of this geometry.
    pub fn contains(&self, p: GridPoint) -> bool {
        p.x >= 0 && p.y >= 0 && (p.x as u32) < self.width && (p.y as u32) < self.height
    }

    /// World-space area covered by this geometry.
    ///
    /// `min` is the origin and `max` the world coordinate of the last
    /// addressable cell, `origin + (width - 1, height - 1) * resolution`.
    /// Returns `None` for a geometry without cells.
    pub fn extent(&self) -> Option<Bounds> {
        if self.width == 0 || self.height == 0 {
            return None;
        }
        let min = self.origin.position;
        let max = Vector3::new(
            min.x + f64::from(self.width - 1) * self.resolution,
            min.y + f64::from(self.height - 1) * self.resolution,
            min.z,
        );
        Some(Bounds::new(min, max))
    }

    /// Converts world coordinates (in meters) to grid coordinates (in cells).
    ///
    /// # Errors
    ///
    /// `GridMapError::OutOfBounds` if the nearest cell lies outside
    /// `[0, width) x [0, height)`.
    pub fn world_to_grid(&self, world_p: WorldPoint) -> Result<GridPoint> {
        let gx = ((world_p.x - self.origin.position.x) / self.resolution).round();
        let gy = ((world_p.y - self.origin.position.y) / self.resolution).round();

        if !axis_in_range(gx, self.width) || !axis_in_range(gy, self.height) {
            trace!(
                x = world_p.x,
                y = world_p.y,
                origin_x = self.origin.position.x,
                origin_y = self.origin.position.y,
                resolution = self.resolution,
                grid_x = gx,
                grid_y = gy,
                width = self.width,
                height = self.height,
                "world_to_grid failed"
            );
            return Err(self.out_of_bounds(gx as i64, gy as i64));
        }

        Ok(GridPoint::new(gx as i32, gy as i32))
    }

    /// Decodes a linear cell index into grid coordinates.
    ///
    /// # Errors
    ///
    /// `GridMapError::OutOfBounds` if the decoded row lies outside the grid,
    /// i.e. `idx >= width * height`, or if the geometry has no columns.
    pub fn index_to_grid(&self, idx: usize) -> Result<GridPoint> {
        let idx_i64 = i64::try_from(idx).unwrap_or(i64::MAX);
        if self.width == 0 {
            trace!(idx, "index_to_grid failed on zero-width grid");
            return Err(self.out_of_bounds(idx_i64, 0));
        }

        let width = self.width as usize;
        let gx = idx % width;
        let gy = idx / width;

        match (i32::try_from(gx), i32::try_from(gy)) {
            (Ok(x), Ok(y)) if self.contains(GridPoint::new(x, y)) => Ok(GridPoint::new(x, y)),
            _ => {
                trace!(idx, width = self.width, height = self.height, "index_to_grid failed");
                Err(self.out_of_bounds(gx as i64, i64::try_from(gy).unwrap_or(i64::MAX)))
            }
        }
    }

    /// Encodes grid coordinates as a linear, row-major cell index.
    ///
    /// # Errors
    ///
    /// `GridMapError::OutOfBounds` if `p` is not a cell of this geometry.
    pub fn grid_to_index(&self, p: GridPoint) -> Result<usize> {
        if !self.contains(p) {
            trace!(grid_x = p.x, grid_y = p.y, width = self.width, height = self.height, "grid_to_index failed");
            return Err(self.out_of_bounds(i64::from(p.x), i64::from(p.y)));
        }
        Ok(p.x as usize + p.y as usize * self.width as usize)
    }

    /// Converts world coordinates straight to a linear cell index.
    pub fn world_to_index(&self, world_p: WorldPoint) -> Result<usize> {
        let p = self.world_to_grid(world_p)?;
        self.grid_to_index(p)
    }

    /// Converts grid coordinates to the world coordinates of that lattice
    /// point. Never fails: cells outside the current buffer are allowed.
    pub fn grid_to_world(&self, p: GridPoint) -> WorldPoint {
        WorldPoint::new(
            f64::from(p.x) * self.resolution + self.origin.position.x,
            f64::from(p.y) * self.resolution + self.origin.position.y,
        )
    }

    /// Converts a linear cell index to world coordinates.
    pub fn index_to_world(&self, idx: usize) -> Result<WorldPoint> {
        let p = self.index_to_grid(idx)?;
        Ok(self.grid_to_world(p))
    }
}
