//! Dynamically growable 2D occupancy grid.
//!
//! [`GridMap`] keeps a dense, row-major buffer of signed-byte cells together
//! with the world-space box the buffer covers. Growing the map never moves a
//! cell: after every resize each value is still found at the world coordinate
//! it was written to.
//!
//! Growth is amortized. The first allocation fits the requested box exactly;
//! every later growth extends each edge that has to move by at least the
//! minimum expansion size, so a stream of slightly larger requests does not
//! reallocate the buffer every time.

use core::fmt;
use core::ops::{Index, IndexMut};

use tracing::{debug, trace};

use crate::boundary::compute_bounding_box;
use crate::error::{GridMapError, Result};
use crate::math::{cell_span, pceil, pfloor};
use crate::msg::{Header, MapMetaData, OccupancyGrid, UNKNOWN_CELL};
use crate::types::{Bounds, GridPoint, PointXyz, Vector3, WorldPoint};

fn validate_resolution(resolution: f64) -> Result<()> {
    if !resolution.is_finite() || resolution <= 0.0 {
        return Err(GridMapError::InvalidResolution("must be positive and finite"));
    }
    Ok(())
}

/// Rounds the expansion size up to a multiple of `resolution` so that growing
/// an edge never shifts existing data off the lattice.
fn expansion_size(min_expansion_size: f64, resolution: f64) -> Result<f64> {
    if !min_expansion_size.is_finite() || min_expansion_size < 0.0 {
        return Err(GridMapError::InvalidExpansionSize("must be non-negative and finite"));
    }
    Ok(pceil(min_expansion_size, resolution))
}

fn validate_msg(msg: &OccupancyGrid) -> Result<()> {
    validate_resolution(msg.info.resolution)?;
    if !msg.is_consistent() {
        return Err(GridMapError::InvalidMessage("data length must equal width * height"));
    }
    Ok(())
}

/// A dense 2D grid of signed-byte cells that grows to fit the data written to it.
///
/// The map starts out empty. [`GridMap::resize`] and [`GridMap::resize_to_cloud`]
/// allocate and grow the buffer; cells are then read and written by linear
/// index ([`GridMap::at`], `map[idx]`) or by world coordinate
/// ([`GridMap::value_at_world`], [`GridMap::set_at_world`]).
///
/// No locking is done internally. Share it between threads behind a lock.
#[derive(Debug, Clone, PartialEq)]
pub struct GridMap {
    /// Header, geometry and cells.
    msg: OccupancyGrid,
    /// World box covered by the buffer, absent until the first allocation.
    bounds: Option<Bounds>,
    /// Minimum growth per edge, a multiple of the resolution.
    min_expansion_size: f64,
}

impl GridMap {
    /// Creates an empty grid map.
    ///
    /// # Arguments
    ///
    /// * `frame_id`: Frame the map is expressed in; a leading `/` is dropped.
    /// * `resolution`: Cell edge length in meters.
    /// * `min_expansion_size`: Minimum growth per edge in meters, rounded up to a
    ///   multiple of `resolution`.
    ///
    /// # Errors
    ///
    /// Returns `Err(GridMapError::InvalidResolution)` if `resolution` is not positive.
    /// Returns `Err(GridMapError::InvalidExpansionSize)` if `min_expansion_size` is negative.
    pub fn new(frame_id: &str, resolution: f64, min_expansion_size: f64) -> Result<Self> {
        validate_resolution(resolution)?;
        let min_expansion_size = expansion_size(min_expansion_size, resolution)?;

        let mut msg = OccupancyGrid::default();
        msg.header.frame_id = frame_id.trim_start_matches('/').to_owned();
        msg.info.resolution = resolution;

        Ok(GridMap {
            msg,
            bounds: None,
            min_expansion_size,
        })
    }

    /// Creates a grid map holding a copy of `msg`.
    ///
    /// Geometry and cells are taken over verbatim. The covered bounds are
    /// derived from the geometry, see [`MapMetaData::extent`].
    ///
    /// # Errors
    ///
    /// Returns `Err(GridMapError::InvalidResolution)` if the message resolution is not positive.
    /// Returns `Err(GridMapError::InvalidMessage)` if the data length does not match the geometry.
    /// Returns `Err(GridMapError::InvalidExpansionSize)` if `min_expansion_size` is negative.
    pub fn from_msg(msg: OccupancyGrid, min_expansion_size: f64) -> Result<Self> {
        validate_msg(&msg)?;
        let min_expansion_size = expansion_size(min_expansion_size, msg.info.resolution)?;
        let bounds = msg.info.extent();

        Ok(GridMap {
            msg,
            bounds,
            min_expansion_size,
        })
    }

    /// Replaces the content of this map with a copy of `msg`.
    ///
    /// The expansion size is kept, re-rounded to the resolution of `msg`.
    /// On error the map is left untouched.
    pub fn load_msg(&mut self, msg: &OccupancyGrid) -> Result<()> {
        validate_msg(msg)?;
        let min_expansion_size = pceil(self.min_expansion_size, msg.info.resolution);

        self.reset();
        self.msg.clone_from(msg);
        self.bounds = self.msg.info.extent();
        self.min_expansion_size = min_expansion_size;
        Ok(())
    }

    /// Copies the full map into `msg`.
    pub fn export_to(&self, msg: &mut OccupancyGrid) {
        msg.clone_from(&self.msg);
    }

    /// Returns a copy of the full map as a message.
    pub fn to_msg(&self) -> OccupancyGrid {
        self.msg.clone()
    }

    /// Borrows the full map as a message.
    pub fn as_msg(&self) -> &OccupancyGrid {
        &self.msg
    }

    /// Consumes the map, returning its message.
    pub fn into_msg(self) -> OccupancyGrid {
        self.msg
    }

    /// Drops all cells and forgets the covered bounds.
    ///
    /// Width and height are zeroed as well; resolution, origin and the
    /// expansion policy are kept. The next resize is an exact-fit allocation.
    pub fn reset(&mut self) {
        self.msg.data.clear();
        self.msg.info.width = 0;
        self.msg.info.height = 0;
        self.msg.header.seq = 0;
        self.bounds = None;
    }

    /// Returns `true` if no cell buffer is allocated.
    pub fn is_empty(&self) -> bool {
        self.msg.data.is_empty()
    }

    /// Cell edge length in meters.
    pub fn resolution(&self) -> f64 {
        self.msg.info.resolution
    }

    /// Minimum growth per edge in meters.
    pub fn min_expansion_size(&self) -> f64 {
        self.min_expansion_size
    }

    /// World position of the corner of cell (0, 0).
    pub fn origin(&self) -> Vector3 {
        self.msg.info.origin.position
    }

    /// Width in cells.
    pub fn width(&self) -> u32 {
        self.msg.info.width
    }

    /// Height in cells.
    pub fn height(&self) -> u32 {
        self.msg.info.height
    }

    /// Geometry of the map.
    pub fn info(&self) -> &MapMetaData {
        &self.msg.info
    }

    /// Message header.
    pub fn header(&self) -> &Header {
        &self.msg.header
    }

    /// Mutable message header, e.g. for stamping before export.
    pub fn header_mut(&mut self) -> &mut Header {
        &mut self.msg.header
    }

    /// Frame the map is expressed in.
    pub fn frame_id(&self) -> &str {
        &self.msg.header.frame_id
    }

    /// World box currently covered by the buffer, `None` while empty.
    pub fn bounds(&self) -> Option<Bounds> {
        self.bounds
    }

    /// Minimum corner of the covered box.
    pub fn get_min(&self) -> Option<Vector3> {
        self.bounds.map(|b| b.min)
    }

    /// Maximum corner of the covered box.
    pub fn get_max(&self) -> Option<Vector3> {
        self.bounds.map(|b| b.max)
    }

    /// All cells in row-major order.
    pub fn cells(&self) -> &[i8] {
        &self.msg.data
    }

    /// All cells in row-major order, mutable.
    pub fn cells_mut(&mut self) -> &mut [i8] {
        &mut self.msg.data
    }

    /// Value of the cell at `idx`.
    ///
    /// # Panics
    ///
    /// Panics if `idx` is not below `width * height`.
    pub fn at(&self, idx: usize) -> i8 {
        self.msg.data[idx]
    }

    /// Mutable reference to the cell at `idx`.
    ///
    /// # Panics
    ///
    /// Panics if `idx` is not below `width * height`.
    pub fn at_mut(&mut self, idx: usize) -> &mut i8 {
        &mut self.msg.data[idx]
    }

    /// Value of the cell at `idx`, `None` if out of range.
    pub fn get(&self, idx: usize) -> Option<i8> {
        self.msg.data.get(idx).copied()
    }

    /// Value of the cell nearest to a world coordinate.
    pub fn value_at_world(&self, world_p: WorldPoint) -> Result<i8> {
        let idx = self.world_to_index(world_p)?;
        Ok(self.msg.data[idx])
    }

    /// Sets the cell nearest to a world coordinate.
    pub fn set_at_world(&mut self, world_p: WorldPoint, value: i8) -> Result<()> {
        let idx = self.world_to_index(world_p)?;
        self.msg.data[idx] = value;
        Ok(())
    }

    /// See [`MapMetaData::world_to_grid`].
    pub fn world_to_grid(&self, world_p: WorldPoint) -> Result<GridPoint> {
        self.msg.info.world_to_grid(world_p)
    }

    /// See [`MapMetaData::index_to_grid`].
    pub fn index_to_grid(&self, idx: usize) -> Result<GridPoint> {
        self.msg.info.index_to_grid(idx)
    }

    /// See [`MapMetaData::grid_to_index`].
    pub fn grid_to_index(&self, p: GridPoint) -> Result<usize> {
        self.msg.info.grid_to_index(p)
    }

    /// See [`MapMetaData::world_to_index`].
    pub fn world_to_index(&self, world_p: WorldPoint) -> Result<usize> {
        self.msg.info.world_to_index(world_p)
    }

    /// See [`MapMetaData::grid_to_world`].
    pub fn grid_to_world(&self, p: GridPoint) -> WorldPoint {
        self.msg.info.grid_to_world(p)
    }

    /// See [`MapMetaData::index_to_world`].
    pub fn index_to_world(&self, idx: usize) -> Result<WorldPoint> {
        self.msg.info.index_to_world(idx)
    }

    /// Grows the map so that it covers the bounding box of `points`.
    ///
    /// An empty cloud leaves the map untouched. Returns `true` if the buffer
    /// was reallocated.
    pub fn resize_to_cloud(&mut self, points: &[PointXyz]) -> Result<bool> {
        match compute_bounding_box(points) {
            Some(b) => self.resize(b.min, b.max),
            None => Ok(false),
        }
    }

    /// Grows the map so that it covers `[min, max]` on x and y.
    ///
    /// Returns `Ok(false)` without touching the buffer if the box is already
    /// covered (or inverted), `Ok(true)` after a reallocation.
    ///
    /// # Errors
    ///
    /// Returns `Err(GridMapError::InvalidBounds)` if a corner is not finite.
    /// Returns `Err(GridMapError::AllocationFailure)` if the grown buffer cannot
    /// be allocated; the map keeps its previous buffer in that case.
    pub fn resize(&mut self, min: Vector3, max: Vector3) -> Result<bool> {
        if !min.is_finite() || !max.is_finite() {
            return Err(GridMapError::InvalidBounds("corners must be finite"));
        }

        let request = Bounds::new(min, max);
        if request.is_inverted_xy() {
            trace!(%request, "Ignoring inverted resize request");
            return Ok(false);
        }

        // enlargement only
        if let Some(current) = self.bounds {
            if current.covers_xy(&request) {
                return Ok(false);
            }
        }

        let next = self.grown_bounds(&request);
        let res = self.resolution();

        // +1 because world coordinates are mapped onto cells by rounding
        let width_f = cell_span(next.max.x - next.min.x, res) + 1.0;
        let height_f = cell_span(next.max.y - next.min.y, res) + 1.0;
        let alloc_failure = GridMapError::AllocationFailure {
            width: width_f as u64,
            height: height_f as u64,
        };
        if width_f > f64::from(u32::MAX) || height_f > f64::from(u32::MAX) {
            return Err(alloc_failure);
        }

        let mut info = self.msg.info;
        info.width = width_f as u32;
        info.height = height_f as u32;
        info.origin.position.x = next.min.x;
        info.origin.position.y = next.min.y;

        let count = info.cell_count().ok_or(alloc_failure.clone())?;
        let mut data: Vec<i8> = Vec::new();
        data.try_reserve_exact(count).map_err(|_| alloc_failure)?;
        data.resize(count, UNKNOWN_CELL);

        // copy row-wise data
        if !self.msg.data.is_empty() {
            let old = &self.msg.info;
            let start = info.world_to_index(WorldPoint::new(old.origin.position.x, old.origin.position.y))?;
            let old_width = old.width as usize;
            let new_width = info.width as usize;

            for (row, src) in self.msg.data.chunks_exact(old_width).enumerate() {
                let dst = start + row * new_width;
                data[dst..dst + old_width].copy_from_slice(src);
            }
        }

        debug!(
            old_width = self.msg.info.width,
            old_height = self.msg.info.height,
            new_width = info.width,
            new_height = info.height,
            %next,
            "Resized grid map"
        );

        self.msg.info = info;
        self.msg.data = data;
        self.bounds = Some(next);
        Ok(true)
    }

    /// Computes the covered box after growing to fit `request`.
    fn grown_bounds(&self, request: &Bounds) -> Bounds {
        let res = self.resolution();

        let current = match self.bounds {
            Some(current) if !self.is_empty() => current,
            // first allocation fits the request exactly
            _ => {
                return Bounds::new(
                    Vector3::new(pfloor(request.min.x, res), pfloor(request.min.y, res), request.min.z),
                    Vector3::new(pceil(request.max.x, res), pceil(request.max.y, res), request.max.z),
                );
            }
        };

        let grow = |deficit: f64| pceil(deficit, res).max(self.min_expansion_size);
        let mut next = current;
        if current.min.x > request.min.x {
            next.min.x -= grow(current.min.x - request.min.x);
        }
        if current.min.y > request.min.y {
            next.min.y -= grow(current.min.y - request.min.y);
        }
        if current.max.x < request.max.x {
            next.max.x += grow(request.max.x - current.max.x);
        }
        if current.max.y < request.max.y {
            next.max.y += grow(request.max.y - current.max.y);
        }
        next
    }
}

impl Index<usize> for GridMap {
    type Output = i8;

    fn index(&self, idx: usize) -> &i8 {
        &self.msg.data[idx]
    }
}

impl IndexMut<usize> for GridMap {
    fn index_mut(&mut self, idx: usize) -> &mut i8 {
        &mut self.msg.data[idx]
    }
}

impl fmt::Display for GridMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "GridMap ({}x{}, resolution: {:.3}m)",
            self.width(),
            self.height(),
            self.resolution()
        )?;
        writeln!(f, "Origin: ({:.3}, {:.3})", self.origin().x, self.origin().y)?;

        if self.width() == 0 {
            return Ok(());
        }
        for row in self.msg.data.chunks_exact(self.width() as usize) {
            for value in row {
                write!(f, "{:4} ", value)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::msg::Time;
    use crate::types::Pose;
    use proptest::prelude::*;

    const EPSILON: f64 = 1e-9;

    fn v(x: f64, y: f64) -> Vector3 {
        Vector3::new(x, y, 0.0)
    }

    fn unit_square_map() -> GridMap {
        let mut map = GridMap::new("map", 0.1, 0.2).unwrap();
        assert!(map.resize(v(0.0, 0.0), v(1.0, 1.0)).unwrap());
        map
    }

    #[test]
    fn test_new_map_is_empty() {
        let map = GridMap::new("/world", 0.05, 0.1).unwrap();
        assert!(map.is_empty());
        assert_eq!(map.width(), 0);
        assert_eq!(map.height(), 0);
        assert_eq!(map.origin(), Vector3::default());
        assert!(map.bounds().is_none());
        assert!(map.get_min().is_none());
        assert!(map.get_max().is_none());
        assert_eq!(map.frame_id(), "world");
        assert_eq!(map.header().seq, 0);
        assert!((map.min_expansion_size() - 0.1).abs() < EPSILON);
    }

    #[test]
    fn test_expansion_size_rounded_up_to_resolution() {
        let map = GridMap::new("map", 0.05, 0.12).unwrap();
        assert!((map.min_expansion_size() - 0.15).abs() < EPSILON);

        let map = GridMap::new("map", 0.05, 0.0).unwrap();
        assert_eq!(map.min_expansion_size(), 0.0);
    }

    #[test]
    fn test_invalid_creation() {
        assert!(matches!(
            GridMap::new("map", 0.0, 0.1),
            Err(GridMapError::InvalidResolution(_))
        ));
        assert!(matches!(
            GridMap::new("map", f64::NAN, 0.1),
            Err(GridMapError::InvalidResolution(_))
        ));
        assert!(matches!(
            GridMap::new("map", 0.05, -0.1),
            Err(GridMapError::InvalidExpansionSize(_))
        ));
    }

    #[test]
    fn test_first_allocation_is_exact_fit() {
        let mut map = GridMap::new("map", 0.05, 0.1).unwrap();
        assert!(map.resize(v(-0.03, -0.02), v(0.07, 0.04)).unwrap());

        let origin = map.origin();
        assert!((origin.x - (-0.05)).abs() < EPSILON);
        assert!((origin.y - (-0.05)).abs() < EPSILON);
        assert_eq!(origin.z, 0.0);

        // x: -0.05 .. 0.10 -> 3 intervals + 1, y: -0.05 .. 0.05 -> 2 intervals + 1
        assert_eq!(map.width(), 4);
        assert_eq!(map.height(), 3);
        assert_eq!(map.cells().len(), 12);
        assert!(map.cells().iter().all(|&c| c == UNKNOWN_CELL));

        let max = map.get_max().unwrap();
        assert!((max.x - 0.10).abs() < EPSILON);
        assert!((max.y - 0.05).abs() < EPSILON);
        assert_eq!(map.get_min().unwrap().x, origin.x);
    }

    #[test]
    fn test_growth_uses_min_expansion_size() {
        let mut map = unit_square_map();
        assert_eq!(map.width(), 11);
        assert_eq!(map.height(), 11);

        // 0.05 deficit, but every grown edge moves by at least 0.2
        assert!(map.resize(v(0.5, 0.5), v(1.05, 0.5)).unwrap());

        let b = map.bounds().unwrap();
        assert!((b.max.x - 1.2).abs() < EPSILON);
        assert!((b.max.y - 1.0).abs() < EPSILON);
        assert!((b.min.x - 0.0).abs() < EPSILON);
        assert!((b.min.y - 0.0).abs() < EPSILON);
        assert_eq!(map.width(), 13);
        assert_eq!(map.height(), 11);
    }

    #[test]
    fn test_growth_larger_than_expansion_size_is_resolution_aligned() {
        let mut map = unit_square_map();
        assert!(map.resize(v(0.0, 0.0), v(1.55, 1.0)).unwrap());
        assert!((map.get_max().unwrap().x - 1.6).abs() < EPSILON);
        assert_eq!(map.width(), 17);
    }

    #[test]
    fn test_growth_towards_negative_moves_origin() {
        let mut map = unit_square_map();
        assert!(map.resize(v(-0.05, 0.0), v(1.0, 1.0)).unwrap());
        assert!((map.origin().x - (-0.2)).abs() < EPSILON);
        assert!((map.origin().y - 0.0).abs() < EPSILON);
        assert_eq!(map.width(), 13);
        assert_eq!(map.height(), 11);
    }

    #[test]
    fn test_resize_preserves_cells_at_world_coordinates() {
        let mut map = unit_square_map();
        let samples = [
            (WorldPoint::new(0.0, 0.0), 1),
            (WorldPoint::new(1.0, 1.0), 2),
            (WorldPoint::new(0.5, 0.3), 3),
            (WorldPoint::new(1.0, 0.0), 4),
        ];
        for (p, value) in samples {
            map.set_at_world(p, value).unwrap();
        }

        assert!(map.resize(v(-0.35, -0.15), v(1.45, 1.05)).unwrap());
        assert_eq!(map.width(), 20);
        assert_eq!(map.height(), 15);

        for (p, value) in samples {
            assert_eq!(map.value_at_world(p).unwrap(), value);
        }
        let written = map.cells().iter().filter(|&&c| c != UNKNOWN_CELL).count();
        assert_eq!(written, samples.len());
    }

    #[test]
    fn test_resize_is_idempotent_for_covered_box() {
        let mut map = GridMap::new("map", 0.05, 0.1).unwrap();
        assert!(map.resize(v(-0.03, -0.02), v(0.07, 0.04)).unwrap());
        let snapshot = map.clone();

        assert!(!map.resize(v(-0.03, -0.02), v(0.07, 0.04)).unwrap());
        assert!(!map.resize(v(0.0, 0.0), v(0.05, 0.05)).unwrap());
        assert_eq!(map, snapshot);
    }

    #[test]
    fn test_z_is_carried_not_indexed() {
        let mut map = GridMap::new("map", 0.1, 0.0).unwrap();
        map.resize(Vector3::new(0.0, 0.0, -1.0), Vector3::new(1.0, 1.0, 2.0)).unwrap();
        let b = map.bounds().unwrap();
        assert_eq!(b.min.z, -1.0);
        assert_eq!(b.max.z, 2.0);

        // z outside the tracked range alone does not trigger growth
        assert!(!map.resize(Vector3::new(0.0, 0.0, -5.0), Vector3::new(1.0, 1.0, 5.0)).unwrap());
        assert_eq!(map.origin().z, 0.0);
    }

    #[test]
    fn test_empty_cloud_is_a_no_op() {
        let mut map = GridMap::new("map", 0.05, 0.1).unwrap();
        assert!(!map.resize_to_cloud(&[]).unwrap());
        assert!(map.is_empty());
        assert!(map.bounds().is_none());
        assert_eq!(map.cells().len(), 0);
    }

    #[test]
    fn test_resize_to_cloud_covers_every_point() {
        let mut map = GridMap::new("map", 0.05, 0.5).unwrap();
        let cloud = [
            PointXyz::new(0.12, -0.4, 0.0),
            PointXyz::new(-1.3, 0.77, 0.2),
            PointXyz::new(0.9, 0.05, -0.1),
        ];
        assert!(map.resize_to_cloud(&cloud).unwrap());
        for p in &cloud {
            let w = WorldPoint::new(f64::from(p.x), f64::from(p.y));
            assert!(map.world_to_index(w).is_ok(), "{:?} not addressable", p);
        }

        let far = [PointXyz::new(3.0, 3.0, 0.0)];
        assert!(map.resize_to_cloud(&far).unwrap());
        assert!(map.world_to_index(WorldPoint::new(3.0, 3.0)).is_ok());
        for p in &cloud {
            let w = WorldPoint::new(f64::from(p.x), f64::from(p.y));
            assert!(map.world_to_index(w).is_ok());
        }
    }

    #[test]
    fn test_index_one_past_end_fails() {
        let map = unit_square_map();
        let count = map.cells().len();
        assert!(map.index_to_grid(count - 1).is_ok());
        assert!(matches!(
            map.index_to_grid(count),
            Err(GridMapError::OutOfBounds { .. })
        ));
        assert!(map.get(count).is_none());
    }

    #[test]
    fn test_inverted_and_non_finite_requests() {
        let mut map = GridMap::new("map", 0.1, 0.2).unwrap();
        assert!(!map.resize(v(1.0, 1.0), v(0.0, 0.0)).unwrap());
        assert!(map.is_empty());

        assert!(matches!(
            map.resize(v(f64::NAN, 0.0), v(1.0, 1.0)),
            Err(GridMapError::InvalidBounds(_))
        ));
        assert!(matches!(
            map.resize(v(0.0, 0.0), v(f64::INFINITY, 1.0)),
            Err(GridMapError::InvalidBounds(_))
        ));
    }

    #[test]
    fn test_oversized_request_reports_allocation_failure() {
        let mut map = unit_square_map();
        let before = map.clone();
        let result = map.resize(v(-1.0e12, -1.0e12), v(1.0e12, 1.0e12));
        assert!(matches!(result, Err(GridMapError::AllocationFailure { .. })));
        assert_eq!(map, before);
    }

    #[test]
    fn test_reset_clears_cells_and_bounds() {
        let mut map = unit_square_map();
        map.header_mut().seq = 7;
        map.reset();

        assert!(map.is_empty());
        assert_eq!(map.width(), 0);
        assert_eq!(map.height(), 0);
        assert!(map.bounds().is_none());
        assert_eq!(map.header().seq, 0);

        // next allocation is exact fit again, no expansion padding
        assert!(map.resize(v(2.0, 2.0), v(2.25, 2.05)).unwrap());
        assert_eq!(map.width(), 4);
        assert_eq!(map.height(), 2);
    }

    fn sample_msg() -> OccupancyGrid {
        let mut msg = OccupancyGrid::default();
        msg.header.frame_id = "odom".to_owned();
        msg.header.stamp = Time { sec: 12, nsec: 5 };
        msg.info.resolution = 0.5;
        msg.info.width = 3;
        msg.info.height = 2;
        msg.info.origin = Pose {
            position: Vector3::new(1.0, 2.0, 0.5),
            ..Default::default()
        };
        msg.data = vec![0, 1, 2, 3, 4, 5];
        msg
    }

    #[test]
    fn test_from_msg_seeds_both_bounds() {
        let map = GridMap::from_msg(sample_msg(), 0.7).unwrap();
        assert!((map.min_expansion_size() - 1.0).abs() < EPSILON);
        assert_eq!(map.frame_id(), "odom");

        let b = map.bounds().unwrap();
        assert_eq!(b.min, Vector3::new(1.0, 2.0, 0.5));
        assert!((b.max.x - 2.0).abs() < EPSILON);
        assert!((b.max.y - 2.5).abs() < EPSILON);

        assert_eq!(map.value_at_world(WorldPoint::new(1.5, 2.5)).unwrap(), 4);
        // the loaded extent is already covered
        let mut map = map;
        assert!(!map.resize(v(1.0, 2.0), v(2.0, 2.5)).unwrap());
    }

    #[test]
    fn test_loaded_map_grows_and_keeps_data() {
        let mut map = GridMap::from_msg(sample_msg(), 0.5).unwrap();
        assert!(map.resize(v(0.2, 2.0), v(2.0, 2.5)).unwrap());
        assert!((map.origin().x - 0.0).abs() < EPSILON);
        assert_eq!(map.origin().z, 0.5);
        assert_eq!(map.width(), 5);
        assert_eq!(map.height(), 2);
        assert_eq!(map.value_at_world(WorldPoint::new(1.0, 2.0)).unwrap(), 0);
        assert_eq!(map.value_at_world(WorldPoint::new(2.0, 2.5)).unwrap(), 5);
        assert_eq!(map.value_at_world(WorldPoint::new(0.0, 2.0)).unwrap(), UNKNOWN_CELL);
    }

    #[test]
    fn test_invalid_msg_rejected() {
        let mut msg = sample_msg();
        msg.data.pop();
        assert!(matches!(
            GridMap::from_msg(msg, 0.5),
            Err(GridMapError::InvalidMessage(_))
        ));

        let mut msg = sample_msg();
        msg.info.resolution = 0.0;
        assert!(matches!(
            GridMap::from_msg(msg, 0.5),
            Err(GridMapError::InvalidResolution(_))
        ));
    }

    #[test]
    fn test_load_msg_replaces_content() {
        let mut map = unit_square_map();
        map.load_msg(&sample_msg()).unwrap();
        assert_eq!(map.width(), 3);
        assert_eq!(map.resolution(), 0.5);
        // 0.2 re-rounded against the loaded resolution
        assert!((map.min_expansion_size() - 0.5).abs() < EPSILON);
        assert_eq!(map.to_msg(), sample_msg());

        let mut bad = sample_msg();
        bad.data.clear();
        assert!(map.load_msg(&bad).is_err());
        assert_eq!(map.width(), 3);
    }

    #[test]
    fn test_export_round_trip() {
        let map = GridMap::from_msg(sample_msg(), 0.5).unwrap();
        let mut out = OccupancyGrid::default();
        map.export_to(&mut out);
        assert_eq!(&out, map.as_msg());
        assert_eq!(map.into_msg(), out);
    }

    #[test]
    fn test_index_accessors() {
        let mut map = unit_square_map();
        map[5] = 42;
        *map.at_mut(6) = -3;
        map.cells_mut()[7] = 9;
        assert_eq!(map.at(5), 42);
        assert_eq!(map[6], -3);
        assert_eq!(map.get(7), Some(9));
    }

    #[test]
    #[should_panic]
    fn test_at_out_of_range_panics() {
        let map = GridMap::new("map", 0.1, 0.0).unwrap();
        let _ = map.at(0);
    }

    #[test]
    fn test_set_at_world_outside_map() {
        let mut map = unit_square_map();
        assert!(matches!(
            map.set_at_world(WorldPoint::new(2.0, 0.0), 1),
            Err(GridMapError::OutOfBounds { .. })
        ));
    }

    #[test]
    fn test_display() {
        let mut map = GridMap::new("map", 0.1, 0.0).unwrap();
        map.resize(v(0.0, 0.0), v(0.2, 0.2)).unwrap();
        map[4] = 100;

        let display_str = format!("{}", map);
        assert!(display_str.contains("GridMap (3x3"));
        assert!(display_str.contains(" 100"));
        assert!(display_str.contains("-128"));
    }

    fn covers_approx(outer: &Bounds, inner: &Bounds) -> bool {
        inner.min.x >= outer.min.x - EPSILON
            && inner.min.y >= outer.min.y - EPSILON
            && inner.max.x <= outer.max.x + EPSILON
            && inner.max.y <= outer.max.y + EPSILON
    }

    proptest! {
        #[test]
        fn prop_resize_preserves_data(
            x0 in -3.0f64..3.0,
            y0 in -3.0f64..3.0,
            w0 in 0.0f64..2.0,
            h0 in 0.0f64..2.0,
            x1 in -6.0f64..6.0,
            y1 in -6.0f64..6.0,
            w1 in 0.0f64..4.0,
            h1 in 0.0f64..4.0,
            expansion in 0.0f64..1.0,
        ) {
            let mut map = GridMap::new("map", 0.1, expansion).unwrap();
            map.resize(v(x0, y0), v(x0 + w0, y0 + h0)).unwrap();

            let mut written = Vec::new();
            for idx in 0..map.cells().len() {
                let value = (idx % 100) as i8;
                map[idx] = value;
                written.push((map.index_to_world(idx).unwrap(), value));
            }

            map.resize(v(x1, y1), v(x1 + w1, y1 + h1)).unwrap();
            prop_assert_eq!(map.cells().len(), map.width() as usize * map.height() as usize);
            for (p, value) in written {
                prop_assert_eq!(map.value_at_world(p).unwrap(), value);
            }
        }

        #[test]
        fn prop_growth_is_monotonic(
            requests in prop::collection::vec((-5.0f64..5.0, -5.0f64..5.0, 0.0f64..1.0, 0.0f64..1.0), 1..8),
        ) {
            let mut map = GridMap::new("map", 0.05, 0.3).unwrap();
            let mut previous: Option<Bounds> = None;
            for (x, y, w, h) in requests {
                map.resize(v(x, y), v(x + w, y + h)).unwrap();
                let b = map.bounds().unwrap();
                prop_assert!(covers_approx(&b, &Bounds::new(v(x, y), v(x + w, y + h))));
                if let Some(p) = previous {
                    prop_assert!(b.covers_xy(&p));
                }
                prop_assert!((b.min.x - map.origin().x).abs() < EPSILON);
                prop_assert!((b.min.y - map.origin().y).abs() < EPSILON);
                previous = Some(b);
            }
        }
    }
}
