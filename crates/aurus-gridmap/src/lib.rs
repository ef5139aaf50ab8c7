#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![doc = "A dynamically growable 2D occupancy grid."]
#![doc = ""]
#![doc = "This crate provides [`GridMap`], a dense row-major grid of signed-byte cells"]
#![doc = "addressed by world coordinates. The grid grows on demand, either to an explicit"]
#![doc = "box or to the bounding box of a point cloud, and never loses or moves a cell"]
#![doc = "that was written before a resize."]

pub mod boundary;
pub mod error;
pub mod geometry;
pub mod grid_map;
pub mod math;
pub mod msg;
pub mod types;

pub use boundary::compute_bounding_box;
pub use error::{GridMapError, Result};
pub use grid_map::GridMap;
pub use math::{pceil, pfloor};
pub use msg::{Header, MapMetaData, OccupancyGrid, Time, UNKNOWN_CELL};
pub use types::{Bounds, GridPoint, PointXyz, Pose, Quaternion, Vector3, WorldPoint};
