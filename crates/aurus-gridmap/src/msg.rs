//! In-memory occupancy grid message.
//!
//! [`OccupancyGrid`] is the wholesale exchange format of a [`crate::GridMap`]:
//! a header, the grid geometry ([`MapMetaData`]) and the flat, row-major cell
//! data. How the message is transported is up to the caller.

use crate::types::Pose;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Value of a cell nothing has been written to yet.
pub const UNKNOWN_CELL: i8 = i8::MIN;

/// A timestamp split into seconds and nanoseconds.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Time {
    /// Seconds.
    pub sec: u32,
    /// Nanoseconds within the second.
    pub nsec: u32,
}

/// Message header.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Header {
    /// Sequence number.
    pub seq: u32,
    /// Time stamp of the data.
    pub stamp: Time,
    /// Coordinate frame the grid is expressed in.
    pub frame_id: String,
}

/// Geometry of a grid: resolution, size in cells and origin pose.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct MapMetaData {
    /// The time at which the map was loaded.
    pub map_load_time: Time,
    /// Edge length of a cell (m/cell).
    pub resolution: f64,
    /// Map width (cells).
    pub width: u32,
    /// Map height (cells).
    pub height: u32,
    /// World pose of the corner of cell (0, 0).
    pub origin: Pose,
}

/// A 2D grid of signed-byte cells.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq, Default)]
pub struct OccupancyGrid {
    /// Message header.
    pub header: Header,
    /// Geometry of the grid.
    pub info: MapMetaData,
    /// Cell values in row-major order, starting with (0, 0).
    pub data: Vec<i8>,
}

impl OccupancyGrid {
    /// Returns `true` if `data` holds exactly `width * height` cells.
    pub fn is_consistent(&self) -> bool {
        self.info.cell_count() == Some(self.data.len())
    }
}
