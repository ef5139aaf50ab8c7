//! This module defines the error types used by the `aurus-gridmap` crate.

use thiserror::Error;

/// Convenience alias for results returned by grid map operations.
pub type Result<T> = core::result::Result<T, GridMapError>;

/// Error type for grid map operations.
///
/// Coordinate conversions report [`GridMapError::OutOfBounds`] as a recoverable
/// failure; the caller decides whether to skip the value, grow the map first, or
/// abort. [`GridMapError::AllocationFailure`] is not handled anywhere inside the
/// crate and is meant to be propagated.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GridMapError {
    /// A world coordinate, grid coordinate or linear index does not map to a
    /// cell of the given geometry. `x`/`y` are the (rounded) grid coordinates
    /// that failed the range check.
    #[error("Map access out of bounds: cell ({x}, {y}) outside {width}x{height} grid")]
    OutOfBounds {
        /// Grid x coordinate that was requested.
        x: i64,
        /// Grid y coordinate that was requested.
        y: i64,
        /// Width of the geometry the request was checked against.
        width: u32,
        /// Height of the geometry the request was checked against.
        height: u32,
    },
    /// The cell buffer for a resize could not be allocated, either because the
    /// requested size overflows or because the allocator refused it.
    #[error("Failed to allocate {width}x{height} cell buffer")]
    AllocationFailure {
        /// Requested width in cells.
        width: u64,
        /// Requested height in cells.
        height: u64,
    },
    /// Error for invalid map resolution.
    #[error("Invalid map resolution: {0}")]
    InvalidResolution(&'static str),
    /// Error for an invalid minimum expansion size.
    #[error("Invalid expansion size: {0}")]
    InvalidExpansionSize(&'static str),
    /// A grid message whose geometry and data disagree.
    #[error("Invalid grid message: {0}")]
    InvalidMessage(&'static str),
    /// A resize request whose corners are not usable world coordinates.
    #[error("Invalid bounds: {0}")]
    InvalidBounds(&'static str),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_out_of_bounds_display_includes_context() {
        let err = GridMapError::OutOfBounds {
            x: -1,
            y: 4,
            width: 3,
            height: 3,
        };
        assert_eq!(
            err.to_string(),
            "Map access out of bounds: cell (-1, 4) outside 3x3 grid"
        );
    }

    #[test]
    fn test_static_message_variants() {
        let err = GridMapError::InvalidResolution("must be positive");
        assert_eq!(err.to_string(), "Invalid map resolution: must be positive");
        assert!(matches!(
            GridMapError::InvalidMessage("data length mismatch"),
            GridMapError::InvalidMessage(_)
        ));
    }
}
