//! Rounding helpers for snapping world values onto the resolution lattice.
//!
//! All functions expect a strictly positive `step`.

/// Quotients closer than this to an integer are treated as that integer when
/// counting cells.
const SPAN_TOLERANCE: f64 = 1e-6;

/// Rounds `value` up to the nearest multiple of `step`.
///
/// Works for negative values as well: `pceil(-0.03, 0.05) == 0.0`.
#[inline]
pub fn pceil(value: f64, step: f64) -> f64 {
    (value / step).ceil() * step
}

/// Rounds `value` down to the nearest multiple of `step`.
///
/// Works for negative values as well: `pfloor(-0.03, 0.05) == -0.05`.
#[inline]
pub fn pfloor(value: f64, step: f64) -> f64 {
    (value / step).floor() * step
}

/// Number of `step`-sized intervals needed to cover `extent`.
///
/// Behaves like `ceil(extent / step)`, except that a quotient which is an
/// integer up to floating-point noise snaps to that integer instead of rounding
/// up to the next one. Extents passed here are differences of lattice-aligned
/// values, so `0.15000000000000002 / 0.05` must count as 3 and not 4.
#[inline]
pub fn cell_span(extent: f64, step: f64) -> f64 {
    let quotient = extent / step;
    let nearest = quotient.round();
    if (quotient - nearest).abs() < SPAN_TOLERANCE {
        nearest
    } else {
        quotient.ceil()
    }
}
