//! Conversion between map coordinates and canvas pixels.
//!
//! Map coordinates start at 1 in the top-left corner and span 41 units per
//! axis at a size factor of 100. Larger size factors zoom the map in, so the
//! same coordinate lands further from the origin. Pixel 0 always maps to
//! coordinate 1, whatever the size factor.

use serde::{Deserialize, Serialize};

/// Edge length of the square output surface in pixels.
pub const CANVAS_SIZE: u32 = 2048;

/// Map units covered by one canvas edge at size factor 100.
pub const MAP_SPAN: f64 = 41.0;

/// Coordinate of the top-left pixel.
pub const COORD_ORIGIN: f64 = 1.0;

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

impl From<(f64, f64)> for Point {
    fn from((x, y): (f64, f64)) -> Self {
        Self { x, y }
    }
}

impl From<[f64; 2]> for Point {
    fn from([x, y]: [f64; 2]) -> Self {
        Self { x, y }
    }
}

/// Values the transform can be applied to: a single axis or both at once.
///
/// Both axes share one formula, so a [`Point`] is converted component-wise.
pub trait Axes: Copy {
    fn map_axes(self, f: impl Fn(f64) -> f64) -> Self;
}

impl Axes for f64 {
    fn map_axes(self, f: impl Fn(f64) -> f64) -> Self {
        f(self)
    }
}

impl Axes for Point {
    fn map_axes(self, f: impl Fn(f64) -> f64) -> Self {
        Self {
            x: f(self.x),
            y: f(self.y),
        }
    }
}

/// Map units covered by the canvas at the given size factor.
fn span(size_factor: f64) -> f64 {
    MAP_SPAN / (size_factor / 100.0)
}

/// Converts canvas pixels to map coordinates. Out-of-range input is not
/// clamped.
pub fn pixel_to_coord<T: Axes>(value: T, size_factor: f64) -> T {
    let span = span(size_factor);
    value.map_axes(|pixel| span * (pixel / f64::from(CANVAS_SIZE)) + COORD_ORIGIN)
}

/// Converts map coordinates to canvas pixels. Inverse of [`pixel_to_coord`]
/// for the same size factor.
pub fn coord_to_pixel<T: Axes>(value: T, size_factor: f64) -> T {
    let span = span(size_factor);
    value.map_axes(|coord| (coord - COORD_ORIGIN) * f64::from(CANVAS_SIZE) / span)
}
