//! Integer geometry shared by the rasterizer and the contour tracer.

use serde::{Deserialize, Serialize};

/// A point on the pixel lattice.
///
/// `x` is the column index, `y` the row index. Coordinates are signed so
/// polygon vertices may lie outside the grid; drawing clips them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Point {
    pub x: i64,
    pub y: i64,
}

impl Point {
    pub const fn new(x: i64, y: i64) -> Self {
        Point { x, y }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_point_new() {
        let p = Point::new(-3, 7);
        assert_eq!(p.x, -3);
        assert_eq!(p.y, 7);
    }
}
