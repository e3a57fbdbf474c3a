//! Dense 2D label grid shared by the codec, the rasterizer, and the tracer.

use crate::error::{Error, Result};

/// A dense row-major grid of `u32` labels.
///
/// Cell `(x, y)` lives at index `y * width + x`; scan order is
/// left-to-right within a row, rows top-to-bottom. Label `0` is background.
/// Either dimension may be zero, in which case the grid holds no cells.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    height: usize,
    width: usize,
    data: Vec<u32>,
}

impl Grid {
    /// Creates a grid of the given shape with every cell at background.
    ///
    /// Panics if `height * width` overflows `usize`.
    pub fn new(height: usize, width: usize) -> Self {
        Self::filled(height, width, 0)
    }

    /// Creates a grid of the given shape with every cell set to `value`.
    ///
    /// Panics if `height * width` overflows `usize`.
    pub fn filled(height: usize, width: usize, value: u32) -> Self {
        let len = height.checked_mul(width).expect("grid size overflow");
        Grid {
            height,
            width,
            data: vec![value; len],
        }
    }

    /// Wraps an existing flat buffer as a grid.
    ///
    /// `data` must hold exactly `height * width` cells in scan order.
    pub fn from_vec(height: usize, width: usize, data: Vec<u32>) -> Result<Self> {
        let expected = height.checked_mul(width).ok_or(Error::ShapeMismatch {
            expected: u64::MAX,
            actual: data.len() as u64,
        })?;

        if data.len() != expected {
            return Err(Error::ShapeMismatch {
                expected: expected as u64,
                actual: data.len() as u64,
            });
        }

        Ok(Grid {
            height,
            width,
            data,
        })
    }

    /// Builds a grid from one `Vec` per row.
    ///
    /// All rows must be the same length; the grid's width is the length of
    /// the first row (zero rows give a `0 x 0` grid).
    pub fn from_rows(rows: &[Vec<u32>]) -> Result<Self> {
        let height = rows.len();
        let width = rows.first().map_or(0, Vec::len);

        let mut data = Vec::with_capacity(height * width);
        for row in rows {
            if row.len() != width {
                return Err(Error::ShapeMismatch {
                    expected: width as u64,
                    actual: row.len() as u64,
                });
            }
            data.extend_from_slice(row);
        }

        Ok(Grid {
            height,
            width,
            data,
        })
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn width(&self) -> usize {
        self.width
    }

    /// Total cell count, `height * width`.
    pub fn area(&self) -> u64 {
        (self.height as u64) * (self.width as u64)
    }

    /// True when the grid has no cells (either dimension is zero).
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn data(&self) -> &[u32] {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut [u32] {
        &mut self.data
    }

    pub fn row(&self, y: usize) -> &[u32] {
        assert!(y < self.height, "row index out of bounds");
        let start = y * self.width;
        &self.data[start..start + self.width]
    }

    pub fn row_mut(&mut self, y: usize) -> &mut [u32] {
        assert!(y < self.height, "row index out of bounds");
        let start = y * self.width;
        &mut self.data[start..start + self.width]
    }

    pub fn get(&self, x: usize, y: usize) -> Option<u32> {
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(self.data[y * self.width + x])
    }

    pub fn get_mut(&mut self, x: usize, y: usize) -> Option<&mut u32> {
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(&mut self.data[y * self.width + x])
    }

    /// Sets every cell to `value`.
    pub fn fill(&mut self, value: u32) {
        self.data.fill(value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_vec_shape_checked() {
        let g = Grid::from_vec(2, 3, vec![1, 2, 3, 4, 5, 6]).unwrap();
        assert_eq!(g.height(), 2);
        assert_eq!(g.width(), 3);
        assert_eq!(g.row(1), &[4, 5, 6]);

        let err = Grid::from_vec(2, 3, vec![1, 2, 3]).unwrap_err();
        assert_eq!(
            err,
            Error::ShapeMismatch {
                expected: 6,
                actual: 3
            }
        );
    }

    #[test]
    fn test_from_rows() {
        let g = Grid::from_rows(&[vec![0, 1], vec![2, 3], vec![4, 5]]).unwrap();
        assert_eq!(g.height(), 3);
        assert_eq!(g.width(), 2);
        assert_eq!(g.data(), &[0, 1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_from_rows_ragged() {
        let err = Grid::from_rows(&[vec![0, 1, 2], vec![3, 4]]).unwrap_err();
        assert_eq!(
            err,
            Error::ShapeMismatch {
                expected: 3,
                actual: 2
            }
        );
    }

    #[test]
    fn test_get_and_fill() {
        let mut g = Grid::new(2, 2);
        assert_eq!(g.get(1, 1), Some(0));
        assert_eq!(g.get(2, 0), None);
        assert_eq!(g.get(0, 2), None);

        g.fill(7);
        assert_eq!(g.data(), &[7, 7, 7, 7]);

        *g.get_mut(0, 1).unwrap() = 9;
        assert_eq!(g.row(1), &[9, 7]);
    }

    #[test]
    fn test_zero_area_shapes() {
        let g = Grid::new(0, 5);
        assert!(g.is_empty());
        assert_eq!(g.area(), 0);

        let g = Grid::new(5, 0);
        assert!(g.is_empty());

        let g = Grid::from_rows(&[]).unwrap();
        assert_eq!(g.height(), 0);
        assert_eq!(g.width(), 0);
    }
}
