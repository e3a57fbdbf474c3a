//! Scan-conversion of polygon paths into label grids.
//!
//! Filling runs an even-odd parity scanline pass and then paints every edge
//! with a Bresenham walk, so boundary cells are always included and a
//! degenerate zero-area path still draws its line. Out-of-bounds vertices
//! are clipped, never rejected; work stays proportional to the grid area no
//! matter how far outside the grid a path reaches.

use tracing::debug;

use crate::error::{Error, Result};
use crate::geom::Point;
use crate::grid::Grid;

/// Fill one implicitly closed path into the grid.
///
/// Every cell inside or on the boundary of the path is set to `value`;
/// cells the path does not cover keep their previous labels. A path with a
/// single vertex paints one cell. Fails with `InvalidPath` on an empty
/// path (reported even when the grid has no cells).
pub fn draw_polygon(grid: &mut Grid, path: &[Point], value: u32) -> Result<()> {
    if path.is_empty() {
        return Err(Error::InvalidPath {
            reason: "path has no vertices",
        });
    }
    draw_ring_set(grid, &[path], value);
    debug!(
        vertices = path.len(),
        value,
        height = grid.height(),
        width = grid.width(),
        "drew polygon"
    );
    Ok(())
}

/// Fill several paths in sequence, later paths painting over earlier ones.
///
/// `values` holds either exactly one value shared by every path or one
/// value per path; any other length fails with `InvalidPath`. All paths
/// are validated before the first cell is touched, so a failed call leaves
/// the grid unchanged.
pub fn draw_polygons(grid: &mut Grid, paths: &[Vec<Point>], values: &[u32]) -> Result<()> {
    validate_paths(paths)?;
    if values.len() != 1 && values.len() != paths.len() {
        return Err(Error::InvalidPath {
            reason: "values must hold one shared value or one value per path",
        });
    }

    for (i, path) in paths.iter().enumerate() {
        let value = if values.len() == 1 { values[0] } else { values[i] };
        draw_ring_set(grid, &[path.as_slice()], value);
    }
    debug!(paths = paths.len(), "drew polygon set");
    Ok(())
}

/// Fill a multi-ring region under the even-odd rule with one value.
///
/// All rings contribute crossings to a single parity pass, so a ring nested
/// inside another cuts a hole instead of painting over it. Every ring's
/// boundary is painted.
pub fn draw_complex_polygon(grid: &mut Grid, rings: &[Vec<Point>], value: u32) -> Result<()> {
    validate_paths(rings)?;

    let rings: Vec<&[Point]> = rings.iter().map(Vec::as_slice).collect();
    draw_ring_set(grid, &rings, value);
    debug!(rings = rings.len(), value, "drew complex polygon");
    Ok(())
}

fn validate_paths(paths: &[Vec<Point>]) -> Result<()> {
    for path in paths {
        if path.is_empty() {
            return Err(Error::InvalidPath {
                reason: "path has no vertices",
            });
        }
    }
    Ok(())
}

fn draw_ring_set(grid: &mut Grid, rings: &[&[Point]], value: u32) {
    if grid.is_empty() {
        return;
    }
    scanline_fill(grid, rings, value);
    paint_edges(grid, rings, value);
}

/// Even-odd parity fill over all rings at once.
///
/// Each scanline collects the x of every edge crossing (half-open in y, so
/// a vertex on the line is counted once and horizontal edges never count),
/// sorts them, and fills between alternate pairs. Spans are clamped to the
/// row, so vertices may lie anywhere.
fn scanline_fill(grid: &mut Grid, rings: &[&[Point]], value: u32) {
    let width = grid.width() as i64;

    let Some((y_min, y_max)) = scan_range(grid, rings) else {
        return;
    };

    let mut xs: Vec<f64> = Vec::new();
    for y in y_min..=y_max {
        xs.clear();
        for ring in rings {
            for (a, b) in ring_edges(ring) {
                if (a.y <= y && b.y > y) || (b.y <= y && a.y > y) {
                    xs.push(edge_x_at(a, b, y));
                }
            }
        }
        xs.sort_unstable_by(f64::total_cmp);

        for pair in xs.chunks_exact(2) {
            let x0 = (pair[0].ceil() as i64).max(0);
            let x1 = (pair[1].floor() as i64).min(width - 1);
            if x0 > x1 {
                continue;
            }
            let row = grid.row_mut(y as usize);
            for cell in &mut row[x0 as usize..=x1 as usize] {
                *cell = value;
            }
        }
    }
}

/// Scanlines the rings can reach, clamped to the grid. `None` when every
/// vertex lies above or below the grid.
fn scan_range(grid: &Grid, rings: &[&[Point]]) -> Option<(i64, i64)> {
    let height = grid.height() as i64;
    let mut y_min = i64::MAX;
    let mut y_max = i64::MIN;
    for ring in rings {
        for p in *ring {
            y_min = y_min.min(p.y);
            y_max = y_max.max(p.y);
        }
    }
    let y_min = y_min.max(0);
    let y_max = y_max.min(height - 1);
    (y_min <= y_max).then_some((y_min, y_max))
}

/// Edges of the implicitly closed ring. A two-vertex ring yields its
/// segment once; the closing edge would retrace it and Bresenham is not
/// symmetric under reversal.
fn ring_edges(ring: &[Point]) -> impl Iterator<Item = (Point, Point)> + '_ {
    let n = if ring.len() == 2 { 1 } else { ring.len() };
    (0..n).map(move |i| (ring[i], ring[(i + 1) % ring.len()]))
}

fn edge_x_at(a: Point, b: Point, y: i64) -> f64 {
    let ax = a.x as f64;
    let ay = a.y as f64;
    let bx = b.x as f64;
    let by = b.y as f64;
    ax + (y as f64 - ay) * (bx - ax) / (by - ay)
}

/// Paint every ring edge with a Bresenham walk.
///
/// Edges with an out-of-bounds endpoint are clipped first so the walk
/// length is bounded by the grid perimeter.
fn paint_edges(grid: &mut Grid, rings: &[&[Point]], value: u32) {
    let width = grid.width() as i64;
    let height = grid.height() as i64;

    for ring in rings {
        for (a, b) in ring_edges(ring) {
            let clipped = if in_bounds(a, width, height) && in_bounds(b, width, height) {
                Some((a, b))
            } else {
                clip_segment(a, b, width, height)
            };
            if let Some((a, b)) = clipped {
                bresenham_walk(grid, a, b, value);
            }
        }
    }
}

#[inline]
fn in_bounds(p: Point, width: i64, height: i64) -> bool {
    p.x >= 0 && p.x < width && p.y >= 0 && p.y < height
}

/// Liang-Barsky clip of segment `a`..`b` against the pixel-center box
/// `[0, width-1] x [0, height-1]`, rounded back to the lattice.
fn clip_segment(a: Point, b: Point, width: i64, height: i64) -> Option<(Point, Point)> {
    let x1 = a.x as f64;
    let y1 = a.y as f64;
    let dx = b.x as f64 - x1;
    let dy = b.y as f64 - y1;
    let x_max = (width - 1) as f64;
    let y_max = (height - 1) as f64;

    let mut t0 = 0.0f64;
    let mut t1 = 1.0f64;
    for (p, q) in [(-dx, x1), (dx, x_max - x1), (-dy, y1), (dy, y_max - y1)] {
        if p == 0.0 {
            if q < 0.0 {
                return None;
            }
        } else {
            let r = q / p;
            if p < 0.0 {
                if r > t1 {
                    return None;
                }
                t0 = t0.max(r);
            } else {
                if r < t0 {
                    return None;
                }
                t1 = t1.min(r);
            }
        }
    }

    Some((
        Point::new((x1 + t0 * dx).round() as i64, (y1 + t0 * dy).round() as i64),
        Point::new((x1 + t1 * dx).round() as i64, (y1 + t1 * dy).round() as i64),
    ))
}

fn bresenham_walk(grid: &mut Grid, a: Point, b: Point, value: u32) {
    let dx = (b.x - a.x).abs();
    let dy = (b.y - a.y).abs();
    let sx = if a.x < b.x { 1 } else { -1 };
    let sy = if a.y < b.y { 1 } else { -1 };
    let mut err = dx - dy;
    let mut x = a.x;
    let mut y = a.y;
    loop {
        if x >= 0 && y >= 0 {
            if let Some(cell) = grid.get_mut(x as usize, y as usize) {
                *cell = value;
            }
        }
        if x == b.x && y == b.y {
            break;
        }
        let e2 = 2 * err;
        if e2 > -dy {
            err -= dy;
            x += sx;
        }
        if e2 < dx {
            err += dx;
            y += sy;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pts(coords: &[(i64, i64)]) -> Vec<Point> {
        coords.iter().map(|&(x, y)| Point::new(x, y)).collect()
    }

    #[test]
    fn test_square_fill() {
        let mut g = Grid::new(5, 5);
        draw_polygon(&mut g, &pts(&[(1, 1), (3, 1), (3, 3), (1, 3)]), 1).unwrap();
        let expected = [
            0, 0, 0, 0, 0, //
            0, 1, 1, 1, 0, //
            0, 1, 1, 1, 0, //
            0, 1, 1, 1, 0, //
            0, 0, 0, 0, 0, //
        ];
        assert_eq!(g.data(), &expected);
    }

    #[test]
    fn test_triangle_fill() {
        let mut g = Grid::new(5, 5);
        draw_polygon(&mut g, &pts(&[(0, 0), (4, 0), (0, 4)]), 1).unwrap();
        // Staircase: each row one cell shorter.
        assert_eq!(g.row(0), &[1, 1, 1, 1, 1]);
        assert_eq!(g.row(1), &[1, 1, 1, 1, 0]);
        assert_eq!(g.row(2), &[1, 1, 1, 0, 0]);
        assert_eq!(g.row(3), &[1, 1, 0, 0, 0]);
        assert_eq!(g.row(4), &[1, 0, 0, 0, 0]);
    }

    #[test]
    fn test_degenerate_path_draws_its_line() {
        // Collinear vertices enclose no area; only the diagonal is painted.
        let mut g = Grid::new(4, 4);
        draw_polygon(&mut g, &pts(&[(0, 0), (1, 1), (3, 3)]), 9).unwrap();
        let expected = [
            9, 0, 0, 0, //
            0, 9, 0, 0, //
            0, 0, 9, 0, //
            0, 0, 0, 9, //
        ];
        assert_eq!(g.data(), &expected);
    }

    #[test]
    fn test_single_vertex_paints_one_cell() {
        let mut g = Grid::new(3, 3);
        draw_polygon(&mut g, &pts(&[(2, 1)]), 5).unwrap();
        assert_eq!(g.get(2, 1), Some(5));
        assert_eq!(rle_foreground(&g), 1);
    }

    #[test]
    fn test_two_vertex_line() {
        let mut g = Grid::new(5, 5);
        draw_polygon(&mut g, &pts(&[(0, 0), (4, 2)]), 1).unwrap();
        // One cell per column, walked once.
        let expected = [
            1, 1, 0, 0, 0, //
            0, 0, 1, 1, 0, //
            0, 0, 0, 0, 1, //
            0, 0, 0, 0, 0, //
            0, 0, 0, 0, 0, //
        ];
        assert_eq!(g.data(), &expected);
    }

    #[test]
    fn test_out_of_bounds_clipped() {
        let mut g = Grid::new(4, 4);
        draw_polygon(
            &mut g,
            &pts(&[(-100, -100), (100, -100), (100, 100), (-100, 100)]),
            1,
        )
        .unwrap();
        assert!(g.data().iter().all(|&c| c == 1));

        // Fully exterior geometry is a no-op.
        let mut g = Grid::new(4, 4);
        draw_polygon(&mut g, &pts(&[(10, 10), (20, 10), (20, 20)]), 1).unwrap();
        assert_eq!(g, Grid::new(4, 4));
    }

    #[test]
    fn test_draw_is_idempotent() {
        let path = pts(&[(0, 0), (6, 1), (5, 6), (1, 4)]);
        let mut once = Grid::new(8, 8);
        draw_polygon(&mut once, &path, 3).unwrap();

        let mut twice = once.clone();
        draw_polygon(&mut twice, &path, 3).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn test_painters_order() {
        let mut g = Grid::new(6, 6);
        let paths = vec![
            pts(&[(0, 0), (3, 0), (3, 3), (0, 3)]),
            pts(&[(2, 2), (5, 2), (5, 5), (2, 5)]),
        ];
        draw_polygons(&mut g, &paths, &[1, 2]).unwrap();
        // Overlap belongs to the later path.
        assert_eq!(g.get(2, 2), Some(2));
        assert_eq!(g.get(3, 3), Some(2));
        assert_eq!(g.get(0, 0), Some(1));
        assert_eq!(g.get(5, 5), Some(2));
    }

    #[test]
    fn test_shared_value() {
        let mut g = Grid::new(6, 6);
        let paths = vec![
            pts(&[(0, 0), (1, 0), (1, 1), (0, 1)]),
            pts(&[(4, 4), (5, 4), (5, 5), (4, 5)]),
        ];
        draw_polygons(&mut g, &paths, &[7]).unwrap();
        assert_eq!(g.get(0, 0), Some(7));
        assert_eq!(g.get(5, 5), Some(7));
    }

    #[test]
    fn test_values_length_mismatch_leaves_grid_untouched() {
        let mut g = Grid::new(4, 4);
        let paths = vec![
            pts(&[(0, 0), (3, 0), (3, 3), (0, 3)]),
            pts(&[(1, 1), (2, 1), (2, 2)]),
        ];
        let err = draw_polygons(&mut g, &paths, &[1, 2, 3]).unwrap_err();
        assert!(matches!(err, Error::InvalidPath { .. }));
        assert_eq!(g, Grid::new(4, 4));
    }

    #[test]
    fn test_empty_path_rejected() {
        let mut g = Grid::new(4, 4);
        assert!(matches!(
            draw_polygon(&mut g, &[], 1),
            Err(Error::InvalidPath { .. })
        ));

        let paths = vec![pts(&[(0, 0), (1, 0), (1, 1)]), pts(&[])];
        let err = draw_polygons(&mut g, &paths, &[1]).unwrap_err();
        assert!(matches!(err, Error::InvalidPath { .. }));
        assert_eq!(g, Grid::new(4, 4));
    }

    #[test]
    fn test_complex_polygon_cuts_hole() {
        let mut g = Grid::new(7, 7);
        let rings = vec![
            pts(&[(1, 1), (5, 1), (5, 5), (1, 5)]),
            pts(&[(2, 2), (4, 2), (4, 4), (2, 4)]),
        ];
        draw_complex_polygon(&mut g, &rings, 1).unwrap();
        // The inner ring's interior stays background; its boundary is painted.
        assert_eq!(g.get(3, 3), Some(0));
        assert_eq!(g.get(2, 2), Some(1));
        assert_eq!(g.get(3, 2), Some(1));
        assert_eq!(g.get(1, 1), Some(1));
        assert_eq!(g.get(5, 5), Some(1));
        assert_eq!(g.get(0, 0), Some(0));
        assert_eq!(g.get(6, 6), Some(0));
    }

    #[test]
    fn test_complex_single_ring_matches_draw_polygon() {
        let ring = pts(&[(1, 0), (4, 1), (3, 4), (0, 2)]);
        let mut a = Grid::new(6, 6);
        draw_polygon(&mut a, &ring, 2).unwrap();
        let mut b = Grid::new(6, 6);
        draw_complex_polygon(&mut b, &[ring], 2).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_zero_area_grid_noop() {
        let mut g = Grid::new(0, 0);
        draw_polygon(&mut g, &pts(&[(0, 0), (1, 0), (1, 1)]), 1).unwrap();
        assert!(g.is_empty());

        // Validation still applies on degenerate grids.
        assert!(draw_polygon(&mut g, &[], 1).is_err());
    }

    fn rle_foreground(g: &Grid) -> usize {
        g.data().iter().filter(|&&c| c != 0).count()
    }
}
