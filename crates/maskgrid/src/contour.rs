//! Contour tracing with nesting hierarchy.
//!
//! Border following over the foreground of a grid (any nonzero label is
//! foreground): a raster scan starts an outer border at a foreground cell
//! with background to its left and a hole border at one with background to
//! its right, then follows each border through the 8-neighborhood, marking
//! visited cells with signed border ids. The id of the last border met on
//! the scan row decides each new border's parent, which yields the full
//! containment tree alongside the contours themselves.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};
use crate::geom::Point;
use crate::grid::Grid;

/// Whether a contour bounds foreground from the outside or encloses a hole.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ContourKind {
    Outer,
    Hole,
}

/// One traced border.
///
/// `points` are `(x, y)` cell coordinates in trace order. A single
/// isolated cell yields a one-point contour; a one-cell-thick line is
/// traversed out and back, so its cells can repeat.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contour {
    pub points: Vec<Point>,
    pub kind: ContourKind,
}

/// Containment links for one contour, all indices into the contour list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HierarchyNode {
    pub parent: Option<usize>,
    pub first_child: Option<usize>,
    pub next_sibling: Option<usize>,
    pub prev_sibling: Option<usize>,
}

/// The containment tree over a contour list.
///
/// Outermost contours have no parent and are chained as siblings in
/// discovery order, as are the children of each contour.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hierarchy {
    nodes: Vec<HierarchyNode>,
}

impl Hierarchy {
    pub fn nodes(&self) -> &[HierarchyNode] {
        &self.nodes
    }

    pub fn get(&self, index: usize) -> Option<&HierarchyNode> {
        self.nodes.get(index)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Nesting depth of a contour: outermost contours are at depth 0.
    pub fn depth(&self, index: usize) -> usize {
        let mut depth = 0;
        let mut cur = self.nodes.get(index).and_then(|n| n.parent);
        while let Some(p) = cur {
            depth += 1;
            cur = self.nodes[p].parent;
        }
        depth
    }
}

// 8-neighborhood in clockwise order starting east; DX is the column step,
// DY the row step.
const DX: [i64; 8] = [1, 1, 0, -1, -1, -1, 0, 1];
const DY: [i64; 8] = [0, 1, 1, 1, 0, -1, -1, -1];

#[inline]
fn neighbor(i: i64, j: i64, dir: usize) -> (i64, i64) {
    (i + DY[dir], j + DX[dir])
}

#[inline]
fn direction(dx: i64, dy: i64) -> usize {
    match (dx, dy) {
        (1, 0) => 0,
        (1, 1) => 1,
        (0, 1) => 2,
        (-1, 1) => 3,
        (-1, 0) => 4,
        (-1, -1) => 5,
        (0, -1) => 6,
        (1, -1) => 7,
        _ => unreachable!("border points are 8-adjacent"),
    }
}

#[inline]
fn at(labels: &[i32], height: i64, width: i64, i: i64, j: i64) -> i32 {
    if i < 0 || i >= height || j < 0 || j >= width {
        0
    } else {
        labels[(i * width + j) as usize]
    }
}

struct BorderInfo {
    kind: ContourKind,
    // parent border id; 0 means none
    parent: usize,
}

/// Trace every contour of the grid's foreground with its hierarchy.
///
/// Foreground is any nonzero label. An all-background grid yields no
/// contours; a grid with no cells fails with `InvalidInput`.
pub fn find_contours(grid: &Grid) -> Result<(Vec<Contour>, Hierarchy)> {
    if grid.is_empty() {
        return Err(Error::InvalidInput {
            reason: "grid has no cells",
        });
    }

    let height = grid.height() as i64;
    let width = grid.width() as i64;
    let mut labels: Vec<i32> = grid.data().iter().map(|&c| (c != 0) as i32).collect();

    // Border 1 is the implicit background frame around the grid.
    let mut borders = vec![BorderInfo {
        kind: ContourKind::Hole,
        parent: 0,
    }];
    let mut contours = Vec::new();

    for i in 0..height {
        // id of the last border met on this row
        let mut lnbd: usize = 1;
        for j in 0..width {
            let f = at(&labels, height, width, i, j);
            if f == 0 {
                continue;
            }

            let start = if f == 1 && at(&labels, height, width, i, j - 1) == 0 {
                // unvisited cell with background to the left: outer border
                Some((ContourKind::Outer, 4))
            } else if f >= 1 && at(&labels, height, width, i, j + 1) == 0 {
                // background to the right: hole border begins here
                if f > 1 {
                    lnbd = f as usize;
                }
                Some((ContourKind::Hole, 0))
            } else {
                None
            };

            if let Some((kind, start_dir)) = start {
                let parent = {
                    let last = &borders[lnbd - 1];
                    if last.kind == kind {
                        last.parent
                    } else {
                        lnbd
                    }
                };
                borders.push(BorderInfo { kind, parent });
                let nbd = borders.len() as i32;
                let points = trace_border(&mut labels, height, width, i, j, start_dir, nbd);
                contours.push(Contour { points, kind });
            }

            let f = at(&labels, height, width, i, j);
            if f != 1 {
                lnbd = f.unsigned_abs() as usize;
            }
        }
    }

    // border ids 0 (none) and 1 (frame) have no contour
    let parents: Vec<Option<usize>> = borders[1..]
        .iter()
        .map(|b| if b.parent >= 2 { Some(b.parent - 2) } else { None })
        .collect();
    let hierarchy = build_hierarchy(&parents);
    debug!(
        contours = contours.len(),
        height = grid.height(),
        width = grid.width(),
        "traced contours"
    );
    Ok((contours, hierarchy))
}

/// Follow one border starting at `(i, j)`, marking cells with `nbd`.
///
/// The first probe sweeps clockwise from `start_dir` to find the previous
/// border point; each following step sweeps counterclockwise around the
/// current point from just past the point it came from. A cell whose east
/// neighbor is examined as background gets the negative mark, which stops
/// the scan from starting a second hole border there.
fn trace_border(
    labels: &mut [i32],
    height: i64,
    width: i64,
    i: i64,
    j: i64,
    start_dir: usize,
    nbd: i32,
) -> Vec<Point> {
    let mut points = Vec::new();

    let mut first = None;
    for k in 0..8 {
        let d = (start_dir + k) % 8;
        let (ni, nj) = neighbor(i, j, d);
        if at(labels, height, width, ni, nj) != 0 {
            first = Some((ni, nj));
            break;
        }
    }
    let Some((i1, j1)) = first else {
        // isolated cell
        labels[(i * width + j) as usize] = -nbd;
        points.push(Point::new(j, i));
        return points;
    };

    let (mut i2, mut j2) = (i1, j1);
    let (mut i3, mut j3) = (i, j);

    loop {
        let back = direction(j2 - j3, i2 - i3);
        let mut next = (i2, j2);
        let mut east_seen_zero = false;
        for k in 1..=8 {
            let d = (back + 8 - k) % 8;
            let (ni, nj) = neighbor(i3, j3, d);
            if at(labels, height, width, ni, nj) != 0 {
                next = (ni, nj);
                break;
            }
            if d == 0 {
                east_seen_zero = true;
            }
        }
        let (i4, j4) = next;

        let idx = (i3 * width + j3) as usize;
        if east_seen_zero {
            labels[idx] = -nbd;
        } else if labels[idx] == 1 {
            labels[idx] = nbd;
        }
        points.push(Point::new(j3, i3));

        if i4 == i && j4 == j && i3 == i1 && j3 == j1 {
            return points;
        }
        (i2, j2) = (i3, j3);
        (i3, j3) = (i4, j4);
    }
}

fn build_hierarchy(parents: &[Option<usize>]) -> Hierarchy {
    let mut nodes: Vec<HierarchyNode> = parents
        .iter()
        .map(|&parent| HierarchyNode {
            parent,
            ..HierarchyNode::default()
        })
        .collect();

    let mut last_child: Vec<Option<usize>> = vec![None; nodes.len()];
    let mut last_root: Option<usize> = None;
    for i in 0..nodes.len() {
        let slot = match nodes[i].parent {
            Some(p) => {
                if nodes[p].first_child.is_none() {
                    nodes[p].first_child = Some(i);
                }
                &mut last_child[p]
            }
            None => &mut last_root,
        };
        if let Some(prev) = *slot {
            nodes[prev].next_sibling = Some(i);
            nodes[i].prev_sibling = Some(prev);
        }
        *slot = Some(i);
    }

    Hierarchy { nodes }
}
