//! Example: polygon annotations to a label mask and back.
//!
//! Rasterizes three annotations onto one mask (two overlapping polygons drawn
//! in painter's order, plus a polygon with a hole), prints the mask, run-length
//! encodes it, decodes the stream back, and traces the contours of the decoded
//! mask with their nesting hierarchy.
//!
//! Run from the workspace root:
//!   cargo run -p maskgrid --example masks

use anyhow::{Context, Result};
use maskgrid::{contour, raster, rle, Grid, Point};

const HEIGHT: usize = 24;
const WIDTH: usize = 40;

fn pt(x: i64, y: i64) -> Point {
    Point::new(x, y)
}

/// Render the mask as one ASCII row per grid row, `.` for background.
fn print_mask(grid: &Grid) {
    for y in 0..grid.height() {
        let line: String = grid
            .row(y)
            .iter()
            .map(|&v| {
                if v == 0 {
                    '.'
                } else {
                    char::from_digit(v % 10, 10).unwrap_or('#')
                }
            })
            .collect();
        println!("  {line}");
    }
}

fn main() -> Result<()> {
    let mut mask = Grid::new(HEIGHT, WIDTH);

    // Two overlapping annotations: the square is drawn last and wins the overlap.
    let paths = vec![
        vec![pt(3, 3), pt(16, 3), pt(3, 14)],
        vec![pt(10, 8), pt(22, 8), pt(22, 18), pt(10, 18)],
    ];
    raster::draw_polygons(&mut mask, &paths, &[1, 2]).context("drawing annotations")?;

    // A third annotation with an interior hole, drawn in one parity pass.
    let rings = vec![
        vec![pt(26, 4), pt(37, 4), pt(37, 19), pt(26, 19)],
        vec![pt(29, 8), pt(34, 8), pt(34, 15), pt(29, 15)],
    ];
    raster::draw_complex_polygon(&mut mask, &rings, 3).context("drawing holed annotation")?;

    println!("mask {}x{}:", HEIGHT, WIDTH);
    print_mask(&mask);

    let stream = rle::encode(&mask);
    println!(
        "encoded: {} runs covering {} cells ({} labeled)",
        stream.len(),
        stream.total_len(),
        rle::area(&stream)
    );

    let wire = serde_json::to_string(&stream).context("serializing stream")?;
    let head: String = wire.chars().take(60).collect();
    println!("wire form: {head}... ({} bytes)", wire.len());

    let restored = rle::decode(&stream, HEIGHT, WIDTH).context("decoding stream")?;
    assert_eq!(restored, mask, "decode must restore the mask");
    println!("decoded stream matches the original mask");

    let (contours, hierarchy) = contour::find_contours(&restored).context("tracing contours")?;
    println!("contours: {}", contours.len());
    for (i, c) in contours.iter().enumerate() {
        let node = hierarchy.get(i).context("hierarchy node")?;
        println!(
            "  #{i}: {:?}, {} points, depth {}, parent {:?}, starts at ({}, {})",
            c.kind,
            c.points.len(),
            hierarchy.depth(i),
            node.parent,
            c.points[0].x,
            c.points[0].y
        );
    }

    Ok(())
}
