pub mod contour;
pub mod error;
pub mod geom;
pub mod grid;
pub mod raster;
pub mod rle;

pub use contour::{Contour, ContourKind, Hierarchy, HierarchyNode};
pub use error::{Error, Result};
pub use geom::Point;
pub use grid::Grid;
pub use rle::{Run, RleStream};
