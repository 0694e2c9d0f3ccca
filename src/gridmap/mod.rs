//! Grid maps and image grid resolution
//!
//! A `grid-map` block defines a named mapping from characters to image
//! files. An `image-grid` block names one or more grid maps and draws a grid
//! of characters, each of which is looked up in those maps.
//!
//! # Example
//!
//! ```text
//! .. grid-map:: terrain
//!
//!    g: grass.png
//!    w: water.png
//!
//! .. image-grid:: terrain
//!
//!    |ggw|
//!    |gww|
//! ```

mod registry;
mod resolver;

pub use registry::{GridMap, Registry};
pub use resolver::{resolve_grid, ImageCell, ImageTable};
