//! Parsers for directive documents and the block bodies they contain

pub mod ast;
mod grid_map;
mod image_grid;
pub mod scanner;

pub use ast::*;
pub use grid_map::{parse_entries, parse_grid_map, parse_header};
pub use image_grid::parse_image_grid;
pub use scanner::{body_lines, scan};
