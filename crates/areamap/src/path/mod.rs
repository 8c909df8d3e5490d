//! Coarse path data and path finding.
//!
//! The dense walkability bitmap is reduced to one byte per 5x5 block. Each
//! byte holds the directions in which a walker may leave that block:
//!
//! | bit | direction |
//! |-----|-----------|
//! | 1   | left      |
//! | 2   | right     |
//! | 4   | up        |
//! | 8   | down      |
//!
//! - [`PathGrid`] derives the coarse grid and its (value, count) encoding
//! - [`find_path`] runs a breadth-first search over a coarse grid

mod finder;
mod grid;

pub use finder::find_path;
pub use grid::{
    DOWN, LEFT, PathGrid, RIGHT, UP, coarse_dimensions, decode_path_data, encode_path_data,
};
