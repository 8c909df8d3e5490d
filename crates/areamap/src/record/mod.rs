//! Area collision records.
//!
//! An [`AreaRecord`] is the unit handed across the process boundary: a
//! run-length encoded walkability bitmap for one area, cropped to the
//! populated rectangle, plus the exit/NPC/object marker tables and an
//! optional coarse path grid.
//!
//! ## Bitmap encoding
//!
//! `map_data` holds one entry per run, alternating blocked/walkable and
//! starting with blocked on every row; `-1` terminates a row. The rows
//!
//! ```text
//! X.....X
//! XX...XX
//! X.....X
//! ```
//!
//! encode as `[1, 5, 1, -1, 2, 3, 2, -1, 1, 5, 1, -1]`. A row that starts
//! walkable begins with a zero-length blocked run.

mod cells;
mod codec;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::geometry::{CELLS_PER_UNIT, Point, Rect, Size};
use crate::path::{PathGrid, coarse_dimensions, find_path};

pub use cells::encode_map_data;

/// Connection points towards one destination area
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Exit {
    pub offsets: Vec<Point>,
    #[serde(default)]
    pub is_portal: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AreaRecord {
    pub id: u32,
    /// Global origin of the area in fine cells
    pub offset: Point,
    /// Full theoretical extent of the area
    pub size: Size,
    /// Populated sub-rectangle, relative to `offset`
    pub crop: Rect,
    pub map_data: Vec<i16>,
    /// Keyed by destination area id
    pub exits: BTreeMap<u32, Exit>,
    /// Keyed by content id
    pub npcs: BTreeMap<u32, Vec<Point>>,
    /// Keyed by content id
    pub objects: BTreeMap<u32, Vec<Point>>,
    /// Decoded coarse grid, one byte per 5x5 block of `crop`
    pub path: Vec<u8>,
    pub path_data: Vec<u8>,
    pub built: bool,
    pub error_string: Option<String>,
}

impl AreaRecord {
    pub fn new(id: u32) -> Self {
        Self {
            id,
            ..Default::default()
        }
    }

    /// A record that could not be built or decoded
    pub fn failed(id: u32, message: impl Into<String>) -> Self {
        Self {
            id,
            error_string: Some(message.into()),
            ..Default::default()
        }
    }

    /// Crop width and height in fine cells (zero when the crop is unset)
    pub fn crop_dimensions(&self) -> (usize, usize) {
        (
            usize::try_from(self.crop.width()).unwrap_or(0),
            usize::try_from(self.crop.height()).unwrap_or(0),
        )
    }

    /// Coarse grid width and height for the current crop
    pub fn path_dimensions(&self) -> (usize, usize) {
        let (w, h) = self.crop_dimensions();
        coarse_dimensions(w, h)
    }

    pub fn has_path_data(&self) -> bool {
        !self.path.is_empty()
    }

    /// Derive `path` and `path_data` from `map_data`
    pub fn generate_path_data(&mut self) {
        let (w, h) = self.crop_dimensions();
        let walkable = self.extract_cell_data(false, true);
        let grid = PathGrid::build(&walkable, w, h);
        self.path_data = grid.encode();
        self.path = grid.into_cells();
    }

    /// Path between two global positions.
    ///
    /// Positions are snapped to their coarse cell; the returned points are
    /// the global centres of the visited cells, ordered start to target.
    /// Empty when either point lies outside the crop or no path grid is
    /// loaded.
    pub fn find_path(&self, start: Point, target: Point, merge: bool) -> Vec<Point> {
        let (Some(from), Some(to)) = (self.coarse_cell(start), self.coarse_cell(target)) else {
            return Vec::new();
        };
        let (w, h) = self.path_dimensions();
        let origin = self.crop_origin();
        let half = CELLS_PER_UNIT / 2;

        find_path(from, to, &self.path, w, h, merge)
            .into_iter()
            .map(|(x, y)| {
                origin.offset_by(
                    x as i32 * CELLS_PER_UNIT + half,
                    y as i32 * CELLS_PER_UNIT + half,
                )
            })
            .collect()
    }

    /// Global position of the crop's top-left cell
    pub fn crop_origin(&self) -> Point {
        self.offset.offset_by(self.crop.x0, self.crop.y0)
    }

    fn coarse_cell(&self, p: Point) -> Option<(usize, usize)> {
        let origin = self.crop_origin();
        let (x, y) = (p.x - origin.x, p.y - origin.y);
        if x < 0 || y < 0 || x >= self.crop.width() || y >= self.crop.height() {
            return None;
        }
        Some(((x / CELLS_PER_UNIT) as usize, (y / CELLS_PER_UNIT) as usize))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::path::{LEFT, RIGHT};

    /// 10x5 crop at global (100, 200), open corridor through rows 1..=3
    fn corridor() -> AreaRecord {
        let mut walkable = vec![false; 50];
        for y in 1..4 {
            for x in 0..10 {
                walkable[y * 10 + x] = true;
            }
        }
        AreaRecord {
            id: 3,
            offset: Point::new(100, 200),
            size: Size::new(10, 5),
            crop: Rect::new(0, 0, 10, 5),
            map_data: encode_map_data(&walkable, 10, 5),
            built: true,
            ..Default::default()
        }
    }

    #[test]
    fn test_generate_path_data() {
        let mut record = corridor();
        assert!(!record.has_path_data());
        record.generate_path_data();
        assert_eq!(record.path, vec![RIGHT, LEFT]);
        assert_eq!(record.path_data, vec![RIGHT, 1, LEFT, 1]);
        assert_eq!(record.path_dimensions(), (2, 1));
    }

    #[test]
    fn test_find_path_global_coordinates() {
        let mut record = corridor();
        record.generate_path_data();

        let path = record.find_path(Point::new(101, 202), Point::new(109, 203), true);
        assert_eq!(path, vec![Point::new(102, 202), Point::new(107, 202)]);
    }

    #[test]
    fn test_find_path_outside_crop_is_empty() {
        let mut record = corridor();
        record.generate_path_data();
        assert!(record.find_path(Point::new(99, 202), Point::new(105, 202), false).is_empty());
        assert!(record.find_path(Point::new(101, 202), Point::new(110, 202), false).is_empty());
    }

    #[test]
    fn test_find_path_without_path_grid_is_empty() {
        let record = corridor();
        assert!(record.find_path(Point::new(101, 202), Point::new(108, 202), false).is_empty());
    }

    #[test]
    fn test_failed_record_carries_message() {
        let record = AreaRecord::failed(9, "Level not found: 9");
        assert!(!record.built);
        assert_eq!(record.id, 9);
        assert_eq!(record.error_string.as_deref(), Some("Level not found: 9"));
    }
}
