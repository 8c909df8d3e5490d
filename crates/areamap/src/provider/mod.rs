//! Level and room graph access.
//!
//! The builder never touches game memory. Everything it needs about levels,
//! rooms and their collision data comes through [`LevelProvider`], which
//! hands out stable [`RoomId`] handles instead of references into the
//! game's own structures.
//!
//! Positions and sizes in [`LevelInfo`] and [`RoomInfo`] are in room-grid
//! units; [`CollisionBitmap`] and marker offsets are in fine cells.

mod lease;
mod snapshot;

use serde::{Deserialize, Serialize};
use strum::{Display, IntoStaticStr};
use thiserror::Error;

use crate::error::Result;
use crate::geometry::{Point, Rect, Size};

pub use lease::CollisionLease;
pub use snapshot::{LevelEntry, RoomBuilder, RoomEntry, TileEntry, WorldSnapshot};

/// Error for invalid enum value conversion
#[derive(Debug, Error)]
#[error("Invalid {type_name} value: {value}")]
pub struct InvalidEnumValueError {
    type_name: &'static str,
    value: u32,
}

impl InvalidEnumValueError {
    pub fn new(type_name: &'static str, value: u32) -> Self {
        Self { type_name, value }
    }
}

/// Stable handle for a room in the provider's arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoomId(pub u32);

impl std::fmt::Display for RoomId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LevelInfo {
    pub id: u32,
    pub position: Point,
    pub size: Size,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoomInfo {
    pub level_id: u32,
    pub position: Point,
    pub size: Size,
}

impl RoomInfo {
    /// Room rectangle in room-grid units
    pub fn grid_rect(&self) -> Rect {
        Rect::from_origin_size(self.position, self.size)
    }

    /// Room rectangle in global fine cells
    pub fn cell_rect(&self) -> Rect {
        Rect::from_origin_size(self.position.to_cells(), self.size.to_cells())
    }
}

/// A room's collision grid, one `u16` per fine cell, row-major.
///
/// The low bit of a cell set means blocked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollisionBitmap {
    /// Global position of the top-left cell
    pub origin: Point,
    pub width: usize,
    pub height: usize,
    pub cells: Vec<u16>,
}

impl CollisionBitmap {
    pub fn rect(&self) -> Rect {
        Rect::new(
            self.origin.x,
            self.origin.y,
            self.origin.x + self.width as i32,
            self.origin.y + self.height as i32,
        )
    }

    /// Walkability at bitmap-local `(x, y)`; out of range counts as blocked
    pub fn is_walkable(&self, x: usize, y: usize) -> bool {
        x < self.width
            && y < self.height
            && self
                .cells
                .get(y * self.width + x)
                .is_some_and(|cell| cell & 1 == 0)
    }

    /// Walkability at a global position
    pub fn is_walkable_at(&self, p: Point) -> bool {
        let (x, y) = (p.x - self.origin.x, p.y - self.origin.y);
        x >= 0 && y >= 0 && self.is_walkable(x as usize, y as usize)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PresetMarker {
    /// Raw kind value, see [`MarkerKind`]
    pub kind: u32,
    pub content_id: u32,
    /// Offset from the room's top-left corner in fine cells
    pub local_x: i32,
    pub local_y: i32,
}

impl PresetMarker {
    pub fn marker_kind(&self) -> std::result::Result<MarkerKind, InvalidEnumValueError> {
        MarkerKind::try_from(self.kind)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, IntoStaticStr, Display)]
#[repr(u32)]
pub enum MarkerKind {
    #[strum(serialize = "npc")]
    Npc = 1,
    #[strum(serialize = "object")]
    Object = 2,
    #[strum(serialize = "tile")]
    Tile = 5,
}

impl TryFrom<u32> for MarkerKind {
    type Error = InvalidEnumValueError;

    fn try_from(value: u32) -> std::result::Result<Self, Self::Error> {
        match value {
            1 => Ok(Self::Npc),
            2 => Ok(Self::Object),
            5 => Ok(Self::Tile),
            _ => Err(InvalidEnumValueError::new("MarkerKind", value)),
        }
    }
}

impl MarkerKind {
    pub fn as_str(&self) -> &'static str {
        self.into()
    }
}

/// Where an exit tile leads
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileLink {
    pub room: RoomId,
    pub level_id: u32,
}

/// Access to the game's level graph.
///
/// Every call may cross a process boundary, so all of them are fallible
/// except [`release_collision`](Self::release_collision), which has to be
/// callable from a destructor.
pub trait LevelProvider {
    /// Level with the given area id, `None` if the area does not exist
    fn level(&self, area_id: u32) -> Result<Option<LevelInfo>>;

    /// Materialize the level's room list if the game has not done so yet
    fn ensure_rooms_loaded(&self, area_id: u32) -> Result<()>;

    /// Rooms belonging to the level; empty until the room list exists
    fn rooms(&self, area_id: u32) -> Result<Vec<RoomId>>;

    fn room(&self, room: RoomId) -> Result<RoomInfo>;

    /// Rooms adjacent to `room`, which may belong to other levels
    fn near_rooms(&self, room: RoomId) -> Result<Vec<RoomId>>;

    /// Load the room's collision data. Returns `false` when the game refused.
    fn force_load_collision(&self, room: RoomId) -> Result<bool>;

    /// Undo one [`force_load_collision`](Self::force_load_collision)
    fn release_collision(&self, room: RoomId);

    /// Collision data, `None` while the room is not loaded
    fn collision(&self, room: RoomId) -> Result<Option<CollisionBitmap>>;

    fn preset_markers(&self, room: RoomId) -> Result<Vec<PresetMarker>>;

    /// Destination of the exit tile `content_id` placed in `room`
    fn tile_record_for(&self, room: RoomId, content_id: u32) -> Result<Option<TileLink>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_marker_kind_try_from() {
        assert_eq!(MarkerKind::try_from(1).unwrap(), MarkerKind::Npc);
        assert_eq!(MarkerKind::try_from(2).unwrap(), MarkerKind::Object);
        assert_eq!(MarkerKind::try_from(5).unwrap(), MarkerKind::Tile);
        let err = MarkerKind::try_from(3).unwrap_err();
        assert_eq!(err.to_string(), "Invalid MarkerKind value: 3");
    }

    #[test]
    fn test_marker_kind_display() {
        assert_eq!(MarkerKind::Tile.to_string(), "tile");
        assert_eq!(MarkerKind::Npc.as_str(), "npc");
    }

    #[test]
    fn test_collision_bitmap_low_bit_is_blocked() {
        let bitmap = CollisionBitmap {
            origin: Point::new(5, 0),
            width: 2,
            height: 2,
            cells: vec![0, 1, 4, 5],
        };
        assert!(bitmap.is_walkable(0, 0));
        assert!(!bitmap.is_walkable(1, 0));
        assert!(bitmap.is_walkable(0, 1));
        assert!(!bitmap.is_walkable(1, 1));
        assert!(!bitmap.is_walkable(2, 0));
        assert!(bitmap.is_walkable_at(Point::new(5, 1)));
        assert!(!bitmap.is_walkable_at(Point::new(4, 0)));
        assert_eq!(bitmap.rect(), Rect::new(5, 0, 7, 2));
    }

    #[test]
    fn test_room_rects() {
        let room = RoomInfo {
            level_id: 1,
            position: Point::new(2, 1),
            size: Size::new(1, 2),
        };
        assert_eq!(room.grid_rect(), Rect::new(2, 1, 3, 3));
        assert_eq!(room.cell_rect(), Rect::new(10, 5, 15, 15));
    }
}
