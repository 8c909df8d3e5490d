//! # areamap
//!
//! Area collision maps built from a game's level graph.
//!
//! This crate provides:
//! - [`AreaRecord`]: a run-length encoded walkability bitmap for one area with
//!   its exits, NPC and object markers, and a JSON wire codec
//! - [`AreaBuilder`]: stitches per-room collision bitmaps into an area record
//!   and detects openings towards neighbouring areas
//! - [`PathGrid`] and [`find_path`]: a coarse directional grid and a
//!   breadth-first path search over it
//! - [`LevelProvider`]: the seam to the game, with [`WorldSnapshot`] as a
//!   captured stand-in
//! - [`MapSession`]: per-session cache of built areas

pub mod builder;
pub mod error;
pub mod geometry;
pub mod path;
pub mod prelude;
pub mod provider;
pub mod record;
pub mod session;

pub use builder::{AreaBuilder, BuildOptions, BuildOptionsBuilder};
pub use error::{Error, Result};
pub use geometry::{CELLS_PER_UNIT, Point, Rect, Size};
pub use path::{PathGrid, find_path};
pub use provider::{
    CollisionBitmap, CollisionLease, LevelInfo, LevelProvider, MarkerKind, PresetMarker, RoomId,
    RoomInfo, TileLink, WorldSnapshot,
};
pub use record::{AreaRecord, Exit, encode_map_data};
pub use session::MapSession;
