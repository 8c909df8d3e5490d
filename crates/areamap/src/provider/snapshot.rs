//! Captured level graph that can stand in for a live game.
//!
//! A snapshot is plain JSON: levels plus an arena of rooms addressed by
//! index. Rooms that are not `resident` only expose collision data while
//! force-loaded, and levels captured with `roomsInitialized: false` report
//! no rooms until [`LevelProvider::ensure_rooms_loaded`] is called. Force
//! loads are reference counted so tests can check that every load was
//! released.

use std::cell::RefCell;
use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{Error, Result};
use crate::geometry::{Point, Size};

use super::{
    CollisionBitmap, LevelInfo, LevelProvider, MarkerKind, PresetMarker, RoomId, RoomInfo,
    TileLink,
};

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LevelEntry {
    pub id: u32,
    pub position: Point,
    pub size: Size,
    #[serde(default = "default_true")]
    pub rooms_initialized: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomEntry {
    pub level: u32,
    pub position: Point,
    pub size: Size,
    #[serde(default)]
    pub near: Vec<RoomId>,
    #[serde(default)]
    pub resident: bool,
    #[serde(default)]
    pub collision: Option<CollisionBitmap>,
    #[serde(default)]
    pub markers: Vec<PresetMarker>,
    #[serde(default)]
    pub tiles: Vec<TileEntry>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TileEntry {
    pub content_id: u32,
    pub room: RoomId,
}

#[derive(Debug, Clone, Default)]
struct LoadState {
    loads: HashMap<RoomId, u32>,
    initialized: HashSet<u32>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WorldSnapshot {
    #[serde(default)]
    pub levels: Vec<LevelEntry>,
    #[serde(default)]
    pub rooms: Vec<RoomEntry>,
    #[serde(skip)]
    state: RefCell<LoadState>,
}

impl WorldSnapshot {
    /// Parse a snapshot and check that every room reference resolves
    pub fn from_json(bytes: &[u8]) -> Result<Self> {
        let world: WorldSnapshot = serde_json::from_slice(bytes)?;
        world.validate()?;
        Ok(world)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    fn validate(&self) -> Result<()> {
        let known = |id: RoomId| (id.0 as usize) < self.rooms.len();
        for (index, room) in self.rooms.iter().enumerate() {
            if let Some(near) = room.near.iter().find(|id| !known(**id)) {
                return Err(Error::Decode(format!(
                    "room #{} lists unknown near room {}",
                    index, near
                )));
            }
            if let Some(tile) = room.tiles.iter().find(|t| !known(t.room)) {
                return Err(Error::Decode(format!(
                    "room #{} has a tile pointing at unknown room {}",
                    index, tile.room
                )));
            }
            if let Some(bitmap) = &room.collision
                && bitmap.cells.len() != bitmap.width * bitmap.height
            {
                return Err(Error::Decode(format!(
                    "room #{} collision has {} cells, expected {}x{}",
                    index,
                    bitmap.cells.len(),
                    bitmap.width,
                    bitmap.height
                )));
            }
        }
        Ok(())
    }

    /// Force loads not yet released, summed over all rooms
    pub fn outstanding_loads(&self) -> u32 {
        self.state.borrow().loads.values().sum()
    }

    pub fn push_level(&mut self, id: u32, position: Point, size: Size) -> &mut LevelEntry {
        self.levels.push(LevelEntry {
            id,
            position,
            size,
            rooms_initialized: true,
        });
        let last = self.levels.len() - 1;
        &mut self.levels[last]
    }

    /// Add a room without collision data; position and size in room-grid units
    pub fn push_room(&mut self, level: u32, position: Point, size: Size) -> RoomBuilder<'_> {
        let id = RoomId(self.rooms.len() as u32);
        self.rooms.push(RoomEntry {
            level,
            position,
            size,
            near: Vec::new(),
            resident: false,
            collision: None,
            markers: Vec::new(),
            tiles: Vec::new(),
        });
        RoomBuilder { world: self, id }
    }

    /// Make two rooms neighbours of each other
    pub fn link(&mut self, a: RoomId, b: RoomId) {
        for (from, to) in [(a, b), (b, a)] {
            if let Some(room) = self.rooms.get_mut(from.0 as usize)
                && !room.near.contains(&to)
            {
                room.near.push(to);
            }
        }
    }

    fn entry(&self, room: RoomId) -> Result<&RoomEntry> {
        self.rooms
            .get(room.0 as usize)
            .ok_or_else(|| Error::Provider(format!("unknown room {}", room)))
    }

    fn level_entry(&self, area_id: u32) -> Option<&LevelEntry> {
        self.levels.iter().find(|level| level.id == area_id)
    }
}

/// Chained setup for a freshly pushed room
pub struct RoomBuilder<'a> {
    world: &'a mut WorldSnapshot,
    id: RoomId,
}

impl RoomBuilder<'_> {
    fn entry(&mut self) -> &mut RoomEntry {
        &mut self.world.rooms[self.id.0 as usize]
    }

    pub fn id(&self) -> RoomId {
        self.id
    }

    /// Fully walkable collision covering the room
    pub fn open(mut self) -> Self {
        let rect = {
            let room = self.entry();
            RoomInfo {
                level_id: room.level,
                position: room.position,
                size: room.size,
            }
            .cell_rect()
        };
        let (width, height) = (rect.width() as usize, rect.height() as usize);
        self.entry().collision = Some(CollisionBitmap {
            origin: Point::new(rect.x0, rect.y0),
            width,
            height,
            cells: vec![0; width * height],
        });
        self
    }

    /// Collision from text rows, `#` blocked and anything else walkable
    pub fn cells(mut self, rows: &[&str]) -> Self {
        let origin = self.entry().position.to_cells();
        let width = rows.first().map_or(0, |row| row.chars().count());
        let cells = rows
            .iter()
            .flat_map(|row| row.chars().map(|c| u16::from(c == '#')))
            .collect();
        self.entry().collision = Some(CollisionBitmap {
            origin,
            width,
            height: rows.len(),
            cells,
        });
        self
    }

    /// Collision stays available without a force-load
    pub fn resident(mut self) -> Self {
        self.entry().resident = true;
        self
    }

    pub fn marker(mut self, kind: MarkerKind, content_id: u32, local_x: i32, local_y: i32) -> Self {
        self.entry().markers.push(PresetMarker {
            kind: kind as u32,
            content_id,
            local_x,
            local_y,
        });
        self
    }

    pub fn tile(mut self, content_id: u32, room: RoomId) -> Self {
        self.entry().tiles.push(TileEntry { content_id, room });
        self
    }
}

impl LevelProvider for WorldSnapshot {
    fn level(&self, area_id: u32) -> Result<Option<LevelInfo>> {
        Ok(self.level_entry(area_id).map(|level| LevelInfo {
            id: level.id,
            position: level.position,
            size: level.size,
        }))
    }

    fn ensure_rooms_loaded(&self, area_id: u32) -> Result<()> {
        if self.level_entry(area_id).is_none() {
            return Err(Error::LevelNotFound(area_id));
        }
        self.state.borrow_mut().initialized.insert(area_id);
        Ok(())
    }

    fn rooms(&self, area_id: u32) -> Result<Vec<RoomId>> {
        let Some(level) = self.level_entry(area_id) else {
            return Ok(Vec::new());
        };
        if !level.rooms_initialized && !self.state.borrow().initialized.contains(&area_id) {
            return Ok(Vec::new());
        }
        Ok(self
            .rooms
            .iter()
            .enumerate()
            .filter(|(_, room)| room.level == area_id)
            .map(|(index, _)| RoomId(index as u32))
            .collect())
    }

    fn room(&self, room: RoomId) -> Result<RoomInfo> {
        let entry = self.entry(room)?;
        Ok(RoomInfo {
            level_id: entry.level,
            position: entry.position,
            size: entry.size,
        })
    }

    fn near_rooms(&self, room: RoomId) -> Result<Vec<RoomId>> {
        Ok(self.entry(room)?.near.clone())
    }

    fn force_load_collision(&self, room: RoomId) -> Result<bool> {
        if self.entry(room)?.collision.is_none() {
            return Ok(false);
        }
        *self.state.borrow_mut().loads.entry(room).or_insert(0) += 1;
        Ok(true)
    }

    fn release_collision(&self, room: RoomId) {
        let mut state = self.state.borrow_mut();
        let Some(count) = state.loads.get_mut(&room) else {
            warn!("Release of room {} without a matching load", room);
            return;
        };
        *count -= 1;
        if *count == 0 {
            state.loads.remove(&room);
        }
    }

    fn collision(&self, room: RoomId) -> Result<Option<CollisionBitmap>> {
        let entry = self.entry(room)?;
        let loaded = entry.resident || self.state.borrow().loads.contains_key(&room);
        Ok(if loaded { entry.collision.clone() } else { None })
    }

    fn preset_markers(&self, room: RoomId) -> Result<Vec<PresetMarker>> {
        Ok(self.entry(room)?.markers.clone())
    }

    fn tile_record_for(&self, room: RoomId, content_id: u32) -> Result<Option<TileLink>> {
        let Some(tile) = self
            .entry(room)?
            .tiles
            .iter()
            .find(|tile| tile.content_id == content_id)
        else {
            return Ok(None);
        };
        let target = self.entry(tile.room)?;
        Ok(Some(TileLink {
            room: tile.room,
            level_id: target.level,
        }))
    }
}
