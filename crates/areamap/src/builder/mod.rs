//! Area stitching.
//!
//! [`AreaBuilder`] walks every room of a level, pastes the room collision
//! bitmaps into one area-wide grid, probes neighbouring rooms of other
//! levels for boundary openings and classifies preset markers. The result
//! is a fully populated [`AreaRecord`].
//!
//! # Example
//!
//! ```ignore
//! let builder = AreaBuilder::new(&world, BuildOptions::default());
//! let record = builder.build(1);
//! if !record.built {
//!     eprintln!("{}", record.error_string.unwrap_or_default());
//! }
//! ```

mod boundary;
mod canvas;
mod markers;
mod options;

use std::collections::HashSet;

use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::path::PathGrid;
use crate::provider::{CollisionLease, LevelProvider, RoomId, RoomInfo};
use crate::record::{AreaRecord, encode_map_data};

use self::boundary::{BoundarySpan, Side, merge_spans, refine, scan_neighbour};
use self::canvas::AreaCanvas;
use self::markers::classify_markers;

pub use options::{BuildOptions, BuildOptionsBuilder};

pub struct AreaBuilder<'a, P: LevelProvider + ?Sized> {
    provider: &'a P,
    options: BuildOptions,
}

/// Mutable state of one build
struct Assembly {
    area_id: u32,
    record: AreaRecord,
    canvas: AreaCanvas,
    spans: Vec<BoundarySpan>,
}

impl<'a, P: LevelProvider + ?Sized> AreaBuilder<'a, P> {
    pub fn new(provider: &'a P, options: BuildOptions) -> Self {
        Self { provider, options }
    }

    /// Build the record for one area.
    ///
    /// A missing level or an empty room list yields an unbuilt record with
    /// the reason in `error_string`. Rooms and neighbours whose provider
    /// calls fail are skipped, so a built record may be incomplete.
    pub fn build(&self, area_id: u32) -> AreaRecord {
        match self.try_build(area_id) {
            Ok(record) => record,
            Err(e) => {
                warn!("Failed to build area {}: {}", area_id, e);
                AreaRecord::failed(area_id, e.to_string())
            }
        }
    }

    fn try_build(&self, area_id: u32) -> Result<AreaRecord> {
        let level = self
            .provider
            .level(area_id)?
            .ok_or(Error::LevelNotFound(area_id))?;

        let mut rooms = self.provider.rooms(area_id)?;
        if rooms.is_empty() {
            debug!("Initializing room list of level {}", area_id);
            self.provider.ensure_rooms_loaded(area_id)?;
            rooms = self.provider.rooms(area_id)?;
        }
        if rooms.is_empty() {
            return Err(Error::NoRooms(area_id));
        }

        let mut record = AreaRecord::new(area_id);
        record.offset = level.position.to_cells();
        record.size = level.size.to_cells();

        let mut assembly = Assembly {
            area_id,
            canvas: AreaCanvas::new(record.offset, record.size),
            record,
            spans: Vec::new(),
        };

        let mut visited = HashSet::new();
        for room_id in rooms {
            if !visited.insert(room_id) {
                debug!("Room {} listed twice in level {}", room_id, area_id);
                continue;
            }
            if let Err(e) = self.add_room(room_id, &mut assembly) {
                warn!("Skipping room {} of area {}: {}", room_id, area_id, e);
            }
        }

        let Assembly {
            mut record,
            canvas,
            spans,
            ..
        } = assembly;

        if !canvas.crop().is_valid() {
            warn!("Area {} has no collision data", area_id);
        }
        self.add_boundary_exits(&mut record, &canvas, spans);

        record.crop = canvas.crop();
        let (width, height) = record.crop_dimensions();
        let walkable = canvas.crop_walkable();
        record.map_data = encode_map_data(&walkable, width, height);

        if self.options.generate_path_data {
            let grid = PathGrid::build(&walkable, width, height);
            record.path_data = grid.encode();
            record.path = grid.into_cells();
        }

        record.built = true;
        info!(
            "Built area {}: crop {}x{}, {} exits, {} npcs, {} objects",
            area_id,
            width,
            height,
            record.exits.len(),
            record.npcs.len(),
            record.objects.len()
        );
        Ok(record)
    }

    /// Everything one room contributes. The lease is held for the whole
    /// call, so the room's collision is released on every return path.
    fn add_room(&self, room_id: RoomId, assembly: &mut Assembly) -> Result<()> {
        let room = self.provider.room(room_id)?;
        let lease = CollisionLease::acquire(self.provider, room_id)?;

        self.scan_neighbours(room_id, &room, assembly);

        match lease.bitmap() {
            Some(bitmap) => {
                if assembly.canvas.paste(bitmap) {
                    warn!(
                        "Collision of room {} extends past level {}, clipped",
                        room_id, assembly.area_id
                    );
                }
            }
            None => warn!("Room {} has no collision data", room_id),
        }

        if let Err(e) = classify_markers(self.provider, room_id, &room, &mut assembly.record) {
            warn!("Skipping markers of room {}: {}", room_id, e);
        }
        Ok(())
    }

    fn scan_neighbours(&self, room_id: RoomId, room: &RoomInfo, assembly: &mut Assembly) {
        let near = match self.provider.near_rooms(room_id) {
            Ok(near) => near,
            Err(e) => {
                warn!("Failed to list neighbours of room {}: {}", room_id, e);
                return;
            }
        };

        let mut seen = HashSet::new();
        for near_id in near {
            if near_id == room_id || !seen.insert(near_id) {
                continue;
            }
            match self.probe_neighbour(room, near_id, assembly.area_id) {
                Ok(spans) => assembly.spans.extend(spans),
                Err(e) => warn!(
                    "Skipping neighbour {} of room {}: {}",
                    near_id, room_id, e
                ),
            }
        }
    }

    fn probe_neighbour(
        &self,
        room: &RoomInfo,
        near_id: RoomId,
        area_id: u32,
    ) -> Result<Vec<BoundarySpan>> {
        let near = self.provider.room(near_id)?;
        if near.level_id == area_id {
            return Ok(Vec::new());
        }
        let Some(side) = Side::between(&room.grid_rect(), &near.grid_rect()) else {
            return Ok(Vec::new());
        };

        let lease = CollisionLease::acquire(self.provider, near_id)?;
        let Some(bitmap) = lease.bitmap() else {
            return Ok(Vec::new());
        };
        let spans = scan_neighbour(near.level_id, side, &room.cell_rect(), bitmap);
        debug!(
            "Neighbour {} has {} opening(s) towards level {} on the {} side",
            near_id,
            spans.len(),
            near.level_id,
            side
        );
        Ok(spans)
    }

    fn add_boundary_exits(
        &self,
        record: &mut AreaRecord,
        canvas: &AreaCanvas,
        spans: Vec<BoundarySpan>,
    ) {
        for span in merge_spans(spans) {
            for opening in refine(&span, canvas) {
                if opening.width() < self.options.min_exit_width {
                    continue;
                }
                record
                    .exits
                    .entry(opening.level_id)
                    .or_default()
                    .offsets
                    .push(opening.midpoint());
            }
        }
    }
}
