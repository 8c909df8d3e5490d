use tracing::{debug, warn};

use crate::error::Result;
use crate::provider::{LevelProvider, MarkerKind, RoomId, RoomInfo};
use crate::record::AreaRecord;

/// Sort a room's preset markers into the record's NPC, object and exit
/// tables. Positions are global.
///
/// A tile marker without a usable tile record is skipped; only the marker
/// list itself failing to load is an error.
pub(crate) fn classify_markers<P: LevelProvider + ?Sized>(
    provider: &P,
    room_id: RoomId,
    room: &RoomInfo,
    record: &mut AreaRecord,
) -> Result<()> {
    let origin = room.position.to_cells();

    for marker in provider.preset_markers(room_id)? {
        let position = origin.offset_by(marker.local_x, marker.local_y);
        let kind = match marker.marker_kind() {
            Ok(kind) => kind,
            Err(e) => {
                debug!("Ignoring marker {} in room {}: {}", marker.content_id, room_id, e);
                continue;
            }
        };

        match kind {
            MarkerKind::Npc => record.npcs.entry(marker.content_id).or_default().push(position),
            MarkerKind::Object => record
                .objects
                .entry(marker.content_id)
                .or_default()
                .push(position),
            MarkerKind::Tile => match provider.tile_record_for(room_id, marker.content_id) {
                Ok(Some(link)) => {
                    let exit = record.exits.entry(link.level_id).or_default();
                    exit.is_portal = true;
                    exit.offsets.push(position);
                }
                Ok(None) => warn!(
                    "No tile record for exit tile {} in room {}",
                    marker.content_id, room_id
                ),
                Err(e) => warn!(
                    "Failed to resolve exit tile {} in room {}: {}",
                    marker.content_id, room_id, e
                ),
            },
        }
    }
    Ok(())
}
