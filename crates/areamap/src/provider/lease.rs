use tracing::debug;

use crate::error::{Error, Result};

use super::{CollisionBitmap, LevelProvider, RoomId};

/// Scoped access to a room's collision data.
///
/// If the room was not resident, acquiring the lease force-loads it and
/// dropping the lease releases it again, so every exit path of the caller
/// (including `?` and `continue`) leaves the game's room state as it was.
pub struct CollisionLease<'a, P: LevelProvider + ?Sized> {
    provider: &'a P,
    room: RoomId,
    forced: bool,
    bitmap: Option<CollisionBitmap>,
}

impl<'a, P: LevelProvider + ?Sized> CollisionLease<'a, P> {
    pub fn acquire(provider: &'a P, room: RoomId) -> Result<Self> {
        if let Some(bitmap) = provider.collision(room)? {
            return Ok(Self {
                provider,
                room,
                forced: false,
                bitmap: Some(bitmap),
            });
        }

        if !provider.force_load_collision(room)? {
            return Err(Error::Provider(format!(
                "force-load of room {} failed",
                room
            )));
        }
        debug!("Force-loaded collision for room {}", room);

        // From here on the lease owns the load; an error below still releases it
        let mut lease = Self {
            provider,
            room,
            forced: true,
            bitmap: None,
        };
        lease.bitmap = provider.collision(room)?;
        Ok(lease)
    }

    /// Whether this lease performed (and will undo) a force-load
    pub fn was_forced(&self) -> bool {
        self.forced
    }

    /// Collision data, `None` if the room has none even after loading
    pub fn bitmap(&self) -> Option<&CollisionBitmap> {
        self.bitmap.as_ref()
    }
}

impl<P: LevelProvider + ?Sized> Drop for CollisionLease<'_, P> {
    fn drop(&mut self) {
        if self.forced {
            self.provider.release_collision(self.room);
            debug!("Released collision for room {}", self.room);
        }
    }
}
