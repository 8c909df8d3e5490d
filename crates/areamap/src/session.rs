//! Per-session cache of built areas
//!
//! Building an area force-loads rooms and walks the whole level, so a
//! session keeps every successfully built record and hands out the cached
//! copy on later requests. Failed builds are not cached and are retried on
//! the next request.

use std::collections::HashMap;
use std::collections::hash_map::Entry;

use tracing::debug;

use crate::builder::{AreaBuilder, BuildOptions};
use crate::provider::LevelProvider;
use crate::record::AreaRecord;

pub struct MapSession<P: LevelProvider> {
    provider: P,
    options: BuildOptions,
    maps: HashMap<u32, AreaRecord>,
}

impl<P: LevelProvider> MapSession<P> {
    pub fn new(provider: P, options: BuildOptions) -> Self {
        Self {
            provider,
            options,
            maps: HashMap::new(),
        }
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Built record for `area_id`, building it on first use.
    ///
    /// Returns `None` if the area cannot be built; the failure is logged by
    /// the builder and nothing is cached.
    pub fn get_map(&mut self, area_id: u32) -> Option<&AreaRecord> {
        self.get_or_build(area_id).ok()
    }

    /// Like [`get_map`](Self::get_map) but hands back the failed record
    pub fn get_or_build(&mut self, area_id: u32) -> Result<&AreaRecord, AreaRecord> {
        match self.maps.entry(area_id) {
            Entry::Occupied(entry) => {
                debug!("Area {} served from cache", area_id);
                Ok(entry.into_mut())
            }
            Entry::Vacant(entry) => {
                let record = AreaBuilder::new(&self.provider, self.options.clone()).build(area_id);
                if !record.built {
                    return Err(record);
                }
                debug!("Caching area {}", area_id);
                Ok(entry.insert(record))
            }
        }
    }

    /// Remove and return a cached record
    pub fn take(&mut self, area_id: u32) -> Option<AreaRecord> {
        self.maps.remove(&area_id)
    }

    pub fn len(&self) -> usize {
        self.maps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.maps.is_empty()
    }

    pub fn clear(&mut self) {
        self.maps.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{Point, Size};
    use crate::provider::WorldSnapshot;

    fn world() -> WorldSnapshot {
        let mut world = WorldSnapshot::default();
        world.push_level(1, Point::new(0, 0), Size::new(1, 1));
        world.push_room(1, Point::new(0, 0), Size::new(1, 1)).open();
        world
    }

    #[test]
    fn test_get_map_caches_built_records() {
        let mut session = MapSession::new(world(), BuildOptions::default());
        assert!(session.is_empty());

        let first = session.get_map(1).cloned().unwrap();
        assert!(first.built);
        assert_eq!(session.len(), 1);

        // changing the world does not affect the cached copy
        session.provider.rooms[0].collision = None;
        assert_eq!(session.get_map(1), Some(&first));
        assert_eq!(session.provider().outstanding_loads(), 0);
    }

    #[test]
    fn test_failed_builds_are_not_cached() {
        let mut session = MapSession::new(world(), BuildOptions::default());
        assert!(session.get_map(5).is_none());
        assert!(session.is_empty());

        let failed = session.get_or_build(5).unwrap_err();
        assert_eq!(failed.error_string.as_deref(), Some("Level not found: 5"));
    }

    #[test]
    fn test_take_and_clear() {
        let mut session = MapSession::new(world(), BuildOptions::default());
        session.get_map(1);
        let record = session.take(1).unwrap();
        assert_eq!(record.id, 1);
        assert!(session.is_empty());

        session.get_map(1);
        session.clear();
        assert_eq!(session.len(), 0);
    }
}
