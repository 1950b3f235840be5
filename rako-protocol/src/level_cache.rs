//! Per-scene channel levels
//!
//! The bridge stores, for every channel, the level it takes in each of the
//! room's scenes. A scene broadcast only names the room and scene, so the
//! cache is what turns it into per-channel brightness.

use std::collections::BTreeMap;

use parking_lot::RwLock;

/// Number of scenes a Rako room supports
pub const MAX_SCENES: usize = 16;

/// Room-wide channel; it addresses every channel in the room at once
pub const ROOM_CHANNEL: u8 = 0;

/// Thread-safe cache of scene levels keyed by room and channel
#[derive(Debug, Default)]
pub struct LevelCache {
    levels: RwLock<BTreeMap<(u16, u8), Vec<u8>>>,
}

impl LevelCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store the scene levels of one channel
    ///
    /// `levels[0]` is the level for scene 1. Entries past [`MAX_SCENES`] are
    /// dropped.
    pub fn set_channel_levels(&self, room: u16, channel: u8, levels: &[u8]) {
        let levels = levels.iter().copied().take(MAX_SCENES).collect();
        self.levels.write().insert((room, channel), levels);
    }

    /// Forget every cached level
    pub fn clear(&self) {
        self.levels.write().clear();
    }

    pub fn is_empty(&self) -> bool {
        self.levels.read().is_empty()
    }

    /// Channel levels activated by `scene` in `room`, ordered by channel
    ///
    /// Scene 0 turns every known channel off. Channels with no stored level
    /// for the scene are left out, as is the room-wide channel.
    pub fn channel_levels(&self, room: u16, scene: u8) -> Vec<(u8, u8)> {
        let levels = self.levels.read();
        levels
            .range((room, u8::MIN)..=(room, u8::MAX))
            .filter(|((_, channel), _)| *channel != ROOM_CHANNEL)
            .filter_map(|((_, channel), scene_levels)| {
                let level = match scene {
                    0 => 0,
                    n => *scene_levels.get(n as usize - 1)?,
                };
                Some((*channel, level))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cache() -> LevelCache {
        let cache = LevelCache::new();
        cache.set_channel_levels(1, 1, &[255, 128, 0]);
        cache.set_channel_levels(1, 2, &[200, 0]);
        cache.set_channel_levels(1, ROOM_CHANNEL, &[255, 255, 255]);
        cache.set_channel_levels(2, 1, &[10]);
        cache
    }

    #[test]
    fn test_levels_for_scene() {
        let cache = cache();
        assert_eq!(cache.channel_levels(1, 1), vec![(1, 255), (2, 200)]);
        assert_eq!(cache.channel_levels(1, 2), vec![(1, 128), (2, 0)]);
    }

    #[test]
    fn test_missing_scene_level_is_skipped() {
        assert_eq!(cache().channel_levels(1, 3), vec![(1, 0)]);
    }

    #[test]
    fn test_scene_zero_turns_everything_off() {
        assert_eq!(cache().channel_levels(1, 0), vec![(1, 0), (2, 0)]);
    }

    #[test]
    fn test_rooms_are_isolated() {
        let cache = cache();
        assert_eq!(cache.channel_levels(2, 1), vec![(1, 10)]);
        assert!(cache.channel_levels(3, 1).is_empty());
    }

    #[test]
    fn test_overwrite_and_clear() {
        let cache = cache();
        cache.set_channel_levels(2, 1, &[99]);
        assert_eq!(cache.channel_levels(2, 1), vec![(1, 99)]);

        cache.clear();
        assert!(cache.is_empty());
        assert!(cache.channel_levels(1, 1).is_empty());
    }

    #[test]
    fn test_levels_are_truncated() {
        let cache = LevelCache::new();
        cache.set_channel_levels(1, 1, &[1; 20]);
        assert_eq!(cache.channel_levels(1, 16), vec![(1, 1)]);
        assert!(cache.channel_levels(1, 17).is_empty());
    }
}
