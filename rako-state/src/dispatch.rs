//! Status dispatch: from a decoded status message to observer state
//!
//! Dispatch happens in two steps. [`expand`] turns one status message into
//! the flat list of channel updates it implies; a scene broadcast expands to
//! one update per channel the level cache knows for that scene, followed by
//! the scene's own update. [`apply`] then routes each update to the light or
//! switch registered under its unique id.

use rako_protocol::{make_unique_id, scene_to_brightness, LevelCache, StatusMessage};

use crate::registry::Registry;

/// A resolved brightness for one room channel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChannelUpdate {
    pub room: u16,
    pub channel: u8,
    pub brightness: u8,
}

/// Which observer, if any, an update reached
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    Light,
    Switch,
    NotRegistered,
}

/// Expand a status message into the channel updates it implies
///
/// Synthetic updates taken from the level cache come first, in channel
/// order, so the message's own update is always last.
pub fn expand(message: &StatusMessage, levels: &LevelCache) -> Vec<ChannelUpdate> {
    match message {
        StatusMessage::Channel(status) => vec![ChannelUpdate {
            room: status.room,
            channel: status.channel,
            brightness: status.brightness,
        }],
        StatusMessage::Scene(status) => {
            let mut updates: Vec<ChannelUpdate> = levels
                .channel_levels(status.room, status.scene)
                .into_iter()
                .map(|(channel, brightness)| ChannelUpdate {
                    room: status.room,
                    channel,
                    brightness,
                })
                .collect();

            updates.push(ChannelUpdate {
                room: status.room,
                channel: status.channel,
                brightness: scene_to_brightness(status.scene),
            });
            updates
        }
    }
}

/// Route one update to the observer registered under its unique id
pub fn apply(bridge_id: &str, registry: &Registry, update: &ChannelUpdate) -> Delivery {
    let unique_id = make_unique_id(bridge_id, update.room, update.channel);

    if let Some(light) = registry.lookup_light(&unique_id) {
        light.apply_brightness(update.brightness);
        Delivery::Light
    } else if let Some(switch) = registry.lookup_switch(&unique_id) {
        switch.apply_on_off(update.brightness > 0);
        Delivery::Switch
    } else {
        tracing::debug!("Device not listening: {} ({:?})", unique_id, update);
        Delivery::NotRegistered
    }
}

/// Expand and apply a status message, returning how many observers it reached
pub fn dispatch(
    bridge_id: &str,
    registry: &Registry,
    levels: &LevelCache,
    message: &StatusMessage,
) -> usize {
    let updates = expand(message, levels);
    tracing::trace!("{:?} expanded to {} updates", message, updates.len());

    updates
        .iter()
        .map(|update| apply(bridge_id, registry, update))
        .filter(|delivery| *delivery != Delivery::NotRegistered)
        .count()
}
