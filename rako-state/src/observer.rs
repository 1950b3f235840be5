//! Observers: the in-process objects mirroring a light or switch
//!
//! The entity layer owns its observers. The synchronizer only keeps weak
//! references and calls the capability methods below when a status broadcast
//! resolves to the observer's unique id.

use std::sync::Arc;

use tokio::sync::watch;

use rako_protocol::Bridge;

/// A dimmable light
pub trait LightObserver: Send + Sync {
    fn unique_id(&self) -> &str;

    /// Apply a brightness reported by the bridge (0–255)
    fn apply_brightness(&self, brightness: u8);
}

/// An on/off switch
pub trait SwitchObserver: Send + Sync {
    fn unique_id(&self) -> &str;

    /// Apply an on/off state reported by the bridge
    fn apply_on_off(&self, is_on: bool);
}

/// An observer registered for status updates
#[derive(Clone)]
pub enum Observer {
    Light(Arc<dyn LightObserver>),
    Switch(Arc<dyn SwitchObserver>),
}

impl Observer {
    pub fn light(light: Arc<dyn LightObserver>) -> Self {
        Observer::Light(light)
    }

    pub fn switch(switch: Arc<dyn SwitchObserver>) -> Self {
        Observer::Switch(switch)
    }

    pub fn unique_id(&self) -> &str {
        match self {
            Observer::Light(light) => light.unique_id(),
            Observer::Switch(switch) => switch.unique_id(),
        }
    }
}

impl std::fmt::Debug for Observer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Observer::Light(light) => f.debug_tuple("Light").field(&light.unique_id()).finish(),
            Observer::Switch(switch) => f.debug_tuple("Switch").field(&switch.unique_id()).finish(),
        }
    }
}

/// Ready-made light observer
///
/// Brightness lives in a watch channel: [`LightEntity::subscribe`] gives the
/// host a receiver that wakes whenever the bridge reports a new level.
#[derive(Debug)]
pub struct LightEntity {
    unique_id: String,
    name: String,
    room: u16,
    channel: u8,
    brightness: watch::Sender<u8>,
}

impl LightEntity {
    pub fn new(bridge: &Bridge, room: u16, channel: u8, name: impl Into<String>) -> Self {
        Self {
            unique_id: bridge.unique_id(room, channel),
            name: name.into(),
            room,
            channel,
            brightness: watch::Sender::new(0),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn room(&self) -> u16 {
        self.room
    }

    pub fn channel(&self) -> u8 {
        self.channel
    }

    pub fn brightness(&self) -> u8 {
        *self.brightness.borrow()
    }

    pub fn is_on(&self) -> bool {
        self.brightness() > 0
    }

    pub fn subscribe(&self) -> watch::Receiver<u8> {
        self.brightness.subscribe()
    }
}

impl LightObserver for LightEntity {
    fn unique_id(&self) -> &str {
        &self.unique_id
    }

    fn apply_brightness(&self, brightness: u8) {
        let changed = self.brightness.send_if_modified(|current| {
            let changed = *current != brightness;
            *current = brightness;
            changed
        });
        if changed {
            tracing::debug!("{} brightness -> {}", self.unique_id, brightness);
        }
    }
}

/// Ready-made switch observer
#[derive(Debug)]
pub struct SwitchEntity {
    unique_id: String,
    name: String,
    room: u16,
    channel: u8,
    is_on: watch::Sender<bool>,
}

impl SwitchEntity {
    pub fn new(bridge: &Bridge, room: u16, channel: u8, name: impl Into<String>) -> Self {
        Self {
            unique_id: bridge.unique_id(room, channel),
            name: name.into(),
            room,
            channel,
            is_on: watch::Sender::new(false),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn room(&self) -> u16 {
        self.room
    }

    pub fn channel(&self) -> u8 {
        self.channel
    }

    pub fn is_on(&self) -> bool {
        *self.is_on.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.is_on.subscribe()
    }
}

impl SwitchObserver for SwitchEntity {
    fn unique_id(&self) -> &str {
        &self.unique_id
    }

    fn apply_on_off(&self, is_on: bool) {
        let changed = self.is_on.send_if_modified(|current| {
            let changed = *current != is_on;
            *current = is_on;
            changed
        });
        if changed {
            tracing::debug!("{} is_on -> {}", self.unique_id, is_on);
        }
    }
}
