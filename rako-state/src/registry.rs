//! Registration table: unique id to observer, for one bridge
//!
//! Lights and switches live in separate maps but form one registry: a unique
//! id is looked up as a light first, then as a switch. Entries are weak, so an
//! observer dropped by the entity layer simply stops being found.

use std::collections::HashMap;
use std::sync::{Arc, Weak};

use crate::observer::{LightObserver, Observer, SwitchObserver};

/// Per-bridge registry of observers
#[derive(Default)]
pub struct Registry {
    lights: HashMap<String, Weak<dyn LightObserver>>,
    switches: HashMap<String, Weak<dyn SwitchObserver>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace the entry for the observer's unique id
    pub fn register(&mut self, observer: &Observer) {
        match observer {
            Observer::Light(light) => {
                self.lights
                    .insert(light.unique_id().to_string(), Arc::downgrade(light));
            }
            Observer::Switch(switch) => {
                self.switches
                    .insert(switch.unique_id().to_string(), Arc::downgrade(switch));
            }
        }
    }

    /// Remove the entry for the observer's unique id, if any
    pub fn deregister(&mut self, observer: &Observer) {
        match observer {
            Observer::Light(light) => {
                self.lights.remove(light.unique_id());
            }
            Observer::Switch(switch) => {
                self.switches.remove(switch.unique_id());
            }
        }
    }

    pub fn lookup_light(&self, unique_id: &str) -> Option<Arc<dyn LightObserver>> {
        self.lights.get(unique_id).and_then(Weak::upgrade)
    }

    pub fn lookup_switch(&self, unique_id: &str) -> Option<Arc<dyn SwitchObserver>> {
        self.switches.get(unique_id).and_then(Weak::upgrade)
    }

    /// Total entries across lights and switches
    pub fn size(&self) -> usize {
        self.lights.len() + self.switches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.size() == 0
    }

    pub fn clear(&mut self) {
        self.lights.clear();
        self.switches.clear();
    }
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registry")
            .field("lights", &self.lights.keys().collect::<Vec<_>>())
            .field("switches", &self.switches.keys().collect::<Vec<_>>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::observer::{LightEntity, SwitchEntity};
    use rako_protocol::Bridge;

    fn bridge() -> Bridge {
        Bridge::new("10.0.0.2".parse().unwrap(), "Bridge", "aa:bb")
    }

    #[test]
    fn test_register_is_idempotent() {
        let mut registry = Registry::new();
        let light = Observer::light(Arc::new(LightEntity::new(&bridge(), 1, 1, "Lamp")));

        registry.register(&light);
        registry.register(&light);

        assert_eq!(registry.size(), 1);
        assert!(registry.lookup_light(light.unique_id()).is_some());
    }

    #[test]
    fn test_reregistration_replaces_entry() {
        let mut registry = Registry::new();
        let first = Arc::new(LightEntity::new(&bridge(), 1, 1, "Old"));
        let second = Arc::new(LightEntity::new(&bridge(), 1, 1, "New"));

        registry.register(&Observer::light(first.clone()));
        registry.register(&Observer::light(second.clone()));
        assert_eq!(registry.size(), 1);

        registry
            .lookup_light(first.unique_id())
            .unwrap()
            .apply_brightness(90);
        assert_eq!(second.brightness(), 90);
        assert_eq!(first.brightness(), 0);
    }

    #[test]
    fn test_deregister_absent_is_noop() {
        let mut registry = Registry::new();
        let light = Observer::light(Arc::new(LightEntity::new(&bridge(), 1, 1, "Lamp")));
        let switch = Observer::switch(Arc::new(SwitchEntity::new(&bridge(), 1, 2, "Fan")));

        registry.register(&light);
        registry.deregister(&switch);
        assert_eq!(registry.size(), 1);

        registry.deregister(&light);
        registry.deregister(&light);
        assert!(registry.is_empty());
    }

    #[test]
    fn test_lights_and_switches_are_partitioned() {
        let mut registry = Registry::new();
        let switch = Observer::switch(Arc::new(SwitchEntity::new(&bridge(), 2, 1, "Fan")));
        registry.register(&switch);

        assert!(registry.lookup_light(switch.unique_id()).is_none());
        assert!(registry.lookup_switch(switch.unique_id()).is_some());
        assert!(registry.lookup_switch("b:aa:bbt:9d:9").is_none());
    }

    #[test]
    fn test_dropped_observer_is_not_found() {
        let mut registry = Registry::new();
        let light = Arc::new(LightEntity::new(&bridge(), 1, 1, "Lamp"));
        let unique_id = light.unique_id().to_string();
        registry.register(&Observer::light(light));

        assert!(registry.lookup_light(&unique_id).is_none());
        assert_eq!(registry.size(), 1);
    }
}
