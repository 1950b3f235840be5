//! Rako State Synchronization
//!
//! Keeps in-process light and switch objects in step with the status
//! broadcasts of a Rako bridge.
//!
//! # Architecture
//!
//! ```text
//! register/deregister ─► Registry ─(0→1 / 1→0)─► listener task
//!                                                     │
//!          UDP datagram ─► decode ─► StatusMessage ─► expand ─► apply ─► Observer
//! ```
//!
//! - Observers register through [`BridgeSync::register_for_updates`]. The
//!   first registration spawns the bridge's listener task; the last
//!   deregistration cancels it and waits for it to release the socket.
//! - Each status message is expanded into channel updates (a scene becomes
//!   one update per channel in the scene, plus the scene's own) and every
//!   update is routed to the light or switch registered under its unique id.
//! - Undecodable datagrams are skipped. A transport failure ends the listener;
//!   it is restarted by the next full deregister/register cycle.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use rako_protocol::Bridge;
//! use rako_state::{BridgeSync, LightEntity, Observer, SwitchEntity, SyncConfig};
//!
//! let bridge = Bridge::new("192.168.1.20".parse()?, "Rako", "00:11:22:33:44:55");
//! let sync = BridgeSync::new(bridge.clone(), SyncConfig::default())?;
//! sync.level_cache().set_channel_levels(3, 1, &[255, 128, 64, 0]);
//!
//! let lamp = Arc::new(LightEntity::new(&bridge, 3, 1, "Lamp"));
//! let fan = Arc::new(SwitchEntity::new(&bridge, 3, 2, "Fan"));
//! sync.register_for_updates(&Observer::light(lamp.clone())).await;
//! sync.register_for_updates(&Observer::switch(fan.clone())).await;
//!
//! // ... later, on teardown
//! sync.shutdown().await;
//! ```

pub mod config;
pub mod dispatch;
pub mod error;
pub mod logging;
pub mod manager;
pub mod observer;
pub mod registry;

mod worker;

pub use config::SyncConfig;
pub use dispatch::{apply, dispatch, expand, ChannelUpdate, Delivery};
pub use error::{Result, SyncError};
pub use logging::{init_logging, init_logging_from_env, LoggingError, LoggingMode};
pub use manager::{BridgeSync, ListenerStatus};
pub use observer::{LightEntity, LightObserver, Observer, SwitchEntity, SwitchObserver};
pub use registry::Registry;

/// Commonly used types for convenient importing
pub mod prelude {
    pub use crate::{
        BridgeSync, LightEntity, LightObserver, ListenerStatus, Observer, SwitchEntity,
        SwitchObserver, SyncConfig,
    };
    pub use rako_protocol::{Bridge, LevelCache, StatusMessage};
}
