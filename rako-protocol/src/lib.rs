//! # Rako Protocol
//!
//! Bridge-side building blocks for following Rako lighting state:
//!
//! - [`Bridge`] identity and [`make_unique_id`] for stable device ids
//! - [`decode_datagram`] for the binary status frames bridges broadcast
//! - [`UdpListener`] / [`UdpListenerFactory`], the scoped socket those frames arrive on
//! - [`LevelCache`] mapping a room scene to the channel levels it activates
//! - [`scene_to_brightness`] for the brightness a scene implies
//!
//! The [`MessageSource`] and [`ListenerFactory`] traits are the seams the
//! state layer consumes, so alternative transports and test doubles plug in
//! without touching it.

pub mod bridge;
pub mod brightness;
pub mod error;
pub mod level_cache;
pub mod listener;
pub mod message;

pub use bridge::{make_unique_id, Bridge, DEFAULT_BRIDGE_PORT};
pub use brightness::scene_to_brightness;
pub use error::{DecodeError, ProtocolError, Result};
pub use level_cache::{LevelCache, MAX_SCENES, ROOM_CHANNEL};
pub use listener::{
    ListenerFactory, MessageSource, UdpListener, UdpListenerFactory, DEFAULT_MAX_DATAGRAM_SIZE,
};
pub use message::{
    decode_datagram, encode_status_frame, ChannelStatus, Message, SceneStatus, StatusMessage,
};
