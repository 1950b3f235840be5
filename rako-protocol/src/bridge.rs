//! Bridge identity and unique id derivation

use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::IpAddr;

/// Default UDP port Rako bridges broadcast status on
pub const DEFAULT_BRIDGE_PORT: u16 = 9761;

/// A physical Rako lighting bridge
///
/// The MAC address is the bridge's identity: every device unique id and all
/// per-bridge state is keyed by it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bridge {
    /// Network address of the bridge
    pub host: IpAddr,
    /// UDP port status broadcasts arrive on
    pub port: u16,
    /// Display name
    pub name: String,
    /// Hardware identifier
    pub mac: String,
}

impl Bridge {
    /// Create a bridge using the default status port
    pub fn new(host: IpAddr, name: impl Into<String>, mac: impl Into<String>) -> Self {
        Self {
            host,
            port: DEFAULT_BRIDGE_PORT,
            name: name.into(),
            mac: mac.into(),
        }
    }

    /// Override the status port
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Bridge identifier used in device unique ids
    pub fn id(&self) -> &str {
        &self.mac
    }

    /// Unique id of the device at `room`/`channel` on this bridge
    pub fn unique_id(&self, room: u16, channel: u8) -> String {
        make_unique_id(&self.mac, room, channel)
    }
}

impl fmt::Display for Bridge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}:{})", self.name, self.host, self.port)
    }
}

/// Derive the stable unique id for a device on a bridge.
///
/// The format is fixed: ids persist in host configuration across restarts.
pub fn make_unique_id(bridge_id: &str, room: u16, channel: u8) -> String {
    format!("b:{bridge_id}t:{room}d:{channel}")
}
