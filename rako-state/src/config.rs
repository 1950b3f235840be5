//! Configuration for the bridge state synchronizer

use std::time::Duration;

use serde::{Deserialize, Serialize};

use rako_protocol::{UdpListenerFactory, DEFAULT_MAX_DATAGRAM_SIZE};

use crate::error::{Result, SyncError};

/// Smallest buffer able to hold a status frame
const MIN_DATAGRAM_SIZE: usize = 8;

/// Configuration for a [`BridgeSync`](crate::BridgeSync)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// How long one receive waits before the listener checks in again.
    /// `None` waits indefinitely.
    /// Default: 30 seconds
    pub receive_timeout: Option<Duration>,

    /// Receive buffer size; longer datagrams are truncated
    /// Default: 256 bytes
    pub max_datagram_size: usize,

    /// How long the last deregistration waits for the listener to stop
    /// before aborting it
    /// Default: 5 seconds
    pub shutdown_timeout: Duration,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            receive_timeout: Some(Duration::from_secs(30)),
            max_datagram_size: DEFAULT_MAX_DATAGRAM_SIZE,
            shutdown_timeout: Duration::from_secs(5),
        }
    }
}

impl SyncConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Short timeouts, for tests and simulators
    pub fn fast_shutdown() -> Self {
        Self {
            receive_timeout: Some(Duration::from_millis(250)),
            shutdown_timeout: Duration::from_millis(500),
            ..Default::default()
        }
    }

    pub fn with_receive_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.receive_timeout = timeout;
        self
    }

    pub fn with_shutdown_timeout(mut self, timeout: Duration) -> Self {
        self.shutdown_timeout = timeout;
        self
    }

    /// Check the configuration for values the listener cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.receive_timeout == Some(Duration::ZERO) {
            return Err(SyncError::InvalidConfig(
                "receive_timeout must be non-zero".to_string(),
            ));
        }
        if self.max_datagram_size < MIN_DATAGRAM_SIZE {
            return Err(SyncError::InvalidConfig(format!(
                "max_datagram_size must be at least {MIN_DATAGRAM_SIZE} bytes"
            )));
        }
        if self.shutdown_timeout.is_zero() {
            return Err(SyncError::InvalidConfig(
                "shutdown_timeout must be non-zero".to_string(),
            ));
        }
        Ok(())
    }

    /// The UDP listener factory matching this configuration
    pub fn listener_factory(&self) -> UdpListenerFactory {
        UdpListenerFactory::new(self.receive_timeout, self.max_datagram_size)
    }
}
