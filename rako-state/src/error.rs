//! Error types for rako-state

use thiserror::Error;

use rako_protocol::ProtocolError;

/// Errors raised by the state synchronizer
#[derive(Error, Debug)]
pub enum SyncError {
    /// Error from the bridge protocol layer
    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    /// Configuration rejected by validation
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Result type for rako-state operations
pub type Result<T> = std::result::Result<T, SyncError>;
