//! Error types for the Rako protocol layer.

use thiserror::Error;

/// A single datagram could not be decoded.
///
/// Decode errors are scoped to one datagram: the listener that produced them
/// keeps running.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    /// Fewer bytes than the smallest valid status frame
    #[error("datagram too short: {len} bytes")]
    TooShort { len: usize },

    /// Declared length byte does not match the bytes received
    #[error("length mismatch: header declares {declared} bytes, received {actual}")]
    LengthMismatch { declared: usize, actual: usize },

    /// Checksum byte does not balance the frame
    #[error("bad checksum: frame sums to {sum:#04x}, expected 0x00")]
    BadChecksum { sum: u8 },

    /// Command requires a data payload that is missing
    #[error("command {command:#04x} is missing its data byte")]
    MissingData { command: u8 },
}

/// Errors raised while receiving status messages from a bridge.
#[derive(Error, Debug)]
pub enum ProtocolError {
    /// Listener socket could not be bound
    #[error("failed to bind status listener on port {port}: {source}")]
    Bind {
        port: u16,
        #[source]
        source: std::io::Error,
    },

    /// Socket error while receiving
    #[error("transport error: {0}")]
    Io(#[from] std::io::Error),

    /// A datagram was received but could not be decoded
    #[error("decode error: {0}")]
    Decode(#[from] DecodeError),

    /// The message source has no more input
    #[error("message source closed")]
    Closed,
}

impl ProtocolError {
    /// Whether the listener can keep going after this error.
    ///
    /// Only per-datagram decode failures are recoverable; everything else
    /// means the underlying transport is gone.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, ProtocolError::Decode(_))
    }
}

/// Convenience Result type alias for protocol operations.
pub type Result<T> = std::result::Result<T, ProtocolError>;
