//! Status message model and datagram decoding
//!
//! Rako bridges broadcast a short binary frame whenever a channel level or a
//! room scene changes:
//!
//! ```text
//! 'S' | len | room_hi | room_lo | channel | command | data... | checksum
//! ```
//!
//! `len` counts every byte after itself, checksum included. The checksum makes
//! the sum of bytes from `len` through the checksum zero modulo 256.

use crate::error::DecodeError;

/// Leading byte of a status frame
pub const STATUS_FRAME: u8 = b'S';

/// Smallest valid status frame: header, room, channel, command, checksum
const MIN_FRAME_LEN: usize = 7;

/// Bytes counted by `len` that are not data: room (2), channel, command, checksum
const FIXED_BODY_LEN: usize = 5;

/// Status commands the decoder understands
mod command {
    pub const OFF: u8 = 0x00;
    pub const SCENE_1: u8 = 0x03;
    pub const SCENE_4: u8 = 0x06;
    pub const SET_SCENE: u8 = 0x31;
    pub const SET_LEVEL: u8 = 0x34;
}

/// A channel reporting its own level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChannelStatus {
    pub room: u16,
    pub channel: u8,
    pub brightness: u8,
}

/// A room (or channel) switching to a scene
///
/// Scene 0 is "off".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SceneStatus {
    pub room: u16,
    pub channel: u8,
    pub scene: u8,
}

/// A decoded status broadcast
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatusMessage {
    Channel(ChannelStatus),
    Scene(SceneStatus),
}

impl StatusMessage {
    pub fn room(&self) -> u16 {
        match self {
            StatusMessage::Channel(status) => status.room,
            StatusMessage::Scene(status) => status.room,
        }
    }

    pub fn channel(&self) -> u8 {
        match self {
            StatusMessage::Channel(status) => status.channel,
            StatusMessage::Scene(status) => status.channel,
        }
    }
}

impl From<ChannelStatus> for StatusMessage {
    fn from(status: ChannelStatus) -> Self {
        StatusMessage::Channel(status)
    }
}

impl From<SceneStatus> for StatusMessage {
    fn from(status: SceneStatus) -> Self {
        StatusMessage::Scene(status)
    }
}

/// Any datagram received from the bridge
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message {
    /// A channel or scene status broadcast
    Status(StatusMessage),
    /// A well-formed frame carrying something other than a status update
    Other { frame: u8, command: Option<u8> },
}

/// Decode one datagram received on the status port
pub fn decode_datagram(bytes: &[u8]) -> Result<Message, DecodeError> {
    let Some(&frame) = bytes.first() else {
        return Err(DecodeError::TooShort { len: 0 });
    };
    if frame != STATUS_FRAME {
        return Ok(Message::Other {
            frame,
            command: None,
        });
    }

    if bytes.len() < MIN_FRAME_LEN {
        return Err(DecodeError::TooShort { len: bytes.len() });
    }

    let declared = bytes[1] as usize;
    let actual = bytes.len() - 2;
    if declared != actual {
        return Err(DecodeError::LengthMismatch { declared, actual });
    }

    let sum = bytes[1..].iter().fold(0u8, |acc, b| acc.wrapping_add(*b));
    if sum != 0 {
        return Err(DecodeError::BadChecksum { sum });
    }

    let room = u16::from_be_bytes([bytes[2], bytes[3]]);
    let channel = bytes[4];
    let command = bytes[5];
    let data = &bytes[6..6 + (declared - FIXED_BODY_LEN)];

    let scene_message = |scene| {
        Message::Status(StatusMessage::Scene(SceneStatus {
            room,
            channel,
            scene,
        }))
    };

    let message = match command {
        command::OFF => scene_message(0),
        command::SCENE_1..=command::SCENE_4 => scene_message(command - command::SCENE_1 + 1),
        command::SET_SCENE => scene_message(data_value(data, command)?),
        command::SET_LEVEL => Message::Status(StatusMessage::Channel(ChannelStatus {
            room,
            channel,
            brightness: data_value(data, command)?,
        })),
        other => Message::Other {
            frame,
            command: Some(other),
        },
    };

    Ok(message)
}

/// Value byte of a command payload: `[flags, value]`
fn data_value(data: &[u8], command: u8) -> Result<u8, DecodeError> {
    data.get(1)
        .copied()
        .ok_or(DecodeError::MissingData { command })
}

/// Encode a status frame, computing the length and checksum bytes
///
/// The bridge is the only real producer of these frames; this is used by
/// simulators and tests.
pub fn encode_status_frame(room: u16, channel: u8, command: u8, data: &[u8]) -> Vec<u8> {
    let [room_hi, room_lo] = room.to_be_bytes();
    let len = (FIXED_BODY_LEN + data.len()) as u8;

    let mut frame = Vec::with_capacity(2 + len as usize);
    frame.extend_from_slice(&[STATUS_FRAME, len, room_hi, room_lo, channel, command]);
    frame.extend_from_slice(data);

    let sum = frame[1..].iter().fold(0u8, |acc, b| acc.wrapping_add(*b));
    frame.push(sum.wrapping_neg());
    frame
}
