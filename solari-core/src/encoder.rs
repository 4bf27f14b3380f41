//! Frame encoding and the outbound half of the link

use crate::channel::ByteChannel;
use crate::constants::{HostMessage, FRAME_OVERHEAD, MAX_PAYLOAD_SIZE, SEND_MAGIC};
use crate::decoder::xor_checksum;
use crate::error::SolariError;
use bytes::{BufMut, Bytes, BytesMut};

#[cfg(feature = "logging")]
use tracing::debug;

/// Encode a host command into bytes
///
/// The frame is encoded with the following layout:
/// 1. Magic (1 byte): `SEND_MAGIC`
/// 2. Payload length (1 byte)
/// 3. Message type (1 byte)
/// 4. Payload (variable length)
/// 5. Checksum (1 byte): XOR of all preceding bytes
pub fn encode_frame(msg: HostMessage, payload: &[u8]) -> Result<Bytes, SolariError> {
    encode_frame_with_magic(SEND_MAGIC, msg.as_u8(), payload)
}

/// Encode a frame with an arbitrary direction marker and type byte
///
/// Used for the device direction when simulating a panel.
pub fn encode_frame_with_magic(
    magic: u8,
    msg_type: u8,
    payload: &[u8],
) -> Result<Bytes, SolariError> {
    if payload.len() > MAX_PAYLOAD_SIZE {
        return Err(SolariError::PayloadTooLarge(payload.len(), MAX_PAYLOAD_SIZE));
    }

    let mut buf = BytesMut::with_capacity(payload.len() + FRAME_OVERHEAD);
    buf.put_u8(magic);
    buf.put_u8(payload.len() as u8);
    buf.put_u8(msg_type);
    buf.put_slice(payload);

    let checksum = xor_checksum(&buf);
    buf.put_u8(checksum);

    Ok(buf.freeze())
}

/// Anything a session can hand an outgoing command to
pub trait Transmit {
    /// Frame and send one command
    fn send(&mut self, msg: HostMessage, payload: &[u8]) -> Result<(), SolariError>;
}

/// Serializes commands onto a [`ByteChannel`]
pub struct FrameSender<'a, C: ?Sized> {
    channel: &'a mut C,
}

impl<'a, C: ByteChannel + ?Sized> FrameSender<'a, C> {
    /// Borrow the channel for sending
    pub fn new(channel: &'a mut C) -> Self {
        Self { channel }
    }
}

impl<C: ByteChannel + ?Sized> Transmit for FrameSender<'_, C> {
    fn send(&mut self, msg: HostMessage, payload: &[u8]) -> Result<(), SolariError> {
        let frame = encode_frame(msg, payload)?;

        #[cfg(feature = "logging")]
        debug!("< Send {:?}: {:02x?}", msg, &frame[..]);

        self.channel.write_all(&frame)
    }
}
