//! Frame decoding (strict mode)

use crate::constants::{FRAME_OVERHEAD, RECEIVE_MAGIC};
use crate::error::SolariError;
use crate::types::Frame;
use bytes::Bytes;

/// XOR of every byte in `data`
///
/// A well-formed frame, checksum byte included, folds to zero.
pub fn xor_checksum(data: &[u8]) -> u8 {
    data.iter().fold(0, |acc, &byte| acc ^ byte)
}

/// Decode a candidate frame received from the panel
///
/// `data` must hold exactly one frame. Validates:
/// - the inbound magic byte
/// - the declared length against the actual size
/// - the XOR checksum
pub fn decode_frame(data: Bytes) -> Result<Frame, SolariError> {
    decode_frame_with_magic(data, RECEIVE_MAGIC)
}

/// Decode a frame whose first byte must be `magic`
///
/// Lets host-side tooling re-read frames it produced itself.
pub fn decode_frame_with_magic(data: Bytes, magic: u8) -> Result<Frame, SolariError> {
    if data.len() < FRAME_OVERHEAD {
        return Err(SolariError::IncompleteFrame {
            expected: FRAME_OVERHEAD,
            actual: data.len(),
        });
    }

    if data[0] != magic {
        return Err(SolariError::BadMagic {
            expected: magic,
            actual: data[0],
        });
    }

    let expected = data[1] as usize + FRAME_OVERHEAD;
    if data.len() != expected {
        return Err(SolariError::IncompleteFrame {
            expected,
            actual: data.len(),
        });
    }

    let residue = xor_checksum(&data);
    if residue != 0 {
        return Err(SolariError::ChecksumMismatch(residue));
    }

    Ok(Frame {
        msg_type: data[2],
        payload: data.slice(3..expected - 1),
    })
}
