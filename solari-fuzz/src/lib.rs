//! Fuzz entry points for solari-core's receive path
//!
//! Each function takes arbitrary bytes and must never panic. Wire them into
//! a cargo-fuzz target with `fuzz_target!(|data: &[u8]| fuzz_receiver(data));`.

use solari_core::{
    codec::ContentCodec, decoder::decode_frame, receiver::FrameReceiver, Profile,
};
use std::time::{Duration, Instant};

/// Feed `data` through the receiver, decoding every extracted frame
///
/// The first byte of every chunk of 32 decides whether the chunk arrives
/// after a gap long enough to trigger the receive timeout.
pub fn fuzz_receiver(data: &[u8]) {
    let mut receiver = FrameReceiver::new();
    let mut now = Instant::now();

    for chunk in data.chunks(32) {
        if chunk[0] & 0x80 != 0 {
            now += Duration::from_millis(250);
        }
        for frame in receiver.extend_at(chunk, now) {
            let _ = decode_frame(frame);
        }
    }
}

/// Strictly decode `data` as one frame
pub fn fuzz_decode_frame(data: &[u8]) {
    let _ = decode_frame(data.to_vec().into());
}

/// Render `data` as unit codes of the built-in panel
pub fn fuzz_decode_units(data: &[u8]) {
    let profile = Profile::solari_26();
    let _ = ContentCodec::new(&profile).decode(data);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fuzz_receiver_empty() {
        fuzz_receiver(&[]);
    }

    #[test]
    fn test_fuzz_receiver_magic_flood() {
        fuzz_receiver(&[0xB7; 1024]);
    }

    #[test]
    fn test_fuzz_decode_frame_short() {
        fuzz_decode_frame(&[]);
        fuzz_decode_frame(&[0xB7, 0xFF]);
    }

    #[test]
    fn test_fuzz_decode_units_random() {
        fuzz_decode_units(&[0xFF; 64]);
        fuzz_decode_units(&[0x12, 0x34, 0x56, 0x78]);
    }
}
