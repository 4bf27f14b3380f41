//! Receive-side framing for the noisy serial line

use crate::constants::{FRAME_OVERHEAD, RECEIVE_MAGIC, RECEIVE_TIMEOUT};
use bytes::{Buf, BufMut, Bytes, BytesMut};
use std::time::{Duration, Instant};

#[cfg(feature = "logging")]
use tracing::debug;

/// Receiver statistics
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReceiveStats {
    /// Total bytes pushed into the receiver
    pub bytes_received: usize,

    /// Bytes thrown away by resync or timeout
    pub bytes_discarded: usize,

    /// Number of times a stale partial frame was dropped
    pub timeouts: usize,

    /// Number of candidate frames handed out
    pub frames_extracted: usize,
}

/// Turns a raw byte stream into candidate frames
///
/// The receiver:
/// 1. Drops a buffered partial frame when the line was silent for longer
///    than the timeout (the line is assumed desynchronized)
/// 2. Drops leading bytes until the buffer starts with the inbound magic
/// 3. Cuts complete frames using the declared length byte
///
/// Checksums are not checked here; see [`crate::decoder::decode_frame`].
#[derive(Debug)]
pub struct FrameReceiver {
    buffer: BytesMut,
    last_byte_at: Option<Instant>,
    timeout: Duration,
    stats: ReceiveStats,
}

impl Default for FrameReceiver {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameReceiver {
    /// Create a receiver with the protocol's 200 ms inter-byte timeout
    pub fn new() -> Self {
        Self::with_timeout(RECEIVE_TIMEOUT)
    }

    /// Create a receiver with a custom inter-byte timeout
    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            buffer: BytesMut::with_capacity(2 * (u8::MAX as usize + FRAME_OVERHEAD)),
            last_byte_at: None,
            timeout,
            stats: ReceiveStats::default(),
        }
    }

    /// Feed one byte received now
    pub fn push(&mut self, byte: u8) -> Vec<Bytes> {
        self.push_at(byte, Instant::now())
    }

    /// Feed one byte received at `now`
    ///
    /// Returns every frame completed by this byte, in stream order.
    pub fn push_at(&mut self, byte: u8, now: Instant) -> Vec<Bytes> {
        if let Some(last) = self.last_byte_at {
            if !self.buffer.is_empty() && now.saturating_duration_since(last) > self.timeout {
                #[cfg(feature = "logging")]
                debug!("Clearing {} buffered bytes, timeout!", self.buffer.len());

                self.stats.timeouts += 1;
                self.stats.bytes_discarded += self.buffer.len();
                self.buffer.clear();
            }
        }
        self.last_byte_at = Some(now);

        self.buffer.put_u8(byte);
        self.stats.bytes_received += 1;
        self.resync();

        let mut frames = Vec::new();
        while let Some(size) = self.complete_frame_size() {
            frames.push(self.buffer.split_to(size).freeze());
            self.stats.frames_extracted += 1;
            self.resync();
        }
        frames
    }

    /// Feed a burst of bytes that all arrived at `now`
    pub fn extend_at(&mut self, data: &[u8], now: Instant) -> Vec<Bytes> {
        data.iter()
            .flat_map(|&byte| self.push_at(byte, now))
            .collect()
    }

    /// Number of buffered bytes
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    /// Check if nothing is buffered
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Statistics collected so far
    pub fn stats(&self) -> &ReceiveStats {
        &self.stats
    }

    fn complete_frame_size(&self) -> Option<usize> {
        if self.buffer.len() < 2 {
            return None;
        }
        let size = self.buffer[1] as usize + FRAME_OVERHEAD;
        (self.buffer.len() >= size).then_some(size)
    }

    fn resync(&mut self) {
        let skip = memchr::memchr(RECEIVE_MAGIC, &self.buffer).unwrap_or(self.buffer.len());
        if skip > 0 {
            #[cfg(feature = "logging")]
            debug!("Popping {} bytes: {:02x?}", skip, &self.buffer[..skip]);

            self.stats.bytes_discarded += skip;
            self.buffer.advance(skip);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decoder::xor_checksum;

    fn device_frame(msg_type: u8, payload: &[u8]) -> Vec<u8> {
        let mut frame = vec![RECEIVE_MAGIC, payload.len() as u8, msg_type];
        frame.extend_from_slice(payload);
        frame.push(xor_checksum(&frame));
        frame
    }

    #[test]
    fn test_receive_clean_stream() {
        let now = Instant::now();
        let mut stream = device_frame(0x02, &[0, 1, 2]);
        stream.extend(device_frame(0x03, &[1, 4, 5]));

        let mut receiver = FrameReceiver::new();
        let frames = receiver.extend_at(&stream, now);

        assert_eq!(frames.len(), 2);
        assert_eq!(frames[0][2], 0x02);
        assert_eq!(frames[1][2], 0x03);
        assert!(receiver.is_empty());
        assert_eq!(receiver.stats().frames_extracted, 2);
    }

    #[test]
    fn test_receive_skips_leading_noise() {
        let now = Instant::now();
        let frame = device_frame(0x01, &[0, 0xAA]);

        let mut receiver = FrameReceiver::new();
        assert!(receiver.extend_at(&[0x00, 0x13, 0xCA, 0xFF], now).is_empty());
        assert!(receiver.is_empty());

        let frames = receiver.extend_at(&frame, now);
        assert_eq!(frames, vec![Bytes::from(frame)]);
        assert_eq!(receiver.stats().bytes_discarded, 4);
    }

    #[test]
    fn test_receive_does_not_check_checksum() {
        let now = Instant::now();
        let mut frame = device_frame(0x02, &[0, 9]);
        let last = frame.len() - 1;
        frame[last] ^= 0xFF;

        let mut receiver = FrameReceiver::new();
        assert_eq!(receiver.extend_at(&frame, now).len(), 1);
    }

    #[test]
    fn test_receive_timeout_clears_partial_frame() {
        let start = Instant::now();
        let frame = device_frame(0x02, &[0, 1, 2, 3]);
        let (head, tail) = frame.split_at(3);

        let mut receiver = FrameReceiver::new();
        assert!(receiver.extend_at(head, start).is_empty());
        assert_eq!(receiver.len(), 3);

        let later = start + Duration::from_millis(250);
        let frames = receiver.extend_at(tail, later);

        assert!(frames.is_empty());
        assert_eq!(receiver.stats().timeouts, 1);
    }

    #[test]
    fn test_receive_slow_but_within_timeout() {
        let mut at = Instant::now();
        let frame = device_frame(0x02, &[0, 1]);

        let mut receiver = FrameReceiver::new();
        let mut frames = Vec::new();
        for &byte in &frame {
            at += Duration::from_millis(150);
            frames.extend(receiver.push_at(byte, at));
        }
        assert_eq!(frames.len(), 1);
        assert_eq!(receiver.stats().timeouts, 0);
    }
}
