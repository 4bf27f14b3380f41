//! Byte channel to the panel controller

use crate::error::SolariError;
use std::io::{ErrorKind, Read, Write};

/// Blocking, byte-reliable link to the panel
///
/// End of stream is reported as [`SolariError::ChannelClosed`] and is fatal.
pub trait ByteChannel {
    /// Block until the next byte arrives
    fn read_byte(&mut self) -> Result<u8, SolariError>;

    /// Write a whole frame
    fn write_all(&mut self, bytes: &[u8]) -> Result<(), SolariError>;
}

/// [`ByteChannel`] over any std I/O handle (serial device file, socket, pipe)
#[derive(Debug)]
pub struct IoChannel<T> {
    inner: T,
}

impl<T: Read + Write> IoChannel<T> {
    /// Wrap an open handle
    pub fn new(inner: T) -> Self {
        Self { inner }
    }

    /// Get the wrapped handle back
    pub fn into_inner(self) -> T {
        self.inner
    }
}

impl<T: Read + Write> ByteChannel for IoChannel<T> {
    fn read_byte(&mut self) -> Result<u8, SolariError> {
        let mut byte = [0u8; 1];
        loop {
            match self.inner.read(&mut byte) {
                Ok(0) => return Err(SolariError::ChannelClosed),
                Ok(_) => return Ok(byte[0]),
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        }
    }

    fn write_all(&mut self, bytes: &[u8]) -> Result<(), SolariError> {
        self.inner.write_all(bytes)?;
        self.inner.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_io_channel_reports_end_of_stream() {
        let mut channel = IoChannel::new(Cursor::new(vec![0xB7, 0x01]));
        assert_eq!(channel.read_byte(), Ok(0xB7));
        assert_eq!(channel.read_byte(), Ok(0x01));
        assert_eq!(channel.read_byte(), Err(SolariError::ChannelClosed));
    }

    #[test]
    fn test_io_channel_writes_through() {
        let mut channel = IoChannel::new(Cursor::new(Vec::new()));
        channel.write_all(&[0xCA, 0x00, 0x02, 0xC8]).unwrap();
        assert_eq!(channel.into_inner().into_inner(), vec![0xCA, 0x00, 0x02, 0xC8]);
    }
}
