//! Error types for Solari panel operations

/// Errors that can occur while talking to a Solari panel
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SolariError {
    /// Frame does not start with the expected direction marker
    #[error("Invalid magic byte: expected {expected:#04x}, got {actual:#04x}")]
    BadMagic {
        /// The magic byte expected for this direction.
        expected: u8,
        /// The byte actually found.
        actual: u8,
    },

    /// Frame is shorter or longer than its length byte declares
    #[error("Incomplete frame: expected {expected} bytes, got {actual}")]
    IncompleteFrame {
        /// The number of bytes the length byte implies.
        expected: usize,
        /// The number of bytes actually present.
        actual: usize,
    },

    /// XOR over the whole frame is not zero
    #[error("Checksum mismatch: frame xor is {0:#04x}, expected 0x00")]
    ChecksumMismatch(u8),

    /// Positions payload carries a different number of units than configured
    #[error("Unit count mismatch: expected {expected} units, got {actual}")]
    LengthMismatch {
        /// The installation's unit count.
        expected: usize,
        /// The number of units carried by the frame.
        actual: usize,
    },

    /// Message type byte is not one this host understands
    #[error("Unknown message type: {0:#04x}")]
    UnknownMessageType(u8),

    /// Outgoing payload does not fit the one-byte length field
    #[error("Payload size {0} exceeds maximum {1}")]
    PayloadTooLarge(usize, usize),

    /// A content field cannot be expressed on this installation
    #[error("Invalid {field}: {reason}")]
    InvalidContentField {
        /// Name of the offending content field.
        field: &'static str,
        /// What was wrong with it.
        reason: String,
    },

    /// Installation profile is internally inconsistent
    #[error("Invalid installation profile: {0}")]
    InvalidProfile(String),

    /// The byte channel reported end of stream
    #[error("Channel closed")]
    ChannelClosed,

    /// IO error during read/write
    #[error("IO error: {0}")]
    Io(String),
}

impl SolariError {
    pub(crate) fn content(field: &'static str, reason: impl Into<String>) -> Self {
        SolariError::InvalidContentField {
            field,
            reason: reason.into(),
        }
    }
}

impl From<std::io::Error> for SolariError {
    fn from(err: std::io::Error) -> Self {
        if err.kind() == std::io::ErrorKind::UnexpectedEof {
            SolariError::ChannelClosed
        } else {
            SolariError::Io(err.to_string())
        }
    }
}
