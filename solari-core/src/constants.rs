//! Wire constants for the Solari panel serial protocol

use std::time::Duration;

/// First byte of every frame sent by the panel controller
pub const RECEIVE_MAGIC: u8 = 0xB7;

/// First byte of every frame sent by the host
pub const SEND_MAGIC: u8 = 0xCA;

/// Bytes surrounding the payload: magic + length + type + checksum
pub const FRAME_OVERHEAD: usize = 4;

/// Largest payload the one-byte length field can announce
pub const MAX_PAYLOAD_SIZE: usize = u8::MAX as usize;

/// Silence after which a partially received frame is thrown away
pub const RECEIVE_TIMEOUT: Duration = Duration::from_millis(200);

/// Unit code reported while the controller does not yet know a unit's position
pub const UNKNOWN_POSITION: u8 = 0xFF;

/// Unit code of a blank flap
pub const BLANK: u8 = 0;

/// Messages sent from the host to the panel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostMessage {
    /// Request sensor state
    GetSensors,
    /// Request current positions
    GetPositions,
    /// Request target positions
    GetTarget,
    /// Advance a single unit by one flap
    Flap,
    /// Set the target of a single unit
    SetSingle,
    /// Set the target of all units of a side
    SetAll,
}

impl HostMessage {
    /// Wire value of the message type
    pub const fn as_u8(&self) -> u8 {
        match self {
            HostMessage::GetSensors => 0x01,
            HostMessage::GetPositions => 0x02,
            HostMessage::GetTarget => 0x03,
            HostMessage::Flap => 0x10,
            HostMessage::SetSingle => 0x11,
            HostMessage::SetAll => 0x12,
        }
    }
}

/// Messages sent from the panel to the host
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceMessage {
    /// Raw sensor flags
    Sensors,
    /// Current unit positions
    Positions,
    /// Target unit positions
    Target,
}

impl DeviceMessage {
    /// Classify a received message type byte
    pub const fn from_u8(msg_type: u8) -> Option<Self> {
        match msg_type {
            0x01 => Some(DeviceMessage::Sensors),
            0x02 => Some(DeviceMessage::Positions),
            0x03 => Some(DeviceMessage::Target),
            _ => None,
        }
    }

    /// Wire value of the message type
    pub const fn as_u8(&self) -> u8 {
        match self {
            DeviceMessage::Sensors => 0x01,
            DeviceMessage::Positions => 0x02,
            DeviceMessage::Target => 0x03,
        }
    }
}

/// First payload byte of POS, TARGET and SENS messages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SideFlags(u8);

impl SideFlags {
    /// Frame concerns side B (clear = side A)
    pub const SIDE_B: u8 = 0b0000_0001;

    /// All units of the side reached their target (POS only)
    pub const TARGET_REACHED: u8 = 0b0000_0010;

    /// Create flags from the raw byte
    pub const fn new(flags: u8) -> Self {
        Self(flags)
    }

    /// Get raw flags byte
    pub const fn as_u8(&self) -> u8 {
        self.0
    }

    /// Check if the side bit is set
    pub const fn is_side_b(&self) -> bool {
        (self.0 & Self::SIDE_B) != 0
    }

    /// Check if the target-reached bit is set
    pub const fn target_reached(&self) -> bool {
        (self.0 & Self::TARGET_REACHED) != 0
    }
}
