//! Core types for Solari frames and display content

use crate::constants::{SideFlags, UNKNOWN_POSITION};
use crate::error::SolariError;
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Deref;
use std::str::FromStr;

/// One of the two independently addressable flap matrices of a panel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    /// Side A (side bit clear)
    A,
    /// Side B (side bit set)
    B,
}

impl Side {
    /// Side encoded in the low bit of a flags byte
    pub const fn from_flags(flags: SideFlags) -> Self {
        if flags.is_side_b() {
            Side::B
        } else {
            Side::A
        }
    }

    /// Wire value used as the side prefix of host commands
    pub const fn as_u8(&self) -> u8 {
        match self {
            Side::A => 0,
            Side::B => 1,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::A => f.write_str("A"),
            Side::B => f.write_str("B"),
        }
    }
}

impl FromStr for Side {
    type Err = SolariError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "a" => Ok(Side::A),
            "b" => Ok(Side::B),
            other => Err(SolariError::content("side", format!("'{other}' is not A or B"))),
        }
    }
}

/// A checksum-valid frame received from the panel
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// Message type byte
    pub msg_type: u8,

    /// Payload without length, type and checksum
    pub payload: Bytes,
}

/// Unit codes of a whole side, one byte per flap unit
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FlapUnits(Vec<u8>);

impl FlapUnits {
    /// Wrap raw unit codes
    pub fn new(codes: Vec<u8>) -> Self {
        Self(codes)
    }

    /// All units blank
    pub fn blank(count: usize) -> Self {
        Self(vec![0; count])
    }

    /// All units in the not-yet-reported state
    pub fn unknown(count: usize) -> Self {
        Self(vec![UNKNOWN_POSITION; count])
    }

    /// True once the controller knows the position of every unit
    pub fn is_initialized(&self) -> bool {
        self.0.iter().all(|&code| code != UNKNOWN_POSITION)
    }

    /// Unwrap into the raw codes
    pub fn into_vec(self) -> Vec<u8> {
        self.0
    }
}

impl Deref for FlapUnits {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        &self.0
    }
}

impl From<Vec<u8>> for FlapUnits {
    fn from(codes: Vec<u8>) -> Self {
        Self(codes)
    }
}

/// Decoded POS or TARGET message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PositionsReport {
    /// Side the units belong to
    pub side: Side,

    /// Controller reports all units at their target (POS only)
    pub target_reached: bool,

    /// Unit codes
    pub units: FlapUnits,
}

impl PositionsReport {
    /// Split a POS/TARGET payload into its flags byte and units
    pub fn from_payload(payload: &[u8]) -> Result<Self, SolariError> {
        let (&flags, units) = payload.split_first().ok_or(SolariError::IncompleteFrame {
            expected: 1,
            actual: 0,
        })?;
        let flags = SideFlags::new(flags);
        Ok(Self {
            side: Side::from_flags(flags),
            target_reached: flags.target_reached(),
            units: FlapUnits::new(units.to_vec()),
        })
    }
}

/// Train number as written in content files: integer or digit string
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TrainNumber {
    /// `"num": 12345`
    Number(u32),
    /// `"num": "12345"`
    Text(String),
}

impl From<u32> for TrainNumber {
    fn from(num: u32) -> Self {
        TrainNumber::Number(num)
    }
}

impl From<&str> for TrainNumber {
    fn from(num: &str) -> Self {
        TrainNumber::Text(num.to_owned())
    }
}

/// Delay as written in content files: minutes, `"H:MM"`, digit string or keyword
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DelayInput {
    /// `"delay": 15`
    Minutes(u32),
    /// `"delay": "0:15"`, `"delay": "15"` or `"delay": "BUS"`
    Text(String),
}

impl From<u32> for DelayInput {
    fn from(minutes: u32) -> Self {
        DelayInput::Minutes(minutes)
    }
}

impl From<&str> for DelayInput {
    fn from(text: &str) -> Self {
        DelayInput::Text(text.to_owned())
    }
}

/// Human-meaningful content of one panel side
///
/// Field names follow the JSON content files consumed by the panel tools.
/// Every field is optional; absent fields render as blank flaps.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Content {
    /// Train type name, looked up in the profile's type table
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub train_type: Option<String>,

    /// Train number, at most as many digits as the profile has numerals
    #[serde(skip_serializing_if = "Option::is_none")]
    pub num: Option<TrainNumber>,

    /// Show the train number highlighted
    pub num_red: bool,

    /// Destination text
    #[serde(rename = "final", skip_serializing_if = "Option::is_none")]
    pub destination: Option<String>,

    /// Name from the first direction table
    #[serde(skip_serializing_if = "Option::is_none")]
    pub direction1: Option<String>,

    /// Name from the second direction table
    #[serde(skip_serializing_if = "Option::is_none")]
    pub direction2: Option<String>,

    /// Departure time, `"H:MM"`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time: Option<String>,

    /// Delay
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delay: Option<DelayInput>,
}

/// Best-effort reading of a unit snapshot, for diagnostics only
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ContentExplanation {
    /// Train type name, empty when blank
    #[serde(rename = "type")]
    pub train_type: String,

    /// Train number as shown by the numerals
    pub num: u32,

    /// Any numeral shows its highlighted variant
    pub num_red: bool,

    /// Destination text, space padded
    #[serde(rename = "final")]
    pub destination: String,

    /// First direction name
    pub direction1: String,

    /// Second direction name
    pub direction2: String,

    /// Departure time, empty when blank
    pub time: String,

    /// Delay text, empty when blank
    pub delay: String,
}

impl fmt::Display for ContentExplanation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let red = if self.num_red { " (red)" } else { "" };
        write!(
            f,
            "type='{}' num={}{} final='{}' direction1='{}' direction2='{}' time='{}' delay='{}'",
            self.train_type,
            self.num,
            red,
            self.destination,
            self.direction1,
            self.direction2,
            self.time,
            self.delay
        )
    }
}
