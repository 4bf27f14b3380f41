//! # Solari Core
//!
//! Host-side protocol engine for Solari split-flap platform panels.
//!
//! ## Modules
//!
//! - `constants`: Magic bytes, message types and timing
//! - `types`: Core types (Frame, FlapUnits, Content, Side)
//! - `encoder`: Frame encoding and the outbound link
//! - `decoder`: Strict frame decoding
//! - `receiver`: Resynchronizing receive-side framing
//! - `profile`: Installation unit layout and vocabulary
//! - `codec`: Content encoding and diagnostic decoding
//! - `delay`: Delay quantization
//! - `dispatcher`: Frame validation and routing
//! - `session`: Per-operation state machines
//! - `channel`: Byte channel abstraction
//! - `driver`: The blocking control loop

#![warn(missing_docs)]

pub mod channel;
pub mod codec;
pub mod constants;
pub mod decoder;
pub mod delay;
pub mod dispatcher;
pub mod driver;
pub mod encoder;
pub mod error;
pub mod profile;
pub mod receiver;
pub mod session;
pub mod types;

// Re-export commonly used types
pub use error::SolariError;
pub use profile::Profile;
pub use session::{Session, SessionHandler, Step};
pub use types::{Content, ContentExplanation, FlapUnits, Frame, Side};

/// Result type alias for Solari operations
pub type Result<T> = core::result::Result<T, SolariError>;
