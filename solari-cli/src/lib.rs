//! Library entry for solari-cli used by integration tests and embedding.

pub mod commands;

// Re-export commands for convenience
pub use commands::*;

use solari_core::{dispatcher::EchoOptions, Profile};

/// Settings shared by every subcommand that talks to a panel
#[derive(Debug, Clone)]
pub struct LinkOptions {
    /// Installation profile
    pub profile: Profile,

    /// Which received messages to echo
    pub echo: EchoOptions,
}
