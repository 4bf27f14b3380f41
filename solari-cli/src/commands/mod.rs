//! Subcommand implementations and the loaders they share

pub mod encode;
pub mod flap;
pub mod monitor;
pub mod set;
pub mod state;

use crate::LinkOptions;
use anyhow::{Context, Result};
use solari_core::{
    channel::IoChannel, dispatcher::Dispatcher, driver, receiver::ReceiveStats, Content, Profile,
    Session, Side,
};
use std::fs::{self, File, OpenOptions};
use std::io::{self, Read};
use tracing::{debug, info};

/// Load an installation profile, or the built-in 26-unit one
pub fn load_profile(path: Option<&str>) -> Result<Profile> {
    let Some(path) = path else {
        return Ok(Profile::solari_26());
    };

    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read profile file: {}", path))?;
    let profile: Profile = serde_json::from_str(&text)
        .with_context(|| format!("Failed to parse profile file: {}", path))?;
    profile
        .validate()
        .with_context(|| format!("Invalid profile: {}", path))?;

    info!("Using profile '{}' ({} units)", profile.name, profile.unit_count);
    Ok(profile)
}

/// Load content from a JSON file, or from stdin when `path` is `None` or `-`
pub fn load_content(path: Option<&str>) -> Result<Content> {
    let text = match path {
        None | Some("-") => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read content from stdin")?;
            buf
        }
        Some(path) => fs::read_to_string(path)
            .with_context(|| format!("Failed to read content file: {}", path))?,
    };
    parse_content(&text)
}

/// Parse one content JSON object
pub fn parse_content(text: &str) -> Result<Content> {
    serde_json::from_str(text).context("Failed to parse content JSON")
}

/// Serial line settings the panel controller expects
pub const LINE_SETTINGS: &str = "115200 baud, 8N1, raw";

/// Open the serial device for reading and writing
///
/// The device is opened as a plain file; the line must already run at
/// 115200 baud, 8 data bits, no parity, 1 stop bit in raw mode, e.g.
/// `stty -F /dev/ttyUSB0 115200 cs8 -parenb -cstopb raw`.
pub fn open_device(device: &str) -> Result<IoChannel<File>> {
    let file = OpenOptions::new()
        .read(true)
        .write(true)
        .open(device)
        .with_context(|| {
            format!("Failed to open device: {} (line must be {})", device, LINE_SETTINGS)
        })?;
    debug!("Opened {} (expecting {})", device, LINE_SETTINGS);
    Ok(IoChannel::new(file))
}

/// Open `device` and run `session` to completion
pub fn run_session(
    link: &LinkOptions,
    device: &str,
    side: Option<Side>,
    session: &mut Session,
) -> Result<ReceiveStats> {
    let mut channel = open_device(device)?;
    let dispatcher = Dispatcher::new(link.profile.clone())
        .with_side(side)
        .with_echo(link.echo);

    let stats = driver::run(&mut channel, &dispatcher, session)
        .with_context(|| format!("Session on {} failed", device))?;
    debug!(
        "Received {} bytes, discarded {}, {} frames",
        stats.bytes_received, stats.bytes_discarded, stats.frames_extracted
    );
    Ok(stats)
}
