use crate::LinkOptions;
use anyhow::Result;
use solari_core::{session::Monitor, Session, Side};
use std::time::Duration;
use tracing::info;

/// Watch panel traffic until the channel closes
///
/// Only returns with an error: the monitor itself never finishes.
pub fn execute(
    link: &LinkOptions,
    device: &str,
    side: Option<Side>,
    summary_secs: u64,
) -> Result<()> {
    match side {
        Some(side) => info!("Watching side {} of {}", side, device),
        None => info!("Watching both sides of {}", device),
    }

    let mut session = Session::Loop(Monitor::new(Duration::from_secs(summary_secs)));
    super::run_session(link, device, side, &mut session)?;
    Ok(())
}
