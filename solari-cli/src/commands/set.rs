use crate::LinkOptions;
use anyhow::{Context, Result};
use solari_core::{session::SetPositions, Content, Session, Side};
use tracing::info;

/// Show `content` on `side` of the panel behind `device`
pub fn execute(
    link: &LinkOptions,
    device: &str,
    side: Side,
    content: &Content,
    wait: bool,
) -> Result<()> {
    let set = SetPositions::new(&link.profile, content, side, wait)
        .context("Content cannot be shown on this panel")?;
    info!("Setting side {} of {}", side, device);
    run(link, device, side, set)
}

/// Blank every unit of `side`
pub fn reset(link: &LinkOptions, device: &str, side: Side, wait: bool) -> Result<()> {
    let set = SetPositions::reset(&link.profile, side, wait)?;
    info!("Resetting side {} of {}", side, device);
    run(link, device, side, set)
}

fn run(link: &LinkOptions, device: &str, side: Side, set: SetPositions) -> Result<()> {
    let mut session = Session::SetPositions(set);
    super::run_session(link, device, Some(side), &mut session)?;
    Ok(())
}
