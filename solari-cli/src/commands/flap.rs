use crate::LinkOptions;
use anyhow::{Context, Result};
use solari_core::{session::Flap, Session, Side};

/// Advance unit `flapid` of `side` by one flap
pub fn execute(link: &LinkOptions, device: &str, flapid: usize, side: Side) -> Result<()> {
    let flap = Flap::new(&link.profile, side, flapid).context("Cannot flap this unit")?;
    let mut session = Session::Flap(flap);
    super::run_session(link, device, Some(side), &mut session)?;
    Ok(())
}
