use crate::LinkOptions;
use anyhow::{anyhow, Result};
use colored::*;
use serde::Serialize;
use solari_core::{
    session::{Snapshot, StateDump},
    Session, Side,
};

/// Current and target state of one side
#[derive(Debug, Serialize)]
pub struct PanelState {
    /// Positions the panel shows now
    pub current: Snapshot,

    /// Positions the panel is moving to
    pub target: Snapshot,
}

/// Read current and target positions and print both
pub fn execute(link: &LinkOptions, device: &str, side: Option<Side>, json: bool) -> Result<()> {
    let mut session = Session::State(StateDump::new(link.profile.clone(), side));
    super::run_session(link, device, side, &mut session)?;

    let Session::State(dump) = session else {
        return Err(anyhow!("State session was replaced"));
    };
    let state = collect(&dump)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&state)?);
    } else {
        print!("{}", render(&state));
    }
    Ok(())
}

/// Pull both snapshots out of a finished dump
pub fn collect(dump: &StateDump) -> Result<PanelState> {
    match (dump.current(), dump.target()) {
        (Some(current), Some(target)) => Ok(PanelState {
            current: current.clone(),
            target: target.clone(),
        }),
        _ => Err(anyhow!("Panel did not report both current and target positions")),
    }
}

/// Human-readable state dump
pub fn render(state: &PanelState) -> String {
    let mut out = String::new();
    let reached = if state.current.target_reached {
        "✓ target reached".green()
    } else {
        "… moving".yellow()
    };

    out.push_str(&format!("\n=== Side {} ===\n", state.current.side));
    out.push_str(&format!("Status:  {}\n", reached));
    out.push_str(&format!("Current: {}\n", state.current.content));
    out.push_str(&format!("         {:?}\n", &state.current.units[..]));
    out.push_str(&format!("Target:  {}\n", state.target.content));
    out.push_str(&format!("         {:?}\n", &state.target.units[..]));

    let differing: Vec<usize> = state
        .current
        .units
        .iter()
        .zip(state.target.units.iter())
        .enumerate()
        .filter(|(_, (current, target))| current != target)
        .map(|(unit, _)| unit)
        .collect();
    if !differing.is_empty() {
        out.push_str(&format!(
            "{} {} units not at target: {:?}\n",
            "!".yellow(),
            differing.len(),
            differing
        ));
    }
    out
}
