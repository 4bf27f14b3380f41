//! Per-operation session state machines
//!
//! Exactly one session runs per process. The dispatcher hands it every
//! message for the selected side; a callback returning [`Step::Done`] ends
//! the run successfully.

use crate::codec::ContentCodec;
use crate::constants::HostMessage;
use crate::encoder::Transmit;
use crate::error::SolariError;
use crate::profile::Profile;
use crate::types::{Content, ContentExplanation, FlapUnits, PositionsReport, Side};
use serde::Serialize;
use std::time::{Duration, Instant};

#[cfg(feature = "logging")]
use tracing::{debug, info};

/// Outcome of a session callback
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// Keep reading
    Continue,
    /// Goal reached; stop with success
    Done,
}

/// Callbacks a session receives from the dispatcher
pub trait SessionHandler {
    /// A POS message arrived
    fn received_positions(
        &mut self,
        _report: &PositionsReport,
        _tx: &mut dyn Transmit,
    ) -> Result<Step, SolariError> {
        Ok(Step::Continue)
    }

    /// A TARGET message arrived
    fn received_target(
        &mut self,
        _report: &PositionsReport,
        _tx: &mut dyn Transmit,
    ) -> Result<Step, SolariError> {
        Ok(Step::Continue)
    }

    /// A SENS message arrived; `sensors` is passed through uninterpreted
    fn received_sensors(
        &mut self,
        _sensors: &[u8],
        _side: Side,
        _tx: &mut dyn Transmit,
    ) -> Result<Step, SolariError> {
        Ok(Step::Continue)
    }

    /// Called once per received byte, after dispatching
    fn tick(&mut self, _now: Instant, _tx: &mut dyn Transmit) -> Result<Step, SolariError> {
        Ok(Step::Continue)
    }
}

/// The operation requested for this run
#[derive(Debug)]
pub enum Session {
    /// Show content (or blank the panel) on one side
    SetPositions(SetPositions),
    /// Advance one unit by a single flap
    Flap(Flap),
    /// Dump current and target state of a side
    State(StateDump),
    /// Watch traffic until killed
    Loop(Monitor),
}

impl SessionHandler for Session {
    fn received_positions(
        &mut self,
        report: &PositionsReport,
        tx: &mut dyn Transmit,
    ) -> Result<Step, SolariError> {
        match self {
            Session::SetPositions(s) => s.received_positions(report, tx),
            Session::Flap(s) => s.received_positions(report, tx),
            Session::State(s) => s.received_positions(report, tx),
            Session::Loop(s) => s.received_positions(report, tx),
        }
    }

    fn received_target(
        &mut self,
        report: &PositionsReport,
        tx: &mut dyn Transmit,
    ) -> Result<Step, SolariError> {
        match self {
            Session::SetPositions(s) => s.received_target(report, tx),
            Session::Flap(s) => s.received_target(report, tx),
            Session::State(s) => s.received_target(report, tx),
            Session::Loop(s) => s.received_target(report, tx),
        }
    }

    fn received_sensors(
        &mut self,
        sensors: &[u8],
        side: Side,
        tx: &mut dyn Transmit,
    ) -> Result<Step, SolariError> {
        match self {
            Session::SetPositions(s) => s.received_sensors(sensors, side, tx),
            Session::Flap(s) => s.received_sensors(sensors, side, tx),
            Session::State(s) => s.received_sensors(sensors, side, tx),
            Session::Loop(s) => s.received_sensors(sensors, side, tx),
        }
    }

    fn tick(&mut self, now: Instant, tx: &mut dyn Transmit) -> Result<Step, SolariError> {
        match self {
            Session::SetPositions(s) => s.tick(now, tx),
            Session::Flap(s) => s.tick(now, tx),
            Session::State(s) => s.tick(now, tx),
            Session::Loop(s) => s.tick(now, tx),
        }
    }
}

/// Sends a full set of target positions once the panel is initialized
#[derive(Debug)]
pub struct SetPositions {
    side: Side,
    target: FlapUnits,
    wait: bool,
    sent: bool,
}

impl SetPositions {
    /// Prepare to show `content` on `side`
    ///
    /// The content is encoded here so invalid fields are reported before
    /// the channel is touched. With `wait`, the session only finishes once
    /// the panel reports the target positions.
    pub fn new(
        profile: &Profile,
        content: &Content,
        side: Side,
        wait: bool,
    ) -> Result<Self, SolariError> {
        let target = ContentCodec::new(profile).encode(content)?;
        Ok(Self {
            side,
            target,
            wait,
            sent: false,
        })
    }

    /// Prepare to blank every unit of `side`
    pub fn reset(profile: &Profile, side: Side, wait: bool) -> Result<Self, SolariError> {
        Self::new(profile, &Content::default(), side, wait)
    }

    /// Positions that will be (or were) sent
    pub fn target(&self) -> &FlapUnits {
        &self.target
    }

    /// Check if SET_ALL went out
    pub fn is_sent(&self) -> bool {
        self.sent
    }
}

impl SessionHandler for SetPositions {
    fn received_positions(
        &mut self,
        report: &PositionsReport,
        tx: &mut dyn Transmit,
    ) -> Result<Step, SolariError> {
        if !self.sent {
            if !report.units.is_initialized() {
                #[cfg(feature = "logging")]
                debug!("Waiting for device initialized...");
                return Ok(Step::Continue);
            }

            #[cfg(feature = "logging")]
            info!("Sending positions: {:?} ...", &self.target[..]);

            let mut payload = Vec::with_capacity(self.target.len() + 1);
            payload.push(self.side.as_u8());
            payload.extend_from_slice(&self.target);
            tx.send(HostMessage::SetAll, &payload)?;
            self.sent = true;

            if !self.wait {
                #[cfg(feature = "logging")]
                info!("Finished");
                return Ok(Step::Done);
            }

            #[cfg(feature = "logging")]
            info!("Waiting for positions reached...");
            return Ok(Step::Continue);
        }

        if report.units == self.target {
            #[cfg(feature = "logging")]
            info!("Finished");
            return Ok(Step::Done);
        }
        Ok(Step::Continue)
    }
}

/// Advances a single unit by one flap
#[derive(Debug)]
pub struct Flap {
    side: Side,
    unit: u8,
    sent: bool,
}

impl Flap {
    /// Prepare to flap `unit` on `side`
    pub fn new(profile: &Profile, side: Side, unit: usize) -> Result<Self, SolariError> {
        if unit >= profile.unit_count {
            return Err(SolariError::content(
                "flapid",
                format!("unit {unit} outside 0..{}", profile.unit_count),
            ));
        }
        #[cfg(feature = "logging")]
        info!("Waiting for device initialized...");

        Ok(Self {
            side,
            unit: unit as u8,
            sent: false,
        })
    }

    /// Check if the FLAP command went out
    pub fn is_sent(&self) -> bool {
        self.sent
    }
}

impl SessionHandler for Flap {
    fn received_positions(
        &mut self,
        report: &PositionsReport,
        tx: &mut dyn Transmit,
    ) -> Result<Step, SolariError> {
        if report.units.is_initialized() && !self.sent {
            #[cfg(feature = "logging")]
            info!("Sending flap...");

            tx.send(HostMessage::Flap, &[self.side.as_u8(), self.unit])?;
            self.sent = true;
        }
        Ok(Step::Continue)
    }

    fn received_target(
        &mut self,
        _report: &PositionsReport,
        _tx: &mut dyn Transmit,
    ) -> Result<Step, SolariError> {
        if self.sent {
            #[cfg(feature = "logging")]
            info!("Flap sent.");
            return Ok(Step::Done);
        }
        Ok(Step::Continue)
    }
}

/// One side's units together with their reading
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Snapshot {
    /// Side the units belong to
    pub side: Side,

    /// Controller reported all units at target (current positions only)
    pub target_reached: bool,

    /// Raw unit codes
    pub units: FlapUnits,

    /// Decoded content
    pub content: ContentExplanation,
}

/// Collects current and target positions of a side and dumps both
///
/// Without a side given up front, the first POS report picks the side;
/// reports for the other side are ignored from then on.
#[derive(Debug)]
pub struct StateDump {
    profile: Profile,
    side: Option<Side>,
    current: Option<Snapshot>,
    target: Option<Snapshot>,
}

impl StateDump {
    /// Prepare a dump of `side` (or the first reporting side) decoded with `profile`
    pub fn new(profile: Profile, side: Option<Side>) -> Self {
        Self {
            profile,
            side,
            current: None,
            target: None,
        }
    }

    /// Side being dumped, once known
    pub fn side(&self) -> Option<Side> {
        self.side
    }

    /// Last reported current positions
    pub fn current(&self) -> Option<&Snapshot> {
        self.current.as_ref()
    }

    /// Last reported target positions
    pub fn target(&self) -> Option<&Snapshot> {
        self.target.as_ref()
    }

    fn snapshot(&self, report: &PositionsReport, target_reached: bool) -> Snapshot {
        Snapshot {
            side: report.side,
            target_reached,
            units: report.units.clone(),
            content: ContentCodec::new(&self.profile).decode(&report.units),
        }
    }

    #[cfg(feature = "logging")]
    fn dump(&self) {
        if let (Some(current), Some(target)) = (&self.current, &self.target) {
            info!(
                "Side {} current (target reached: {}): {}",
                current.side, current.target_reached, current.content
            );
            info!("Side {} target: {}", target.side, target.content);
        }
    }

    #[cfg(not(feature = "logging"))]
    fn dump(&self) {}
}

impl SessionHandler for StateDump {
    fn received_positions(
        &mut self,
        report: &PositionsReport,
        tx: &mut dyn Transmit,
    ) -> Result<Step, SolariError> {
        match self.side {
            Some(side) if side != report.side => return Ok(Step::Continue),
            Some(_) => {}
            None => self.side = Some(report.side),
        }
        self.current = Some(self.snapshot(report, report.target_reached));

        if self.target.is_some() {
            self.dump();
            return Ok(Step::Done);
        }

        tx.send(HostMessage::GetTarget, &[report.side.as_u8()])?;
        Ok(Step::Continue)
    }

    fn received_target(
        &mut self,
        report: &PositionsReport,
        _tx: &mut dyn Transmit,
    ) -> Result<Step, SolariError> {
        if self.side != Some(report.side) {
            #[cfg(feature = "logging")]
            debug!("Ignoring target of side {}", report.side);
            return Ok(Step::Continue);
        }
        self.target = Some(self.snapshot(report, false));

        if self.current.is_some() {
            self.dump();
            return Ok(Step::Done);
        }
        Ok(Step::Continue)
    }
}

/// Message counters kept by [`Monitor`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MonitorStats {
    /// POS messages seen
    pub positions: usize,

    /// TARGET messages seen
    pub targets: usize,

    /// SENS messages seen
    pub sensors: usize,
}

/// Passive monitor; never finishes on its own
#[derive(Debug)]
pub struct Monitor {
    interval: Duration,
    last_summary: Option<Instant>,
    stats: MonitorStats,
}

impl Default for Monitor {
    fn default() -> Self {
        Self::new(Duration::from_secs(10))
    }
}

impl Monitor {
    /// Log a traffic summary at most once per `interval`
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last_summary: None,
            stats: MonitorStats::default(),
        }
    }

    /// Counters so far
    pub fn stats(&self) -> &MonitorStats {
        &self.stats
    }
}

impl SessionHandler for Monitor {
    fn received_positions(
        &mut self,
        _report: &PositionsReport,
        _tx: &mut dyn Transmit,
    ) -> Result<Step, SolariError> {
        self.stats.positions += 1;
        Ok(Step::Continue)
    }

    fn received_target(
        &mut self,
        _report: &PositionsReport,
        _tx: &mut dyn Transmit,
    ) -> Result<Step, SolariError> {
        self.stats.targets += 1;
        Ok(Step::Continue)
    }

    fn received_sensors(
        &mut self,
        _sensors: &[u8],
        _side: Side,
        _tx: &mut dyn Transmit,
    ) -> Result<Step, SolariError> {
        self.stats.sensors += 1;
        Ok(Step::Continue)
    }

    fn tick(&mut self, now: Instant, _tx: &mut dyn Transmit) -> Result<Step, SolariError> {
        match self.last_summary {
            None => self.last_summary = Some(now),
            Some(last) if now.saturating_duration_since(last) >= self.interval => {
                #[cfg(feature = "logging")]
                info!(
                    "Received {} positions, {} targets, {} sensor reports",
                    self.stats.positions, self.stats.targets, self.stats.sensors
                );
                self.last_summary = Some(now);
            }
            Some(_) => {}
        }
        Ok(Step::Continue)
    }
}
