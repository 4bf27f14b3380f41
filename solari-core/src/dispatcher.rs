//! Validates candidate frames and routes them to the session

use crate::constants::{DeviceMessage, SideFlags};
use crate::decoder::decode_frame;
use crate::encoder::Transmit;
use crate::error::SolariError;
use crate::profile::Profile;
use crate::session::{SessionHandler, Step};
use crate::types::{PositionsReport, Side};
use bytes::Bytes;

#[cfg(feature = "logging")]
use tracing::{debug, info, warn};

/// Which received messages to echo at info level
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EchoOptions {
    /// Print received positions
    pub positions: bool,
    /// Print received sensors
    pub sensors: bool,
    /// Print received targets
    pub target: bool,
}

/// Run-wide context: installation profile, side filter and echo options
///
/// Built once at startup and shared by every dispatched frame.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    profile: Profile,
    side: Option<Side>,
    echo: EchoOptions,
}

impl Dispatcher {
    /// Dispatch frames of both sides for `profile`
    pub fn new(profile: Profile) -> Self {
        Self {
            profile,
            side: None,
            echo: EchoOptions::default(),
        }
    }

    /// Drop frames of every side but `side` (`None` keeps both)
    pub fn with_side(mut self, side: Option<Side>) -> Self {
        self.side = side;
        self
    }

    /// Echo received messages
    pub fn with_echo(mut self, echo: EchoOptions) -> Self {
        self.echo = echo;
        self
    }

    /// Installation profile in use
    pub fn profile(&self) -> &Profile {
        &self.profile
    }

    /// Side filter in use
    pub fn side(&self) -> Option<Side> {
        self.side
    }

    /// Validate one candidate frame and hand it to `session`
    ///
    /// Frames with a bad checksum, a wrong unit count, an unknown type or
    /// for the other side are dropped and reported as `Step::Continue`.
    /// Only errors raised by the session itself (failed sends) propagate.
    pub fn dispatch<S: SessionHandler + ?Sized>(
        &self,
        candidate: Bytes,
        session: &mut S,
        tx: &mut dyn Transmit,
    ) -> Result<Step, SolariError> {
        let frame = match decode_frame(candidate.clone()) {
            Ok(frame) => frame,
            Err(_e) => {
                #[cfg(feature = "logging")]
                warn!("Dropping frame {:02x?}: {}", &candidate[..], _e);
                return Ok(Step::Continue);
            }
        };

        #[cfg(feature = "logging")]
        debug!("> Received: {:02x?}", &candidate[..]);

        let Some(kind) = DeviceMessage::from_u8(frame.msg_type) else {
            #[cfg(feature = "logging")]
            debug!("{}", SolariError::UnknownMessageType(frame.msg_type));
            return Ok(Step::Continue);
        };

        let Some((&flags, body)) = frame.payload.split_first() else {
            #[cfg(feature = "logging")]
            warn!("Dropping {:?} message without side byte", kind);
            return Ok(Step::Continue);
        };
        let side = Side::from_flags(SideFlags::new(flags));

        if self.side.is_some_and(|wanted| wanted != side) {
            #[cfg(feature = "logging")]
            debug!("Ignoring {:?} message for side {}", kind, side);
            return Ok(Step::Continue);
        }

        match kind {
            DeviceMessage::Positions | DeviceMessage::Target => {
                if body.len() != self.profile.unit_count {
                    #[cfg(feature = "logging")]
                    warn!(
                        "Dropping {:?} message: {}",
                        kind,
                        SolariError::LengthMismatch {
                            expected: self.profile.unit_count,
                            actual: body.len(),
                        }
                    );
                    return Ok(Step::Continue);
                }

                let report = PositionsReport::from_payload(&frame.payload)?;
                self.echo_received(kind, side, body);
                if kind == DeviceMessage::Positions {
                    session.received_positions(&report, tx)
                } else {
                    session.received_target(&report, tx)
                }
            }
            DeviceMessage::Sensors => {
                self.echo_received(kind, side, body);
                session.received_sensors(body, side, tx)
            }
        }
    }

    #[cfg(feature = "logging")]
    fn echo_received(&self, kind: DeviceMessage, side: Side, body: &[u8]) {
        match kind {
            DeviceMessage::Positions if self.echo.positions => {
                info!("Side: {} Positions: {:?}", side, body);
            }
            DeviceMessage::Target if self.echo.target => {
                info!("Side: {} Target: {:?}", side, body);
            }
            DeviceMessage::Sensors if self.echo.sensors => {
                let bits: Vec<String> = body.iter().map(|b| format!("{b:#010b}")).collect();
                info!("Side: {} Sensors: {}", side, bits.join(" "));
            }
            _ => {}
        }
    }

    #[cfg(not(feature = "logging"))]
    fn echo_received(&self, _kind: DeviceMessage, _side: Side, _body: &[u8]) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::{HostMessage, RECEIVE_MAGIC};
    use crate::encoder::encode_frame_with_magic;

    #[derive(Default)]
    struct Recorder {
        positions: Vec<PositionsReport>,
        targets: Vec<PositionsReport>,
        sensors: Vec<(Vec<u8>, Side)>,
    }

    impl SessionHandler for Recorder {
        fn received_positions(
            &mut self,
            report: &PositionsReport,
            _tx: &mut dyn Transmit,
        ) -> Result<Step, SolariError> {
            self.positions.push(report.clone());
            Ok(Step::Continue)
        }

        fn received_target(
            &mut self,
            report: &PositionsReport,
            _tx: &mut dyn Transmit,
        ) -> Result<Step, SolariError> {
            self.targets.push(report.clone());
            Ok(Step::Continue)
        }

        fn received_sensors(
            &mut self,
            sensors: &[u8],
            side: Side,
            _tx: &mut dyn Transmit,
        ) -> Result<Step, SolariError> {
            self.sensors.push((sensors.to_vec(), side));
            Ok(Step::Continue)
        }
    }

    struct NoSend;

    impl Transmit for NoSend {
        fn send(&mut self, _msg: HostMessage, _payload: &[u8]) -> Result<(), SolariError> {
            panic!("dispatcher must not send on its own");
        }
    }

    fn device(msg_type: u8, flags: u8, body: &[u8]) -> Bytes {
        let mut payload = vec![flags];
        payload.extend_from_slice(body);
        encode_frame_with_magic(RECEIVE_MAGIC, msg_type, &payload).unwrap()
    }

    #[test]
    fn test_routes_by_message_type() {
        let dispatcher = Dispatcher::new(Profile::solari_26());
        let mut session = Recorder::default();

        dispatcher
            .dispatch(device(0x02, 0b10, &[4; 26]), &mut session, &mut NoSend)
            .unwrap();
        dispatcher
            .dispatch(device(0x03, 0b01, &[5; 26]), &mut session, &mut NoSend)
            .unwrap();
        dispatcher
            .dispatch(device(0x01, 0b01, &[0xF0, 0x0F]), &mut session, &mut NoSend)
            .unwrap();

        assert_eq!(session.positions.len(), 1);
        assert!(session.positions[0].target_reached);
        assert_eq!(session.positions[0].side, Side::A);
        assert_eq!(session.targets[0].side, Side::B);
        assert_eq!(session.sensors, vec![(vec![0xF0, 0x0F], Side::B)]);
    }

    #[test]
    fn test_drops_invalid_frames() {
        let dispatcher = Dispatcher::new(Profile::solari_26());
        let mut session = Recorder::default();

        let mut corrupted = device(0x02, 0, &[4; 26]).to_vec();
        corrupted[5] ^= 0x40;
        let short = device(0x02, 0, &[4; 25]);
        let unknown = device(0x7E, 0, &[4; 26]);

        for frame in [Bytes::from(corrupted), short, unknown] {
            let step = dispatcher.dispatch(frame, &mut session, &mut NoSend);
            assert_eq!(step, Ok(Step::Continue));
        }
        assert!(session.positions.is_empty());
        assert!(session.targets.is_empty());
    }

    #[test]
    fn test_side_filter() {
        let dispatcher = Dispatcher::new(Profile::solari_26()).with_side(Some(Side::A));
        let mut session = Recorder::default();

        dispatcher
            .dispatch(device(0x02, 0b01, &[4; 26]), &mut session, &mut NoSend)
            .unwrap();
        dispatcher
            .dispatch(device(0x03, 0b11, &[4; 26]), &mut session, &mut NoSend)
            .unwrap();
        dispatcher
            .dispatch(device(0x01, 0b01, &[1]), &mut session, &mut NoSend)
            .unwrap();
        assert!(session.positions.is_empty());
        assert!(session.targets.is_empty());
        assert!(session.sensors.is_empty());

        dispatcher
            .dispatch(device(0x02, 0b00, &[4; 26]), &mut session, &mut NoSend)
            .unwrap();
        assert_eq!(session.positions.len(), 1);
    }
}
