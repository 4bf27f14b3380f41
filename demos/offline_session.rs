//! Drives a set-positions session against a simulated panel controller

use solari_core::{
    channel::ByteChannel,
    codec::ContentCodec,
    constants::{HostMessage, RECEIVE_MAGIC, SEND_MAGIC, UNKNOWN_POSITION},
    decoder::decode_frame_with_magic,
    dispatcher::Dispatcher,
    driver::run,
    encoder::encode_frame_with_magic,
    session::SetPositions,
    Content, Profile, Session, Side, SolariError,
};
use std::collections::VecDeque;

/// Controller that spins every unit one flap per report towards its target
struct SimulatedPanel {
    units: Vec<u8>,
    target: Vec<u8>,
    inbound: VecDeque<u8>,
}

impl SimulatedPanel {
    fn new(unit_count: usize) -> Self {
        let mut panel = Self {
            units: vec![UNKNOWN_POSITION; unit_count],
            target: vec![0; unit_count],
            inbound: VecDeque::new(),
        };
        panel.report();
        // homing finished
        panel.units.iter_mut().for_each(|u| *u = 0);
        panel.report();
        panel
    }

    fn report(&mut self) {
        let reached = self.units == self.target;
        let mut payload = vec![if reached { 0b10 } else { 0b00 }];
        payload.extend_from_slice(&self.units);
        if let Ok(frame) = encode_frame_with_magic(RECEIVE_MAGIC, 0x02, &payload) {
            self.inbound.extend(frame.iter());
        }
    }

    fn step(&mut self) {
        for (unit, &target) in self.units.iter_mut().zip(&self.target) {
            if *unit != target {
                *unit = unit.wrapping_add(1) % 64;
            }
        }
    }
}

impl ByteChannel for SimulatedPanel {
    fn read_byte(&mut self) -> Result<u8, SolariError> {
        if self.inbound.is_empty() {
            self.step();
            self.report();
        }
        self.inbound.pop_front().ok_or(SolariError::ChannelClosed)
    }

    fn write_all(&mut self, bytes: &[u8]) -> Result<(), SolariError> {
        let frame = decode_frame_with_magic(bytes.to_vec().into(), SEND_MAGIC)?;
        println!("Panel received type {:#04x}: {:?}", frame.msg_type, &frame.payload[..]);
        if frame.msg_type == HostMessage::SetAll.as_u8() {
            self.target = frame.payload[1..].to_vec();
        }
        Ok(())
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("Solari Offline Session Example\n");

    let profile = Profile::solari_26();
    let content: Content = serde_json::from_str(
        r#"{"type": "Os", "num": 4712, "final": "Brno", "time": "16:05", "delay": 20}"#,
    )?;

    let set = SetPositions::new(&profile, &content, Side::A, true)?;
    println!("Target units: {:?}\n", &set.target()[..]);

    let mut panel = SimulatedPanel::new(profile.unit_count);
    let mut session = Session::SetPositions(set);
    let dispatcher = Dispatcher::new(profile.clone()).with_side(Some(Side::A));
    let stats = run(&mut panel, &dispatcher, &mut session)?;

    println!("\nPanel now shows: {}", ContentCodec::new(&profile).decode(&panel.units));
    println!(
        "Received {} bytes, {} frames",
        stats.bytes_received, stats.frames_extracted
    );
    Ok(())
}
