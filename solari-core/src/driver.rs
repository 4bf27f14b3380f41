//! The control loop tying channel, receiver, dispatcher and session together

use crate::channel::ByteChannel;
use crate::dispatcher::Dispatcher;
use crate::encoder::FrameSender;
use crate::error::SolariError;
use crate::receiver::{FrameReceiver, ReceiveStats};
use crate::session::{SessionHandler, Step};
use std::time::Instant;

#[cfg(feature = "logging")]
use tracing::debug;

/// Run `session` until it reports [`Step::Done`]
///
/// Blocks on the channel one byte at a time. Returns the receiver
/// statistics on success; a closed or failing channel ends the run with an
/// error and no reconnection is attempted.
pub fn run<C, S>(
    channel: &mut C,
    dispatcher: &Dispatcher,
    session: &mut S,
) -> Result<ReceiveStats, SolariError>
where
    C: ByteChannel + ?Sized,
    S: SessionHandler + ?Sized,
{
    run_with_receiver(channel, FrameReceiver::new(), dispatcher, session)
}

/// Like [`run`], with a caller-configured receiver
pub fn run_with_receiver<C, S>(
    channel: &mut C,
    mut receiver: FrameReceiver,
    dispatcher: &Dispatcher,
    session: &mut S,
) -> Result<ReceiveStats, SolariError>
where
    C: ByteChannel + ?Sized,
    S: SessionHandler + ?Sized,
{
    #[cfg(feature = "logging")]
    debug!("Starting session loop");

    loop {
        let byte = channel.read_byte()?;
        let now = Instant::now();

        for frame in receiver.push_at(byte, now) {
            let mut sender = FrameSender::new(&mut *channel);
            let step = dispatcher.dispatch(frame, &mut *session, &mut sender)?;
            if step == Step::Done {
                return Ok(receiver.stats().clone());
            }
        }

        if session.tick(now, &mut FrameSender::new(&mut *channel))? == Step::Done {
            return Ok(receiver.stats().clone());
        }
    }
}
