//! Property-based tests using proptest

use solari_core::{
    codec::ContentCodec,
    constants::{HostMessage, RECEIVE_MAGIC},
    decoder::{decode_frame, xor_checksum},
    delay::DelayQuantizer,
    encoder::{encode_frame, encode_frame_with_magic},
    receiver::FrameReceiver,
    Content, Profile,
};
use proptest::prelude::*;
use std::time::Instant;

fn host_message() -> impl Strategy<Value = HostMessage> {
    prop_oneof![
        Just(HostMessage::GetSensors),
        Just(HostMessage::GetPositions),
        Just(HostMessage::GetTarget),
        Just(HostMessage::Flap),
        Just(HostMessage::SetSingle),
        Just(HostMessage::SetAll),
    ]
}

proptest! {
    #[test]
    fn prop_encoded_frames_xor_to_zero(
        msg in host_message(),
        payload in prop::collection::vec(any::<u8>(), 0..=255)
    ) {
        let frame = encode_frame(msg, &payload).unwrap();
        prop_assert_eq!(frame.len(), payload.len() + 4);
        prop_assert_eq!(xor_checksum(&frame), 0);
        prop_assert_eq!(frame[1] as usize, payload.len());
    }

    #[test]
    fn prop_frame_found_after_noise(
        noise in prop::collection::vec(
            any::<u8>().prop_filter("no magic", |b| *b != RECEIVE_MAGIC),
            0..64
        ),
        units in prop::collection::vec(0u8..60, 26)
    ) {
        let mut payload = vec![0u8];
        payload.extend_from_slice(&units);
        let frame = encode_frame_with_magic(RECEIVE_MAGIC, 0x02, &payload).unwrap();

        let mut stream = noise.clone();
        stream.extend_from_slice(&frame);

        let mut receiver = FrameReceiver::new();
        let frames = receiver.extend_at(&stream, Instant::now());

        prop_assert_eq!(frames.len(), 1);
        prop_assert_eq!(&frames[0][..], &frame[..]);
        prop_assert_eq!(receiver.stats().bytes_discarded, noise.len());
        let decoded = decode_frame(frames[0].clone()).unwrap();
        prop_assert_eq!(&decoded.payload[..], &payload[..]);
    }

    #[test]
    fn prop_receiver_never_panics(
        data in prop::collection::vec(any::<u8>(), 0..4096)
    ) {
        let mut receiver = FrameReceiver::new();
        let now = Instant::now();
        for frame in receiver.extend_at(&data, now) {
            prop_assert_eq!(frame[0], RECEIVE_MAGIC);
            prop_assert_eq!(frame.len(), frame[1] as usize + 4);
            let _ = decode_frame(frame);
        }
    }

    #[test]
    fn prop_delay_rounds_down_to_bucket(minutes in 0u32..2000) {
        let delays = DelayQuantizer::solari();
        let code = delays.encode_minutes(minutes);

        if minutes < 5 {
            prop_assert_eq!(code, 0);
        } else if minutes > 480 {
            prop_assert_eq!(code, delays.overflow_code());
        } else {
            let bucket = delays.buckets[code as usize - 1];
            prop_assert!(bucket <= minutes);
            prop_assert_eq!(
                delays.decode(code),
                format!("{}:{:02}", bucket / 60, bucket % 60)
            );
            if let Some(&next) = delays.buckets.get(code as usize) {
                prop_assert!(next > minutes);
            }
        }
    }

    #[test]
    fn prop_codec_number_survives_decode(num in 1u32..100_000, highlighted in any::<bool>()) {
        let profile = Profile::solari_26();
        let codec = ContentCodec::new(&profile);
        let content = Content {
            num: Some(num.into()),
            num_red: highlighted,
            ..Default::default()
        };

        let units = codec.encode(&content).unwrap();
        let explained = codec.decode(&units);
        prop_assert_eq!(explained.num, num);
        prop_assert_eq!(explained.num_red, highlighted);
    }

    #[test]
    fn prop_decode_units_never_panics(units in prop::collection::vec(any::<u8>(), 0..64)) {
        let profile = Profile::solari_26();
        let _ = ContentCodec::new(&profile).decode(&units);
    }
}
