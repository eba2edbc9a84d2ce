//! End-to-end runs: VP9 payloader output wrapped in RTP packets and
//! reassembled by a FrameBuilder composed with the VP9 capabilities.

use std::sync::Once;

use fra9e::{Frame, FrameBuilder, RtpPacket, Vp9Depacketizer, Vp9Payloader, Vp9PartitionHeadChecker};

pub fn init_log() {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"));

    static START: Once = Once::new();

    START.call_once(|| {
        tracing_subscriber::registry()
            .with(fmt::layer())
            .with(env_filter)
            .init();
    });
}

fn vp9_builder(lateness: u16) -> FrameBuilder {
    FrameBuilder::new(
        lateness,
        Box::new(Vp9Depacketizer::default()),
        Box::new(Vp9PartitionHeadChecker),
    )
}

/// Fragment `frames` starting at `first_seq`, one timestamp per frame.
fn packetize(frames: &[Vec<u8>], mtu: usize, first_seq: u16) -> Vec<RtpPacket> {
    let mut payloader = Vp9Payloader::default();
    let mut packets = vec![];
    let mut seq = first_seq;
    let mut timestamp = 90_000;

    for frame in frames {
        for chunk in payloader.payload(mtu, frame) {
            packets.push(RtpPacket::new(seq, timestamp, chunk));
            seq = seq.wrapping_add(1);
        }
        timestamp += 3000;
    }

    packets
}

fn drain(builder: &mut FrameBuilder) -> Vec<Frame> {
    let mut frames = vec![];
    while let Some(frame) = builder.pop() {
        frames.push(frame);
    }
    frames
}

#[test]
fn frames_round_trip_in_order() {
    init_log();

    let frames_in: Vec<Vec<u8>> = [10, 1, 2500, 1197, 4000]
        .iter()
        .enumerate()
        .map(|(i, len)| (0..*len).map(|b| (b + i) as u8).collect())
        .collect();

    // Sequence numbers cross the 16 bit wrap.
    let packets = packetize(&frames_in, 1200, 65530);

    let mut builder = vp9_builder(50);
    for packet in packets {
        builder.push(packet);
    }

    let frames_out = drain(&mut builder);

    // The last frame's end is never proven by a following packet.
    assert_eq!(frames_out.len(), frames_in.len() - 1);
    for (i, (frame, original)) in frames_out.into_iter().zip(&frames_in).enumerate() {
        assert_eq!(frame.timestamp, 90_000 + 3000 * i as u32);
        assert_eq!(&frame.into_data(), original, "frame {i} must round trip");
    }
}

#[test]
fn frames_round_trip_reordered_within_window() {
    init_log();

    let frames_in: Vec<Vec<u8>> = (0..5).map(|i| vec![i as u8; 12]).collect();

    // MTU 7 leaves 4 media bytes per packet, three packets per frame.
    // Deliver each frame's packets in reverse.
    let packets = packetize(&frames_in, 7, 65530);
    assert_eq!(packets.len(), 15);

    let mut builder = vp9_builder(50);
    for chunk in packets.chunks(3) {
        for packet in chunk.iter().rev() {
            builder.push(packet.clone());
        }
    }

    let frames_out = drain(&mut builder);

    assert_eq!(frames_out.len(), frames_in.len() - 1);
    for (i, (frame, original)) in frames_out.into_iter().zip(&frames_in).enumerate() {
        assert_eq!(&frame.into_data(), original, "frame {i} must round trip");
    }
}

#[test]
fn lost_fragment_drops_only_its_frame() {
    init_log();

    let frames_in: Vec<Vec<u8>> = (0..12).map(|i| vec![i as u8; 12]).collect();

    // Three packets per frame; packet 104 is the middle of frame 1.
    let packets = packetize(&frames_in, 7, 100);
    assert_eq!(packets.len(), 36);

    let mut builder = vp9_builder(20);
    let mut frames_out = vec![];

    for packet in packets {
        if packet.header.sequence_number == 104 {
            continue;
        }
        builder.push(packet);
        frames_out.extend(drain(&mut builder));
    }

    // Frame 1 lost a fragment and is gone for good. Frame 11's end is
    // unproven. Everything else reassembles once ring pressure clears
    // the torn run.
    let timestamps: Vec<u32> = frames_out.iter().map(|f| f.timestamp).collect();
    let expected: Vec<u32> = (0..11)
        .filter(|k| *k != 1)
        .map(|k| 90_000 + 3000 * k)
        .collect();
    assert_eq!(timestamps, expected);

    for frame in frames_out {
        let k = ((frame.timestamp - 90_000) / 3000) as usize;
        assert_eq!(frame.into_data(), frames_in[k], "frame {k} must round trip");
    }
}
