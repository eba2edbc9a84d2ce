//! Sans-IO VP9 RTP frame reassembly.
//!
//! This crate reconstructs coded VP9 frames from a stream of
//! out-of-order, possibly lossy RTP packets. It is [Sans I/O][sansio]:
//! the crate itself does no network talking, has no internal threads
//! and no async tasks. All state advances through calls of the public
//! API, which makes frame reassembly a deterministic function of the
//! packets it is given.
//!
//! # Usage
//!
//! Obtain packets from some transport, push them into a
//! [`FrameBuilder`] and drain complete frames. The builder only emits
//! a frame when the codec confirmed its first packet starts a frame
//! and a following packet with a different timestamp proved where the
//! frame ended. Anything else stays buffered until more packets
//! arrive or the lateness window evicts it.
//!
//! ```
//! use fra9e::{FrameBuilder, RtpPacket, Vp9Depacketizer, Vp9PartitionHeadChecker};
//!
//! let mut builder = FrameBuilder::new(
//!     50,
//!     Box::new(Vp9Depacketizer::default()),
//!     Box::new(Vp9PartitionHeadChecker),
//! );
//!
//! // Feed RTP packets as the transport delivers them.
//! builder.push(RtpPacket::new(4711, 90_000, vec![0x9C, 0x80, 0x01, 0xAA]));
//! builder.push(RtpPacket::new(4712, 93_000, vec![0x9C, 0x80, 0x02, 0xBB]));
//!
//! // The first frame's end is proven by the timestamp change.
//! let frame = builder.pop().expect("one complete frame");
//! assert_eq!(frame.timestamp, 90_000);
//! assert_eq!(frame.parts, vec![vec![0xAA]]);
//!
//! // The second frame's end is not proven yet.
//! assert!(builder.pop().is_none());
//! ```
//!
//! The VP9 payload format (draft-ietf-payload-vp9) lives in
//! [`Vp9Depacketizer`] and [`Vp9Payloader`]. The builder knows nothing
//! about VP9; the two are composed through the [`Depacketizer`] and
//! [`PartitionHeadChecker`] traits, so any payload format that can
//! implement the pair plugs in the same way.
//!
//! Turning emitted frames into images is the job of a video decoder
//! and out of scope, as are RTP transport, RTCP and congestion
//! control.
//!
//! [sansio]: https://sans-io.readthedocs.io

#![forbid(unsafe_code)]
#![deny(missing_docs)]

#[macro_use]
extern crate tracing;

mod frame;
pub use frame::{Frame, FrameBuilder};

mod packet;
pub use packet::{Depacketizer, PartitionHeadChecker};
pub use packet::{Vp9Depacketizer, Vp9Payloader, Vp9PartitionHeadChecker};

mod rtp;
pub use rtp::{RtpHeader, RtpPacket};

mod util;

/// Various error types.
pub mod error {
    pub use crate::packet::PacketError;
}
