use crate::packet::{Depacketizer, PartitionHeadChecker};
use crate::rtp::RtpPacket;

mod ring;
use ring::{seqnum_ahead, PacketRing};

/// A complete coded frame reassembled from RTP packets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// Depacketized payloads, one per packet, in sequence order.
    pub parts: Vec<Vec<u8>>,
    /// RTP timestamp shared by every packet of the frame.
    pub timestamp: u32,
}

impl Frame {
    /// Concatenates the parts into one coded frame buffer.
    pub fn into_data(self) -> Vec<u8> {
        self.parts.concat()
    }
}

/// Groups buffered RTP packets into complete frames.
///
/// Packets are pushed as they arrive, in any order, and buffered in a
/// sequence number ring bounded by a lateness window. [`pop`] scans
/// the ring for the next complete frame: a run of contiguous sequence
/// numbers sharing one timestamp, starting at a packet the head
/// checker accepted and ended by a packet with a different timestamp.
///
/// A frame whose end is not yet proven stays buffered; a run without
/// a codec-confirmed head is discarded once a later head is found.
/// This means mid-frame packet loss never produces a torn frame, at
/// the cost of needing the first packet of the following frame before
/// anything is emitted.
///
/// [`pop`]: FrameBuilder::pop
#[derive(Debug)]
pub struct FrameBuilder {
    ring: PacketRing,
    /// Next sequence number to consider as a candidate frame start.
    /// Initialized lazily on the first pop; only ever moves forward.
    cursor: Option<u16>,
    depacketizer: Box<dyn Depacketizer>,
    head_checker: Box<dyn PartitionHeadChecker>,
}

impl FrameBuilder {
    /// Creates a builder keeping packets up to `lateness` sequence
    /// numbers behind the newest received one, using the given codec
    /// capabilities.
    pub fn new(
        lateness: u16,
        depacketizer: Box<dyn Depacketizer>,
        head_checker: Box<dyn PartitionHeadChecker>,
    ) -> Self {
        FrameBuilder {
            ring: PacketRing::new(lateness),
            cursor: None,
            depacketizer,
            head_checker,
        }
    }

    /// Buffer a packet.
    ///
    /// Pure buffering; no frame boundary logic runs here. Pushing may
    /// evict packets that fell outside the lateness window.
    pub fn push(&mut self, packet: RtpPacket) {
        self.ring.insert(packet);
    }

    /// Scan for the next complete frame.
    ///
    /// Returns `None` when no frame can be completed from the packets
    /// buffered so far. Calling again without new packets is a no-op;
    /// all progress is a pure function of the buffered state.
    pub fn pop(&mut self) -> Option<Frame> {
        let newest = self.ring.newest()?;

        let cursor = match self.cursor {
            Some(c) => c,
            None => {
                let c = self.oldest_buffered(newest)?;
                self.cursor = Some(c);
                c
            }
        };

        // The search range cursor..=newest is empty once the cursor
        // has moved past everything received.
        if seqnum_ahead(cursor, newest) {
            return None;
        }

        let head = self.find_head(cursor, newest)?;

        // Packets between the cursor and the accepted head are
        // fragments without a recoverable head. Discard them.
        let mut seq = cursor;
        while seq != head {
            if self.ring.get(seq).is_some() {
                trace!("Discard orphaned fragment: {}", seq);
                self.ring.clear(seq);
            }
            seq = seq.wrapping_add(1);
        }
        self.cursor = Some(head);

        let timestamp = self
            .ring
            .get(head)
            .expect("packet for accepted head")
            .header
            .timestamp;

        // Extend the run over contiguous same-timestamp packets. Only
        // a present packet with a different timestamp proves the
        // frame ended; a gap may still be filled by retransmission.
        let mut last = head;
        loop {
            let next = last.wrapping_add(1);
            if next == head {
                break;
            }
            match self.ring.get(next) {
                Some(p) if p.header.timestamp == timestamp => last = next,
                Some(_) => break,
                None => return None,
            }
        }

        // Depacketize before consuming anything, so a malformed
        // packet leaves the whole run buffered for a later attempt.
        let mut parts = Vec::new();
        let mut seq = head;
        loop {
            let packet = self.ring.get(seq).expect("packet in contiguous run");
            match self.depacketizer.unmarshal(&packet.payload) {
                Ok(media) => parts.push(media),
                Err(e) => {
                    trace!("Depacketize failed for {}: {}", seq, e);
                    return None;
                }
            }
            if seq == last {
                break;
            }
            seq = seq.wrapping_add(1);
        }

        let mut seq = head;
        loop {
            self.ring.clear(seq);
            if seq == last {
                break;
            }
            seq = seq.wrapping_add(1);
        }
        self.cursor = Some(last.wrapping_add(1));

        trace!("Emit frame {} for {}..={}", timestamp, head, last);

        Some(Frame { parts, timestamp })
    }

    /// First buffered sequence number at or after `from` (up to and
    /// including `newest`) whose payload starts a new frame.
    fn find_head(&self, from: u16, newest: u16) -> Option<u16> {
        let span = newest.wrapping_sub(from);
        for d in 0..=span {
            let seq = from.wrapping_add(d);
            let Some(packet) = self.ring.get(seq) else {
                continue;
            };
            if self.head_checker.is_partition_head(&packet.payload) {
                return Some(seq);
            }
        }
        None
    }

    /// The buffered sequence number circularly furthest behind
    /// `newest`. Runs once, before the cursor exists.
    fn oldest_buffered(&self, newest: u16) -> Option<u16> {
        let mut oldest = None;
        for d in 0..=u16::MAX {
            let seq = newest.wrapping_sub(d);
            if self.ring.get(seq).is_some() {
                oldest = Some(seq);
            }
        }
        oldest
    }
}
