use std::fmt;

use crate::rtp::RtpPacket;

/// One slot for every possible 16 bit sequence number.
const RING_SIZE: usize = u16::MAX as usize + 1;

/// Shortest circular distance between two 16 bit sequence numbers.
pub(crate) fn seqnum_distance(x: u16, y: u16) -> u16 {
    x.wrapping_sub(y).min(y.wrapping_sub(x))
}

/// Whether `x` is strictly ahead of `y` in the circular sequence
/// number space, i.e. the forward step from `y` to `x` is shorter
/// than the backward step.
pub(crate) fn seqnum_ahead(x: u16, y: u16) -> bool {
    x.wrapping_sub(y) < y.wrapping_sub(x)
}

/// Bounded store of packets keyed by sequence number.
///
/// An arena of all 65,536 sequence number slots. The newest sequence
/// number seen moves only forward; whenever it advances, slots that
/// fall further than `lateness` behind it are evicted. Consecutive
/// advances sweep contiguous ranges, so every slot is cleared before
/// its sequence number can alias.
pub(crate) struct PacketRing {
    slots: Vec<Option<RtpPacket>>,
    newest: Option<u16>,
    lateness: u16,
}

impl PacketRing {
    pub fn new(lateness: u16) -> Self {
        PacketRing {
            slots: vec![None; RING_SIZE],
            newest: None,
            lateness,
        }
    }

    pub fn newest(&self) -> Option<u16> {
        self.newest
    }

    /// Store a packet, unconditionally.
    ///
    /// A packet circularly ahead of `newest` advances it and triggers
    /// the eviction sweep. A late packet is stored where it lands,
    /// even past the eviction threshold for its own slot; the next
    /// forward jump may sweep it away.
    pub fn insert(&mut self, packet: RtpPacket) {
        let seq = packet.header.sequence_number;

        match self.newest {
            None => self.newest = Some(seq),
            Some(newest) if seqnum_ahead(seq, newest) => {
                self.newest = Some(seq);
                self.evict(newest, seq);
            }
            Some(_) => (),
        }

        self.slots[seq as usize] = Some(packet);
    }

    pub fn get(&self, seq: u16) -> Option<&RtpPacket> {
        self.slots[seq as usize].as_ref()
    }

    pub fn clear(&mut self, seq: u16) {
        self.slots[seq as usize] = None;
    }

    /// Sweep the slots that left the lateness window when `newest`
    /// advanced from `from` to `to`.
    fn evict(&mut self, from: u16, to: u16) {
        let mut seq = from.wrapping_sub(self.lateness);
        while seqnum_distance(seq, to) > self.lateness {
            if self.slots[seq as usize].take().is_some() {
                trace!("Evict packet outside lateness window: {}", seq);
            }
            seq = seq.wrapping_add(1);
        }
    }
}

impl fmt::Debug for PacketRing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PacketRing")
            .field("newest", &self.newest)
            .field("lateness", &self.lateness)
            .field("occupied", &self.slots.iter().filter(|s| s.is_some()).count())
            .finish()
    }
}
