use std::fmt;

mod error;
pub use error::PacketError;

mod vp9;
pub use vp9::{Vp9Depacketizer, Vp9Payloader, Vp9PartitionHeadChecker};

/// Strips the codec-specific payload-format header from RTP payloads.
///
/// Implementations parse the header in front of the media bytes and
/// hand back everything after it. Parsing must reject malformed input
/// with an error; it must never panic.
pub trait Depacketizer: fmt::Debug {
    /// Parse the payload-format header and return the media bytes
    /// that follow it.
    fn unmarshal(&mut self, packet: &[u8]) -> Result<Vec<u8>, PacketError>;
}

/// Tells whether an RTP payload begins a new coded frame.
pub trait PartitionHeadChecker: fmt::Debug {
    /// Checks if the raw RTP payload is the first of a coded frame.
    ///
    /// Payloads that cannot be parsed are not heads. This never
    /// errors; absence of a usable head is indistinguishable from
    /// "not a head" at this layer.
    fn is_partition_head(&self, payload: &[u8]) -> bool;
}

/// Helper providing bounds-checked big-endian reads over a byte
/// buffer with a current offset.
pub(crate) trait ByteRead {
    fn remaining(&self) -> usize;
    fn offset(&self) -> usize;
    fn get_u8(&mut self) -> Option<u8>;
    fn get_u16(&mut self) -> Option<u16>;
}

impl ByteRead for (&[u8], usize) {
    #[inline(always)]
    fn remaining(&self) -> usize {
        self.0.len().saturating_sub(self.1)
    }

    #[inline(always)]
    fn offset(&self) -> usize {
        self.1
    }

    #[inline(always)]
    fn get_u8(&mut self) -> Option<u8> {
        let n = *self.0.get(self.1)?;
        self.1 += 1;
        Some(n)
    }

    fn get_u16(&mut self) -> Option<u16> {
        if self.remaining() < 2 {
            return None;
        }
        Some(u16::from_be_bytes([self.get_u8()?, self.get_u8()?]))
    }
}
