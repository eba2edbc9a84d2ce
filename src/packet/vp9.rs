use super::{ByteRead, Depacketizer, PacketError, PartitionHeadChecker};

/// Flexible mode 15 bit picture ID
const VP9HEADER_SIZE: usize = 3;
const MAX_SPATIAL_LAYERS: u8 = 5;
const MAX_VP9REF_PICS: usize = 3;

/// Fragments VP9 frames into RTP payloads.
///
/// Emits the flexible-mode header with a 15 bit picture ID that
/// increments once per frame and wraps at 0x8000.
#[derive(Debug, Default, Clone)]
pub struct Vp9Payloader {
    picture_id: u16,
    initialized: bool,
    #[cfg(test)]
    initial_picture_id: u16,
}

impl Vp9Payloader {
    /// Fragment one VP9 frame across one or more payloads.
    ///
    /// Every payload is prefixed with a 3 byte flexible-mode header;
    /// the first carries the begin-of-frame flag, the last the
    /// end-of-frame flag. Empty input, or an MTU without room for a
    /// single media byte, yields no payloads and leaves the picture
    /// ID untouched.
    pub fn payload(&mut self, mtu: usize, payload: &[u8]) -> Vec<Vec<u8>> {
        /*
         * https://www.ietf.org/id/draft-ietf-payload-vp9-13.txt
         *
         * Flexible mode (F=1)
         *        0 1 2 3 4 5 6 7
         *       +-+-+-+-+-+-+-+-+
         *       |I|P|L|F|B|E|V|Z| (REQUIRED)
         *       +-+-+-+-+-+-+-+-+
         *  I:   |M| PICTURE ID  | (REQUIRED)
         *       +-+-+-+-+-+-+-+-+
         *  M:   | EXTENDED PID  | (RECOMMENDED)
         *       +-+-+-+-+-+-+-+-+
         *  L:   | TID |U| SID |D| (CONDITIONALLY RECOMMENDED)
         *       +-+-+-+-+-+-+-+-+                             -\
         *  P,F: | P_DIFF      |N| (CONDITIONALLY REQUIRED)    - up to 3 times
         *       +-+-+-+-+-+-+-+-+                             -/
         *  V:   | SS            |
         *       | ..            |
         *       +-+-+-+-+-+-+-+-+
         */

        if !self.initialized {
            #[cfg(test)]
            {
                self.picture_id = self.initial_picture_id;
            }
            #[cfg(not(test))]
            {
                use crate::util::NonCryptographicRng;
                self.picture_id = NonCryptographicRng::u16() % 0x7FFF;
            }
            self.initialized = true;
        }

        let max_fragment_size = mtu.saturating_sub(VP9HEADER_SIZE);
        if payload.is_empty() || max_fragment_size == 0 {
            return vec![];
        }

        let mut payloads = vec![];
        let mut payload_data_remaining = payload.len();
        let mut payload_data_index = 0;

        while payload_data_remaining > 0 {
            let current_fragment_size = max_fragment_size.min(payload_data_remaining);
            let mut out = Vec::with_capacity(VP9HEADER_SIZE + current_fragment_size);

            let mut flags = 0x90; // F=1 I=1
            if payload_data_index == 0 {
                flags |= 0x08; // B=1
            }
            if payload_data_remaining == current_fragment_size {
                flags |= 0x04; // E=1
            }
            out.push(flags);
            out.push((self.picture_id >> 8) as u8 | 0x80);
            out.push((self.picture_id & 0xFF) as u8);
            out.extend_from_slice(
                &payload[payload_data_index..payload_data_index + current_fragment_size],
            );

            payloads.push(out);

            payload_data_remaining -= current_fragment_size;
            payload_data_index += current_fragment_size;
        }

        self.picture_id = (self.picture_id + 1) & 0x7FFF;

        payloads
    }
}

/// Parsed VP9 payload-format header of one RTP payload.
///
/// Fields are overwritten by each [`unmarshal`][Depacketizer::unmarshal]
/// call; the parse is stateless across packets.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Vp9Depacketizer {
    /// Picture ID is present.
    pub i: bool,
    /// Inter-picture predicted frame.
    pub p: bool,
    /// Layer indices present.
    pub l: bool,
    /// Flexible mode.
    pub f: bool,
    /// Start of a frame.
    pub b: bool,
    /// End of a frame.
    pub e: bool,
    /// Scalability structure (SS) data present.
    pub v: bool,
    /// Not a reference frame for upper spatial layers.
    pub z: bool,

    /// 7 or 15 bits, picture ID.
    pub picture_id: u16,

    /// Temporal layer ID.
    pub tid: u8,
    /// Switching up point.
    pub u: bool,
    /// Spatial layer ID.
    pub sid: u8,
    /// Inter-layer dependency used.
    pub d: bool,

    /// Reference indices (F=1).
    pub pdiff: Vec<u8>,
    /// Temporal layer zero index (F=0).
    pub tl0picidx: u8,

    /// N_S + 1 is the number of spatial layers in the stream.
    pub ns: u8,
    /// Each spatial layer's frame resolution present.
    pub y: bool,
    /// Picture group description present.
    pub g: bool,
    /// Number of pictures in the picture group.
    pub ng: u8,
    /// Frame width per spatial layer.
    pub width: Vec<u16>,
    /// Frame height per spatial layer.
    pub height: Vec<u16>,
    /// Temporal layer ID of pictures in the picture group.
    pub pgtid: Vec<u8>,
    /// Switching up point of pictures in the picture group.
    pub pgu: Vec<bool>,
    /// Reference indices of pictures in the picture group.
    pub pgpdiff: Vec<Vec<u8>>,
}

impl Depacketizer for Vp9Depacketizer {
    /// Parses the passed byte slice and stores the result in the
    /// fields of the Vp9Depacketizer this method is called upon.
    fn unmarshal(&mut self, packet: &[u8]) -> Result<Vec<u8>, PacketError> {
        *self = Vp9Depacketizer::default();

        let mut reader: (&[u8], usize) = (packet, 0);
        let b = reader.get_u8().ok_or(PacketError::ErrShortPacket)?;

        self.i = b & 0x80 != 0;
        self.p = b & 0x40 != 0;
        self.l = b & 0x20 != 0;
        self.f = b & 0x10 != 0;
        self.b = b & 0x08 != 0;
        self.e = b & 0x04 != 0;
        self.v = b & 0x02 != 0;
        self.z = b & 0x01 != 0;

        if self.i {
            self.parse_picture_id(&mut reader)?;
        }

        if self.l {
            self.parse_layer_info(&mut reader)?;
        }

        if self.f && self.p {
            self.parse_ref_indices(&mut reader)?;
        }

        if self.v {
            self.parse_ssdata(&mut reader)?;
        }

        Ok(packet[reader.offset()..].to_vec())
    }
}

impl Vp9Depacketizer {
    /// Whether the parsed packet starts a keyframe: begin of frame,
    /// not inter-picture predicted and on the base spatial layer.
    pub fn is_keyframe(&self) -> bool {
        self.b && !self.p && (!self.l || self.sid == 0)
    }

    // Picture ID:
    //
    //      +-+-+-+-+-+-+-+-+
    // I:   |M| PICTURE ID  |   M:0 => picture id is 7 bits.
    //      +-+-+-+-+-+-+-+-+   M:1 => picture id is 15 bits.
    // M:   | EXTENDED PID  |
    //      +-+-+-+-+-+-+-+-+
    //
    fn parse_picture_id(&mut self, reader: &mut dyn ByteRead) -> Result<(), PacketError> {
        let b = reader.get_u8().ok_or(PacketError::ErrShortPacket)?;

        if b & 0x80 != 0 {
            let x = reader.get_u8().ok_or(PacketError::ErrShortPacket)?;
            self.picture_id = ((b & 0x7F) as u16) << 8 | x as u16;
        } else {
            self.picture_id = (b & 0x7F) as u16;
        }

        Ok(())
    }

    fn parse_layer_info(&mut self, reader: &mut dyn ByteRead) -> Result<(), PacketError> {
        self.parse_layer_info_common(reader)?;

        if self.f {
            Ok(())
        } else {
            self.parse_layer_info_non_flexible_mode(reader)
        }
    }

    // Layer indices (flexible mode):
    //
    //      +-+-+-+-+-+-+-+-+
    // L:   |  T  |U|  S  |D|
    //      +-+-+-+-+-+-+-+-+
    //
    fn parse_layer_info_common(&mut self, reader: &mut dyn ByteRead) -> Result<(), PacketError> {
        let b = reader.get_u8().ok_or(PacketError::ErrShortPacket)?;

        self.tid = b >> 5;
        self.u = b & 0x10 != 0;
        self.sid = (b >> 1) & 0x7;
        self.d = b & 0x01 != 0;

        if self.sid >= MAX_SPATIAL_LAYERS {
            return Err(PacketError::ErrTooManySpatialLayers);
        }

        Ok(())
    }

    // Layer indices (non-flexible mode):
    //
    //      +-+-+-+-+-+-+-+-+
    // L:   |  T  |U|  S  |D|
    //      +-+-+-+-+-+-+-+-+
    //      |   TL0PICIDX   |
    //      +-+-+-+-+-+-+-+-+
    //
    fn parse_layer_info_non_flexible_mode(
        &mut self,
        reader: &mut dyn ByteRead,
    ) -> Result<(), PacketError> {
        self.tl0picidx = reader.get_u8().ok_or(PacketError::ErrShortPacket)?;
        Ok(())
    }

    // Reference indices:
    //
    //      +-+-+-+-+-+-+-+-+                P=1,F=1: At least one reference index
    // P,F: | P_DIFF      |N|  up to 3 times          has to be specified.
    //      +-+-+-+-+-+-+-+-+                    N=1: An additional P_DIFF follows
    //                                                current P_DIFF.
    //
    fn parse_ref_indices(&mut self, reader: &mut dyn ByteRead) -> Result<(), PacketError> {
        if !self.i {
            return Err(PacketError::ErrNoPictureId);
        }

        loop {
            let b = reader.get_u8().ok_or(PacketError::ErrShortPacket)?;
            self.pdiff.push(b >> 1);

            if b & 0x01 == 0 {
                break;
            }
            if self.pdiff.len() >= MAX_VP9REF_PICS {
                return Err(PacketError::ErrTooManyPDiff);
            }
        }

        Ok(())
    }

    // Scalability structure (SS):
    //
    //      +-+-+-+-+-+-+-+-+
    // V:   | N_S |Y|G|-|-|-|
    //      +-+-+-+-+-+-+-+-+              -|
    // Y:   |     WIDTH     | (OPTIONAL)    .
    //      +               +               .
    //      |               | (OPTIONAL)    .
    //      +-+-+-+-+-+-+-+-+               . N_S + 1 times
    //      |     HEIGHT    | (OPTIONAL)    .
    //      +               +               .
    //      |               | (OPTIONAL)    .
    //      +-+-+-+-+-+-+-+-+              -|
    // G:   |      N_G      | (OPTIONAL)
    //      +-+-+-+-+-+-+-+-+                           -|
    // N_G: |  T  |U| R |-|-| (OPTIONAL)                 .
    //      +-+-+-+-+-+-+-+-+              -|            . N_G times
    //      |    P_DIFF     | (OPTIONAL)    . R times    .
    //      +-+-+-+-+-+-+-+-+              -|           -|
    //
    fn parse_ssdata(&mut self, reader: &mut dyn ByteRead) -> Result<(), PacketError> {
        let b = reader.get_u8().ok_or(PacketError::ErrShortPacket)?;

        self.ns = b >> 5;
        self.y = b & 0x10 != 0;
        self.g = (b >> 1) & 0x7 != 0;

        let ns = self.ns as usize + 1;
        self.ng = 0;

        if self.y {
            self.width = Vec::with_capacity(ns);
            self.height = Vec::with_capacity(ns);
            for _ in 0..ns {
                self.width
                    .push(reader.get_u16().ok_or(PacketError::ErrShortPacket)?);
                self.height
                    .push(reader.get_u16().ok_or(PacketError::ErrShortPacket)?);
            }
        }

        if self.g {
            self.ng = reader.get_u8().ok_or(PacketError::ErrShortPacket)?;
        }

        for _ in 0..self.ng {
            let b = reader.get_u8().ok_or(PacketError::ErrShortPacket)?;

            self.pgtid.push(b >> 5);
            self.pgu.push(b & 0x10 != 0);

            let r = (b >> 2) & 0x3;
            let mut pdiffs = vec![];
            for _ in 0..r {
                pdiffs.push(reader.get_u8().ok_or(PacketError::ErrShortPacket)?);
            }
            self.pgpdiff.push(pdiffs);
        }

        Ok(())
    }
}

/// Detects VP9 frame starts without exposing the full parse.
///
/// A payload begins a new coded frame if its begin-of-frame flag is
/// set and it does not depend on a lower spatial layer within the
/// same frame.
#[derive(Debug, Clone, Copy)]
pub struct Vp9PartitionHeadChecker;

impl PartitionHeadChecker for Vp9PartitionHeadChecker {
    fn is_partition_head(&self, payload: &[u8]) -> bool {
        let mut p = Vp9Depacketizer::default();
        if p.unmarshal(payload).is_err() {
            return false;
        }
        p.b && (!p.l || !p.d)
    }
}
