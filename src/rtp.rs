/// The subset of the RTP header frame reassembly consumes.
///
/// Sequence numbers order packets within the stream and wrap at
/// 16 bits; the timestamp is shared by every packet belonging to the
/// same frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RtpHeader {
    /// 16-bit sequence number, increasing by one per packet.
    pub sequence_number: u16,
    /// Media timestamp in the clock rate of the stream.
    pub timestamp: u32,
}

/// An RTP packet as handed over by the transport layer.
///
/// The payload still carries the codec-specific payload-format header;
/// stripping it is the depacketizer's job.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RtpPacket {
    /// Header fields relevant for reassembly.
    pub header: RtpHeader,
    /// The raw RTP payload.
    pub payload: Vec<u8>,
}

impl RtpPacket {
    /// Packet from its constituent parts.
    pub fn new(sequence_number: u16, timestamp: u32, payload: Vec<u8>) -> Self {
        RtpPacket {
            header: RtpHeader {
                sequence_number,
                timestamp,
            },
            payload,
        }
    }
}
