use thiserror::Error;

/// Errors arising in packet- and depacketization.
#[derive(Debug, PartialEq, Eq, Error)]
pub enum PacketError {
    /// The packet ended before a required field was complete.
    #[error("Packet is too short")]
    ErrShortPacket,
    /// The spatial layer id exceeds what the payload format allows.
    #[error("Too many spatial layers")]
    ErrTooManySpatialLayers,
    /// The reference index list asks for more entries than allowed.
    #[error("Too many P-Diff")]
    ErrTooManyPDiff,
    /// Reference indices require a picture ID, but none was present.
    #[error("No picture ID")]
    ErrNoPictureId,
}
