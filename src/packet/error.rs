use thiserror::Error;

/// Validation failures raised while splitting a raw buffer into header/payload
/// views (component C2 of the mangler core).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PacketError {
    #[error("buffer shorter than minimum header size")]
    TooShort,
    #[error("unsupported IP version {found}")]
    BadVersion { found: u8 },
    #[error("invalid IHL {ihl}")]
    BadIhl { ihl: u8 },
    #[error("declared length {declared} does not match buffer ({actual} bytes available)")]
    LengthMismatch { declared: usize, actual: usize },
    #[error("unexpected L4 protocol number {found}")]
    BadProtocol { found: u8 },
    #[error("invalid TCP data offset {doff}")]
    BadDataOffset { doff: u8 },
    #[error("UDP length field {declared} disagrees with {remaining} remaining bytes")]
    UdpLengthMismatch { declared: u16, remaining: usize },
}
