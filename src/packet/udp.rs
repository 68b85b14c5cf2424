//! UDP header parsing (RFC 768).

use super::error::PacketError;
use super::ipv4::Ipv4View;

pub const HEADER_LEN: usize = 8;

#[derive(Debug, Clone, Copy)]
pub struct UdpView<'a> {
    pub header: &'a [u8],
    pub payload: &'a [u8],
    pub src_port: u16,
    pub dst_port: u16,
    pub length: u16,
}

/// Splits a UDP datagram out of an already-parsed IPv4 view. Tolerates a
/// zero UDP length field (GSO offload delivers superpackets with the real
/// length implied by the IP total length instead).
pub fn split_udp4<'a>(ip: &Ipv4View<'a>) -> Result<UdpView<'a>, PacketError> {
    if ip.protocol != super::ipv4::protocol::UDP {
        return Err(PacketError::BadProtocol { found: ip.protocol });
    }

    let remaining = ip.payload;
    if remaining.len() < HEADER_LEN {
        return Err(PacketError::TooShort);
    }

    let src_port = u16::from_be_bytes([remaining[0], remaining[1]]);
    let dst_port = u16::from_be_bytes([remaining[2], remaining[3]]);
    let length = u16::from_be_bytes([remaining[4], remaining[5]]);

    if length != 0 && length as usize != remaining.len() {
        return Err(PacketError::UdpLengthMismatch {
            declared: length,
            remaining: remaining.len(),
        });
    }

    Ok(UdpView {
        header: &remaining[..HEADER_LEN],
        payload: &remaining[HEADER_LEN..],
        src_port,
        dst_port,
        length,
    })
}
