//! TCP header parsing (RFC 793), restricted to what the mangler needs:
//! read-only header/payload splitting. No connection state is kept here.

use super::error::PacketError;
use super::ipv4::Ipv4View;

pub const MIN_HEADER_LEN: usize = 20;
pub const MAX_HEADER_LEN: usize = 60;

pub mod flags {
    pub const FIN: u8 = 0x01;
    pub const SYN: u8 = 0x02;
    pub const RST: u8 = 0x04;
    pub const PSH: u8 = 0x08;
    pub const ACK: u8 = 0x10;
    pub const URG: u8 = 0x20;
}

#[derive(Debug, Clone, Copy)]
pub struct TcpView<'a> {
    pub header: &'a [u8],
    pub payload: &'a [u8],
    pub src_port: u16,
    pub dst_port: u16,
    pub seq: u32,
    pub ack: u32,
    pub data_offset: u8,
    pub flags: u8,
    pub window: u16,
}

pub fn split_tcp4<'a>(ip: &Ipv4View<'a>) -> Result<TcpView<'a>, PacketError> {
    if ip.protocol != super::ipv4::protocol::TCP {
        return Err(PacketError::BadProtocol { found: ip.protocol });
    }

    let remaining = ip.payload;
    if remaining.len() < MIN_HEADER_LEN {
        return Err(PacketError::TooShort);
    }

    let doff = remaining[12] >> 4;
    let header_len = doff as usize * 4;
    if header_len < MIN_HEADER_LEN {
        return Err(PacketError::BadDataOffset { doff });
    }
    if header_len > remaining.len() {
        return Err(PacketError::BadDataOffset { doff });
    }

    let src_port = u16::from_be_bytes([remaining[0], remaining[1]]);
    let dst_port = u16::from_be_bytes([remaining[2], remaining[3]]);
    let seq = u32::from_be_bytes([remaining[4], remaining[5], remaining[6], remaining[7]]);
    let ack = u32::from_be_bytes([remaining[8], remaining[9], remaining[10], remaining[11]]);
    let flags_byte = remaining[13];
    let window = u16::from_be_bytes([remaining[14], remaining[15]]);

    Ok(TcpView {
        header: &remaining[..header_len],
        payload: &remaining[header_len..],
        src_port,
        dst_port,
        seq,
        ack,
        data_offset: doff,
        flags: flags_byte,
        window,
    })
}
