//! TCP segmenter (C4): split one TCP segment into two at a caller-chosen
//! payload offset, bumping the second segment's sequence number.

use crate::checksum;
use crate::packet;

use super::EngineError;

fn set_total_length(buf: &mut [u8]) {
    let total = buf.len() as u16;
    buf[2..4].copy_from_slice(&total.to_be_bytes());
}

/// Splits `input` (a full IPv4/TCP datagram) into two segments at
/// `payload_offset` bytes into the TCP payload. The input's IP header must
/// not already indicate fragmentation.
pub fn frag_tcp4(input: &[u8], payload_offset: usize) -> Result<(Vec<u8>, Vec<u8>), EngineError> {
    let ip = packet::split_ip4(input).map_err(|_| EngineError::InvalidOffset)?;

    if ip.fragment_offset != 0 || ip.more_fragments() {
        return Err(EngineError::InvalidFragState);
    }

    let tcp = packet::split_tcp4(&ip).map_err(|_| EngineError::InvalidOffset)?;

    if payload_offset == 0 || payload_offset >= tcp.payload.len() {
        return Err(EngineError::InvalidOffset);
    }

    let (payload_a, payload_b) = tcp.payload.split_at(payload_offset);

    let segment_a = build_segment(
        ip.header,
        tcp.header,
        payload_a,
        tcp.seq,
        ip.src_ip,
        ip.dst_ip,
    )?;

    let segment_b_seq = tcp.seq.wrapping_add(payload_offset as u32);
    let segment_b = build_segment(
        ip.header,
        tcp.header,
        payload_b,
        segment_b_seq,
        ip.src_ip,
        ip.dst_ip,
    )?;

    Ok((segment_a, segment_b))
}

fn build_segment(
    ip_header: &[u8],
    tcp_header: &[u8],
    payload: &[u8],
    seq: u32,
    src: std::net::Ipv4Addr,
    dst: std::net::Ipv4Addr,
) -> Result<Vec<u8>, EngineError> {
    let total_len = ip_header.len() + tcp_header.len() + payload.len();
    if total_len > u16::MAX as usize {
        return Err(EngineError::TooShort);
    }

    let mut out = Vec::with_capacity(total_len);
    out.extend_from_slice(ip_header);
    out.extend_from_slice(tcp_header);
    out.extend_from_slice(payload);

    let ip_header_len = ip_header.len();
    out[ip_header_len + 4..ip_header_len + 8].copy_from_slice(&seq.to_be_bytes());

    set_total_length(&mut out);
    checksum::ip_set_checksum(&mut out[..ip_header_len]);

    let (_ip_part, rest) = out.split_at_mut(ip_header_len);
    let (tcp_part, payload_part) = rest.split_at_mut(tcp_header.len());
    checksum::tcp_set_checksum(src, dst, tcp_part, payload_part);

    Ok(out)
}
