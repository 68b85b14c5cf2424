//! IP fragmenter (C3): split one unfragmented IPv4 datagram into two valid
//! fragments at a caller-chosen byte offset.

use crate::checksum;
use crate::packet::{self, ipv4::flags as ip_flags};

use super::EngineError;

fn set_total_length(buf: &mut [u8]) {
    let total = buf.len() as u16;
    buf[2..4].copy_from_slice(&total.to_be_bytes());
}

/// Sets the frag-offset field and, optionally, MF. DF is always cleared:
/// a fragmented datagram cannot also carry "don't fragment".
fn set_frag_field(buf: &mut [u8], mf: bool, offset: u16) {
    let mut flag_bits: u16 = 0;
    if mf {
        flag_bits |= (ip_flags::MORE_FRAGMENTS as u16) << 13;
    }
    let value = flag_bits | (offset & 0x1FFF);
    buf[6..8].copy_from_slice(&value.to_be_bytes());
}

/// Splits `input` (a full IPv4 datagram including its header) into two
/// fragments at `payload_offset` bytes into the payload. `payload_offset`
/// must be a positive multiple of 8 and strictly less than the payload
/// length.
pub fn frag_ip4(input: &[u8], payload_offset: usize) -> Result<(Vec<u8>, Vec<u8>), EngineError> {
    let ip = packet::split_ip4(input).map_err(|_| EngineError::InvalidOffset)?;

    if payload_offset == 0 || payload_offset % 8 != 0 {
        return Err(EngineError::InvalidOffset);
    }
    if payload_offset >= ip.payload.len() {
        return Err(EngineError::InvalidOffset);
    }

    let original_mf = ip.more_fragments();
    let header_len = ip.header_len();
    let (payload_a, payload_b) = ip.payload.split_at(payload_offset);

    let mut fragment_a = Vec::with_capacity(header_len + payload_a.len());
    fragment_a.extend_from_slice(ip.header);
    fragment_a.extend_from_slice(payload_a);
    if fragment_a.len() > u16::MAX as usize {
        return Err(EngineError::TooShort);
    }
    set_total_length(&mut fragment_a);
    set_frag_field(&mut fragment_a, true, 0);
    checksum::ip_set_checksum(&mut fragment_a[..header_len]);

    let mut fragment_b = Vec::with_capacity(header_len + payload_b.len());
    fragment_b.extend_from_slice(ip.header);
    fragment_b.extend_from_slice(payload_b);
    if fragment_b.len() > u16::MAX as usize {
        return Err(EngineError::TooShort);
    }
    set_total_length(&mut fragment_b);
    let new_offset = ip.fragment_offset + (payload_offset as u16 / 8);
    set_frag_field(&mut fragment_b, original_mf, new_offset);
    checksum::ip_set_checksum(&mut fragment_b[..header_len]);

    Ok((fragment_a, fragment_b))
}
