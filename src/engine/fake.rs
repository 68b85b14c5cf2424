//! Fake-packet synthesizer (C6): builds decoy TLS ClientHello packets that
//! share the real flow's 5-tuple and sequence space but are marked so the
//! destination rejects or discards them.

use crate::checksum;
use crate::config::FakingStrategy;
use crate::packet::{Ipv4View, TcpView};

/// Sequence backoff applied by the `ack_seq` strategy so the decoy's
/// sequence number falls well outside the server's receive window.
const ACK_SEQ_BACKOFF: u32 = 1 << 20;

const PLACEHOLDER_SNI: &str = "www.example.org";

/// Builds the compiled-in default decoy TLS record: a syntactically valid
/// ClientHello whose SNI is a non-sensitive placeholder. Callers may
/// override this at `Config` construction time with their own template.
pub fn default_template() -> Vec<u8> {
    let host = PLACEHOLDER_SNI.as_bytes();

    let mut server_name_entry = vec![0u8];
    server_name_entry.extend_from_slice(&(host.len() as u16).to_be_bytes());
    server_name_entry.extend_from_slice(host);

    let mut server_name_list = (server_name_entry.len() as u16).to_be_bytes().to_vec();
    server_name_list.extend_from_slice(&server_name_entry);

    let mut sni_extension = vec![0x00, 0x00];
    sni_extension.extend_from_slice(&(server_name_list.len() as u16).to_be_bytes());
    sni_extension.extend_from_slice(&server_name_list);

    let mut body = vec![0x03, 0x03];
    body.extend_from_slice(&[0u8; 32]);
    body.push(0); // session_id_len
    body.extend_from_slice(&[0x00, 0x02, 0x13, 0x01]); // one cipher suite
    body.extend_from_slice(&[0x01, 0x00]); // one compression method
    body.extend_from_slice(&(sni_extension.len() as u16).to_be_bytes());
    body.extend_from_slice(&sni_extension);

    let mut handshake = vec![0x01]; // ClientHello
    let hs_len = body.len() as u32;
    handshake.extend_from_slice(&hs_len.to_be_bytes()[1..]);
    handshake.extend_from_slice(&body);

    let mut record = vec![0x16, 0x03, 0x03]; // TLS 1.2 record, handshake
    record.extend_from_slice(&(handshake.len() as u16).to_be_bytes());
    record.extend_from_slice(&handshake);
    record
}

/// Builds `count` decoy packets cloning `real_ip`/`real_tcp`'s IP/TCP
/// headers, carrying `template` as payload, mutated per `strategy` so the
/// destination will not accept them as part of the real stream.
pub fn synthesize_decoys(
    real_ip: &Ipv4View<'_>,
    real_tcp: &TcpView<'_>,
    count: usize,
    template: &[u8],
    strategy: FakingStrategy,
    faking_ttl: u8,
) -> Vec<Vec<u8>> {
    (0..count)
        .map(|_| synthesize_one(real_ip, real_tcp, template, strategy, faking_ttl))
        .collect()
}

fn synthesize_one(
    real_ip: &Ipv4View<'_>,
    real_tcp: &TcpView<'_>,
    template: &[u8],
    strategy: FakingStrategy,
    faking_ttl: u8,
) -> Vec<u8> {
    let total_len = real_ip.header_len() + real_tcp.header.len() + template.len();
    let mut out = Vec::with_capacity(total_len);
    out.extend_from_slice(real_ip.header);
    out.extend_from_slice(real_tcp.header);
    out.extend_from_slice(template);

    let ip_header_len = real_ip.header_len();
    out[2..4].copy_from_slice(&(total_len as u16).to_be_bytes());

    match strategy {
        FakingStrategy::Ttl => {
            out[8] = faking_ttl;
        }
        FakingStrategy::AckSeq => {
            let tcp_start = ip_header_len;
            let decoy_seq = real_tcp.seq.wrapping_sub(ACK_SEQ_BACKOFF);
            out[tcp_start + 4..tcp_start + 8].copy_from_slice(&decoy_seq.to_be_bytes());
            out[tcp_start + 8..tcp_start + 12].copy_from_slice(&0u32.to_be_bytes());
        }
    }

    checksum::ip_set_checksum(&mut out[..ip_header_len]);
    let (_ip_part, rest) = out.split_at_mut(ip_header_len);
    let (tcp_part, payload_part) = rest.split_at_mut(real_tcp.header.len());
    checksum::tcp_set_checksum(real_ip.src_ip, real_ip.dst_ip, tcp_part, payload_part);

    out
}

/// Rewrites the TCP window field of a real (non-decoy) packet to
/// `new_window` and recomputes both checksums. Used when `fk_winsize > 0`.
pub fn rewrite_window(input: &[u8], new_window: u16) -> Option<Vec<u8>> {
    let ip = crate::packet::split_ip4(input).ok()?;
    let tcp = crate::packet::split_tcp4(&ip).ok()?;
    let ip_header_len = ip.header_len();
    let tcp_header_len = tcp.header.len();

    let mut out = input.to_vec();
    out[ip_header_len + 14..ip_header_len + 16].copy_from_slice(&new_window.to_be_bytes());

    checksum::ip_set_checksum(&mut out[..ip_header_len]);
    let src = ip.src_ip;
    let dst = ip.dst_ip;
    let (_ip_part, rest) = out.split_at_mut(ip_header_len);
    let (tcp_part, payload_part) = rest.split_at_mut(tcp_header_len);
    checksum::tcp_set_checksum(src, dst, tcp_part, payload_part);

    Some(out)
}
