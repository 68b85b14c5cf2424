//! Policy engine (C7): the decision tree that turns one input packet into
//! zero or more output packets, per the configured evasion strategy.

use tracing::{debug, trace, warn};

use crate::config::{Config, FragmentationStrategy};
use crate::packet;
use crate::packet::{Ipv4View, TcpView};

use super::fake::synthesize_decoys;
use super::fragment::frag_ip4;
use super::segment::frag_tcp4;
use super::sni::{SniLocator, SniResult};
use super::Verdict;

/// Runs the full 8-step dispatch algorithm on one raw input buffer.
pub fn handle_packet(buf: &[u8], config: &Config, locator: &dyn SniLocator) -> Verdict {
    let ip = match packet::split_ip4(buf) {
        Ok(ip) => ip,
        Err(e) => {
            debug!(error = %e, "failed to parse IPv4 header, accepting unchanged");
            return Verdict::AcceptUnchanged;
        }
    };

    if ip.protocol == packet::ipv4::protocol::UDP {
        if config.quic_drop {
            if let Ok(udp) = packet::split_udp4(&ip) {
                if udp.dst_port == 443 {
                    trace!("dropping UDP/443 datagram per quic_drop");
                    return Verdict::Drop;
                }
            }
        }
        return Verdict::AcceptUnchanged;
    }

    if ip.protocol != packet::ipv4::protocol::TCP {
        return Verdict::AcceptUnchanged;
    }

    let tcp = match packet::split_tcp4(&ip) {
        Ok(tcp) => tcp,
        Err(e) => {
            debug!(error = %e, "failed to parse TCP header, accepting unchanged");
            return Verdict::AcceptUnchanged;
        }
    };

    if tcp.payload.is_empty() {
        return Verdict::AcceptUnchanged;
    }

    let sni_offset_in_payload = match locator.locate(tcp.payload) {
        SniResult::Found { name, offset, .. } => {
            if config.domains != crate::config::DomainSet::All && !config.domains.matches(&name) {
                trace!(%name, "SNI did not match configured domain set");
                return Verdict::AcceptUnchanged;
            }
            offset
        }
        _ => return Verdict::AcceptUnchanged,
    };

    let working = if config.fk_winsize > 0 {
        super::fake::rewrite_window(buf, config.fk_winsize).unwrap_or_else(|| buf.to_vec())
    } else {
        buf.to_vec()
    };

    let mut packets: Vec<Vec<u8>> = Vec::new();
    let mut delays: Vec<u64> = Vec::new();

    if config.fake_sni && config.fake_sni_seq_len > 0 {
        let decoys = synthesize_decoys(
            &ip,
            &tcp,
            config.fake_sni_seq_len as usize,
            &config.fake_sni_template,
            config.faking_strategy,
            config.faking_ttl,
        );
        delays.extend(std::iter::repeat(0).take(decoys.len()));
        packets.extend(decoys);
    }

    match config.fragmentation_strategy {
        FragmentationStrategy::None => {
            packets.push(working);
            delays.push(0);
        }
        FragmentationStrategy::Tcp => match frag_tcp4(&working, sni_offset_in_payload) {
            Ok((seg_a, seg_b)) => {
                push_split(&mut packets, &mut delays, seg_a, seg_b, config, &ip, &tcp);
            }
            Err(e) => {
                warn!(error = %e, "TCP segmentation failed, accepting unchanged");
                return Verdict::AcceptUnchanged;
            }
        },
        FragmentationStrategy::Ip => {
            let rounded = (sni_offset_in_payload / 8) * 8;
            match frag_ip4(&working, rounded.max(8)) {
                Ok((frag_a, frag_b)) => {
                    push_split(&mut packets, &mut delays, frag_a, frag_b, config, &ip, &tcp);
                }
                Err(e) => {
                    warn!(error = %e, "IP fragmentation failed, accepting unchanged");
                    return Verdict::AcceptUnchanged;
                }
            }
        }
    }

    Verdict::ReplaceWith {
        packets,
        delays_ms: delays,
    }
}

/// Appends a two-part split (fragment or segment pair) to the output list,
/// honoring `frag_sni_reverse`, `frag_sni_faked`, and `seg2_delay_ms`. When
/// `frag_sni_faked` is set, each fragment is framed with a single decoy
/// packet cloned from the real flow's headers immediately before it.
fn push_split(
    packets: &mut Vec<Vec<u8>>,
    delays: &mut Vec<u64>,
    mut first: Vec<u8>,
    mut second: Vec<u8>,
    config: &Config,
    ip: &Ipv4View<'_>,
    tcp: &TcpView<'_>,
) {
    if config.frag_sni_reverse {
        std::mem::swap(&mut first, &mut second);
    }

    if config.frag_sni_faked {
        let mut decoy = || {
            synthesize_decoys(
                ip,
                tcp,
                1,
                &config.fake_sni_template,
                config.faking_strategy,
                config.faking_ttl,
            )
            .pop()
            .expect("count=1 always yields exactly one decoy")
        };

        packets.push(decoy());
        delays.push(0);
        packets.push(first);
        delays.push(0);
        packets.push(decoy());
        delays.push(0);
        packets.push(second);
        delays.push(config.seg2_delay_ms);
        packets.push(decoy());
        delays.push(config.seg2_delay_ms);
        return;
    }

    packets.push(first);
    delays.push(0);
    packets.push(second);
    delays.push(config.seg2_delay_ms);
}
