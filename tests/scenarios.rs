//! End-to-end scenario tests exercising the policy engine and its
//! collaborators through the crate's public API, plus the documented
//! boundary cases around offsets, header sizes, and configuration limits.

use sni_mangler::checksum;
use sni_mangler::cli::Cli;
use sni_mangler::config::{Config, DomainSet, FakingStrategy, FragmentationStrategy, Verbosity};
use sni_mangler::engine::fragment::frag_ip4;
use sni_mangler::engine::policy::handle_packet;
use sni_mangler::engine::segment::frag_tcp4;
use sni_mangler::engine::sni::DefaultSniLocator;
use sni_mangler::engine::{EngineError, Verdict};
use sni_mangler::packet::{split_ip4, split_tcp4};

use clap::Parser;

fn client_hello_record(hostname: &str) -> Vec<u8> {
    let host = hostname.as_bytes();
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
    body.push(0);
    body.extend_from_slice(&[0x00, 0x02, 0x13, 0x01]);
    body.extend_from_slice(&[0x01, 0x00]);
    body.extend_from_slice(&(sni_extension.len() as u16).to_be_bytes());
    body.extend_from_slice(&sni_extension);
    let mut handshake = vec![0x01];
    let hs_len = body.len() as u32;
    handshake.extend_from_slice(&hs_len.to_be_bytes()[1..]);
    handshake.extend_from_slice(&body);
    let mut record = vec![0x16, 0x03, 0x03];
    record.extend_from_slice(&(handshake.len() as u16).to_be_bytes());
    record.extend_from_slice(&handshake);
    record
}

fn client_hello_packet(hostname: &str) -> Vec<u8> {
    let record = client_hello_record(hostname);
    let total_length = (20 + 20 + record.len()) as u16;
    let mut buf = vec![0u8; total_length as usize];
    buf[0] = 0x45;
    buf[2..4].copy_from_slice(&total_length.to_be_bytes());
    buf[8] = 64;
    buf[9] = 6;
    buf[12..16].copy_from_slice(&[10, 0, 0, 1]);
    buf[16..20].copy_from_slice(&[10, 0, 0, 2]);
    buf[22..24].copy_from_slice(&443u16.to_be_bytes());
    buf[24..28].copy_from_slice(&1000u32.to_be_bytes());
    buf[32] = 5 << 4;
    buf[33] = sni_mangler::packet::tcp::flags::PSH | sni_mangler::packet::tcp::flags::ACK;
    buf[34..36].copy_from_slice(&65535u16.to_be_bytes());
    buf[40..].copy_from_slice(&record);

    checksum::ip_set_checksum(&mut buf[..20]);
    let src = std::net::Ipv4Addr::new(10, 0, 0, 1);
    let dst = std::net::Ipv4Addr::new(10, 0, 0, 2);
    let mut tcp_header = buf[20..40].to_vec();
    let csum = checksum::tcp_checksum(src, dst, &tcp_header, &record);
    tcp_header[16..18].copy_from_slice(&csum.to_be_bytes());
    buf[20..40].copy_from_slice(&tcp_header);
    buf
}

fn base_config() -> Config {
    Config {
        fragmentation_strategy: FragmentationStrategy::None,
        faking_strategy: FakingStrategy::Ttl,
        faking_ttl: 8,
        fake_sni: false,
        fake_sni_seq_len: 0,
        frag_sni_reverse: false,
        frag_sni_faked: false,
        seg2_delay_ms: 0,
        fk_winsize: 0,
        quic_drop: false,
        use_gso: false,
        verbose: Verbosity::Normal,
        domains: DomainSet::All,
        queue_start_num: 200,
        threads: 1,
        fake_sni_template: sni_mangler::engine::fake::default_template(),
    }
}

#[test]
fn tcp_segmentation_splits_client_hello_at_sni_boundary() {
    let config = Config {
        fragmentation_strategy: FragmentationStrategy::Tcp,
        ..base_config()
    };
    let packet = client_hello_packet("blocked.example");
    let verdict = handle_packet(&packet, &config, &DefaultSniLocator);

    match verdict {
        Verdict::ReplaceWith { packets, .. } => {
            assert_eq!(packets.len(), 2);
            let ip_a = split_ip4(&packets[0]).unwrap();
            let tcp_a = split_tcp4(&ip_a).unwrap();
            let ip_b = split_ip4(&packets[1]).unwrap();
            let tcp_b = split_tcp4(&ip_b).unwrap();
            let mut joined = tcp_a.payload.to_vec();
            joined.extend_from_slice(tcp_b.payload);
            let original_ip = split_ip4(&packet).unwrap();
            let original_tcp = split_tcp4(&original_ip).unwrap();
            assert_eq!(joined, original_tcp.payload);
        }
        other => panic!("expected ReplaceWith, got {other:?}"),
    }
}

#[test]
fn ip_fragmentation_with_reverse_emits_second_fragment_first() {
    let config = Config {
        fragmentation_strategy: FragmentationStrategy::Ip,
        frag_sni_reverse: true,
        ..base_config()
    };
    let packet = client_hello_packet("blocked.example");
    let verdict = handle_packet(&packet, &config, &DefaultSniLocator);

    match verdict {
        Verdict::ReplaceWith { packets, .. } => {
            assert_eq!(packets.len(), 2);
            let first = split_ip4(&packets[0]).unwrap();
            let second = split_ip4(&packets[1]).unwrap();
            // The reversed pair puts the continuation fragment (non-zero
            // offset) ahead of the lead fragment (offset zero, MF set).
            assert_ne!(first.fragment_offset, 0);
            assert_eq!(second.fragment_offset, 0);
            assert!(second.more_fragments());
        }
        other => panic!("expected ReplaceWith, got {other:?}"),
    }
}

#[test]
fn fake_sni_prepends_ttl_marked_decoys() {
    let config = Config {
        fake_sni: true,
        fake_sni_seq_len: 2,
        faking_strategy: FakingStrategy::Ttl,
        faking_ttl: 5,
        ..base_config()
    };
    let packet = client_hello_packet("blocked.example");
    let verdict = handle_packet(&packet, &config, &DefaultSniLocator);

    match verdict {
        Verdict::ReplaceWith { packets, .. } => {
            assert_eq!(packets.len(), 3);
            for decoy in &packets[..2] {
                let ip = split_ip4(decoy).unwrap();
                assert_eq!(ip.ttl, 5);
            }
            let real_ip = split_ip4(&packets[2]).unwrap();
            assert_eq!(real_ip.ttl, 64);
        }
        other => panic!("expected ReplaceWith, got {other:?}"),
    }
}

#[test]
fn quic_drop_drops_udp_443_traffic() {
    let config = Config {
        quic_drop: true,
        ..base_config()
    };
    let mut buf = vec![0u8; 20 + 8 + 4];
    buf[0] = 0x45;
    buf[2..4].copy_from_slice(&(buf.len() as u16).to_be_bytes());
    buf[8] = 64;
    buf[9] = 17;
    buf[12..16].copy_from_slice(&[10, 0, 0, 1]);
    buf[16..20].copy_from_slice(&[10, 0, 0, 2]);
    buf[22..24].copy_from_slice(&443u16.to_be_bytes());
    checksum::ip_set_checksum(&mut buf[..20]);

    let verdict = handle_packet(&buf, &config, &DefaultSniLocator);
    assert!(matches!(verdict, Verdict::Drop));
}

#[test]
fn sni_outside_configured_domain_set_passes_through_untouched() {
    let mut config = base_config();
    config.domains = DomainSet::parse("allowed.example");
    let packet = client_hello_packet("blocked.example");
    let verdict = handle_packet(&packet, &config, &DefaultSniLocator);
    assert!(matches!(verdict, Verdict::AcceptUnchanged));
}

#[test]
fn window_rewrite_updates_field_without_fragmentation() {
    let config = Config {
        fk_winsize: 256,
        ..base_config()
    };
    let packet = client_hello_packet("blocked.example");
    let verdict = handle_packet(&packet, &config, &DefaultSniLocator);
    match verdict {
        Verdict::ReplaceWith { packets, .. } => {
            assert_eq!(packets.len(), 1);
            let ip = split_ip4(&packets[0]).unwrap();
            let tcp = split_tcp4(&ip).unwrap();
            assert_eq!(tcp.window, 256);
        }
        other => panic!("expected ReplaceWith, got {other:?}"),
    }
}

#[test]
fn ip_fragmentation_rejects_zero_offset() {
    let packet = client_hello_packet("blocked.example");
    assert_eq!(frag_ip4(&packet, 0), Err(EngineError::InvalidOffset));
}

#[test]
fn tcp_segmentation_rejects_offset_at_payload_length() {
    let packet = client_hello_packet("blocked.example");
    let ip = split_ip4(&packet).unwrap();
    let tcp = split_tcp4(&ip).unwrap();
    let payload_len = tcp.payload.len();
    assert_eq!(
        frag_tcp4(&packet, payload_len),
        Err(EngineError::InvalidOffset)
    );
}

#[test]
fn ihl_fifteen_parses_maximum_size_header() {
    // ihl=15 -> 60-byte header, the largest representable; options fill
    // the remaining 40 bytes.
    let payload = b"x";
    let total_length = (60 + payload.len()) as u16;
    let mut buf = vec![0u8; total_length as usize];
    buf[0] = 0x4F; // version 4, ihl 15
    buf[2..4].copy_from_slice(&total_length.to_be_bytes());
    buf[8] = 64;
    buf[9] = 6;
    buf[12..16].copy_from_slice(&[10, 0, 0, 1]);
    buf[16..20].copy_from_slice(&[10, 0, 0, 2]);
    buf[60..].copy_from_slice(payload);
    checksum::ip_set_checksum(&mut buf[..60]);

    let ip = split_ip4(&buf).unwrap();
    assert_eq!(ip.header_len(), 60);
    assert_eq!(ip.payload, payload);
}

#[test]
fn tcp_segmentation_rejects_already_fragmented_datagram() {
    let mut packet = client_hello_packet("blocked.example");
    packet[6] = 0x40; // MF bit set (FLAGS field occupies buf[6] bits 5-7)
    checksum::ip_set_checksum(&mut packet[..20]);
    assert_eq!(
        frag_tcp4(&packet, 10),
        Err(EngineError::InvalidFragState)
    );
}

#[test]
fn fake_sni_seq_len_accepts_255_and_rejects_256() {
    let cli_ok = Cli::parse_from(["sni-mangler", "--fake-sni-seq-len", "255"]);
    assert!(Config::from_cli(cli_ok).is_ok());

    let cli_bad = Cli::parse_from(["sni-mangler", "--fake-sni-seq-len", "256"]);
    assert!(Config::from_cli(cli_bad).is_err());
}
