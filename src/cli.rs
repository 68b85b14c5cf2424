//! Command-line surface (collaborator per §6). A thin `clap`-derived parser
//! over the configuration table; it never looks at packet contents itself.

use clap::Parser;

use crate::config::{FakingStrategy, FragmentationStrategy, Verbosity};

/// A userspace packet mangler that rewrites outbound TLS ClientHellos to
/// defeat SNI-based deep packet inspection.
#[derive(Debug, Parser)]
#[command(name = "sni-mangler", version, about)]
pub struct Cli {
    /// How to split the carrier packet: tcp, ip, or none.
    #[arg(long, value_enum, default_value = "tcp")]
    pub fragmentation_strategy: FragmentationStrategy,

    /// How decoy packets are marked so the destination rejects them.
    #[arg(long, value_enum, default_value = "ttl")]
    pub faking_strategy: FakingStrategy,

    /// TTL stamped on ttl-strategy decoys.
    #[arg(long, default_value_t = 8)]
    pub faking_ttl: u32,

    /// Emit a decoy TLS record before the real one.
    #[arg(long, default_value_t = true)]
    pub fake_sni: bool,

    /// Number of consecutive decoys per real packet. 0 suppresses decoys.
    #[arg(long, default_value_t = 1)]
    pub fake_sni_seq_len: i64,

    /// Send the second fragment/segment before the first.
    #[arg(long, default_value_t = true)]
    pub frag_sni_reverse: bool,

    /// Wrap fragments in additional decoys.
    #[arg(long, default_value_t = false)]
    pub frag_sni_faked: bool,

    /// Deferred emission delay, in milliseconds, for the second segment.
    #[arg(long, default_value_t = 0)]
    pub seg2_delay_ms: u64,

    /// If non-zero, rewrite the TCP window on the real packet. 0 disables.
    #[arg(long, default_value_t = 0)]
    pub fk_winsize: u16,

    /// Drop all UDP/443 traffic.
    #[arg(long, default_value_t = false)]
    pub quic_drop: bool,

    /// Accept generic-segmentation-offload superpackets as input.
    #[arg(long, default_value_t = false)]
    pub use_gso: bool,

    /// Logging verbosity: silent, normal, or trace.
    #[arg(long, value_enum, default_value = "normal")]
    pub verbose: Verbosity,

    /// Comma-separated SNI match set, or the literal "all".
    #[arg(long, default_value = "all")]
    pub sni_domains: String,

    /// Starting netfilter queue number handed to the external collaborator.
    #[arg(long, default_value_t = 200)]
    pub queue_start_num: u16,

    /// Number of worker threads, one netfilter queue per thread.
    #[arg(long, default_value_t = 1)]
    pub threads: i64,
}
