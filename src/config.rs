//! Immutable configuration record (§3 of the design). Built once at startup
//! from CLI flags and handed to every worker thread behind an `Arc`; never
//! mutated after construction, so no locking is required to read it.

use std::collections::HashSet;
use std::sync::Arc;

use thiserror::Error;

use crate::cli::Cli;

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum FragmentationStrategy {
    Tcp,
    Ip,
    None,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum FakingStrategy {
    Ttl,
    AckSeq,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Verbosity {
    Silent,
    Normal,
    Trace,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DomainSet {
    All,
    Some(HashSet<String>),
}

impl DomainSet {
    pub fn parse(raw: &str) -> Self {
        if raw.trim().eq_ignore_ascii_case("all") {
            return DomainSet::All;
        }
        let domains = raw
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_owned)
            .collect();
        DomainSet::Some(domains)
    }

    pub fn matches(&self, name: &str) -> bool {
        match self {
            DomainSet::All => true,
            DomainSet::Some(set) => set.iter().any(|d| name == d || name.ends_with(&format!(".{d}"))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("faking-ttl {0} out of range (0..=255)")]
    InvalidTtl(u32),
    #[error("threads count {0} out of range")]
    InvalidThreadCount(i64),
    #[error("fake-sni-seq-len {0} out of range (0..=255)")]
    InvalidSeqLen(i64),
}

#[derive(Debug, Clone)]
pub struct Config {
    pub fragmentation_strategy: FragmentationStrategy,
    pub faking_strategy: FakingStrategy,
    pub faking_ttl: u8,
    pub fake_sni: bool,
    pub fake_sni_seq_len: u8,
    pub frag_sni_reverse: bool,
    pub frag_sni_faked: bool,
    pub seg2_delay_ms: u64,
    pub fk_winsize: u16,
    pub quic_drop: bool,
    pub use_gso: bool,
    pub verbose: Verbosity,
    pub domains: DomainSet,
    pub queue_start_num: u16,
    pub threads: usize,
    pub fake_sni_template: Vec<u8>,
}

impl Config {
    pub fn from_cli(cli: Cli) -> Result<Arc<Config>, ConfigError> {
        if cli.faking_ttl > 255 {
            return Err(ConfigError::InvalidTtl(cli.faking_ttl));
        }
        if cli.threads <= 0 || cli.threads > 256 {
            return Err(ConfigError::InvalidThreadCount(cli.threads));
        }
        if cli.fake_sni_seq_len < 0 || cli.fake_sni_seq_len > 255 {
            return Err(ConfigError::InvalidSeqLen(cli.fake_sni_seq_len));
        }

        let template = crate::engine::fake::default_template();

        Ok(Arc::new(Config {
            fragmentation_strategy: cli.fragmentation_strategy,
            faking_strategy: cli.faking_strategy,
            faking_ttl: cli.faking_ttl as u8,
            fake_sni: cli.fake_sni,
            fake_sni_seq_len: cli.fake_sni_seq_len as u8,
            frag_sni_reverse: cli.frag_sni_reverse,
            frag_sni_faked: cli.frag_sni_faked,
            seg2_delay_ms: cli.seg2_delay_ms,
            fk_winsize: cli.fk_winsize,
            quic_drop: cli.quic_drop,
            use_gso: cli.use_gso,
            verbose: cli.verbose,
            domains: DomainSet::parse(&cli.sni_domains),
            queue_start_num: cli.queue_start_num,
            threads: cli.threads as usize,
            fake_sni_template: template,
        }))
    }
}
