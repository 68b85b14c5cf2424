//! The evasion policy engine: fragmentation/segmentation primitives, the
//! fake-packet synthesizer, the ClientHello locator interface, and the
//! dispatch algorithm that ties them together.

pub mod fake;
pub mod fragment;
pub mod policy;
pub mod segment;
pub mod sni;

use thiserror::Error;

/// Internal contract violations raised by C3/C4. The policy engine treats
/// all of these as fail-open: the caller falls back to `accept_unchanged`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum EngineError {
    #[error("output buffer too small to hold fragment or segment")]
    TooShort,
    #[error("split offset out of range for the input payload")]
    InvalidOffset,
    #[error("input datagram is already fragmented")]
    InvalidFragState,
}

/// The outcome of running the policy engine on one input packet.
#[derive(Debug, Clone)]
pub enum Verdict {
    /// Forward the original packet untouched.
    AcceptUnchanged,
    /// Drop the packet; nothing is reinjected.
    Drop,
    /// Replace the original packet with this ordered list of output buffers.
    /// `delays[i]` is the emission delay, in milliseconds, for `packets[i]`.
    ReplaceWith {
        packets: Vec<Vec<u8>>,
        delays_ms: Vec<u64>,
    },
}

impl Verdict {
    pub fn replace(packets: Vec<Vec<u8>>) -> Self {
        let delays_ms = vec![0; packets.len()];
        Verdict::ReplaceWith { packets, delays_ms }
    }
}
