//! Worker pool (§5): `config.threads` workers, each bound to its own
//! `PacketSource`/`PacketSink` pair, with no shared mutable state. Each
//! worker is a tight receive/decide/emit loop; the only blocking call is
//! the collaborator's `recv`.

use std::io;
use std::sync::Arc;
use std::time::Duration;

use tracing::{info_span, warn};

use crate::config::Config;
use crate::engine::policy::handle_packet;
use crate::engine::sni::SniLocator;
use crate::engine::Verdict;
use crate::queue::{PacketSink, PacketSource};

/// Runs one worker's receive/decide/emit loop until `source` reports
/// end-of-stream (`io::ErrorKind::WouldBlock` with an empty backlog is
/// treated as "no more work" by the in-memory queue used in tests/demos;
/// a real NFQUEUE binding would instead block on `recv`).
pub fn run_worker(
    queue_num: u16,
    config: Arc<Config>,
    locator: Arc<dyn SniLocator + Send + Sync>,
    mut source: Box<dyn PacketSource>,
    mut sink: Box<dyn PacketSink>,
) -> io::Result<()> {
    let span = info_span!("worker", queue = queue_num);
    let _enter = span.enter();

    loop {
        let handle = match source.recv() {
            Ok(handle) => handle,
            Err(e) if e.kind() == io::ErrorKind::WouldBlock => return Ok(()),
            Err(e) => return Err(e),
        };

        match handle_packet(&handle.data, &config, locator.as_ref()) {
            Verdict::AcceptUnchanged => {
                sink.send(&handle.data, Duration::ZERO)?;
            }
            Verdict::Drop => {}
            Verdict::ReplaceWith { packets, delays_ms } => {
                for (packet, delay_ms) in packets.into_iter().zip(delays_ms) {
                    if let Err(e) = sink.send(&packet, Duration::from_millis(delay_ms)) {
                        warn!(error = %e, "failed to emit mangled packet");
                    }
                }
            }
        }
    }
}
