//! Stand-in for the netfilter queue collaborator (§6). The core never talks
//! to NFQUEUE directly: it receives packets through [`PacketSource`] and
//! emits verdict output through [`PacketSink`]. A real binding lives outside
//! this crate; [`InMemoryQueue`] exists so the worker loop and the engine
//! can be exercised end-to-end without one.

use std::io;
use std::time::Duration;

/// One packet handed to a worker by the external netfilter collaborator.
pub struct PacketHandle {
    pub data: Vec<u8>,
}

pub trait PacketSource: Send {
    fn recv(&mut self) -> io::Result<PacketHandle>;
}

pub trait PacketSink: Send {
    fn send(&mut self, buf: &[u8], delay: Duration) -> io::Result<()>;
}

/// A `Vec`-backed source/sink pair, useful for tests and for the
/// single-process demo path in `main.rs`.
#[derive(Default)]
pub struct InMemoryQueue {
    pub inbound: std::collections::VecDeque<Vec<u8>>,
    pub outbound: Vec<(Vec<u8>, Duration)>,
}

impl InMemoryQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_inbound(&mut self, packet: Vec<u8>) {
        self.inbound.push_back(packet);
    }
}

impl PacketSource for InMemoryQueue {
    fn recv(&mut self) -> io::Result<PacketHandle> {
        self.inbound
            .pop_front()
            .map(|data| PacketHandle { data })
            .ok_or_else(|| io::Error::new(io::ErrorKind::WouldBlock, "queue empty"))
    }
}

impl PacketSink for InMemoryQueue {
    fn send(&mut self, buf: &[u8], delay: Duration) -> io::Result<()> {
        self.outbound.push((buf.to_vec(), delay));
        Ok(())
    }
}
