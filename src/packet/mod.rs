//! Header splitter (C2): validate and cleave a raw buffer into non-owning
//! IP/TCP/UDP views. No entry point here allocates or mutates its input.

pub mod error;
pub mod ipv4;
pub mod tcp;
pub mod udp;

pub use error::PacketError;
pub use ipv4::{split_ip4, Ipv4View};
pub use tcp::{split_tcp4, TcpView};
pub use udp::{split_udp4, UdpView};
