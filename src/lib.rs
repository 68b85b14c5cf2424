//! A userspace packet mangler that rewrites outbound TLS ClientHellos to
//! defeat SNI-based deep packet inspection, without proxying: packets are
//! delivered by a netfilter queue, mangled, and reinjected.

pub mod checksum;
pub mod cli;
pub mod config;
pub mod engine;
pub mod error;
pub mod logging;
pub mod packet;
pub mod queue;
pub mod runtime;
