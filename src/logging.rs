//! Structured logging setup. Replaces the teacher's serial/VGA text output
//! (meaningful only on bare metal) with `tracing`, since this binary runs
//! under a normal OS.

use tracing_subscriber::EnvFilter;

use crate::config::Verbosity;

pub fn init(verbosity: Verbosity) {
    let level = match verbosity {
        Verbosity::Silent => return,
        Verbosity::Normal => "info",
        Verbosity::Trace => "trace",
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}
