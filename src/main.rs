//! Binary entry point: parse CLI flags, build the immutable configuration,
//! initialize logging, and hand one netfilter queue number per thread to a
//! worker loop. The real NFQUEUE binding is out of scope for this crate
//! (§6); each worker runs against an in-memory queue so the binary is a
//! runnable demonstration of the wiring rather than a deployable daemon.

use std::process::ExitCode;
use std::sync::Arc;
use std::thread;

use clap::Parser;
use tracing::{error, info};

use sni_mangler::cli::Cli;
use sni_mangler::config::Config;
use sni_mangler::engine::sni::DefaultSniLocator;
use sni_mangler::engine::sni::SniLocator;
use sni_mangler::error::AppError;
use sni_mangler::logging;
use sni_mangler::queue::InMemoryQueue;
use sni_mangler::runtime::run_worker;

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e @ AppError::Config(_)) => {
            error!(error = %e, "fatal error");
            ExitCode::from(2)
        }
        Err(e @ AppError::Io(_)) => {
            error!(error = %e, "fatal error");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let config = Config::from_cli(cli)?;
    logging::init(config.verbose);

    info!(
        threads = config.threads,
        queue_start_num = config.queue_start_num,
        strategy = ?config.fragmentation_strategy,
        "starting worker pool"
    );

    let handles: Vec<_> = (0..config.threads)
        .map(|i| {
            let config = Arc::clone(&config);
            let queue_num = config.queue_start_num.wrapping_add(i as u16);
            thread::spawn(move || {
                let locator: Arc<dyn SniLocator + Send + Sync> = Arc::new(DefaultSniLocator);
                let source = Box::new(InMemoryQueue::new());
                let sink = Box::new(InMemoryQueue::new());
                run_worker(queue_num, config, locator, source, sink)
            })
        })
        .collect();

    for handle in handles {
        match handle.join() {
            Ok(Ok(())) => {}
            Ok(Err(e)) => return Err(AppError::Io(e)),
            Err(_) => error!("worker thread panicked"),
        }
    }

    Ok(())
}
