// src/log.rs
use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Mutex;

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Install the process-wide subscriber: terminal lines plus an append-mode
/// log file. `RUST_LOG` overrides the default level (`info`, `debug` when verbose).
///
/// Call once, from the binary. Library code only emits events.
pub fn init(file: &Path, verbose: bool) -> std::io::Result<()> {
    let default = if verbose { "review_scrape=debug,info" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    let log_file = OpenOptions::new().create(true).append(true).open(file)?;

    let registry = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).compact())
        .with(fmt::layer().with_ansi(false).with_writer(Mutex::new(log_file)));

    // A second init (tests, embedding) keeps the first subscriber.
    if registry.try_init().is_err() {
        tracing::debug!("Log: Subscriber already installed");
    }
    Ok(())
}
