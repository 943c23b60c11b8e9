//! Logging init: fmt subscriber on stderr, filtered by `RUST_LOG` or `-v`.

use anyhow::{Result, anyhow};
use tracing_subscriber::EnvFilter;

fn default_directive(verbose: u8) -> &'static str {
    match verbose {
        0 => "warn",
        1 => "info,pkgdata=debug",
        2 => "debug",
        _ => "trace",
    }
}

pub fn init_logging(verbose: u8) -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(verbose)));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init()
        .map_err(|e| anyhow!("failed to initialize logging: {e}"))?;

    tracing::debug!(verbose, "logging initialized");
    Ok(())
}
