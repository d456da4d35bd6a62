//! Logging configuration using tracing
//!
//! Logs go to stderr so results on stdout stay machine-readable.

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Filter directive variable checked before `RUST_LOG`
pub const LOG_ENV: &str = "OLLAMACTL_LOG";

const DEFAULT_DIRECTIVE: &str = "info";

/// Pick the filter directive: `--verbose` wins, then `OLLAMACTL_LOG`, then `RUST_LOG`
fn directive(verbose: bool, own: Option<String>, rust_log: Option<String>) -> String {
    if verbose {
        return "debug".to_string();
    }
    own.or(rust_log)
        .filter(|d| !d.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_DIRECTIVE.to_string())
}

/// Initialize the logging system
pub fn init(verbose: bool, json: bool) -> anyhow::Result<()> {
    let directive = directive(
        verbose,
        std::env::var(LOG_ENV).ok(),
        std::env::var(EnvFilter::DEFAULT_ENV).ok(),
    );
    let filter = EnvFilter::try_new(&directive).unwrap_or_else(|e| {
        eprintln!("Ignoring invalid log filter '{}': {}", directive, e);
        EnvFilter::new(DEFAULT_DIRECTIVE)
    });

    if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .try_init()?;
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
            .try_init()?;
    }

    Ok(())
}
