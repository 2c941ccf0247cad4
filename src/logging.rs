//! Tracing subscriber setup.
//!
//! The library only emits `tracing` events; applications embedding it call
//! [`init_logging`] (or [`try_init_logging`] from tests) to print them.

use tracing::debug;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Build the filter, honouring `RUST_LOG` when set
fn build_filter(log_level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("cruise_curator={}", log_level)))
}

/// Install the global subscriber, returning an error string if one is already set
pub fn try_init_logging(log_level: &str, quiet: bool) -> Result<(), String> {
    let filter = build_filter(log_level);

    let result = if quiet {
        // Minimal logging for quiet mode
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_level(true)
                    .with_writer(std::io::stderr)
                    .compact(),
            )
            .try_init()
    } else {
        // Standard logging with timestamps
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_level(true)
                    .with_timer(fmt::time::uptime())
                    .with_writer(std::io::stderr),
            )
            .try_init()
    };

    result.map_err(|e| e.to_string())?;
    debug!("Logging initialized at level: {}", log_level);
    Ok(())
}

/// Install the global subscriber; a second call is ignored
pub fn init_logging(log_level: &str, quiet: bool) {
    if let Err(e) = try_init_logging(log_level, quiet) {
        debug!("Logging already initialized: {}", e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repeated_init_does_not_panic() {
        init_logging("debug", true);
        init_logging("info", false);
        assert!(try_init_logging("info", true).is_err());
    }
}
