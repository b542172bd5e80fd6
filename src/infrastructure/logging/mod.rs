// Logging module - Logging infrastructure
use crate::domain::error::{BridgeError, BridgeResult};
use std::io;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Map a configured level name to a filter directive for this crate.
pub fn filter_directive(log_level: &str, verbose: bool) -> String {
    let level = if verbose {
        "debug"
    } else {
        match log_level.to_ascii_lowercase().as_str() {
            "error" => "error",
            "warn" => "warn",
            "debug" => "debug",
            "trace" => "trace",
            _ => "info",
        }
    };
    format!("cdcbridge={},warn", level)
}

/// Initialize logging system. `RUST_LOG` takes precedence over the configured level.
pub fn init_logging(log_level: &str, verbose: bool) -> BridgeResult<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(filter_directive(log_level, verbose)));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(io::stderr)
                .with_target(true)
                .with_level(true)
                .with_thread_ids(false)
                .with_file(verbose)
                .with_line_number(verbose),
        )
        .try_init()
        .map_err(|e| BridgeError::Config {
            message: format!("Failed to initialize logging: {}", e),
        })?;

    tracing::info!("cdcbridge logging system initialized");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_directive() {
        assert_eq!(filter_directive("info", false), "cdcbridge=info,warn");
        assert_eq!(filter_directive("TRACE", false), "cdcbridge=trace,warn");
        assert_eq!(filter_directive("bogus", false), "cdcbridge=info,warn");
        assert_eq!(filter_directive("error", true), "cdcbridge=debug,warn");
    }

    #[test]
    fn test_logging_init_twice_reports_error() {
        // The first call may race with other tests; the second must not panic.
        let _ = init_logging("info", false);
        assert!(init_logging("info", false).is_err());
    }
}
