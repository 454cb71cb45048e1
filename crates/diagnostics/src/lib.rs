//! Logging setup shared by the davfs crates
//!
//! Libraries log through the `log` facade; binaries and tests call one of
//! the init functions here to route those records to stderr.
//!
//! Usage:
//! - Set DAVFS_LOG=off (default) - no logs
//! - Set DAVFS_LOG=info - mounts, remounts and other configuration changes
//! - Set DAVFS_LOG=debug - traversal, cache and sidecar details
//! - Set DAVFS_LOG=trace - everything

use log::LevelFilter;
use std::sync::Once;

// Re-export log so dependents can use the macros through this crate
pub use log;

/// Environment variable holding the log level
pub const LOG_ENV: &str = "DAVFS_LOG";

static INIT: Once = Once::new();

/// Maps a `DAVFS_LOG` value to a level filter. Unknown values fall back
/// to `info`; the second element reports whether the value was recognised.
fn parse_level(value: &str) -> (LevelFilter, bool) {
    match value.trim().to_ascii_lowercase().as_str() {
        "off" | "" => (LevelFilter::Off, true),
        "error" => (LevelFilter::Error, true),
        "warn" => (LevelFilter::Warn, true),
        "info" => (LevelFilter::Info, true),
        "debug" => (LevelFilter::Debug, true),
        "trace" => (LevelFilter::Trace, true),
        _ => (LevelFilter::Info, false),
    }
}

fn configured_level() -> (LevelFilter, bool) {
    let value = std::env::var(LOG_ENV).unwrap_or_else(|_| "off".to_string());
    parse_level(&value)
}

/// Initialize logging based on the DAVFS_LOG environment variable
///
/// This should be called once at application startup. It's safe to call
/// multiple times - subsequent calls will be ignored.
pub fn init_diagnostics() {
    INIT.call_once(|| {
        let (level, known) = configured_level();
        if level == LevelFilter::Off {
            return;
        }
        let installed = env_logger::Builder::new()
            .filter_level(level)
            .format_timestamp_millis()
            .try_init();
        if installed.is_ok() && !known {
            log::warn!("Unknown {LOG_ENV} value, using 'info'");
        }
    });
}

/// Initialize logging for tests: output is captured by the test harness
/// and repeated calls from many tests are harmless.
pub fn init_test_logging() {
    let (level, _) = configured_level();
    _ = env_logger::Builder::new()
        .filter_level(level)
        .is_test(true)
        .try_init();
}

/// Re-export the init function for convenience
pub use init_diagnostics as init;
