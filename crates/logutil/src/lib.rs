//! Utilities for logging.

use tracing::Level;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::SubscriberBuilder;

/// Output format for log lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoggingMode {
    #[default]
    Pretty,
    Compact,
    Json,
}

/// Pick the max level from the number of `-v` flags.
pub const fn verbosity_to_level(verbosity: u8) -> Level {
    match verbosity {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    }
}

/// Initialize a global trace subscriber.
///
/// An explicit `RUST_LOG` always takes precedence over the verbosity count.
///
/// Panics if a global subscriber has already been set.
pub fn init(verbosity: u8, mode: LoggingMode) {
    let level = verbosity_to_level(verbosity);
    let filter = EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy();

    let builder = SubscriberBuilder::default()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    match mode {
        LoggingMode::Pretty => builder.pretty().init(),
        LoggingMode::Compact => builder.compact().init(),
        LoggingMode::Json => builder.json().init(),
    }
}

/// Initialize logging for tests.
///
/// Safe to call from multiple tests, only the first call installs the
/// subscriber.
pub fn init_test() {
    let _ = SubscriberBuilder::default()
        .with_max_level(Level::DEBUG)
        .with_test_writer()
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verbosity_levels() {
        assert_eq!(Level::WARN, verbosity_to_level(0));
        assert_eq!(Level::INFO, verbosity_to_level(1));
        assert_eq!(Level::DEBUG, verbosity_to_level(2));
        assert_eq!(Level::TRACE, verbosity_to_level(7));
    }

    #[test]
    fn init_test_twice() {
        init_test();
        init_test();
    }
}
