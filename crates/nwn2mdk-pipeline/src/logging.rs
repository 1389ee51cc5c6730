//! Tracing subscriber setup
//!
//! Library code only emits `tracing` events; binaries call one of the
//! `init_*` functions once at startup to print them.

use std::sync::atomic::{AtomicBool, Ordering};
use tracing::Level;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Default filter when `RUST_LOG` is unset
pub const DEFAULT_FILTER: &str = "warn,nwn2mdk=info";

static TRACING_INITIALIZED: AtomicBool = AtomicBool::new(false);

/// Initialize the default subscriber
///
/// Multiple calls are safe; only the first one installs a subscriber.
pub fn init_default() {
    init_with_config(TracingConfig::default());
}

/// Initialize tracing with a custom configuration
pub fn init_with_config(config: TracingConfig) {
    if TRACING_INITIALIZED
        .compare_exchange(false, true, Ordering::SeqCst, Ordering::Relaxed)
        .is_err()
    {
        return;
    }

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.default_level));

    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(config.show_target)
        .with_file(config.show_file)
        .with_line_number(config.show_line_number);

    // Another subscriber may already be installed by the embedding program.
    let _ = tracing_subscriber::registry().with(fmt_layer).with(filter).try_init();
}

/// Configuration for tracing initialization
#[derive(Debug, Clone)]
pub struct TracingConfig {
    /// Filter directive used when `RUST_LOG` is unset
    pub default_level: String,
    /// Show the target (module path) in log output
    pub show_target: bool,
    pub show_file: bool,
    pub show_line_number: bool,
}

impl Default for TracingConfig {
    fn default() -> Self {
        Self {
            default_level: DEFAULT_FILTER.to_string(),
            show_target: true,
            show_file: false,
            show_line_number: false,
        }
    }
}

impl TracingConfig {
    /// Config for a `-v` count: 0 keeps the default filter, 1 is debug,
    /// 2 or more is trace with source locations
    pub fn from_verbosity(verbosity: u8) -> Self {
        let level = verbosity_level(verbosity);
        let mut config = Self::default();
        if let Some(level) = level {
            config.default_level = format!("warn,nwn2mdk={}", level.as_str().to_lowercase());
        }
        if level == Some(Level::TRACE) {
            config.show_file = true;
            config.show_line_number = true;
        }
        config
    }
}

/// Level selected by a `-v` count, `None` for the default
pub fn verbosity_level(verbosity: u8) -> Option<Level> {
    match verbosity {
        0 => None,
        1 => Some(Level::DEBUG),
        _ => Some(Level::TRACE),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tracing_config_default() {
        let config = TracingConfig::default();
        assert_eq!(config.default_level, "warn,nwn2mdk=info");
        assert!(config.show_target);
        assert!(!config.show_file);
    }

    #[test]
    fn test_from_verbosity() {
        assert_eq!(TracingConfig::from_verbosity(0).default_level, DEFAULT_FILTER);
        assert_eq!(TracingConfig::from_verbosity(1).default_level, "warn,nwn2mdk=debug");

        let trace = TracingConfig::from_verbosity(5);
        assert_eq!(trace.default_level, "warn,nwn2mdk=trace");
        assert!(trace.show_line_number);
    }

    #[test]
    fn test_repeated_init_is_ignored() {
        init_default();
        init_with_config(TracingConfig::from_verbosity(2));
        tracing::info!("still logging after second init");
    }
}
