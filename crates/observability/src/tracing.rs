//! Tracing/logging initialization.
//!
//! Filtering comes from `RUST_LOG` when set, otherwise from
//! [`TracingConfig::default_filter`]. Dispatch internals log at `debug`
//! (registration changes) and `trace` (per-subscriber invocation, pruning).

use tracing_subscriber::EnvFilter;

/// Output format of the fmt layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// One JSON object per line.
    #[default]
    Json,
    /// Human-readable, single line per event.
    Compact,
}

#[derive(Debug, Clone)]
pub struct TracingConfig {
    /// Filter used when `RUST_LOG` is unset or invalid.
    pub default_filter: String,
    pub format: LogFormat,
    /// Route output through the test harness capture instead of stdout.
    pub test_writer: bool,
}

impl Default for TracingConfig {
    fn default() -> Self {
        Self {
            default_filter: "info".to_string(),
            format: LogFormat::Json,
            test_writer: false,
        }
    }
}

impl TracingConfig {
    /// Settings for `#[test]` code: compact, captured, verbose for tether crates.
    pub fn for_tests() -> Self {
        Self {
            default_filter: "tether_events=trace".to_string(),
            format: LogFormat::Compact,
            test_writer: true,
        }
    }

    pub fn with_default_filter(mut self, filter: impl Into<String>) -> Self {
        self.default_filter = filter.into();
        self
    }

    pub fn with_format(mut self, format: LogFormat) -> Self {
        self.format = format;
        self
    }

    /// The filter this configuration resolves to right now.
    pub fn env_filter(&self) -> EnvFilter {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&self.default_filter))
    }
}

/// Initialize tracing/logging for the process.
///
/// Safe to call multiple times (subsequent calls are no-ops). Returns `false`
/// when a global subscriber was already installed.
pub fn init(config: &TracingConfig) -> bool {
    let builder = tracing_subscriber::fmt()
        .with_env_filter(config.env_filter())
        .with_timer(tracing_subscriber::fmt::time::SystemTime)
        .with_target(false);

    match (config.format, config.test_writer) {
        (LogFormat::Json, false) => builder.json().try_init().is_ok(),
        (LogFormat::Json, true) => builder.json().with_test_writer().try_init().is_ok(),
        (LogFormat::Compact, false) => builder.compact().try_init().is_ok(),
        (LogFormat::Compact, true) => builder.compact().with_test_writer().try_init().is_ok(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_init_is_a_no_op() {
        let config = TracingConfig::for_tests();
        let _ = init(&config);
        assert!(!init(&config));
    }

    #[test]
    fn builders_override_defaults() {
        let config = TracingConfig::default()
            .with_default_filter("debug")
            .with_format(LogFormat::Compact);
        assert_eq!(config.default_filter, "debug");
        assert_eq!(config.format, LogFormat::Compact);
        assert!(!config.test_writer);
    }
}
