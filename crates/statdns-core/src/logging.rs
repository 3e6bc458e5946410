//! Logging configuration and `tracing` subscriber setup.

use std::collections::HashMap;
use std::io;

use serde::{Deserialize, Serialize};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Logging configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    pub level: Option<String>,
    /// Log format: json, pretty, or compact. Default: pretty.
    pub format: Option<String>,
    /// Output target: stdout or stderr. Default: stderr.
    pub output: Option<String>,
    /// Per-module log level filters (e.g., {"statdns_dns": "debug", "reqwest": "warn"}).
    #[serde(default)]
    pub filters: HashMap<String, String>,
}

impl LoggingConfig {
    /// Build the `EnvFilter` directive string: base level followed by module filters.
    pub fn filter_directives(&self) -> String {
        let mut directives = self.level.as_deref().unwrap_or("info").to_string();

        let mut modules: Vec<_> = self.filters.iter().collect();
        modules.sort();
        for (module, level) in modules {
            directives.push(',');
            directives.push_str(module);
            directives.push('=');
            directives.push_str(level);
        }

        directives
    }
}

/// Install the global `tracing` subscriber described by `config`.
///
/// Invalid filter directives fall back to `info`. Calling this twice is a no-op
/// for the second call.
pub fn init_tracing(config: &LoggingConfig) {
    let filter =
        EnvFilter::try_new(config.filter_directives()).unwrap_or_else(|_| EnvFilter::new("info"));

    let format = config.format.as_deref().unwrap_or("pretty");
    let output = config.output.as_deref().unwrap_or("stderr");

    let registry = tracing_subscriber::registry().with(filter);
    let _ = match (format, output) {
        ("json", "stdout") => registry
            .with(fmt::layer().json().with_writer(io::stdout))
            .try_init(),
        ("json", _) => registry
            .with(fmt::layer().json().with_writer(io::stderr))
            .try_init(),
        ("compact", "stdout") => registry
            .with(fmt::layer().compact().with_writer(io::stdout))
            .try_init(),
        ("compact", _) => registry
            .with(fmt::layer().compact().with_writer(io::stderr))
            .try_init(),
        (_, "stdout") => registry
            .with(fmt::layer().with_writer(io::stdout))
            .try_init(),
        _ => registry
            .with(fmt::layer().with_writer(io::stderr))
            .try_init(),
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn directives_default_to_info() {
        let config = LoggingConfig::default();
        assert_eq!(config.filter_directives(), "info");
    }

    #[test]
    fn directives_include_sorted_module_filters() {
        let mut config = LoggingConfig {
            level: Some("warn".into()),
            ..Default::default()
        };
        config.filters.insert("statdns_socks".into(), "trace".into());
        config.filters.insert("statdns_dns".into(), "debug".into());

        assert_eq!(
            config.filter_directives(),
            "warn,statdns_dns=debug,statdns_socks=trace"
        );
    }
}
