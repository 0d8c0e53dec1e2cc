//! Structured logging setup
//!
//! `RUST_LOG` wins over the configured filter. Initialization is idempotent:
//! when a global subscriber already exists the call leaves it in place.

use crate::config::AnalyzerConfig;
use tracing_subscriber::{fmt, EnvFilter};

/// Install the global tracing subscriber
///
/// Returns `true` if this call installed it.
pub fn init(default_filter: &str, json: bool) -> bool {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    let builder = fmt().with_env_filter(filter).with_target(true).with_writer(std::io::stderr);

    let installed = if json {
        builder.json().try_init().is_ok()
    } else {
        builder.try_init().is_ok()
    };

    if installed {
        tracing::debug!(filter = default_filter, json, "structured logging initialized");
    }
    installed
}

/// Install the subscriber described by a config
pub fn init_from_config(config: &AnalyzerConfig) -> bool {
    init(&config.log_filter, config.log_json)
}
