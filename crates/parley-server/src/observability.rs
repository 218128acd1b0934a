//! Tracing setup.
//!
//! The subscriber is installed before the configuration is read, using the
//! default `logging` section, and narrowed to the configured level once the
//! file is loaded. `RUST_LOG`, when set, wins over both.

use std::sync::OnceLock;

use tracing_subscriber::{EnvFilter, Registry, fmt, prelude::*, reload};

use crate::config::LoggingConfig;

static FILTER_HANDLE: OnceLock<reload::Handle<EnvFilter, Registry>> = OnceLock::new();

/// Transport crates that only speak up for warnings.
const QUIET_TARGETS: &[&str] = &["hyper", "hyper_util", "h2"];

/// Filter directives for `level`, with the transport crates held at `warn`.
fn directives(level: &str) -> String {
    QUIET_TARGETS
        .iter()
        .fold(level.to_string(), |acc, target| format!("{acc},{target}=warn"))
}

fn filter_for(logging: &LoggingConfig) -> EnvFilter {
    if std::env::var_os("RUST_LOG").is_some()
        && let Ok(filter) = EnvFilter::try_from_default_env()
    {
        return filter;
    }
    EnvFilter::new(directives(&logging.level))
}

/// Installs the global subscriber. Later calls are no-ops.
pub fn init_tracing(logging: &LoggingConfig) {
    let (filter, handle) = reload::Layer::new(filter_for(logging));
    if FILTER_HANDLE.set(handle).is_err() {
        return;
    }

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer())
        .try_init();
}

/// Switches the running subscriber to `logging.level`.
pub fn apply_logging(logging: &LoggingConfig) {
    if std::env::var_os("RUST_LOG").is_some() {
        return;
    }
    if let Some(handle) = FILTER_HANDLE.get() {
        match handle.reload(EnvFilter::new(directives(&logging.level))) {
            Ok(()) => tracing::debug!(level = %logging.level, "Log level applied"),
            Err(e) => tracing::warn!(error = %e, "Failed to apply log level"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_directives_quiet_transport_crates() {
        assert_eq!(directives("debug"), "debug,hyper=warn,hyper_util=warn,h2=warn");
    }

    #[test]
    fn test_directives_are_valid_filters() {
        for level in ["trace", "debug", "info", "warn", "error"] {
            assert!(EnvFilter::try_new(directives(level)).is_ok(), "{level}");
        }
    }
}
