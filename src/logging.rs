//! Tracing subscriber setup for the CLI.

use crate::ports::config_port::ConfigPort;
use tracing_subscriber::util::TryInitError;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

pub const DEFAULT_LEVEL: &str = "info";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggingConfig {
    pub log_level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            log_level: DEFAULT_LEVEL.to_string(),
        }
    }
}

impl LoggingConfig {
    /// `RUST_LOG` wins, then `[logging] level`, then `info`.
    pub fn resolve(env_level: Option<String>, config: Option<&dyn ConfigPort>) -> Self {
        let log_level = env_level
            .filter(|l| !l.trim().is_empty())
            .or_else(|| config.and_then(|c| c.get_string("logging", "level")))
            .unwrap_or_else(|| DEFAULT_LEVEL.to_string());
        Self { log_level }
    }

    pub fn from_env(config: Option<&dyn ConfigPort>) -> Self {
        Self::resolve(std::env::var("RUST_LOG").ok(), config)
    }
}

/// Installs the global subscriber, writing to stderr so stdout stays data-only.
///
/// Fails if a subscriber is already installed.
pub fn init_logging(config: &LoggingConfig) -> Result<(), TryInitError> {
    tracing_subscriber::registry()
        .with(EnvFilter::new(&config.log_level))
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .try_init()
}
