//! Service configuration from environment variables.

use std::net::SocketAddr;

use tracing::warn;

use stockpile_infra::EngineConfig;
use stockpile_observability::LogFormat;

pub const ENV_BIND: &str = "STOCKPILE_BIND";
pub const ENV_LOG_FORMAT: &str = "STOCKPILE_LOG_FORMAT";

const DEFAULT_BIND: &str = "0.0.0.0:8080";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ApiConfig {
    pub bind: SocketAddr,
    pub log_format: LogFormat,
    pub engine: EngineConfig,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            bind: SocketAddr::from(([0, 0, 0, 0], 8080)),
            log_format: LogFormat::Json,
            engine: EngineConfig::default(),
        }
    }
}

impl ApiConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Log format alone, so the subscriber can be installed before the rest of the
    /// config is read. Unparseable values fall back silently; [`Self::from_lookup`] warns.
    pub fn log_format_from_env() -> LogFormat {
        Self::log_format_from_lookup(|name| std::env::var(name).ok())
    }

    pub fn log_format_from_lookup(lookup: impl Fn(&str) -> Option<String>) -> LogFormat {
        lookup(ENV_LOG_FORMAT)
            .and_then(|raw| raw.parse().ok())
            .unwrap_or_default()
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let bind = match lookup(ENV_BIND) {
            None => defaults.bind,
            Some(raw) => raw.trim().parse().unwrap_or_else(|e| {
                warn!(var = ENV_BIND, value = %raw, error = %e, default = DEFAULT_BIND, "invalid bind address; using default");
                defaults.bind
            }),
        };
        let log_format = match lookup(ENV_LOG_FORMAT) {
            None => defaults.log_format,
            Some(raw) => raw.parse().unwrap_or_else(|e: String| {
                warn!(var = ENV_LOG_FORMAT, error = %e, "invalid log format; using json");
                defaults.log_format
            }),
        };

        Self {
            bind,
            log_format,
            engine: EngineConfig::from_lookup(&lookup),
        }
    }
}
