//! Engine configuration, loaded from environment variables with defaults.

use core::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::query::{DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE, Pagination};

pub const ENV_MAX_RETRIES: &str = "STOCKPILE_MAX_RETRIES";
pub const ENV_DEFAULT_PAGE_SIZE: &str = "STOCKPILE_DEFAULT_PAGE_SIZE";
pub const ENV_MAX_PAGE_SIZE: &str = "STOCKPILE_MAX_PAGE_SIZE";
pub const ENV_DELETE_EMPTY: &str = "STOCKPILE_DELETE_EMPTY";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Retries after the first attempt when a commit loses an optimistic race.
    pub max_retries: u32,
    pub default_page_size: u32,
    pub max_page_size: u32,
    /// Remove records once quantity and reserved both reach 0.
    pub delete_empty_records: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_retries: 5,
            default_page_size: DEFAULT_PAGE_SIZE,
            max_page_size: MAX_PAGE_SIZE,
            delete_empty_records: true,
        }
    }
}

impl EngineConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build from an arbitrary variable lookup. Unparseable values are logged
    /// and replaced by the default.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let mut config = Self {
            max_retries: parse_or(&lookup, ENV_MAX_RETRIES, defaults.max_retries),
            default_page_size: parse_or(&lookup, ENV_DEFAULT_PAGE_SIZE, defaults.default_page_size),
            max_page_size: parse_or(&lookup, ENV_MAX_PAGE_SIZE, defaults.max_page_size),
            delete_empty_records: lookup(ENV_DELETE_EMPTY)
                .map(|raw| parse_flag(ENV_DELETE_EMPTY, &raw, defaults.delete_empty_records))
                .unwrap_or(defaults.delete_empty_records),
        };

        if config.max_page_size == 0 {
            warn!(var = ENV_MAX_PAGE_SIZE, "max page size must be positive; using default");
            config.max_page_size = defaults.max_page_size;
        }
        if config.default_page_size == 0 || config.default_page_size > config.max_page_size {
            warn!(
                var = ENV_DEFAULT_PAGE_SIZE,
                value = config.default_page_size,
                max = config.max_page_size,
                "default page size out of range; clamping"
            );
            config.default_page_size = config.default_page_size.clamp(1, config.max_page_size);
        }
        config
    }

    /// Pagination for a caller request under this configuration's limits.
    pub fn pagination(&self, page: Option<u32>, page_size: Option<u32>) -> Pagination {
        Pagination::with_limits(page, page_size, self.default_page_size, self.max_page_size)
    }
}

fn parse_or<T>(lookup: &impl Fn(&str) -> Option<String>, name: &str, default: T) -> T
where
    T: FromStr + Copy + core::fmt::Display,
{
    match lookup(name) {
        None => default,
        Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
            warn!(var = name, value = %raw, default = %default, "invalid value; using default");
            default
        }),
    }
}

fn parse_flag(name: &str, raw: &str, default: bool) -> bool {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => true,
        "0" | "false" | "no" | "off" => false,
        _ => {
            warn!(var = name, value = %raw, default, "invalid flag; using default");
            default
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> EngineConfig {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        EngineConfig::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn defaults_when_unset() {
        assert_eq!(config(&[]), EngineConfig::default());
    }

    #[test]
    fn reads_values() {
        let c = config(&[
            (ENV_MAX_RETRIES, "9"),
            (ENV_DEFAULT_PAGE_SIZE, "50"),
            (ENV_MAX_PAGE_SIZE, "200"),
            (ENV_DELETE_EMPTY, "off"),
        ]);
        assert_eq!(c.max_retries, 9);
        assert_eq!(c.default_page_size, 50);
        assert_eq!(c.max_page_size, 200);
        assert!(!c.delete_empty_records);
    }

    #[test]
    fn invalid_values_fall_back() {
        let c = config(&[(ENV_MAX_RETRIES, "lots"), (ENV_DELETE_EMPTY, "maybe"), (ENV_MAX_PAGE_SIZE, "0")]);
        assert_eq!(c.max_retries, 5);
        assert!(c.delete_empty_records);
        assert_eq!(c.max_page_size, MAX_PAGE_SIZE);
    }

    #[test]
    fn default_page_size_is_capped_by_max() {
        let c = config(&[(ENV_DEFAULT_PAGE_SIZE, "80"), (ENV_MAX_PAGE_SIZE, "30")]);
        assert_eq!(c.default_page_size, 30);
        let p = c.pagination(None, Some(1000));
        assert_eq!(p.page_size(), 30);
    }
}
