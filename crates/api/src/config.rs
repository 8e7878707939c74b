//! Process configuration read from the environment.

use std::net::SocketAddr;

use thiserror::Error;

use flashcart_core::DelayPolicy;
use flashcart_inventory::SAMPLE_CATALOG_SIZE;

pub const BIND_VAR: &str = "FLASHCART_BIND";
pub const CATALOG_SIZE_VAR: &str = "FLASHCART_CATALOG_SIZE";
pub const DELAYS_VAR: &str = "FLASHCART_DELAYS";

const DEFAULT_BIND: &str = "0.0.0.0:8080";
const MAX_DELAY_FACTOR: f64 = 100.0;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{var}: invalid socket address '{value}'")]
    Bind { var: &'static str, value: String },
    #[error("{var}: expected a non-negative integer, got '{value}'")]
    CatalogSize { var: &'static str, value: String },
    #[error("{var}: expected 'reference', 'none' or a scale factor up to 100, got '{value}'")]
    Delays { var: &'static str, value: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub bind: SocketAddr,
    pub catalog_size: u64,
    pub delays: DelayPolicy,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind: SocketAddr::from(([0, 0, 0, 0], 8080)),
            catalog_size: SAMPLE_CATALOG_SIZE,
            delays: DelayPolicy::reference(),
        }
    }
}

impl Config {
    /// Read the process environment. Unparsable values fall back to their
    /// default with a warning.
    pub fn from_env() -> Self {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        Self {
            bind: setting(lookup(BIND_VAR), parse_bind, defaults.bind),
            catalog_size: setting(lookup(CATALOG_SIZE_VAR), parse_catalog_size, defaults.catalog_size),
            delays: setting(lookup(DELAYS_VAR), parse_delays, defaults.delays),
        }
    }

    /// No injected delays and a small catalog; used by tests.
    pub fn for_tests() -> Self {
        Self {
            bind: SocketAddr::from(([127, 0, 0, 1], 0)),
            catalog_size: 50,
            delays: DelayPolicy::none(),
        }
    }
}

fn setting<T>(raw: Option<String>, parse: fn(&str) -> Result<T, ConfigError>, default: T) -> T {
    match raw {
        None => default,
        Some(value) => parse(value.trim()).unwrap_or_else(|err| {
            tracing::warn!(%err, "falling back to default");
            default
        }),
    }
}

pub fn parse_bind(value: &str) -> Result<SocketAddr, ConfigError> {
    let value = if value.is_empty() { DEFAULT_BIND } else { value };
    value.parse().map_err(|_| ConfigError::Bind {
        var: BIND_VAR,
        value: value.to_string(),
    })
}

pub fn parse_catalog_size(value: &str) -> Result<u64, ConfigError> {
    value.parse().map_err(|_| ConfigError::CatalogSize {
        var: CATALOG_SIZE_VAR,
        value: value.to_string(),
    })
}

pub fn parse_delays(value: &str) -> Result<DelayPolicy, ConfigError> {
    match value.to_ascii_lowercase().as_str() {
        "" | "reference" => Ok(DelayPolicy::reference()),
        "none" | "off" => Ok(DelayPolicy::none()),
        factor => factor
            .parse::<f64>()
            .ok()
            .filter(|f| (0.0..=MAX_DELAY_FACTOR).contains(f))
            .map(DelayPolicy::scaled)
            .ok_or_else(|| ConfigError::Delays {
                var: DELAYS_VAR,
                value: value.to_string(),
            }),
    }
}
